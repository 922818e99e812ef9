//! Combines the English corpora used for ASR training. Manifests are expected to have been
//! prepared ahead of time and placed in one directory using the usual file naming:
//!
//! * GigaSpeech: `cuts_XS.jsonl.gz`, `cuts_DEV.jsonl.gz`, `cuts_TEST.jsonl.gz`
//! * CommonVoice: `cv-en_cuts_{train,dev,test}.jsonl.gz`
//! * LibriSpeech: `librispeech_cuts_<split>.jsonl.gz`
//!
//! Training only has a recipe for all three corpora together. Dev and test sets ignore the flags
//! and always load every corpus.
use crate::cut_set::CutSet;
use crate::error::Error;
use crate::manifest::{load_manifest_lazy, LazyManifest};
use clap::{ArgAction, Args};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiDatasetArgs {
    /// Directory containing the cut manifests
    #[clap(long, default_value = "data/fbank")]
    pub manifest_dir: PathBuf,
    /// Include LibriSpeech (960h) in training
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    #[serde(default = "enabled")]
    pub use_librispeech: bool,
    /// Include the GigaSpeech XS subset in training
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    #[serde(default = "enabled")]
    pub use_gigaspeech: bool,
    /// Include CommonVoice English in training
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    #[serde(default = "enabled")]
    pub use_commonvoice: bool,
}

fn enabled() -> bool {
    true
}

impl Default for MultiDatasetArgs {
    fn default() -> Self {
        Self {
            manifest_dir: PathBuf::from("data/fbank"),
            use_librispeech: true,
            use_gigaspeech: true,
            use_commonvoice: true,
        }
    }
}

pub struct MultiDataset {
    manifest_dir: PathBuf,
    use_librispeech: bool,
    use_gigaspeech: bool,
    use_commonvoice: bool,
    train_clean_100: OnceCell<LazyManifest>,
    train_clean_360: OnceCell<LazyManifest>,
    train_other_500: OnceCell<LazyManifest>,
    dev_clean: OnceCell<LazyManifest>,
    dev_other: OnceCell<LazyManifest>,
    test_clean: OnceCell<LazyManifest>,
    test_other: OnceCell<LazyManifest>,
}

impl MultiDataset {
    /// Nothing is checked here, a bad directory shows up the first time a manifest is loaded.
    pub fn new(args: &MultiDatasetArgs) -> Self {
        Self {
            manifest_dir: args.manifest_dir.clone(),
            use_librispeech: args.use_librispeech,
            use_gigaspeech: args.use_gigaspeech,
            use_commonvoice: args.use_commonvoice,
            train_clean_100: OnceCell::new(),
            train_clean_360: OnceCell::new(),
            train_other_500: OnceCell::new(),
            dev_clean: OnceCell::new(),
            dev_other: OnceCell::new(),
            test_clean: OnceCell::new(),
            test_other: OnceCell::new(),
        }
    }

    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    pub fn train_cuts(&self) -> Result<CutSet, Error> {
        info!("About to get multidataset train cuts");

        let gigaspeech = if self.use_gigaspeech {
            info!("Loading GigaSpeech in lazy mode");
            Some(self.load("cuts_XS.jsonl.gz")?)
        } else {
            None
        };

        let commonvoice = if self.use_commonvoice {
            info!("Loading CommonVoice in lazy mode");
            Some(self.load("cv-en_cuts_train.jsonl.gz")?)
        } else {
            None
        };

        let librispeech = if self.use_librispeech {
            info!("Loading LibriSpeech in lazy mode");
            Some([
                self.train_clean_100_cuts()?,
                self.train_clean_360_cuts()?,
                self.train_other_500_cuts()?,
            ])
        } else {
            None
        };

        match (gigaspeech, librispeech, commonvoice) {
            (Some(gigaspeech), Some([clean_100, clean_360, other_500]), Some(commonvoice)) => {
                CutSet::mux_by_len(vec![
                    gigaspeech.into(),
                    clean_100.into(),
                    clean_360.into(),
                    other_500.into(),
                    commonvoice.into(),
                ])
            }
            _ => Err(Error::NotImplemented {
                use_gigaspeech: self.use_gigaspeech,
                use_librispeech: self.use_librispeech,
                use_commonvoice: self.use_commonvoice,
            }),
        }
    }

    pub fn dev_cuts(&self) -> Result<CutSet, Error> {
        info!("About to get multidataset dev cuts");

        info!("Loading GigaSpeech DEV set in lazy mode");
        let gigaspeech = self.load("cuts_DEV.jsonl.gz")?;

        let dev_clean = self.dev_clean_cuts()?;
        let dev_other = self.dev_other_cuts()?;

        info!("Loading CommonVoice set in lazy mode");
        let commonvoice = self.load("cv-en_cuts_dev.jsonl.gz")?;

        CutSet::mux_by_len(vec![
            gigaspeech.into(),
            dev_clean.into(),
            dev_other.into(),
            commonvoice.into(),
        ])
    }

    /// Test sets are kept separate so each corpus can be scored on its own
    pub fn test_cuts(&self) -> Result<BTreeMap<String, CutSet>, Error> {
        info!("About to get multidataset test cuts");

        info!("Loading GigaSpeech test set in lazy mode");
        let gigaspeech = self.load("cuts_TEST.jsonl.gz")?;

        let test_clean = self.test_clean_cuts()?;
        let test_other = self.test_other_cuts()?;

        info!("Loading CommonVoice set in lazy mode");
        let commonvoice = self.load("cv-en_cuts_test.jsonl.gz")?;

        let mut test_cuts = BTreeMap::new();
        test_cuts.insert("librispeech_test_clean".to_string(), test_clean.into());
        test_cuts.insert("librispeech_test_other".to_string(), test_other.into());
        test_cuts.insert("gigaspeech_test".to_string(), gigaspeech.into());
        test_cuts.insert("commonvoice_test".to_string(), commonvoice.into());
        Ok(test_cuts)
    }

    pub fn train_clean_100_cuts(&self) -> Result<LazyManifest, Error> {
        self.librispeech(&self.train_clean_100, "train-clean-100")
    }

    pub fn train_clean_360_cuts(&self) -> Result<LazyManifest, Error> {
        self.librispeech(&self.train_clean_360, "train-clean-360")
    }

    pub fn train_other_500_cuts(&self) -> Result<LazyManifest, Error> {
        self.librispeech(&self.train_other_500, "train-other-500")
    }

    pub fn dev_clean_cuts(&self) -> Result<LazyManifest, Error> {
        self.librispeech(&self.dev_clean, "dev-clean")
    }

    pub fn dev_other_cuts(&self) -> Result<LazyManifest, Error> {
        self.librispeech(&self.dev_other, "dev-other")
    }

    pub fn test_clean_cuts(&self) -> Result<LazyManifest, Error> {
        self.librispeech(&self.test_clean, "test-clean")
    }

    pub fn test_other_cuts(&self) -> Result<LazyManifest, Error> {
        self.librispeech(&self.test_other, "test-other")
    }

    /// Loads a LibriSpeech split the first time it's asked for, after that the cached manifest is
    /// handed out. A failed load isn't cached so it will be retried on the next call.
    fn librispeech(
        &self,
        cell: &OnceCell<LazyManifest>,
        split: &str,
    ) -> Result<LazyManifest, Error> {
        cell.get_or_try_init(|| {
            info!("About to get {} cuts", split);
            self.load(&format!("librispeech_cuts_{}.jsonl.gz", split))
        })
        .cloned()
    }

    fn load(&self, name: &str) -> Result<LazyManifest, Error> {
        load_manifest_lazy(self.manifest_dir.join(name))
    }
}
