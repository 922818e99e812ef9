use asr_multidataset::stats::{CorpusSummary, DatasetReport};
use asr_multidataset::*;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Loads the train/dev/test sets the same way training would and reports what's in them
#[derive(Parser, Debug)]
pub struct Args {
    #[clap(flatten)]
    dataset: MultiDatasetArgs,
    /// Where to write the JSON report, printed to stdout if not given
    #[clap(long, short)]
    output: Option<PathBuf>,
    /// Don't read the training set, it's by far the largest
    #[clap(long)]
    skip_train: bool,
}

fn main() -> anyhow::Result<()> {
    asr_multidataset::setup_logging();
    let args = Args::parse();

    let dataset = MultiDataset::new(&args.dataset);
    info!("Inspecting manifests in {}", dataset.manifest_dir().display());

    let train = if args.skip_train {
        None
    } else {
        match dataset.train_cuts() {
            Ok(cuts) => Some(CorpusSummary::compute(&cuts)?),
            Err(e @ Error::NotImplemented { .. }) => {
                warn!("Skipping training set: {}", e);
                None
            }
            Err(e) => return Err(e.into()),
        }
    };

    let dev = CorpusSummary::compute(&dataset.dev_cuts()?)?;

    let test: BTreeMap<String, CorpusSummary> = dataset
        .test_cuts()?
        .iter()
        .map(|(name, cuts)| {
            let summary = CorpusSummary::compute(cuts)?;
            Ok::<_, anyhow::Error>((name.clone(), summary))
        })
        .collect::<anyhow::Result<_>>()?;

    let report = DatasetReport { train, dev, test };
    report.log();

    let report = serde_json::to_string_pretty(&report)?;
    match args.output {
        Some(path) => std::fs::write(path, report)?,
        None => println!("{}", report),
    }

    Ok(())
}
