//! Summaries of the cut sets, mainly so you can sanity check a manifest directory before kicking
//! off a long training run.
use crate::cut_set::CutSet;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub cuts: usize,
    pub supervisions: usize,
    pub total_duration_secs: f64,
    /// Number of cuts without any transcript text
    pub untranscribed: usize,
}

impl CorpusSummary {
    /// Streams every cut in the set, for the big training sets this reads a lot of data.
    pub fn compute(cuts: &CutSet) -> Result<Self, Error> {
        let mut summary = Self::default();
        for cut in cuts.iter()? {
            summary.push(&cut?);
        }
        Ok(summary)
    }

    fn push(&mut self, cut: &crate::cut::Cut) {
        self.cuts += 1;
        self.supervisions += cut.supervisions.len();
        self.total_duration_secs += cut.duration;
        if cut.text().trim().is_empty() {
            self.untranscribed += 1;
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.total_duration_secs / 3600.0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetReport {
    /// Not present if the training set wasn't requested or the flags have no recipe
    pub train: Option<CorpusSummary>,
    pub dev: CorpusSummary,
    pub test: BTreeMap<String, CorpusSummary>,
}

impl DatasetReport {
    pub fn log(&self) {
        if let Some(train) = &self.train {
            info!(
                "train: {} cuts, {:.2} hours",
                train.cuts,
                train.total_hours()
            );
        }
        info!("dev: {} cuts, {:.2} hours", self.dev.cuts, self.dev.total_hours());
        for (name, summary) in &self.test {
            info!(
                "{}: {} cuts, {:.2} hours",
                name,
                summary.cuts,
                summary.total_hours()
            );
        }
    }
}
