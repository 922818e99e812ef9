use std::env;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::{Layer, Registry};

pub mod cut;
pub mod cut_set;
pub mod error;
pub mod manifest;
pub mod multi_dataset;
pub mod stats;

pub use cut::*;
pub use cut_set::CutSet;
pub use error::Error;
pub use manifest::{load_manifest_lazy, LazyManifest};
pub use multi_dataset::{MultiDataset, MultiDatasetArgs};

pub fn setup_logging() {
    let filter = match env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_env("RUST_LOG"),
        _ => EnvFilter::new("asr_multidataset=info,inspect=info"),
    };

    let fmt = tracing_subscriber::fmt::Layer::default();

    let subscriber = filter.and_then(fmt).with_subscriber(Registry::default());

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Logging already initialised: {}", e);
    }
}
