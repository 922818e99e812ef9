use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading or combining cut manifests.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested combination of corpora has no training recipe.
    #[error(
        "Not implemented for use_gigaspeech: {use_gigaspeech} use_librispeech: {use_librispeech} use_commonvoice: {use_commonvoice}"
    )]
    NotImplemented {
        use_gigaspeech: bool,
        use_librispeech: bool,
        use_commonvoice: bool,
    },
    #[error("failed to read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed cut on line {line} of {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid mux weights: {0}")]
    InvalidWeights(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The kind of the underlying IO failure, if this error came from the filesystem.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
