use std::path::PathBuf;

use thiserror::Error;

/// Infrastructure failures. Unlike extraction errors, which are recorded
/// per target and never stop a batch, these abort the run: losing the
/// mapping store or progress file makes further work pointless.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("i/o failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize state for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
