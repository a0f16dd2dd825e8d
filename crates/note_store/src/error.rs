use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures to persist notes. The file on disk keeps its last good contents.
/// Unknown ids and malformed note files are not errors; see `NoteRepository`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode notes")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
