//! Error types for history and result-slot I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading or writing history records and the result slot.
///
/// Per-file errors are absorbed by the writer and reconciler, which fall
/// back to defaults; only directory-level failures reach the caller.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed result file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl HistoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HistoryError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type HistoryResult<T> = Result<T, HistoryError>;
