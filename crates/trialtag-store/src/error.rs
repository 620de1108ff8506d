use std::path::PathBuf;

use thiserror::Error;
use trialtag_core::FeedbackError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is neither UTF-8 nor Windows-1252 (undefined byte 0x{byte:02X})")]
    Encoding { path: PathBuf, byte: u8 },

    #[error("{path}: missing '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
