//! Error types for bookmark storage.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::DecodeError;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("decode file key: {0}")]
    Decode(#[from] DecodeError),
    #[error("key path is empty")]
    EmptyKeyPath,
    #[error("invalid line number {0}: lines start at 1")]
    InvalidLine(u32),
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
    #[error("annotation is empty")]
    EmptyAnnotation,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
