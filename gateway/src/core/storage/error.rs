use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by [`super::ObjectStorage`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object '{key}' not found in bucket '{bucket}'")]
    NotFound { bucket: String, key: String },

    #[error("object '{key}' is not valid UTF-8")]
    InvalidUtf8 { key: String },

    #[error("invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("storage request for '{key}' failed: {source}")]
    Unavailable {
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("local file error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage configuration error: {0}")]
    Configuration(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
