//! Storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or writing the flag file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The flag file or its directory could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The flag file exists but is not a JSON object of strings.
    #[error("corrupt flag file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The flag map could not be encoded.
    #[error("failed to encode flags: {0}")]
    Encode(#[from] serde_json::Error),
}
