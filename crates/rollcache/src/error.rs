use std::path::PathBuf;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors from cache reads and writes.
///
/// A missing entry is never an error; `get` returns `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt cache entry {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to encode cache entry {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("cache is in read-only mode")]
    ReadOnly,
}

pub type Result<T> = std::result::Result<T, CacheError>;
