//! PathKey: a BLAKE3 hash of a source path string, truncated to 128 bits (32 hex chars).
//!
//! The key is derived from the path as given, not from the file's bytes.
//! `song.mid`, `./song.mid` and `/data/song.mid` are three different keys, and
//! editing or renaming a file never invalidates the entry stored under its old path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// A cache key - 128 bits (16 bytes, 32 hex chars) of BLAKE3 over the path bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKey(String);

/// Errors that can occur when parsing keys.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid key length: expected 32 hex chars, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex character in key")]
    InvalidHex,
}

impl PathKey {
    /// Key for a source path, taken byte-for-byte.
    pub fn from_path(path: &Path) -> Self {
        Self::from_bytes(path.as_os_str().as_encoded_bytes())
    }

    fn from_bytes(data: &[u8]) -> Self {
        let hash_bytes = blake3::hash(data);
        let hash_hex = hex::encode(&hash_bytes.as_bytes()[..16]); // Truncate to 16 bytes (128 bits)
        Self(hash_hex)
    }

    /// Create from an existing key string (validates format).
    pub fn from_str_checked(s: &str) -> Result<Self, KeyError> {
        if s.len() != 32 {
            return Err(KeyError::InvalidLength(s.len()));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(KeyError::InvalidHex);
        }
        Ok(Self(s.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PathKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_checked(s)
    }
}

impl AsRef<str> for PathKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
