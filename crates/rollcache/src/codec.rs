//! On-disk entry format.
//!
//! ```text
//! +------+---------------+----------------------+
//! | ROLL | version (u32) | bincode body ...     |
//! +------+---------------+----------------------+
//!   4 B     4 B LE
//! ```
//!
//! Anything that does not decode is corruption, not a miss.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub const MAGIC: &[u8; 4] = b"ROLL";
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("entry is {0} bytes, shorter than the header")]
    Truncated(usize),

    #[error("bad magic bytes")]
    BadMagic,

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Serialize a value behind the entry header.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    let body = bincode::serialize(value)?;
    let mut buf = Vec::with_capacity(HEADER_LEN + body.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&body);
    Ok(buf)
}

/// Check the entry header and deserialize the body.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Truncated(bytes.len()));
    }
    if &bytes[..4] != MAGIC {
        return Err(CodecError::BadMagic);
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    Ok(bincode::deserialize(&bytes[HEADER_LEN..])?)
}
