//! Path-addressed persistent cache for rollbook.
//!
//! Entries are keyed by a hash of the *source path string*, not of the file's
//! contents. Extracting pianorolls from a large MIDI corpus is expensive; the
//! cache lets a second load skip parsing entirely.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use rollcache::{CacheConfig, PathCache};
//!
//! // Create from environment (reads ROLLBOOK_CACHE_PATH)
//! let cache = PathCache::new(CacheConfig::from_env().unwrap());
//!
//! // Or at a specific root
//! let cache = PathCache::at_root("/tank/rollbook/cache");
//!
//! cache.put(Path::new("data/song.mid"), &vec![1u8, 2, 3]).unwrap();
//! let hit: Option<Vec<u8>> = cache.get(Path::new("data/song.mid")).unwrap();
//! assert!(hit.is_some());
//! ```
//!
//! # Staleness
//!
//! Renaming or editing a source file does not invalidate its entry. Use
//! [`PathCache::remove`] or point at a fresh root when the corpus changes.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod key;
pub mod store;

// Re-exports for convenience
pub use cache::PathCache;
pub use codec::CodecError;
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use key::{KeyError, PathKey};
pub use store::{EntryStore, FileStore, MemoryStore};
