//! Cache configuration with environment variable and file-based loading.
//!
//! Environment variables:
//! - `ROLLBOOK_CACHE_PATH`: Root directory for cache entries
//! - `ROLLBOOK_CACHE_READONLY`: Set to "true" for read-only mode
//!
//! Default root: `~/.rollbook/cache`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_CACHE_PATH: &str = "ROLLBOOK_CACHE_PATH";
pub const ENV_CACHE_READONLY: &str = "ROLLBOOK_CACHE_READONLY";

/// Configuration for the pianoroll cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding `{key}.roll` entries. Created on first write.
    #[serde(default = "default_cache_root")]
    pub root: PathBuf,

    /// Read-only mode - lookups only, writes are refused.
    /// Useful for sharing a prebuilt cache between training jobs.
    #[serde(default)]
    pub read_only: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: default_cache_root(),
            read_only: false,
        }
    }
}

/// Get the default cache root (~/.rollbook/cache).
fn default_cache_root() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".rollbook").join("cache"))
        .unwrap_or_else(|| PathBuf::from(".rollbook/cache"))
}

impl CacheConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let root = env::var(ENV_CACHE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_cache_root());

        let read_only = env::var(ENV_CACHE_READONLY)
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self { root, read_only })
    }

    /// Load configuration from a TOML file, falling back to environment.
    ///
    /// The file should contain a `[cache]` section:
    /// ```toml
    /// [cache]
    /// root = "/tank/rollbook/cache"
    /// read_only = false
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let table: toml::Table = contents
            .parse()
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?;

        if let Some(section) = table.get("cache") {
            let config: CacheConfig = section
                .clone()
                .try_into()
                .context("failed to parse [cache] section")?;
            Ok(config)
        } else {
            // No [cache] section, fall back to env
            Self::from_env()
        }
    }

    /// Create a writable config rooted at a specific directory.
    pub fn with_root(path: impl Into<PathBuf>) -> Self {
        Self {
            root: path.into(),
            read_only: false,
        }
    }

    /// Create a read-only config rooted at a specific directory.
    pub fn read_only(path: impl Into<PathBuf>) -> Self {
        Self {
            root: path.into(),
            read_only: true,
        }
    }
}
