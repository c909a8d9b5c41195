//! Dataset configuration, loaded from TOML.
//!
//! ```toml
//! required = ["PIANO", "BASS"]
//! workers = 4
//!
//! [parse]
//! steps_per_beat = 24
//! max_steps = 262144
//!
//! [cache]
//! root = "~/.rollbook/cache"
//! read_only = false
//! ```
//!
//! Without a `[cache]` section the cache is disabled.

use std::path::Path;

use anyhow::{Context, Result};
use midi_roll::ParseOptions;
use rollcache::CacheConfig;
use serde::{Deserialize, Serialize};

use crate::instrument::Instrument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Instruments every file must contain, in tensor channel order.
    #[serde(default = "default_required")]
    pub required: Vec<Instrument>,

    /// Files loaded concurrently.
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub parse: ParseOptions,

    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

fn default_required() -> Vec<Instrument> {
    vec![Instrument::Piano]
}

fn default_workers() -> usize {
    1
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            required: default_required(),
            workers: default_workers(),
            parse: ParseOptions::default(),
            cache: None,
        }
    }
}

impl DatasetConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse TOML: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
