//! Configuration schema for demand
//!
//! Configuration is stored at `~/.config/demand/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Binary cache settings
    pub cache: CacheConfig,

    /// Toolchain settings
    pub build: BuildConfig,
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root; `DEMAND_CACHE_DIR` takes precedence
    pub dir: Option<PathBuf>,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Go toolchain program
    pub go: PathBuf,

    /// Also search the ambient GOPATH after the ephemeral one
    pub use_gopath: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            go: PathBuf::from("go"),
            use_gopath: false,
        }
    }
}
