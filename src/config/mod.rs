//! Configuration management for demand

pub mod schema;

pub use schema::Config;

use crate::error::{DemandError, DemandResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Overrides the cache root
pub const CACHE_DIR_ENV: &str = "DEMAND_CACHE_DIR";

/// Ambient dependency root list of the Go toolchain
pub const GOPATH_ENV: &str = "GOPATH";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("demand")
            .join("config.toml")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> DemandResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> DemandResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DemandError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| DemandError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute cache root: `DEMAND_CACHE_DIR`, then `cache.dir`, then
/// `~/.cache/demand`.
pub fn cache_root(config: &Config) -> DemandResult<PathBuf> {
    resolve_cache_root(std::env::var_os(CACHE_DIR_ENV), config, dirs::home_dir())
}

fn resolve_cache_root(
    env_override: Option<OsString>,
    config: &Config,
    home: Option<PathBuf>,
) -> DemandResult<PathBuf> {
    let root = match env_override.filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => match &config.cache.dir {
            Some(dir) => dir.clone(),
            None => home
                .ok_or(DemandError::HomeNotFound)?
                .join(".cache")
                .join("demand"),
        },
    };

    std::path::absolute(&root)
        .map_err(|e| DemandError::io(format!("resolving cache root {}", root.display()), e))
}

/// Ambient GOPATH, when the user opted in to searching it
pub fn ambient_gopath(opt_in: bool) -> Option<OsString> {
    if !opt_in {
        return None;
    }
    std::env::var_os(GOPATH_ENV).filter(|v| !v.is_empty())
}
