//! Error types for demand
//!
//! All modules use `DemandResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for demand operations
pub type DemandResult<T> = Result<T, DemandError>;

/// All errors that can occur while resolving, building or launching a spec
#[derive(Error, Debug)]
pub enum DemandError {
    // Spec location errors
    #[error("Invalid spec {path}: {reason}")]
    InvalidSpec { path: PathBuf, reason: String },

    #[error("Too many levels of symlinks (>{limit}) starting at {path}")]
    TooManySymlinks { path: PathBuf, limit: usize },

    #[error("Broken symlink: {path}")]
    BrokenSymlink { path: PathBuf },

    // Spec content errors
    #[error("Cannot parse spec file {path}: {reason}")]
    SpecParse { path: PathBuf, reason: String },

    // Build errors
    #[error("Could not fetch {module} for {spec}: {status}")]
    Fetch {
        module: String,
        spec: PathBuf,
        status: String,
    },

    #[error("Could not compile {module} for {spec}: {status}")]
    Compile {
        module: String,
        spec: PathBuf,
        status: String,
    },

    #[error("Could not put new binary in place ({from} -> {to}): {source}")]
    Install {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Launch errors
    #[error("Cannot exec {path}: {source}")]
    Exec {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Cannot determine home directory for the cache")]
    HomeNotFound,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl DemandError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an invalid spec error
    pub fn invalid_spec(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::HomeNotFound => Some("Set DEMAND_CACHE_DIR to choose a cache location"),
            Self::SpecParse { .. } => {
                Some("A spec needs a go: section with a non-empty import: key")
            }
            Self::TooManySymlinks { .. } => Some("Check the spec path for a symlink loop"),
            Self::CommandFailed { .. } => {
                Some("Is the Go toolchain installed? Override it with --go or DEMAND_GO")
            }
            _ => None,
        }
    }
}
