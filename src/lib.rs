//! demand - build and run programs on demand
//!
//! Turns a tiny spec file naming a Go import path into a cached binary,
//! keyed by the spec's location, and replaces the current process with it.

#[cfg(not(unix))]
compile_error!("demand relies on Unix symlinks and exec(2)");

pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod launch;

pub use error::{DemandError, DemandResult};
