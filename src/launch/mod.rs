//! Launching specs
//!
//! Walks the spec's symlink chain trying cached artifacts at every hop,
//! builds on a miss, and replaces the current process with the result.

pub mod exec;
pub mod launcher;

pub use exec::{ExecReplacer, ExecTarget, ProcessReplacer};
pub use launcher::{LaunchOptions, Launched, Launcher, Mode};
