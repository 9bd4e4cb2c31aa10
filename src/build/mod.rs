//! Building spec artifacts
//!
//! Parses the spec, runs the external toolchain in an ephemeral workspace
//! and installs the result into the cache with a single rename.

pub mod builder;
pub mod spec;
#[cfg(test)]
pub(crate) mod testing;
pub mod toolchain;

pub use builder::Builder;
pub use spec::Spec;
pub use toolchain::{BuildWorkspace, GoToolchain, Toolchain};
