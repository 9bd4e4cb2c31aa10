//! Path-keyed binary cache
//!
//! Maps spec file locations to compiled artifacts and keeps breadcrumb
//! symlinks in step with symlinks found on the way to the real spec.
//!
//! # Layout
//!
//! ```text
//! <root>/bin/<os>_<arch>/<escaped absolute spec dir>/<spec basename>
//! ```
//!
//! Each entry is either a regular artifact or a relative symlink to another
//! entry. Every mutation is committed with `rename`, so concurrent
//! invocations only ever observe complete entries.
//!
//! | Entry | Written by | Commit |
//! |-------|------------|--------|
//! | Artifact | builder | rename of `.<name>.<pid>.<seq>.tmp` |
//! | Breadcrumb | symlink walk | rename of `.<name>.<pid>.<seq>.link` |

pub mod breadcrumb;
pub mod escape;
pub mod locator;

pub use breadcrumb::{Hop, SymlinkWalk, MAX_SYMLINK_HOPS};
pub use escape::escape_path;
pub use locator::{spec_basename, ArtifactLocation, CacheLayout, PlatformTag};

use crate::error::{DemandError, DemandResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique hidden sibling of `path` for staging a rename.
///
/// Artifact names are never hidden, so a staged entry can't shadow one.
pub(crate) fn temp_sibling(path: &Path, suffix: &str) -> PathBuf {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = OsString::from(".");
    if let Some(base) = path.file_name() {
        name.push(base);
    }
    name.push(format!(".{}.{}.{}", std::process::id(), seq, suffix));
    path.with_file_name(name)
}

/// Create a cache directory (and parents), tolerating existing ones
pub(crate) async fn ensure_dir(dir: &Path) -> DemandResult<()> {
    tokio::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o750)
        .create(dir)
        .await
        .map_err(|e| DemandError::io(format!("creating cache directory {}", dir.display()), e))
}
