//! Cache key derivation
//!
//! Artifacts live at `<root>/bin/<platform>/<escaped spec dir>/<spec basename>`.
//! Keying on the spec's own directory means two spec files naming the same
//! import never share a binary unless the user links them with a symlink.

use crate::cache::escape::escape_path;
use crate::error::{DemandError, DemandResult};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};

/// OS and CPU architecture pair used as one cache path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTag(String);

impl PlatformTag {
    /// Tag for the platform this binary was compiled for
    pub fn current() -> Self {
        Self(format!(
            "{}_{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the compiled artifact for one spec path belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    /// Cache directory holding the artifact
    pub dir: PathBuf,
    /// Escaped absolute directory of the spec (last segment of `dir`)
    pub escaped_dir: OsString,
    /// Basename of the spec, reused as the artifact name
    pub basename: OsString,
}

impl ArtifactLocation {
    /// Full path of the artifact
    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(&self.basename)
    }

    /// Path of the artifact relative to any sibling cache directory
    pub fn relative_path(&self) -> PathBuf {
        Path::new("..").join(&self.escaped_dir).join(&self.basename)
    }
}

/// Per-platform binary cache layout under a cache root
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
    platform_dir: PathBuf,
}

impl CacheLayout {
    /// Create a layout for `root`, which should already be absolute
    pub fn new(root: impl Into<PathBuf>, platform: &PlatformTag) -> Self {
        let root = root.into();
        let platform_dir = root.join("bin").join(platform.as_str());
        Self { root, platform_dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/bin/<platform>`
    pub fn platform_dir(&self) -> &Path {
        &self.platform_dir
    }

    /// Compute the artifact location for a spec path.
    ///
    /// Fails with `InvalidSpec` for hidden basenames and when the spec's
    /// directory cannot be made absolute.
    pub fn locate(&self, spec_path: &Path) -> DemandResult<ArtifactLocation> {
        let basename = spec_basename(spec_path)?;
        let parent = spec_path.parent().unwrap_or_else(|| Path::new(""));
        let abs_dir = absolute_dir(parent).map_err(|e| {
            DemandError::invalid_spec(spec_path, format!("cannot resolve directory: {}", e))
        })?;

        let escaped_dir = escape_path(abs_dir.as_os_str());
        Ok(ArtifactLocation {
            dir: self.platform_dir.join(&escaped_dir),
            escaped_dir,
            basename: basename.to_os_string(),
        })
    }
}

/// Basename of a spec path, rejecting hidden files
pub fn spec_basename(spec_path: &Path) -> DemandResult<&OsStr> {
    let basename = spec_path
        .file_name()
        .ok_or_else(|| DemandError::invalid_spec(spec_path, "spec path has no file name"))?;
    if basename.as_bytes().starts_with(b".") {
        return Err(DemandError::invalid_spec(
            spec_path,
            "refusing to run hidden spec file",
        ));
    }
    Ok(basename)
}

/// Absolute, lexically cleaned form of a directory. Symlinks in the
/// directory chain are deliberately not resolved.
fn absolute_dir(dir: &Path) -> std::io::Result<PathBuf> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let abs = std::path::absolute(dir)?;

    let mut clean = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other),
        }
    }
    Ok(clean)
}
