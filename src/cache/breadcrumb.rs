//! Symlink walk from a user-supplied spec path to the real spec file
//!
//! Every filesystem symlink crossed on the way gets a breadcrumb in the
//! cache: a relative symlink from the link's own cache entry to the cache
//! entry of its target. The chain is re-walked on every invocation so the
//! breadcrumbs follow changes to the live filesystem.

use crate::cache::locator::{ArtifactLocation, CacheLayout};
use crate::cache::{ensure_dir, temp_sibling};
use crate::error::{DemandError, DemandResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Maximum number of symlinks followed before giving up
pub const MAX_SYMLINK_HOPS: usize = 100;

/// One step of the walk
#[derive(Debug, Clone)]
pub struct Hop {
    /// Spec path at this hop (as typed, or as read from a link)
    pub spec_path: PathBuf,
    /// Cache coordinates for this spec path
    pub location: ArtifactLocation,
    /// Whether `spec_path` is a symlink; the last hop never is
    pub is_symlink: bool,
}

/// Lazy, hop-by-hop walk of a symlink chain
pub struct SymlinkWalk<'a> {
    layout: &'a CacheLayout,
    origin: PathBuf,
    next: Option<PathBuf>,
    followed: usize,
}

impl<'a> SymlinkWalk<'a> {
    pub fn new(layout: &'a CacheLayout, spec_path: impl Into<PathBuf>) -> Self {
        let origin = spec_path.into();
        Self {
            layout,
            next: Some(origin.clone()),
            origin,
            followed: 0,
        }
    }

    /// Advance one hop, writing its breadcrumb if it is a symlink.
    ///
    /// Returns `None` once the terminal (non-symlink) hop has been yielded.
    pub async fn next_hop(&mut self) -> DemandResult<Option<Hop>> {
        let Some(spec_path) = self.next.take() else {
            return Ok(None);
        };
        let location = self.layout.locate(&spec_path)?;

        let Some(link_target) = maybe_readlink(&spec_path).await? else {
            clear_stale_breadcrumb(&location.artifact_path()).await?;
            return Ok(Some(Hop {
                spec_path,
                location,
                is_symlink: false,
            }));
        };

        if self.followed >= MAX_SYMLINK_HOPS {
            return Err(DemandError::TooManySymlinks {
                path: self.origin.clone(),
                limit: MAX_SYMLINK_HOPS,
            });
        }
        self.followed += 1;

        // Relative link targets are relative to the link's directory
        let target = spec_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&link_target);
        let target_location = self.layout.locate(&target)?;

        ensure_dir(&location.dir).await?;
        let crumb = location.artifact_path();
        replace_symlink(&target_location.relative_path(), &crumb).await?;
        debug!(
            "Breadcrumb {} -> {}",
            crumb.display(),
            target_location.artifact_path().display()
        );

        self.next = Some(target);
        Ok(Some(Hop {
            spec_path,
            location,
            is_symlink: true,
        }))
    }

    /// Walk the whole chain, returning every hop in order
    pub async fn collect(mut self) -> DemandResult<Vec<Hop>> {
        let mut hops = Vec::new();
        while let Some(hop) = self.next_hop().await? {
            hops.push(hop);
        }
        Ok(hops)
    }
}

/// Like `read_link`, but `None` for paths that are not symlinks
async fn maybe_readlink(path: &Path) -> DemandResult<Option<PathBuf>> {
    match fs::read_link(path).await {
        Ok(target) => Ok(Some(target)),
        Err(e) if e.kind() == ErrorKind::InvalidInput => Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(DemandError::BrokenSymlink {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(DemandError::io(format!("readlink {}", path.display()), e)),
    }
}

/// Remove a breadcrumb left at the entry of a path that is no longer a symlink.
///
/// Artifacts of regular spec files are regular files, so a symlink here
/// would redirect execution to another spec's binary.
async fn clear_stale_breadcrumb(entry: &Path) -> DemandResult<()> {
    match fs::symlink_metadata(entry).await {
        Ok(meta) if meta.file_type().is_symlink() => {}
        Ok(_) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(DemandError::io(format!("stat {}", entry.display()), e)),
    }

    match fs::remove_file(entry).await {
        Ok(()) => {
            debug!("Removed stale breadcrumb {}", entry.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DemandError::io(
            format!("removing stale breadcrumb {}", entry.display()),
            e,
        )),
    }
}

/// Point `link` at `target`, replacing any existing entry atomically
pub(crate) async fn replace_symlink(target: &Path, link: &Path) -> DemandResult<()> {
    let tmp = temp_sibling(link, "link");
    fs::symlink(target, &tmp)
        .await
        .map_err(|e| DemandError::io(format!("creating symlink {}", tmp.display()), e))?;

    if let Err(e) = fs::rename(&tmp, link).await {
        if let Err(cleanup) = fs::remove_file(&tmp).await {
            warn!("temp symlink cleanup failed for {}: {}", tmp.display(), cleanup);
        }
        return Err(DemandError::io(
            format!("replacing symlink {}", link.display()),
            e,
        ));
    }
    Ok(())
}
