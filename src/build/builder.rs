//! One-shot, isolated build and atomic install of a spec's artifact
//!
//! The only commit point is the final `rename` of a per-process temporary
//! inside the destination cache directory. Any failure before it leaves
//! the previous artifact (if any) untouched.

use crate::build::spec::Spec;
use crate::build::toolchain::{BuildWorkspace, Toolchain};
use crate::cache::{ensure_dir, temp_sibling, ArtifactLocation};
use crate::error::{DemandError, DemandResult};
use std::ffi::OsString;
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Builds spec artifacts with an external toolchain
pub struct Builder<'a> {
    toolchain: &'a dyn Toolchain,
    ambient_dependency_root: Option<&'a OsString>,
}

impl<'a> Builder<'a> {
    /// Create a builder. With `ambient_dependency_root` set, it is searched
    /// after the ephemeral workspace.
    pub fn new(toolchain: &'a dyn Toolchain, ambient_dependency_root: Option<&'a OsString>) -> Self {
        Self {
            toolchain,
            ambient_dependency_root,
        }
    }

    /// Build the module named by the spec at `spec_path` and install it at
    /// `location`.
    pub async fn build(&self, spec_path: &Path, location: &ArtifactLocation) -> DemandResult<()> {
        ensure_dir(&location.dir).await?;

        let spec = Spec::from_file(spec_path).await?;
        let module = spec.import();
        info!("Building {} for {}", module, spec_path.display());

        let workspace_dir = tempfile::Builder::new()
            .prefix("demand-gopath-")
            .tempdir()
            .map_err(|e| DemandError::io("creating build workspace", e))?;
        let binary = location.artifact_path();
        let staged = temp_sibling(&binary, "tmp");

        let result = self
            .fetch_compile_install(spec_path, module, workspace_dir.path(), &staged, &binary)
            .await;

        cleanup(workspace_dir, &staged).await;
        result
    }

    async fn fetch_compile_install(
        &self,
        spec_path: &Path,
        module: &str,
        workspace_root: &Path,
        staged: &Path,
        binary: &Path,
    ) -> DemandResult<()> {
        let workspace = BuildWorkspace::new(workspace_root, self.ambient_dependency_root)?;
        debug!(
            "{} workspace: {}",
            self.toolchain.name(),
            workspace.dependency_path.to_string_lossy()
        );

        let status = self.toolchain.fetch(module, &workspace).await?;
        if !status.success() {
            return Err(DemandError::Fetch {
                module: module.to_string(),
                spec: spec_path.to_path_buf(),
                status: status.to_string(),
            });
        }

        let status = self.toolchain.compile(module, &workspace, staged).await?;
        if !status.success() {
            return Err(DemandError::Compile {
                module: module.to_string(),
                spec: spec_path.to_path_buf(),
                status: status.to_string(),
            });
        }

        tokio::fs::rename(staged, binary)
            .await
            .map_err(|e| DemandError::Install {
                from: staged.to_path_buf(),
                to: binary.to_path_buf(),
                source: e,
            })?;

        info!("Installed {}", binary.display());
        Ok(())
    }
}

/// Best-effort removal of the workspace and any staged output
async fn cleanup(workspace: TempDir, staged: &Path) {
    let workspace_path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        warn!(
            "tempdir cleanup failed for {}: {}",
            workspace_path.display(),
            e
        );
    }

    match tokio::fs::remove_file(staged).await {
        Ok(()) => debug!("Removed leftover {}", staged.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("temp binary cleanup failed for {}: {}", staged.display(), e),
    }
}
