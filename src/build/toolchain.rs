//! External fetch/compile toolchain
//!
//! The toolchain is a black box: it gets a module reference and an
//! isolated workspace, and reports only an exit status. Its own output is
//! streamed to our stderr so it never mixes with the launched program's
//! stdout.

use crate::error::{DemandError, DemandResult};
use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::debug;

/// Isolated dependency root for one build
#[derive(Debug, Clone)]
pub struct BuildWorkspace {
    /// Ephemeral, process-private directory; also the working directory
    pub root: PathBuf,
    /// Dependency search list, ephemeral root first
    pub dependency_path: OsString,
}

impl BuildWorkspace {
    /// Workspace at `root`, optionally searching an ambient root list after it
    pub fn new(root: impl Into<PathBuf>, ambient: Option<&OsString>) -> DemandResult<Self> {
        let root = root.into();
        let mut roots = vec![root.clone()];
        if let Some(ambient) = ambient.filter(|a| !a.is_empty()) {
            roots.extend(std::env::split_paths(ambient));
        }
        let dependency_path = std::env::join_paths(roots).map_err(|e| {
            DemandError::io(
                "joining dependency roots",
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            )
        })?;
        Ok(Self {
            root,
            dependency_path,
        })
    }
}

/// Fetch and compile steps of an external build toolchain
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Download the module and its dependencies into the workspace
    async fn fetch(&self, module: &str, workspace: &BuildWorkspace) -> DemandResult<ExitStatus>;

    /// Compile the module into a binary at `output`
    async fn compile(
        &self,
        module: &str,
        workspace: &BuildWorkspace,
        output: &Path,
    ) -> DemandResult<ExitStatus>;

    /// Human-readable toolchain name for logs
    fn name(&self) -> &str;
}

/// The Go toolchain, driven in GOPATH mode
pub struct GoToolchain {
    program: PathBuf,
}

impl GoToolchain {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, workspace: &BuildWorkspace) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&workspace.root)
            .env("GOPATH", &workspace.dependency_path)
            .stdin(std::process::Stdio::null())
            .stdout(std::io::stderr())
            .stderr(std::io::stderr());
        cmd
    }

    async fn run(&self, workspace: &BuildWorkspace, args: &[&OsStr]) -> DemandResult<ExitStatus> {
        let rendered = format!("{} {:?}", self.program.display(), args);
        debug!("Executing: {}", rendered);

        self.command(workspace)
            .args(args)
            .status()
            .await
            .map_err(|e| DemandError::command_failed(rendered, e))
    }
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::new("go")
    }
}

#[async_trait]
impl Toolchain for GoToolchain {
    async fn fetch(&self, module: &str, workspace: &BuildWorkspace) -> DemandResult<ExitStatus> {
        // "go get" can't choose a destination, hence the separate build step
        let args = ["get", "-d", "--", module].map(OsStr::new);
        self.run(workspace, &args).await
    }

    async fn compile(
        &self,
        module: &str,
        workspace: &BuildWorkspace,
        output: &Path,
    ) -> DemandResult<ExitStatus> {
        let args = [
            OsStr::new("build"),
            OsStr::new("-o"),
            output.as_os_str(),
            OsStr::new("--"),
            OsStr::new(module),
        ];
        self.run(workspace, &args).await
    }

    fn name(&self) -> &str {
        "go"
    }
}
