//! In-process toolchain double for unit tests

use crate::build::toolchain::{BuildWorkspace, Toolchain};
use crate::error::{DemandError, DemandResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

/// Records calls and writes a small shell script as the "binary"
#[derive(Default)]
pub struct FakeToolchain {
    fetches: AtomicUsize,
    compiles: AtomicUsize,
    fail_fetch: bool,
    fail_compile: bool,
    workspaces: Mutex<Vec<PathBuf>>,
    dependency_paths: Mutex<Vec<OsString>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_compile(mut self) -> Self {
        self.fail_compile = true;
        self
    }

    /// Content of the binary produced for `module`
    pub fn binary_for(module: &str) -> String {
        format!("#!/bin/sh\necho {}\n", module)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    /// Total toolchain invocations
    pub fn calls(&self) -> usize {
        self.fetches() + self.compiles()
    }

    pub fn workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.lock().unwrap().clone()
    }

    pub fn dependency_paths(&self) -> Vec<OsString> {
        self.dependency_paths.lock().unwrap().clone()
    }

    fn record(&self, workspace: &BuildWorkspace) {
        self.workspaces.lock().unwrap().push(workspace.root.clone());
        self.dependency_paths
            .lock()
            .unwrap()
            .push(workspace.dependency_path.clone());
    }
}

/// Write like a real linker: a few bytes at a time, yielding in between,
/// so a concurrent reader of `output` can see it half written
async fn write_in_chunks(output: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(output).await?;
    for chunk in content.chunks(4) {
        file.write_all(chunk).await?;
        file.flush().await?;
        tokio::task::yield_now().await;
    }
    file.sync_all().await
}

fn exit(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

#[async_trait]
impl Toolchain for FakeToolchain {
    async fn fetch(&self, _module: &str, workspace: &BuildWorkspace) -> DemandResult<ExitStatus> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.record(workspace);
        Ok(exit(if self.fail_fetch { 1 } else { 0 }))
    }

    async fn compile(
        &self,
        module: &str,
        workspace: &BuildWorkspace,
        output: &Path,
    ) -> DemandResult<ExitStatus> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        self.record(workspace);

        if self.fail_compile {
            std::fs::write(output, "partial")
                .map_err(|e| DemandError::io("writing fake output", e))?;
            return Ok(exit(2));
        }

        write_in_chunks(output, Self::binary_for(module).as_bytes())
            .await
            .map_err(|e| DemandError::io("writing fake output", e))?;
        std::fs::set_permissions(output, std::fs::Permissions::from_mode(0o755))
            .map_err(|e| DemandError::io("chmod fake output", e))?;
        Ok(exit(0))
    }

    fn name(&self) -> &str {
        "fake"
    }
}
