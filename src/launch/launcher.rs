//! Cache-hit / build / exec state machine for one spec invocation

use crate::build::{Builder, Toolchain};
use crate::cache::{spec_basename, CacheLayout, SymlinkWalk};
use crate::error::{DemandError, DemandResult};
use crate::launch::exec::{ExecTarget, ProcessReplacer};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How an invocation treats the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Exec a cached artifact if present, build otherwise
    #[default]
    Run,
    /// Build, never exec
    BuildOnly,
    /// Rebuild even if an artifact exists, then exec
    Upgrade,
}

impl Mode {
    fn tries_cache(self) -> bool {
        self == Self::Run
    }

    fn execs(self) -> bool {
        self != Self::BuildOnly
    }
}

/// Immutable per-process launch settings
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub mode: Mode,
    /// Ambient dependency root searched after the ephemeral one, if opted in
    pub ambient_dependency_root: Option<OsString>,
}

/// How a launch ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    /// The process image was handed over to the artifact
    Replaced,
    /// Build-only mode finished
    Built,
}

pub struct Launcher<'a> {
    layout: &'a CacheLayout,
    toolchain: &'a dyn Toolchain,
    replacer: &'a dyn ProcessReplacer,
    options: &'a LaunchOptions,
}

impl<'a> Launcher<'a> {
    pub fn new(
        layout: &'a CacheLayout,
        toolchain: &'a dyn Toolchain,
        replacer: &'a dyn ProcessReplacer,
        options: &'a LaunchOptions,
    ) -> Self {
        Self {
            layout,
            toolchain,
            replacer,
            options,
        }
    }

    /// Run the spec at `spec_path` with `args`, building it first if needed.
    ///
    /// With a real replacer this only returns on error or in build-only mode.
    pub async fn launch(&self, spec_path: &Path, args: &[OsString]) -> DemandResult<Launched> {
        spec_basename(spec_path)?;

        // Fail fast on typos. lstat, so long link chains are left to the walk
        std::fs::symlink_metadata(spec_path).map_err(|e| {
            DemandError::io(format!("cannot read spec file {}", spec_path.display()), e)
        })?;

        let mut walk = SymlinkWalk::new(self.layout, spec_path);
        let mut entry: Option<PathBuf> = None;
        let mut real = None;

        while let Some(hop) = walk.next_hop().await? {
            let artifact = hop.location.artifact_path();
            let entry = entry.get_or_insert_with(|| artifact.clone());

            if self.options.mode.tries_cache() && self.try_exec(&artifact, entry, args)? {
                return Ok(Launched::Replaced);
            }
            if !hop.is_symlink {
                real = Some(hop);
            }
        }

        let (Some(real), Some(entry)) = (real, entry) else {
            return Err(DemandError::invalid_spec(
                spec_path,
                "symlink chain has no regular file",
            ));
        };

        debug!("Cache miss for {}", spec_path.display());
        Builder::new(self.toolchain, self.options.ambient_dependency_root.as_ref())
            .build(&real.spec_path, &real.location)
            .await?;

        if !self.options.mode.execs() {
            return Ok(Launched::Built);
        }

        // This time a missing artifact means the build lied
        if self.try_exec(&entry, &entry, args)? {
            return Ok(Launched::Replaced);
        }
        Err(DemandError::Exec {
            path: entry,
            source: std::io::Error::from(ErrorKind::NotFound),
        })
    }

    /// Attempt to exec `program`; `Ok(false)` on a cache miss
    fn try_exec(&self, program: &Path, entry: &Path, args: &[OsString]) -> DemandResult<bool> {
        let target = ExecTarget {
            program,
            argv0: entry.as_os_str(),
            args,
        };
        match self.replacer.replace(&target) {
            Ok(()) => {
                info!("Replaced process with {}", program.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cached binary at {}", program.display());
                Ok(false)
            }
            Err(e) => Err(DemandError::Exec {
                path: program.to_path_buf(),
                source: e,
            }),
        }
    }
}
