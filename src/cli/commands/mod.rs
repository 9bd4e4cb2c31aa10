//! CLI command implementations

pub mod build;
pub mod run;

pub use build::execute as build;
pub use run::execute as run;

use crate::build::{GoToolchain, Toolchain};
use crate::cache::{CacheLayout, PlatformTag};
use crate::cli::Cli;
use crate::config::{ambient_gopath, cache_root, Config};
use crate::error::DemandResult;
use crate::launch::{LaunchOptions, Launcher, Mode, ProcessReplacer};
use tracing::debug;

/// Everything a command needs to launch specs, fixed for the process
pub struct Context {
    pub layout: CacheLayout,
    pub toolchain: Box<dyn Toolchain>,
    pub options: LaunchOptions,
}

impl Context {
    /// Resolve cache root, toolchain and options from flags and config
    pub fn new(cli: &Cli, config: &Config, mode: Mode) -> DemandResult<Self> {
        let layout = CacheLayout::new(cache_root(config)?, &PlatformTag::current());
        debug!("Cache directory: {}", layout.platform_dir().display());

        let go = cli.go.clone().unwrap_or_else(|| config.build.go.clone());
        let options = LaunchOptions {
            mode,
            ambient_dependency_root: ambient_gopath(cli.gopath || config.build.use_gopath),
        };

        Ok(Self {
            layout,
            toolchain: Box::new(GoToolchain::new(go)),
            options,
        })
    }

    pub fn launcher<'a>(&'a self, replacer: &'a dyn ProcessReplacer) -> Launcher<'a> {
        Launcher::new(&self.layout, &*self.toolchain, replacer, &self.options)
    }
}
