//! Build command - build one or more specs without running them

use crate::cli::commands::Context;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::DemandResult;
use crate::launch::{ExecReplacer, Mode};
use tracing::info;

/// Execute the build command, stopping at the first failing spec
pub async fn execute(cli: &Cli, config: &Config) -> DemandResult<()> {
    let ctx = Context::new(cli, config, Mode::BuildOnly)?;
    let launcher = ctx.launcher(&ExecReplacer);

    for spec in cli.spec_paths() {
        launcher.launch(&spec, &[]).await?;
        info!("Built {}", spec.display());
    }

    Ok(())
}
