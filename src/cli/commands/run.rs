//! Run command - exec the cached binary for a spec, building it first if needed

use crate::cli::commands::Context;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::DemandResult;
use crate::launch::{ExecReplacer, Mode};
use tracing::debug;

/// Execute the run command
pub async fn execute(cli: &Cli, config: &Config) -> DemandResult<()> {
    let mode = if cli.upgrade { Mode::Upgrade } else { Mode::Run };
    let ctx = Context::new(cli, config, mode)?;

    let launched = ctx
        .launcher(&ExecReplacer)
        .launch(cli.spec_path(), cli.forwarded_args())
        .await?;

    debug!("Launch ended without exec: {:?}", launched);
    Ok(())
}
