//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const INTERPRETER_HELP: &str = "\
Use as an interpreter:
  #!/usr/bin/env demand
  go:
    import: GO_IMPORT_PATH_HERE";

/// demand - build and run programs on demand
///
/// Builds the program named by a spec file into a per-user cache the first
/// time it is run, then replaces itself with the cached binary.
#[derive(Parser, Debug)]
#[command(name = "demand")]
#[command(author, version, about, long_about = None)]
#[command(after_help = INTERPRETER_HELP)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "DEMAND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Force upgrade even if a cached binary exists
    #[arg(long)]
    pub upgrade: bool,

    /// Only build, do not run command (can pass multiple spec files)
    #[arg(long)]
    pub build: bool,

    /// Also search GOPATH from the environment after the private build GOPATH
    #[arg(long)]
    pub gopath: bool,

    /// Go toolchain program
    #[arg(long, env = "DEMAND_GO")]
    pub go: Option<PathBuf>,

    /// Spec file followed by arguments for the program (or more spec files with --build)
    #[arg(
        value_name = "SPEC_PATH",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Spec path to launch
    pub fn spec_path(&self) -> &Path {
        Path::new(&self.command[0])
    }

    /// Arguments forwarded verbatim to the launched program
    pub fn forwarded_args(&self) -> &[OsString] {
        &self.command[1..]
    }

    /// Every positional as a spec path (build-only mode)
    pub fn spec_paths(&self) -> Vec<PathBuf> {
        self.command.iter().map(PathBuf::from).collect()
    }
}
