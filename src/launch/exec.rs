//! Process image replacement
//!
//! The launched program must inherit our file descriptors and environment
//! and see the user-facing name as `argv[0]`, so it replaces this process
//! instead of running as a child.
//!
//! Signal state is inherited with one known difference. `Command::exec`
//! restores `SIGPIPE` to its default action and clears the signal mask
//! before `execve(2)`. The Rust runtime ignores `SIGPIPE` at startup, so
//! without the reset the program would inherit our ignore instead of the
//! caller's default. This process never blocks signals itself, so a mask
//! set by the caller before starting us is the only state lost.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// What to run in place of the current process
#[derive(Debug, Clone, Copy)]
pub struct ExecTarget<'a> {
    /// File to execute
    pub program: &'a Path,
    /// Name the program sees as its own
    pub argv0: &'a OsStr,
    /// Forwarded arguments
    pub args: &'a [OsString],
}

/// Replaces the current process image.
///
/// Implementations that really replace the process only ever return
/// `Err`; `Ok(())` means the target took over (test doubles).
pub trait ProcessReplacer: Send + Sync {
    fn replace(&self, target: &ExecTarget<'_>) -> io::Result<()>;
}

/// `execve(2)` based replacer
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecReplacer;

impl ProcessReplacer for ExecReplacer {
    fn replace(&self, target: &ExecTarget<'_>) -> io::Result<()> {
        use std::os::unix::process::CommandExt;

        debug!(
            "exec {} as {}",
            target.program.display(),
            target.argv0.to_string_lossy()
        );
        let err = Command::new(target.program)
            .arg0(target.argv0)
            .args(target.args)
            .exec();
        Err(err)
    }
}
