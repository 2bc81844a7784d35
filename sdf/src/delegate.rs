//! Transparent pass-through of arbitrary engine subcommands.

use std::ffi::OsString;
use std::process::ExitStatus;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::exit_codes;
use crate::io::git::GitEngine;
use crate::io::process::ProcessRunner;

/// Forwards everything that is not a profile-specific command to the engine.
pub struct CommandDelegator<'a, R: ProcessRunner> {
    git: GitEngine<'a, R>,
}

impl<'a, R: ProcessRunner> CommandDelegator<'a, R> {
    pub fn new(git: GitEngine<'a, R>) -> Self {
        Self { git }
    }

    /// Run `args` against the detached repository with the terminal attached.
    ///
    /// Output is neither captured nor transformed; the engine's status is
    /// returned as-is.
    #[instrument(skip_all, fields(subcommand = ?args.first()))]
    pub fn delegate(&self, args: &[OsString]) -> Result<ExitStatus> {
        let status = self.git.run_located(args)?;
        debug!(exit_code = ?status.code(), "delegated command finished");
        Ok(status)
    }
}

/// Exit code to mirror for a delegated command.
///
/// Termination by signal has no code and maps to [`exit_codes::FATAL`].
pub fn mirrored_exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(exit_codes::FATAL)
}
