//! Version-control engine adapter.
//!
//! The engine is an opaque subprocess. Everything that touches the detached
//! repository goes through here so the storage and work-tree flags are never
//! forgotten.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::ExitStatus;

use anyhow::{Result, bail};
use tracing::{debug, info, instrument, warn};

use super::process::{ProcessRunner, display_argv};
use super::profile::ProfilePaths;
use crate::core::engine_args::{flag_with_path, located_argv};

/// Config key that stops `status` from listing every untracked file in `$HOME`.
pub const SHOW_UNTRACKED_FILES: &str = "status.showUntrackedFiles";
pub const DEFAULT_REMOTE: &str = "origin";

/// Wrapper for executing engine commands against the detached repository.
#[derive(Debug, Clone)]
pub struct GitEngine<'a, R: ProcessRunner> {
    runner: &'a R,
    program: OsString,
    paths: &'a ProfilePaths,
}

impl<'a, R: ProcessRunner> GitEngine<'a, R> {
    pub fn new(runner: &'a R, program: impl Into<OsString>, paths: &'a ProfilePaths) -> Self {
        Self {
            runner,
            program: program.into(),
            paths,
        }
    }

    pub fn paths(&self) -> &ProfilePaths {
        self.paths
    }

    /// `[engine, --git-dir=<storage>, --work-tree=<home>] ++ args`.
    pub fn located<I, S>(&self, args: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        located_argv(&self.program, &self.paths.storage, &self.paths.home, args)
    }

    /// Run a located command with the terminal attached and return its status untouched.
    pub fn run_located<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<ExitStatus> {
        let argv = self.located(args);
        self.runner.run_inherited(&argv)
    }

    /// Clone `url` into `checkout`, placing metadata at the storage location.
    #[instrument(skip_all)]
    pub fn clone_separated(&self, url: &OsStr, checkout: &Path) -> Result<()> {
        let argv = vec![
            self.program.clone(),
            OsString::from("clone"),
            flag_with_path("--separate-git-dir=", &self.paths.storage),
            url.to_os_string(),
            checkout.as_os_str().to_os_string(),
        ];
        self.run_checked(&argv)
    }

    /// Create an empty bare repository at the storage location.
    #[instrument(skip_all)]
    pub fn init_bare(&self) -> Result<()> {
        let argv = vec![
            self.program.clone(),
            OsString::from("init"),
            OsString::from("--bare"),
            self.paths.storage.as_os_str().to_os_string(),
        ];
        self.run_checked(&argv)
    }

    /// Turn off untracked-file scanning. Failure only costs status speed.
    pub fn hide_untracked_files(&self) {
        self.best_effort(&["config", SHOW_UNTRACKED_FILES, "no"]);
    }

    /// Register `url` as the default remote. Failure leaves the user to add it by hand.
    pub fn add_default_remote(&self, url: &OsStr) {
        self.best_effort(&[
            OsStr::new("remote"),
            OsStr::new("add"),
            OsStr::new(DEFAULT_REMOTE),
            url,
        ]);
    }

    fn best_effort<S: AsRef<OsStr>>(&self, args: &[S]) {
        let argv = self.located(args);
        match self.runner.run_silenced(&argv) {
            Ok(status) if status.success() => {
                debug!(command = %display_argv(&argv), "engine command succeeded");
            }
            Ok(status) => {
                info!(
                    command = %display_argv(&argv),
                    exit_code = ?status.code(),
                    "engine command failed, continuing"
                );
            }
            Err(err) => {
                warn!(
                    command = %display_argv(&argv),
                    err = %format!("{err:#}"),
                    "engine command could not run, continuing"
                );
            }
        }
    }

    fn run_checked(&self, argv: &[OsString]) -> Result<()> {
        let status = self.runner.run_inherited(argv)?;
        if !status.success() {
            bail!("{} failed ({status})", display_argv(argv));
        }
        Ok(())
    }
}
