//! Helpers for running child processes.
//!
//! Two modes are needed: fully transparent runs that inherit the terminal's
//! standard streams, and a capture mode that hands the caller the child's
//! stderr pipe to read while the child is still running.

use std::ffi::OsString;
use std::io::BufReader;
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument};

/// Spawns external programs from a full argument vector (`argv[0]` is the program).
pub trait ProcessRunner {
    /// Run with stdin/stdout/stderr inherited and wait for completion.
    fn run_inherited(&self, argv: &[OsString]) -> Result<ExitStatus>;

    /// Run with all standard streams discarded and wait for completion.
    fn run_silenced(&self, argv: &[OsString]) -> Result<ExitStatus>;
}

/// Runner backed by real subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    #[instrument(skip_all, fields(program = ?argv.first()))]
    fn run_inherited(&self, argv: &[OsString]) -> Result<ExitStatus> {
        let mut cmd = command_for(argv)?;
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        wait_for(cmd, argv)
    }

    #[instrument(skip_all, fields(program = ?argv.first()))]
    fn run_silenced(&self, argv: &[OsString]) -> Result<ExitStatus> {
        let mut cmd = command_for(argv)?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        wait_for(cmd, argv)
    }
}

/// A running child whose stderr is being captured.
#[derive(Debug)]
pub struct CapturedChild {
    pub child: Child,
    pub stderr: BufReader<ChildStderr>,
}

/// Spawn `argv` with stdin/stdout inherited and stderr piped back.
///
/// The caller must drain `stderr` and then wait on `child`; the child keeps
/// running concurrently while the pipe is read.
#[instrument(skip_all, fields(program = ?argv.first()))]
pub fn spawn_capturing_stderr(argv: &[OsString]) -> Result<CapturedChild> {
    let mut cmd = command_for(argv)?;
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped());

    debug!(argv = ?argv, "spawning child process with stderr capture");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).with_context(|| format!("spawn {}", display_argv(argv)));
        }
    };
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    Ok(CapturedChild {
        child,
        stderr: BufReader::new(stderr),
    })
}

/// Render an argument vector for messages and logs.
pub fn display_argv(argv: &[OsString]) -> String {
    argv.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn command_for(argv: &[OsString]) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("empty command line"))?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

fn wait_for(mut cmd: Command, argv: &[OsString]) -> Result<ExitStatus> {
    debug!(argv = ?argv, "spawning child process");
    let status = cmd
        .status()
        .with_context(|| format!("spawn {}", display_argv(argv)))?;
    debug!(exit_code = ?status.code(), "command finished");
    Ok(status)
}
