//! Report which profile files a program opens while it runs.
//!
//! The program runs under a syscall tracer whose log channel (stderr) is
//! piped back and filtered line by line while the program is still running,
//! so arbitrarily long or interactive sessions never need buffering.

use std::ffi::OsString;
use std::fs;
use std::io::{BufRead, ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, trace, warn};

use crate::core::trace_line::{PathState, TraceEvent};
use crate::io::config::SdfConfig;
use crate::io::process::spawn_capturing_stderr;
use crate::io::profile::ProfilePaths;

/// How a trace ended without a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceOutcome {
    /// The traced program exited and the log was fully consumed.
    Completed { reported: usize },
    /// The tracer could not be found on the search path.
    TracerMissing { tracer: String },
    /// The program to trace could not be found or is not executable.
    TargetMissing,
}

impl TraceOutcome {
    /// User-facing message for setup failures.
    pub fn message(&self) -> Option<String> {
        match self {
            TraceOutcome::Completed { .. } => None,
            TraceOutcome::TracerMissing { tracer } => Some(format!(
                "{} not found. Check your $PATH or install it.",
                capitalize(tracer)
            )),
            TraceOutcome::TargetMissing => {
                Some("Binary not executable or doesn't exist. Cannot continue.".to_string())
            }
        }
    }
}

/// Upper-case the first character so a bare program name reads as a sentence start.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Runs programs under the tracer and prints the work-tree files they open.
pub struct TraceCollector<'a> {
    paths: &'a ProfilePaths,
    tracer: &'a str,
    syscalls: &'a [String],
}

impl<'a> TraceCollector<'a> {
    pub fn new(paths: &'a ProfilePaths, config: &'a SdfConfig) -> Self {
        Self {
            paths,
            tracer: &config.tracer,
            syscalls: &config.trace_syscalls,
        }
    }

    /// Tracer command line: follow forks, report only the configured syscalls.
    pub fn tracer_argv(&self, program_argv: &[OsString]) -> Vec<OsString> {
        let mut argv = vec![
            OsString::from(self.tracer),
            OsString::from("-f"),
            OsString::from("-e"),
            OsString::from(format!("trace={}", self.syscalls.join(","))),
        ];
        argv.extend_from_slice(program_argv);
        argv
    }

    /// Trace `program_argv` and write one relative path per reported open to `out`.
    ///
    /// Missing binaries are reported through the outcome without spawning
    /// anything. The traced program's exit status is not propagated.
    #[instrument(skip_all, fields(program = ?program_argv.first()))]
    pub fn trace(&self, program_argv: &[OsString], out: &mut impl Write) -> Result<TraceOutcome> {
        let program = program_argv
            .first()
            .ok_or_else(|| anyhow!("no program to trace"))?;
        if let Err(err) = which::which(self.tracer) {
            debug!(tracer = self.tracer, err = %err, "tracer lookup failed");
            return Ok(TraceOutcome::TracerMissing {
                tracer: self.tracer.to_string(),
            });
        }
        if let Err(err) = which::which(program) {
            debug!(program = ?program, err = %err, "target lookup failed");
            return Ok(TraceOutcome::TargetMissing);
        }

        let mut captured = spawn_capturing_stderr(&self.tracer_argv(program_argv))?;
        match collect_opened_files(&mut captured.stderr, &self.paths.home, out) {
            Ok(reported) => {
                let status = captured.child.wait().context("wait for tracer")?;
                debug!(reported, exit_code = ?status.code(), "trace finished");
                Ok(TraceOutcome::Completed { reported })
            }
            Err(err) => {
                if let Err(kill_err) = captured.child.kill() {
                    warn!(err = %kill_err, "failed to stop tracer after error");
                }
                if let Err(wait_err) = captured.child.wait() {
                    warn!(err = %wait_err, "failed to reap tracer after error");
                }
                Err(err)
            }
        }
    }
}

/// Filter a tracer log until end-of-stream.
///
/// Each kept line is written (and flushed) immediately; repeated opens are
/// reported every time. Returns the number of lines written.
pub fn collect_opened_files<R: BufRead, W: Write>(
    mut log: R,
    work_tree: &Path,
    out: &mut W,
) -> Result<usize> {
    let mut reported = 0usize;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = log.read_until(b'\n', &mut buf).context("read tracer log")?;
        if n == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let event = TraceEvent::parse(line.trim_end_matches(['\n', '\r']));
        let (Some(candidate), Some(relative)) =
            (event.candidate_path, event.relative_to(work_tree))
        else {
            trace!(line = event.raw_line, "no work-tree path in tracer line");
            continue;
        };
        if path_state(Path::new(candidate))? != PathState::File {
            trace!(line = event.raw_line, "candidate is not an existing file");
            continue;
        }
        writeln!(out, "{}", relative.display()).context("write traced path")?;
        out.flush().context("flush traced path")?;
        reported += 1;
    }
    Ok(reported)
}

/// Stat `path`. Anything other than "not found" going wrong is fatal.
pub fn path_state(path: &Path) -> Result<PathState> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(PathState::Directory),
        Ok(_) => Ok(PathState::File),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(PathState::Missing),
        Err(err) => Err(err).with_context(|| format!("stat {}", path.display())),
    }
}
