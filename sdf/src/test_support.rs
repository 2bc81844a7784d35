//! Test-only helpers: throwaway home directories and scripted collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::io::confirm::Confirm;
use crate::io::process::ProcessRunner;
use crate::io::profile::ProfilePaths;

/// Build an owned argument vector from string literals.
pub fn os_argv(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}

/// A temporary directory standing in for `$HOME`.
pub struct FakeHome {
    _dir: TempDir,
    pub paths: ProfilePaths,
}

impl FakeHome {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create fake home")?;
        let paths = ProfilePaths::new(dir.path());
        Ok(Self { _dir: dir, paths })
    }

    pub fn path(&self) -> &Path {
        &self.paths.home
    }

    /// Write `contents` at `relative` under the fake home, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.paths.home.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write file {}", path.display()))?;
        Ok(path)
    }
}

/// Write an executable `/bin/sh` script at `path`.
pub fn write_script(path: &Path, body: &str) -> Result<()> {
    let script = format!("#!/bin/sh\n{body}\n");
    fs::write(path, script).with_context(|| format!("write script {}", path.display()))?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod script {}", path.display()))?;
    Ok(())
}

type Effect = Box<dyn Fn(&[OsString]) -> Result<()>>;

/// Process runner that records argument vectors instead of spawning.
///
/// An optional effect runs for every inherited call, letting tests mimic
/// what the real engine would leave on disk.
pub struct RecordingRunner {
    inherited: RefCell<Vec<Vec<OsString>>>,
    silenced: RefCell<Vec<Vec<OsString>>>,
    exit_code: i32,
    effect: Option<Effect>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            inherited: RefCell::new(Vec::new()),
            silenced: RefCell::new(Vec::new()),
            exit_code: 0,
            effect: None,
        }
    }

    /// Every recorded call exits with `code`.
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn with_effect(mut self, effect: impl Fn(&[OsString]) -> Result<()> + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    /// Calls made with inherited streams, in order.
    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.inherited.borrow().clone()
    }

    /// Calls made with discarded streams, in order.
    pub fn silenced_calls(&self) -> Vec<Vec<OsString>> {
        self.silenced.borrow().clone()
    }

    fn status(&self) -> ExitStatus {
        ExitStatus::from_raw(self.exit_code << 8)
    }
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run_inherited(&self, argv: &[OsString]) -> Result<ExitStatus> {
        self.inherited.borrow_mut().push(argv.to_vec());
        if let Some(effect) = &self.effect {
            effect(argv)?;
        }
        Ok(self.status())
    }

    fn run_silenced(&self, argv: &[OsString]) -> Result<ExitStatus> {
        self.silenced.borrow_mut().push(argv.to_vec());
        Ok(self.status())
    }
}

/// Confirmation prompt that replays canned answers.
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    pub questions: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<bool>) -> Self {
        Self {
            answers: answers.into(),
            questions: Vec::new(),
        }
    }
}

impl Confirm for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted answer left for: {question}"))
    }
}
