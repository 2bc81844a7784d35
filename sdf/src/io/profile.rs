//! Canonical locations of the detached profile repository.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

/// All canonical paths for a profile rooted at a home directory.
///
/// Computed once at startup; changing `HOME` afterwards has no effect on a
/// profile that already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    /// Work tree: the user's home directory.
    pub home: PathBuf,
    /// Parent of the storage location.
    pub config_dir: PathBuf,
    /// Repository metadata, kept apart from the work tree.
    pub storage: PathBuf,
    /// Transient checkout used only while importing.
    pub staging: PathBuf,
    /// Optional settings file.
    pub config_file: PathBuf,
}

impl ProfilePaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let config_dir = home.join(".config");
        Self {
            home: home.clone(),
            storage: config_dir.join("sdf"),
            staging: config_dir.join("sdf-tmp"),
            config_file: config_dir.join("sdf.toml"),
            config_dir,
        }
    }

    /// Derive paths from `$HOME`.
    pub fn from_env() -> Result<Self> {
        let home = env::var_os("HOME")
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("HOME is not set; cannot locate the profile"))?;
        Ok(Self::new(home))
    }

    /// True unless the storage location is known not to exist.
    ///
    /// A stat failure other than "not found" counts as initialized so a
    /// destructive command still asks before touching it.
    pub fn is_initialized(&self) -> bool {
        !matches!(fs::metadata(&self.storage), Err(err) if err.kind() == ErrorKind::NotFound)
    }

    /// Nested-module descriptor inside a checkout rooted at `root`.
    pub fn modules_file(root: &Path) -> PathBuf {
        root.join(".gitmodules")
    }
}
