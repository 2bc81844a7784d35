//! Optional settings stored at `~/.config/sdf.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Tool settings (TOML).
///
/// Every field is optional in the file; missing fields fall back to the
/// defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SdfConfig {
    /// Version-control engine program.
    pub git: String,

    /// Syscall tracer program.
    pub tracer: String,

    /// Syscalls passed to the tracer as `-e trace=<list>`. Only members of
    /// [`OPEN_SYSCALLS`] are accepted.
    pub trace_syscalls: Vec<String>,
}

/// Syscalls whose first quoted argument is the path being opened.
pub const OPEN_SYSCALLS: &[&str] = &["open", "openat", "openat2", "creat"];

impl Default for SdfConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            tracer: "strace".to_string(),
            trace_syscalls: vec!["openat".to_string()],
        }
    }
}

impl SdfConfig {
    pub fn validate(&self) -> Result<()> {
        if self.git.trim().is_empty() {
            return Err(anyhow!("git must be a non-empty program name"));
        }
        if self.tracer.trim().is_empty() {
            return Err(anyhow!("tracer must be a non-empty program name"));
        }
        if self.trace_syscalls.is_empty() {
            return Err(anyhow!("trace_syscalls must be a non-empty list of names"));
        }
        if let Some(name) = self
            .trace_syscalls
            .iter()
            .find(|name| !OPEN_SYSCALLS.contains(&name.as_str()))
        {
            return Err(anyhow!(
                "trace_syscalls entry '{name}' is not one of: {}",
                OPEN_SYSCALLS.join(", ")
            ));
        }
        Ok(())
    }
}

/// Load settings from a TOML file.
///
/// If the file is missing, returns `SdfConfig::default()`.
pub fn load_config(path: &Path) -> Result<SdfConfig> {
    if !path.exists() {
        let cfg = SdfConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SdfConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(cfg)
}
