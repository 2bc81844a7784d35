//! Bootstrap and import of the detached profile repository.
//!
//! The repository's metadata lives at the storage location while its work
//! tree is the whole home directory. Filesystem failures abort immediately
//! without rollback; the user can retry once the cause is fixed.

use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::io::confirm::Confirm;
use crate::io::git::GitEngine;
use crate::io::process::ProcessRunner;
use crate::io::profile::ProfilePaths;

/// Owner-only access to repository metadata.
pub const STORAGE_MODE: u32 = 0o700;

pub const REINIT_QUESTION: &str =
    "sdf is already initialized. Force remove previous configuration?";

/// How a lifecycle command ended without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// Content imported from a remote; files still need checking out.
    Imported,
    /// Empty repository created with a default remote.
    Initialized,
    /// An existing profile was found and the user kept it.
    Declined,
}

impl LifecycleOutcome {
    pub fn message(self) -> &'static str {
        match self {
            LifecycleOutcome::Imported => {
                "Restored sdf configuration, activate it with 'sdf checkout .'"
            }
            LifecycleOutcome::Initialized => "Initialized new configuration.",
            LifecycleOutcome::Declined => "Kept the existing configuration.",
        }
    }
}

/// Creates the detached repository either from a remote or from scratch.
pub struct RepositoryController<'a, R: ProcessRunner> {
    git: GitEngine<'a, R>,
}

impl<'a, R: ProcessRunner> RepositoryController<'a, R> {
    pub fn new(git: GitEngine<'a, R>) -> Self {
        Self { git }
    }

    fn paths(&self) -> &ProfilePaths {
        self.git.paths()
    }

    /// Seed a new profile from `url`.
    ///
    /// The engine cannot clone straight into a metadata directory that is
    /// disjoint from its checkout, so the checkout lands in a staging
    /// directory that is dropped once the nested-module descriptor (if any)
    /// has been moved into the real work tree.
    #[instrument(skip_all, fields(url = ?url))]
    pub fn import(&self, url: &OsStr, prompt: &mut impl Confirm) -> Result<LifecycleOutcome> {
        if !self.clear_existing(prompt)? {
            return Ok(LifecycleOutcome::Declined);
        }
        let paths = self.paths();

        create_dir(&paths.config_dir)?;
        remove_dir_if_present(&paths.staging)?;

        info!(storage = %paths.storage.display(), "importing profile");
        self.git.clone_separated(url, &paths.staging)?;

        let staged_modules = ProfilePaths::modules_file(&paths.staging);
        let has_modules = staged_modules
            .try_exists()
            .with_context(|| format!("stat {}", staged_modules.display()))?;
        if has_modules {
            let target = ProfilePaths::modules_file(&paths.home);
            debug!(target = %target.display(), "relocating nested-module descriptor");
            fs::rename(&staged_modules, &target).with_context(|| {
                format!(
                    "move {} to {}",
                    staged_modules.display(),
                    target.display()
                )
            })?;
        }
        fs::remove_dir_all(&paths.staging)
            .with_context(|| format!("remove staging {}", paths.staging.display()))?;

        self.git.hide_untracked_files();
        restrict_to_owner(&paths.storage)?;
        Ok(LifecycleOutcome::Imported)
    }

    /// Create an empty profile whose default remote is `url`.
    #[instrument(skip_all, fields(url = ?url))]
    pub fn bootstrap(&self, url: &OsStr, prompt: &mut impl Confirm) -> Result<LifecycleOutcome> {
        if !self.clear_existing(prompt)? {
            return Ok(LifecycleOutcome::Declined);
        }
        let paths = self.paths();

        info!(storage = %paths.storage.display(), "creating empty profile");
        self.git.init_bare()?;
        self.git.add_default_remote(url);
        self.git.hide_untracked_files();
        restrict_to_owner(&paths.storage)?;
        Ok(LifecycleOutcome::Initialized)
    }

    /// Returns false if an existing profile must be kept.
    fn clear_existing(&self, prompt: &mut impl Confirm) -> Result<bool> {
        let paths = self.paths();
        if !paths.is_initialized() {
            return Ok(true);
        }
        if !prompt.confirm(REINIT_QUESTION)? {
            debug!("user kept existing profile");
            return Ok(false);
        }
        info!(storage = %paths.storage.display(), "removing previous profile");
        fs::remove_dir_all(&paths.storage)
            .with_context(|| format!("remove storage {}", paths.storage.display()))?;
        Ok(true)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("create directory {}", path.display()))
}

fn remove_dir_if_present(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale staging directory");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("remove staging {}", path.display())),
    }
}

fn restrict_to_owner(path: &Path) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(STORAGE_MODE))
        .with_context(|| format!("restrict permissions on {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    use crate::test_support::{FakeHome, RecordingRunner, ScriptedPrompt};

    const URL: &str = "https://example.com/dots.git";

    fn url() -> &'static OsStr {
        OsStr::new(URL)
    }

    /// Mimic `git clone --separate-git-dir=<storage> <url> <checkout>`.
    fn fake_clone(with_modules: bool) -> impl Fn(&[OsString]) -> Result<()> + 'static {
        move |argv: &[OsString]| {
            if argv.get(1).map(OsString::as_os_str) != Some(OsStr::new("clone")) {
                return Ok(());
            }
            let storage = argv[2]
                .to_str()
                .and_then(|flag| flag.strip_prefix("--separate-git-dir="))
                .map(PathBuf::from)
                .context("storage flag")?;
            let checkout = PathBuf::from(&argv[4]);
            fs::create_dir_all(storage.join("objects"))?;
            fs::create_dir_all(&checkout)?;
            fs::write(checkout.join(".bashrc"), "export EDITOR=vi\n")?;
            if with_modules {
                fs::write(checkout.join(".gitmodules"), "[submodule \"vim\"]\n")?;
            }
            Ok(())
        }
    }

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).expect("metadata").permissions().mode() & 0o777
    }

    #[test]
    fn import_leaves_owner_only_storage_and_no_staging() {
        let home = FakeHome::new().expect("home");
        let runner = RecordingRunner::new().with_effect(fake_clone(false));
        let controller = RepositoryController::new(GitEngine::new(&runner, "git", &home.paths));
        let mut prompt = ScriptedPrompt::new(Vec::new());

        let outcome = controller.import(url(), &mut prompt).expect("import");

        assert_eq!(outcome, LifecycleOutcome::Imported);
        assert!(home.paths.storage.is_dir());
        assert_eq!(mode_of(&home.paths.storage), STORAGE_MODE);
        assert!(!home.paths.staging.exists());
        assert!(!home.path().join(".gitmodules").exists());
        assert!(prompt.questions.is_empty());
        assert_eq!(runner.silenced_calls().len(), 1);
    }

    #[test]
    fn import_moves_nested_module_descriptor_into_home() {
        let home = FakeHome::new().expect("home");
        let runner = RecordingRunner::new().with_effect(fake_clone(true));
        let controller = RepositoryController::new(GitEngine::new(&runner, "git", &home.paths));

        controller
            .import(url(), &mut ScriptedPrompt::new(Vec::new()))
            .expect("import");

        let modules = home.path().join(".gitmodules");
        assert_eq!(
            fs::read_to_string(modules).expect("read modules"),
            "[submodule \"vim\"]\n"
        );
        assert!(!home.paths.staging.exists());
    }

    #[test]
    fn import_clears_stale_staging_before_cloning() {
        let home = FakeHome::new().expect("home");
        home.write(".config/sdf-tmp/leftover", "x").expect("stale");
        let runner = RecordingRunner::new().with_effect(fake_clone(false));
        let controller = RepositoryController::new(GitEngine::new(&runner, "git", &home.paths));

        controller
            .import(url(), &mut ScriptedPrompt::new(Vec::new()))
            .expect("import");

        assert!(!home.paths.staging.exists());
    }

    #[test]
    fn declined_reinit_changes_nothing() {
        let home = FakeHome::new().expect("home");
        let marker = home.write(".config/sdf/HEAD", "ref: refs/heads/main\n").expect("seed");
        let runner = RecordingRunner::new().with_effect(fake_clone(true));
        let controller = RepositoryController::new(GitEngine::new(&runner, "git", &home.paths));
        let mut prompt = ScriptedPrompt::new(vec![false, false]);

        let imported = controller.import(url(), &mut prompt).expect("import");
        let bootstrapped = controller.bootstrap(url(), &mut prompt).expect("bootstrap");

        assert_eq!(imported, LifecycleOutcome::Declined);
        assert_eq!(bootstrapped, LifecycleOutcome::Declined);
        assert_eq!(prompt.questions, vec![REINIT_QUESTION, REINIT_QUESTION]);
        assert_eq!(
            fs::read_to_string(marker).expect("read"),
            "ref: refs/heads/main\n"
        );
        assert!(runner.calls().is_empty());
        assert!(runner.silenced_calls().is_empty());
        assert!(!home.paths.staging.exists());
    }

    #[test]
    fn confirmed_reinit_replaces_previous_storage() {
        let home = FakeHome::new().expect("home");
        let stale = home.write(".config/sdf/stale", "old").expect("seed");
        let runner = RecordingRunner::new().with_effect(fake_clone(false));
        let controller = RepositoryController::new(GitEngine::new(&runner, "git", &home.paths));

        let outcome = controller
            .import(url(), &mut ScriptedPrompt::new(vec![true]))
            .expect("import");

        assert_eq!(outcome, LifecycleOutcome::Imported);
        assert!(!stale.exists());
        assert!(home.paths.storage.join("objects").is_dir());
    }

    #[test]
    fn failed_clone_aborts_before_touching_permissions() {
        let home = FakeHome::new().expect("home");
        let runner = RecordingRunner::new().with_exit_code(128);
        let controller = RepositoryController::new(GitEngine::new(&runner, "git", &home.paths));

        let err = controller
            .import(url(), &mut ScriptedPrompt::new(Vec::new()))
            .unwrap_err();

        assert!(err.to_string().contains("clone"));
        assert!(runner.silenced_calls().is_empty());
    }

    #[test]
    fn bootstrap_creates_bare_repo_with_remote_and_option() {
        let home = FakeHome::new().expect("home");
        let storage = home.paths.storage.clone();
        let runner = RecordingRunner::new().with_effect(move |_argv: &[OsString]| {
            fs::create_dir_all(&storage)?;
            Ok(())
        });
        let controller = RepositoryController::new(GitEngine::new(&runner, "git", &home.paths));

        let outcome = controller
            .bootstrap(url(), &mut ScriptedPrompt::new(Vec::new()))
            .expect("bootstrap");

        assert_eq!(outcome, LifecycleOutcome::Initialized);
        assert_eq!(mode_of(&home.paths.storage), STORAGE_MODE);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][1], "init");
        assert_eq!(calls[0][2], "--bare");

        let silenced = runner.silenced_calls();
        assert_eq!(silenced.len(), 2);
        assert!(silenced[0].iter().any(|arg| arg == "remote"));
        assert!(silenced[0].iter().any(|arg| arg == URL));
        assert!(silenced[1].iter().any(|arg| arg == "status.showUntrackedFiles"));
    }

    #[test]
    fn bootstrap_survives_best_effort_failures_but_not_missing_storage() {
        let home = FakeHome::new().expect("home");
        let runner = RecordingRunner::new();
        let controller = RepositoryController::new(GitEngine::new(&runner, "git", &home.paths));

        // The recording runner never creates the storage directory.
        let err = controller
            .bootstrap(url(), &mut ScriptedPrompt::new(Vec::new()))
            .unwrap_err();
        assert!(format!("{err:#}").contains("restrict permissions"));
        assert_eq!(runner.silenced_calls().len(), 2);
    }
}
