//! Argument vectors for the detached repository.
//!
//! Every repository-affecting engine call carries both location flags so the
//! engine never falls back to the current directory.

use std::ffi::{OsStr, OsString};
use std::path::Path;

/// `--git-dir=<storage>` and `--work-tree=<work_tree>`, in that order.
pub fn location_flags(storage: &Path, work_tree: &Path) -> [OsString; 2] {
    [
        flag_with_path("--git-dir=", storage),
        flag_with_path("--work-tree=", work_tree),
    ]
}

/// `[engine, --git-dir=.., --work-tree=..] ++ args`.
pub fn located_argv<I, S>(
    engine: &OsStr,
    storage: &Path,
    work_tree: &Path,
    args: I,
) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut argv = vec![engine.to_os_string()];
    argv.extend(location_flags(storage, work_tree));
    argv.extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
    argv
}

/// Join a `--flag=` prefix and a path without lossy conversion.
pub fn flag_with_path(prefix: &str, path: &Path) -> OsString {
    let mut flag = OsString::from(prefix);
    flag.push(path.as_os_str());
    flag
}
