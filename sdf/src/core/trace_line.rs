//! Parsing of tracer log lines into candidate file accesses.

use std::path::{Path, PathBuf};

/// Whether a candidate path names something worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    /// Exists and is not a directory.
    File,
    Directory,
    /// Vanished between the open call and our stat, or never existed.
    Missing,
}

/// One parsed candidate file access. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent<'a> {
    pub raw_line: &'a str,
    /// First quoted segment of the line, if the line has one.
    pub candidate_path: Option<&'a str>,
}

impl<'a> TraceEvent<'a> {
    pub fn parse(raw_line: &'a str) -> Self {
        Self {
            raw_line,
            candidate_path: quoted_path(raw_line),
        }
    }

    /// Path relative to `work_tree`, or `None` when the candidate is
    /// absent or lies outside the work tree.
    pub fn relative_to(&self, work_tree: &Path) -> Option<PathBuf> {
        self.candidate_path
            .and_then(|path| relative_to_work_tree(Path::new(path), work_tree))
    }
}

/// Extract the first quote-delimited segment.
///
/// A well-formed open call looks like
/// `openat(AT_FDCWD, "/home/u/.bashrc", O_RDONLY) = 3`; splitting on `"`
/// must give at least three pieces for the path to be present.
pub fn quoted_path(line: &str) -> Option<&str> {
    let mut pieces = line.split('"');
    let _before = pieces.next()?;
    let path = pieces.next()?;
    pieces.next()?;
    Some(path)
}

/// Strip `work_tree` from `path` component-wise.
///
/// The work tree itself yields `None`: it is a directory and has no
/// relative spelling.
pub fn relative_to_work_tree(path: &Path, work_tree: &Path) -> Option<PathBuf> {
    let relative = path.strip_prefix(work_tree).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_path_from_openat_line() {
        let line = r#"openat(AT_FDCWD, "/home/u/.bashrc", O_RDONLY) = 3"#;
        assert_eq!(quoted_path(line), Some("/home/u/.bashrc"));
    }

    #[test]
    fn extracts_path_from_forked_child_line() {
        let line = r#"[pid 4242] openat(AT_FDCWD, "/home/u/.vimrc", O_RDONLY|O_CLOEXEC) = 4"#;
        assert_eq!(quoted_path(line), Some("/home/u/.vimrc"));
    }

    #[test]
    fn lines_without_a_closed_quote_have_no_path() {
        assert_eq!(quoted_path("+++ exited with 0 +++"), None);
        assert_eq!(quoted_path(r#"openat(AT_FDCWD, "/home/u/trunc"#), None);
        assert_eq!(quoted_path(""), None);
    }

    #[test]
    fn parse_keeps_the_whole_line() {
        let line = r#"[pid 7] openat(AT_FDCWD, "/home/u/.inputrc", O_RDONLY) = -1 ENOENT"#;
        let event = TraceEvent::parse(line);
        assert_eq!(event.raw_line, line);
        assert_eq!(event.candidate_path, Some("/home/u/.inputrc"));
    }

    #[test]
    fn relative_path_strips_home_prefix() {
        let event = TraceEvent::parse(r#"openat(AT_FDCWD, "/home/u/.bashrc", O_RDONLY) = 3"#);
        assert_eq!(
            event.relative_to(Path::new("/home/u")),
            Some(PathBuf::from(".bashrc"))
        );
    }

    #[test]
    fn paths_outside_work_tree_are_rejected() {
        let event = TraceEvent::parse(r#"openat(AT_FDCWD, "/etc/passwd", O_RDONLY) = 3"#);
        assert_eq!(event.relative_to(Path::new("/home/u")), None);
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_under_work_tree() {
        assert_eq!(
            relative_to_work_tree(Path::new("/home/u2/.bashrc"), Path::new("/home/u")),
            None
        );
    }

    #[test]
    fn work_tree_itself_is_not_reported() {
        assert_eq!(
            relative_to_work_tree(Path::new("/home/u"), Path::new("/home/u")),
            None
        );
    }

    #[test]
    fn nested_paths_keep_their_directories() {
        assert_eq!(
            relative_to_work_tree(Path::new("/home/u/.config/nvim/init.lua"), Path::new("/home/u")),
            Some(PathBuf::from(".config/nvim/init.lua"))
        );
    }
}
