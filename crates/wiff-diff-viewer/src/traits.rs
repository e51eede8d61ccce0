//! File-content injection for the full-file view.
//!
//! The viewer itself never talks to git or the filesystem; the
//! orchestrating application provides content through this trait, which
//! keeps the display-line builders testable without a repository.

/// Where the new version of a file lives for the current comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// The staged (index) version: `git show :<path>`.
    Staged,
    /// A specific ref: `git show <ref>:<path>`.
    Ref(String),
    /// The working tree.
    WorkTree,
}

/// Provides the new version of a file as lines without trailing newlines.
pub trait FileContents {
    /// Read the file, or `None` when it cannot be produced (deleted,
    /// binary, outside the repository).
    fn read_new_file(&self, path: &str, source: &FileSource) -> Option<Vec<String>>;
}

/// A provider that never finds anything; used in tests and pipe mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFileContents;

impl FileContents for NoFileContents {
    fn read_new_file(&self, _path: &str, _source: &FileSource) -> Option<Vec<String>> {
        None
    }
}
