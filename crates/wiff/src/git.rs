//! Child-process git client: diff, show, root discovery, and hunk
//! staging via `apply --cached`.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use wiff_diff_viewer::{FileContents, FileSource};

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),
    /// Output that must be decoded exactly (the repository root is used
    /// as a filesystem path) was not valid UTF-8. Diff and file content
    /// are decoded lossily instead and never hit this.
    #[error("git produced non-UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("git exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitClient;

impl GitClient {
    /// `git diff --no-color -U<n> [--staged] [refs…]`. A non-zero exit
    /// is tolerated and yields whatever stdout was produced; only a
    /// failure to run git at all is an error.
    pub fn diff(&self, refs: &[String], context_lines: u32, staged: bool) -> Result<Vec<u8>, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("diff")
            .arg("--no-color")
            .arg(format!("-U{context_lines}"));
        if staged {
            cmd.arg("--staged");
        }
        cmd.args(refs);

        let output = cmd.output()?;
        Ok(output.stdout)
    }

    /// `git show <spec>` (e.g. `:path`, `ref:path`).
    pub fn show(&self, spec: &str) -> Result<Vec<u8>, GitError> {
        let output = Command::new("git").arg("show").arg(spec).output()?;
        if !output.status.success() {
            return Err(GitError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Top-level directory of the current repository.
    pub fn root(&self) -> Result<PathBuf, GitError> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .output()?;
        if !output.status.success() {
            return Err(GitError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let root = String::from_utf8(output.stdout)?;
        Ok(PathBuf::from(root.trim_end_matches('\n')))
    }

    /// `git apply --cached [-R]` with the patch on stdin.
    pub fn apply_cached(&self, patch: &str, reverse: bool) -> Result<(), GitError> {
        let mut cmd = Command::new("git");
        cmd.args(["apply", "--cached"]);
        if reverse {
            cmd.arg("-R");
        }
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(patch.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(GitError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Bytes → lines without trailing newlines, matching how the builders
/// index file content.
fn split_lines(bytes: Vec<u8>) -> Vec<String> {
    String::from_utf8_lossy(&bytes)
        .trim_end_matches('\n')
        .split('\n')
        .map(String::from)
        .collect()
}

impl FileContents for GitClient {
    fn read_new_file(&self, path: &str, source: &FileSource) -> Option<Vec<String>> {
        match source {
            FileSource::Staged => self.show(&format!(":{path}")).ok().map(split_lines),
            FileSource::Ref(r) => self.show(&format!("{r}:{path}")).ok().map(split_lines),
            FileSource::WorkTree => {
                if let Ok(root) = self.root() {
                    if let Ok(content) = std::fs::read(root.join(path)) {
                        return Some(split_lines(content));
                    }
                }
                // Deleted from the working tree; the last committed
                // version is the closest thing to show.
                self.show(&format!("HEAD:{path}")).ok().map(split_lines)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_strips_trailing_newline() {
        assert_eq!(split_lines(b"a\nb\n".to_vec()), vec!["a", "b"]);
        assert_eq!(split_lines(b"a\nb".to_vec()), vec!["a", "b"]);
        assert_eq!(split_lines(b"\n".to_vec()), vec![""]);
    }

    #[test]
    fn split_lines_keeps_interior_blank_lines() {
        assert_eq!(split_lines(b"a\n\nb\n".to_vec()), vec!["a", "", "b"]);
    }

    #[test]
    fn non_utf8_output_maps_to_the_utf8_variant() {
        let err: GitError = String::from_utf8(vec![0x66, 0xff, 0x6f]).unwrap_err().into();
        assert!(matches!(err, GitError::Utf8(_)));
        assert!(err.to_string().starts_with("git produced non-UTF-8 output"));
    }
}
