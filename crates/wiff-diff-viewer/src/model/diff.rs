//! Diff data structures: hunks, lines, and patch re-emission.

/// A single line inside a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// Line type.
    pub op: LineOp,
    /// Line content without the leading op character or trailing newline.
    pub content: String,
}

impl DiffLine {
    /// Create a context line.
    pub fn context(content: impl Into<String>) -> Self {
        Self {
            op: LineOp::Context,
            content: content.into(),
        }
    }

    /// Create an added line.
    pub fn added(content: impl Into<String>) -> Self {
        Self {
            op: LineOp::Add,
            content: content.into(),
        }
    }

    /// Create a removed line.
    pub fn removed(content: impl Into<String>) -> Self {
        Self {
            op: LineOp::Remove,
            content: content.into(),
        }
    }
}

/// Line type in a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    Add,
    Remove,
    Context,
}

impl LineOp {
    /// The unified-diff prefix character for this op.
    pub fn prefix(&self) -> char {
        match self {
            LineOp::Add => '+',
            LineOp::Remove => '-',
            LineOp::Context => ' ',
        }
    }
}

/// One contiguous fragment of a single file's diff, addressable by label.
#[derive(Debug, Clone)]
pub struct Hunk {
    /// One- or two-character label, stable for the lifetime of the parse.
    pub label: String,
    /// New path, or old path when the new one is absent.
    pub file: String,
    /// The `@@ -a,b +c,d @@ ...` line verbatim, for patch re-emission.
    pub raw_header: String,
    /// Trimmed function/context hint after the second `@@`.
    pub comment: String,
    /// 1-based starting line in the old file.
    pub old_start: u32,
    /// 1-based starting line in the new file.
    pub new_start: u32,
    /// Hunk lines in unified-diff order.
    pub lines: Vec<DiffLine>,
    /// Index of this hunk's header in the display-line list; `None` when
    /// the hunk is filtered out of the current view.
    pub start_line: Option<usize>,
    /// Whether this hunk is currently staged.
    pub staged: bool,
}

impl Hunk {
    /// The `+` lines' content, joined with newlines (no trailing newline).
    pub fn added_lines(&self) -> String {
        self.filter_lines(LineOp::Add)
    }

    /// The `-` lines' content, joined with newlines.
    pub fn removed_lines(&self) -> String {
        self.filter_lines(LineOp::Remove)
    }

    /// What the file looks like in the new version within this hunk:
    /// context and `+` lines, joined with newlines.
    pub fn result_lines(&self) -> String {
        self.lines
            .iter()
            .filter(|l| l.op != LineOp::Remove)
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn filter_lines(&self, op: LineOp) -> String {
        self.lines
            .iter()
            .filter(|l| l.op == op)
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The hunk as a unified-diff patch: raw header plus op-prefixed lines.
    /// These are the exact bytes a patch tool accepts.
    pub fn as_patch(&self) -> String {
        let mut out = String::with_capacity(self.raw_header.len() + self.lines.len() * 32);
        out.push_str(&self.raw_header);
        out.push('\n');
        for line in &self.lines {
            out.push(line.op.prefix());
            out.push_str(&line.content);
            out.push('\n');
        }
        out
    }

    /// `as_patch` prefixed with `diff --git`/`---`/`+++` headers, suitable
    /// for feeding to `git apply --cached`.
    pub fn as_full_patch(&self) -> String {
        format!(
            "diff --git a/{file} b/{file}\n--- a/{file}\n+++ b/{file}\n{patch}",
            file = self.file,
            patch = self.as_patch()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hunk() -> Hunk {
        Hunk {
            label: "i".to_string(),
            file: "src/config.rs".to_string(),
            raw_header: "@@ -3,5 +3,6 @@ fn load()".to_string(),
            comment: "fn load()".to_string(),
            old_start: 3,
            new_start: 3,
            lines: vec![
                DiffLine::context("fn load() {"),
                DiffLine::removed("    let host = \"localhost\";"),
                DiffLine::removed("    let port = 8080;"),
                DiffLine::added("    let host = env(\"HOST\");"),
                DiffLine::added("    let port = env(\"PORT\");"),
                DiffLine::added("    log::debug!(\"loaded\");"),
                DiffLine::context("}"),
            ],
            start_line: None,
            staged: false,
        }
    }

    #[test]
    fn added_lines_joins_plus_lines_only() {
        let h = sample_hunk();
        let added = h.added_lines();
        assert_eq!(
            added,
            "    let host = env(\"HOST\");\n    let port = env(\"PORT\");\n    log::debug!(\"loaded\");"
        );
        assert!(!added.contains("localhost"));
    }

    #[test]
    fn removed_lines_joins_minus_lines_only() {
        let h = sample_hunk();
        let removed = h.removed_lines();
        assert_eq!(
            removed,
            "    let host = \"localhost\";\n    let port = 8080;"
        );
        assert!(!removed.contains("env("));
    }

    #[test]
    fn result_lines_mixed() {
        let h = sample_hunk();
        let result = h.result_lines();
        assert!(result.contains("fn load() {"));
        assert!(result.contains("env(\"HOST\")"));
        assert!(result.contains("loaded"));
        assert!(!result.contains("localhost"));
        assert!(!result.contains("8080"));
    }

    #[test]
    fn result_lines_pure_add_equals_added_lines() {
        let mut h = sample_hunk();
        h.lines.retain(|l| l.op == LineOp::Add);
        assert_eq!(h.result_lines(), h.added_lines());
    }

    #[test]
    fn result_lines_pure_remove_is_empty() {
        let mut h = sample_hunk();
        h.lines.retain(|l| l.op == LineOp::Remove);
        assert_eq!(h.result_lines(), "");
    }

    #[test]
    fn as_patch_format() {
        let h = sample_hunk();
        let patch = h.as_patch();
        assert!(patch.starts_with("@@ -3,5 +3,6 @@ fn load()\n"));
        assert!(patch.contains("\n-    let port = 8080;\n"));
        assert!(patch.contains("\n+    let port = env(\"PORT\");\n"));
        assert!(patch.ends_with(" }\n"));
        // Every content line carries exactly one op character.
        for line in patch.lines().skip(1) {
            assert!(matches!(line.chars().next(), Some('+' | '-' | ' ')));
        }
    }

    #[test]
    fn as_full_patch_prepends_file_headers() {
        let h = sample_hunk();
        let patch = h.as_full_patch();
        assert!(patch.starts_with(
            "diff --git a/src/config.rs b/src/config.rs\n--- a/src/config.rs\n+++ b/src/config.rs\n@@ -3,5 +3,6 @@"
        ));
        assert!(patch.ends_with(&h.as_patch()));
    }

    #[test]
    fn emission_is_deterministic() {
        let h = sample_hunk();
        assert_eq!(h.as_patch(), h.as_patch());
        assert_eq!(h.as_full_patch(), h.as_full_patch());
    }
}
