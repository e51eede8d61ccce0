//! Parse unified diff text (as produced by `git diff`) into labeled hunks.

use thiserror::Error;
use unidiff::PatchSet;

use crate::model::{DiffLine, Hunk, LabelAlphabet, LineOp};

/// Errors that can occur during diff parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse diff: {0}")]
    Malformed(String),
}

/// Parse a unified diff into an ordered hunk list. Labels are assigned
/// from `alphabet` in hunk order; parsing the same input twice yields
/// structurally identical output.
pub fn parse_diff(diff_text: &str, alphabet: &LabelAlphabet) -> Result<Vec<Hunk>, ParseError> {
    let mut patch_set = PatchSet::new();
    patch_set
        .parse(diff_text)
        .map_err(|e| ParseError::Malformed(e.to_string()))?;

    let mut hunks = Vec::new();
    for file in patch_set.files() {
        let target = clean_path(&file.target_file);
        let source = clean_path(&file.source_file);
        let filename = if target.is_empty() || target == "/dev/null" {
            source
        } else {
            target
        };

        for fragment in file.hunks() {
            let comment = fragment.section_header.trim().to_string();
            let lines = parse_lines(fragment);
            hunks.push(Hunk {
                label: alphabet.label_for(hunks.len()),
                file: filename.clone(),
                raw_header: format_header(fragment),
                comment,
                old_start: fragment.source_start as u32,
                new_start: fragment.target_start as u32,
                lines,
                start_line: None,
                staged: false,
            });
        }
    }
    Ok(hunks)
}

fn format_header(fragment: &unidiff::Hunk) -> String {
    let comment = fragment.section_header.trim();
    let suffix = if comment.is_empty() {
        String::new()
    } else {
        format!(" {comment}")
    };
    format!(
        "@@ -{},{} +{},{} @@{}",
        fragment.source_start,
        fragment.source_length,
        fragment.target_start,
        fragment.target_length,
        suffix
    )
}

fn parse_lines(fragment: &unidiff::Hunk) -> Vec<DiffLine> {
    fragment
        .lines()
        .iter()
        .filter_map(|line| {
            let op = match line.line_type.as_str() {
                "+" => LineOp::Add,
                "-" => LineOp::Remove,
                " " => LineOp::Context,
                // "\ No newline at end of file" markers are not hunk lines.
                _ => return None,
            };
            Some(DiffLine {
                op,
                content: line.value.trim_end_matches('\n').to_string(),
            })
        })
        .collect()
}

/// Strip the `a/`/`b/` prefixes git puts on paths.
fn clean_path(path: &str) -> String {
    let path = path.trim();
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DIFF: &str = "\
diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,5 +1,6 @@ fn main()
 fn main() {
     println!(\"Hello\");
+    println!(\"World\");
 }
diff --git a/docs/notes.txt b/docs/notes.txt
index 111222..333444 100644
--- a/docs/notes.txt
+++ b/docs/notes.txt
@@ -10,7 +10,6 @@
 intro
-stale line
 outro
";

    #[test]
    fn parses_files_and_fragments_in_order() {
        let alphabet = LabelAlphabet::default();
        let hunks = parse_diff(SAMPLE_DIFF, &alphabet).unwrap();

        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].file, "src/main.rs");
        assert_eq!(hunks[0].old_start, 1);
        assert_eq!(hunks[0].new_start, 1);
        assert_eq!(hunks[0].comment, "fn main()");
        assert_eq!(hunks[0].raw_header, "@@ -1,5 +1,6 @@ fn main()");

        assert_eq!(hunks[1].file, "docs/notes.txt");
        assert_eq!(hunks[1].comment, "");
        assert_eq!(hunks[1].raw_header, "@@ -10,7 +10,6 @@");
    }

    #[test]
    fn assigns_labels_in_alphabet_order() {
        let alphabet = LabelAlphabet::default();
        let hunks = parse_diff(SAMPLE_DIFF, &alphabet).unwrap();
        assert_eq!(hunks[0].label, alphabet.label_for(0));
        assert_eq!(hunks[1].label, alphabet.label_for(1));
    }

    #[test]
    fn classifies_line_ops_and_strips_newlines() {
        let alphabet = LabelAlphabet::default();
        let hunks = parse_diff(SAMPLE_DIFF, &alphabet).unwrap();

        let lines = &hunks[0].lines;
        assert_eq!(lines[0].op, LineOp::Context);
        assert_eq!(lines[0].content, "fn main() {");
        let added: Vec<_> = lines.iter().filter(|l| l.op == LineOp::Add).collect();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].content, "    println!(\"World\");");
        assert!(lines.iter().all(|l| !l.content.ends_with('\n')));
    }

    #[test]
    fn new_file_uses_target_name() {
        let diff = "\
diff --git a/new.rs b/new.rs
new file mode 100644
index 0000000..abc1234
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,2 @@
+fn fresh() {
+}
";
        let hunks = parse_diff(diff, &LabelAlphabet::default()).unwrap();
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].file, "new.rs");
    }

    #[test]
    fn deleted_file_falls_back_to_old_name() {
        let diff = "\
diff --git a/gone.rs b/gone.rs
deleted file mode 100644
index abc1234..0000000
--- a/gone.rs
+++ /dev/null
@@ -1,2 +0,0 @@
-fn old() {
-}
";
        let hunks = parse_diff(diff, &LabelAlphabet::default()).unwrap();
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].file, "gone.rs");
        assert!(hunks[0].lines.iter().all(|l| l.op == LineOp::Remove));
    }

    #[test]
    fn as_patch_round_trips_through_parser() {
        let alphabet = LabelAlphabet::default();
        let hunks = parse_diff(SAMPLE_DIFF, &alphabet).unwrap();

        for hunk in &hunks {
            let reparsed = parse_diff(&hunk.as_full_patch(), &alphabet).unwrap();
            assert_eq!(reparsed.len(), 1);
            let back = &reparsed[0];
            assert_eq!(back.file, hunk.file);
            assert_eq!(back.old_start, hunk.old_start);
            assert_eq!(back.new_start, hunk.new_start);
            assert_eq!(back.lines, hunk.lines);
        }
    }

    #[test]
    fn empty_input_parses_to_no_hunks() {
        let hunks = parse_diff("", &LabelAlphabet::default()).unwrap();
        assert!(hunks.is_empty());
    }
}
