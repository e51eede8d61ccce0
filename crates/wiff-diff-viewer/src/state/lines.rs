//! Display-line builders: hunks plus view options in, flat line list out.
//!
//! Four modes (inline, side-by-side, and their full-file variants) plus
//! an optional wrap pass. All of them reset and re-resolve each hunk's
//! `start_line` so navigation stays correct after every rebuild.

use crate::model::{Hunk, LineOp};
use crate::state::display::{DisplayLine, HalfLine, LineStyle};
use crate::state::viewer_state::{ViewerState, LINE_NO_WIDTH};
use crate::traits::FileSource;

impl ViewerState {
    /// Rebuild the display-line list for the current mode and options.
    pub fn build_lines(&mut self) {
        self.update_layout();
        self.compute_label_gutter();
        // Stale start lines would break navigation when switching views.
        for hunk in &mut self.hunks {
            hunk.start_line = None;
        }

        if self.full_file && self.full_file_name.is_some() {
            if self.side_by_side {
                self.build_full_file_side_by_side_lines();
                if self.wrap {
                    self.wrap_side_by_side_lines();
                }
            } else {
                self.build_full_file_lines();
                if self.wrap {
                    self.wrap_inline_lines();
                }
            }
        } else if self.side_by_side {
            self.build_side_by_side_lines();
            if self.wrap {
                self.wrap_side_by_side_lines();
            }
        } else {
            self.build_inline_lines();
            if self.wrap {
                self.wrap_inline_lines();
            }
        }

        // Line indices changed; recompute matches for the active query.
        if !self.search.query.is_empty() {
            self.update_matches();
        }
    }

    /// Character width available for text content in inline mode.
    pub fn text_width(&self) -> usize {
        let line_no = if self.line_numbers { LINE_NO_WIDTH } else { 0 };
        self.diff_width
            .saturating_sub(self.label_gutter)
            .saturating_sub(line_no)
            .max(1) as usize
    }

    /// Character width available for each half in side-by-side mode,
    /// including the op prefix.
    pub fn side_col_width(&self) -> usize {
        let line_no = if self.line_numbers { LINE_NO_WIDTH } else { 0 };
        let col = self.diff_width.saturating_sub(self.label_gutter + 1) / 2;
        col.saturating_sub(line_no).max(1) as usize
    }

    fn hunk_filtered(&self, idx: usize) -> bool {
        match &self.filter_file {
            Some(filter) => self.hunks[idx].file != *filter,
            None => false,
        }
    }

    fn build_inline_lines(&mut self) {
        let mut lines: Vec<DisplayLine> = Vec::new();
        let mut current_file: Option<String> = None;

        for i in 0..self.hunks.len() {
            if self.hunk_filtered(i) {
                continue;
            }
            let file = self.hunks[i].file.clone();

            if current_file.as_deref() != Some(file.as_str()) {
                if current_file.is_some() {
                    lines.push(DisplayLine::blank());
                }
                lines.push(DisplayLine::file_header(file.clone()));
                current_file = Some(file);
            }

            lines.push(DisplayLine::blank());
            self.hunks[i].start_line = Some(lines.len());
            lines.push(DisplayLine::hunk_header(
                self.hunks[i].comment.clone(),
                self.hunks[i].label.clone(),
                i,
            ));

            let mut old_no = self.hunks[i].old_start;
            let mut new_no = self.hunks[i].new_start;
            for dl in &self.hunks[i].lines {
                let (style, old, new) = match dl.op {
                    LineOp::Add => {
                        let row = (LineStyle::Added, None, Some(new_no));
                        new_no += 1;
                        row
                    }
                    LineOp::Remove => {
                        let row = (LineStyle::Removed, Some(old_no), None);
                        old_no += 1;
                        row
                    }
                    LineOp::Context => {
                        let row = (LineStyle::Context, Some(old_no), Some(new_no));
                        old_no += 1;
                        new_no += 1;
                        row
                    }
                };
                lines.push(DisplayLine {
                    text: format!("{}{}", dl.op.prefix(), dl.content),
                    style,
                    hunk_idx: Some(i),
                    old_line_no: old,
                    new_line_no: new,
                    ..DisplayLine::default()
                });
            }
        }

        self.lines = lines;
    }

    fn build_side_by_side_lines(&mut self) {
        let mut lines: Vec<DisplayLine> = Vec::new();
        let mut current_file: Option<String> = None;

        for i in 0..self.hunks.len() {
            if self.hunk_filtered(i) {
                continue;
            }
            let file = self.hunks[i].file.clone();

            if current_file.as_deref() != Some(file.as_str()) {
                if current_file.is_some() {
                    lines.push(DisplayLine::blank());
                }
                lines.push(DisplayLine::file_header(file.clone()));
                current_file = Some(file);
            }

            lines.push(DisplayLine::blank());
            self.hunks[i].start_line = Some(lines.len());
            lines.push(DisplayLine::hunk_header(
                self.hunks[i].comment.clone(),
                self.hunks[i].label.clone(),
                i,
            ));

            let mut old_no = self.hunks[i].old_start;
            let mut new_no = self.hunks[i].new_start;
            let hunk_lines = self.hunks[i].lines.clone();
            emit_paired_rows(&mut lines, &hunk_lines, i, &mut old_no, &mut new_no);
        }

        self.lines = lines;
    }

    fn build_full_file_lines(&mut self) {
        let Some(filename) = self.full_file_name.clone() else {
            return;
        };
        let Some(file_lines) = self.read_new_file(&filename) else {
            self.lines = Vec::new();
            return;
        };

        let file_hunks: Vec<usize> = (0..self.hunks.len())
            .filter(|&i| self.hunks[i].file == filename)
            .collect();
        // Context between hunks still belongs to this file for syntax
        // highlighting purposes.
        let context_idx = file_hunks.first().copied();

        let mut lines = vec![DisplayLine::file_header(filename.clone())];
        let mut new_no: u32 = 1;
        let mut old_no: u32 = 1;

        for &i in &file_hunks {
            while new_no < self.hunks[i].new_start && (new_no as usize) <= file_lines.len() {
                lines.push(context_row(
                    &file_lines[new_no as usize - 1],
                    context_idx,
                    old_no,
                    new_no,
                ));
                new_no += 1;
                old_no += 1;
            }

            lines.push(DisplayLine::blank());
            self.hunks[i].start_line = Some(lines.len());
            lines.push(DisplayLine::hunk_header(
                self.hunks[i].comment.clone(),
                self.hunks[i].label.clone(),
                i,
            ));

            let mut hunk_old = self.hunks[i].old_start;
            let mut hunk_new = self.hunks[i].new_start;
            for dl in &self.hunks[i].lines {
                match dl.op {
                    LineOp::Context => {
                        lines.push(DisplayLine {
                            text: format!(" {}", dl.content),
                            style: LineStyle::Context,
                            hunk_idx: Some(i),
                            old_line_no: Some(hunk_old),
                            new_line_no: Some(hunk_new),
                            ..DisplayLine::default()
                        });
                        hunk_old += 1;
                        hunk_new += 1;
                    }
                    LineOp::Add => {
                        lines.push(DisplayLine {
                            text: format!("+{}", dl.content),
                            style: LineStyle::Added,
                            hunk_idx: Some(i),
                            new_line_no: Some(hunk_new),
                            ..DisplayLine::default()
                        });
                        hunk_new += 1;
                    }
                    LineOp::Remove => {
                        lines.push(DisplayLine {
                            text: format!("-{}", dl.content),
                            style: LineStyle::Removed,
                            hunk_idx: Some(i),
                            old_line_no: Some(hunk_old),
                            ..DisplayLine::default()
                        });
                        hunk_old += 1;
                    }
                }
            }

            lines.push(DisplayLine::blank());
            new_no = hunk_new;
            old_no = hunk_old;
        }

        while (new_no as usize) <= file_lines.len() {
            lines.push(context_row(
                &file_lines[new_no as usize - 1],
                context_idx,
                old_no,
                new_no,
            ));
            new_no += 1;
            old_no += 1;
        }

        self.lines = lines;
    }

    fn build_full_file_side_by_side_lines(&mut self) {
        let Some(filename) = self.full_file_name.clone() else {
            return;
        };
        let Some(new_lines) = self.read_new_file(&filename) else {
            self.lines = Vec::new();
            return;
        };
        let old_lines = self.reconstruct_old_file(&filename, &new_lines);

        let file_hunks: Vec<usize> = (0..self.hunks.len())
            .filter(|&i| self.hunks[i].file == filename)
            .collect();
        let context_idx = file_hunks.first().copied();

        let mut lines = vec![DisplayLine::file_header(filename.clone())];
        let mut old_no: u32 = 1;
        let mut new_no: u32 = 1;

        for &i in &file_hunks {
            while new_no < self.hunks[i].new_start {
                let left = old_lines
                    .get(old_no as usize - 1)
                    .map(|t| HalfLine::new(format!(" {t}"), LineStyle::Context, old_no))
                    .unwrap_or_default();
                let right = new_lines
                    .get(new_no as usize - 1)
                    .map(|t| HalfLine::new(format!(" {t}"), LineStyle::Context, new_no))
                    .unwrap_or_default();
                lines.push(DisplayLine {
                    style: LineStyle::Context,
                    hunk_idx: context_idx,
                    left,
                    right,
                    ..DisplayLine::default()
                });
                old_no += 1;
                new_no += 1;
            }

            lines.push(DisplayLine::blank());
            self.hunks[i].start_line = Some(lines.len());
            lines.push(DisplayLine::hunk_header(
                self.hunks[i].comment.clone(),
                self.hunks[i].label.clone(),
                i,
            ));

            let mut hunk_old = self.hunks[i].old_start;
            let mut hunk_new = self.hunks[i].new_start;
            let hunk_lines = self.hunks[i].lines.clone();
            emit_paired_rows(&mut lines, &hunk_lines, i, &mut hunk_old, &mut hunk_new);

            lines.push(DisplayLine::blank());
            old_no = hunk_old;
            new_no = hunk_new;
        }

        while (old_no as usize) <= old_lines.len() || (new_no as usize) <= new_lines.len() {
            let mut left = HalfLine::default();
            let mut right = HalfLine::default();
            if let Some(t) = old_lines.get(old_no as usize - 1) {
                left = HalfLine::new(format!(" {t}"), LineStyle::Context, old_no);
                old_no += 1;
            }
            if let Some(t) = new_lines.get(new_no as usize - 1) {
                right = HalfLine::new(format!(" {t}"), LineStyle::Context, new_no);
                new_no += 1;
            }
            lines.push(DisplayLine {
                style: LineStyle::Context,
                hunk_idx: context_idx,
                left,
                right,
                ..DisplayLine::default()
            });
        }

        self.lines = lines;
    }

    /// New version of a file, read through the injected provider from
    /// the index, a ref, or the working tree depending on the comparison.
    fn read_new_file(&self, filename: &str) -> Option<Vec<String>> {
        let source = if self.staged {
            FileSource::Staged
        } else if self.refs.len() >= 2 {
            FileSource::Ref(self.refs[1].clone())
        } else {
            FileSource::WorkTree
        };
        self.reader.read_new_file(filename, &source)
    }

    /// Derive the old file from the new file plus hunks. Context is
    /// shared, removes exist only in the old file, adds only in the new.
    fn reconstruct_old_file(&self, filename: &str, new_lines: &[String]) -> Vec<String> {
        let file_hunks: Vec<&Hunk> = self
            .hunks
            .iter()
            .filter(|h| h.file == filename)
            .collect();
        if file_hunks.is_empty() {
            return new_lines.to_vec();
        }

        let mut old = Vec::new();
        let mut new_pos: usize = 1;

        for hunk in file_hunks {
            while new_pos < hunk.new_start as usize && new_pos <= new_lines.len() {
                old.push(new_lines[new_pos - 1].clone());
                new_pos += 1;
            }
            for dl in &hunk.lines {
                match dl.op {
                    LineOp::Context => {
                        old.push(dl.content.clone());
                        new_pos += 1;
                    }
                    LineOp::Remove => old.push(dl.content.clone()),
                    LineOp::Add => new_pos += 1,
                }
            }
        }

        while new_pos <= new_lines.len() {
            old.push(new_lines[new_pos - 1].clone());
            new_pos += 1;
        }
        old
    }

    /// Split long inline rows into continuation rows. Only content rows
    /// wrap; the first chunk keeps line numbers, continuations carry the
    /// style and hunk index but no label or numbers.
    fn wrap_inline_lines(&mut self) {
        let tw = self.text_width();
        let mut wrapped: Vec<DisplayLine> = Vec::new();

        for line in std::mem::take(&mut self.lines) {
            if !line.is_content() {
                wrapped.push(line);
                continue;
            }
            let chars: Vec<char> = line.text.chars().collect();
            if chars.len() <= tw {
                wrapped.push(line);
                continue;
            }

            wrapped.push(DisplayLine {
                text: chars[..tw].iter().collect(),
                style: line.style,
                hunk_idx: line.hunk_idx,
                old_line_no: line.old_line_no,
                new_line_no: line.new_line_no,
                ..DisplayLine::default()
            });
            let mut rest = &chars[tw..];
            while !rest.is_empty() {
                let end = tw.min(rest.len());
                wrapped.push(DisplayLine {
                    text: rest[..end].iter().collect(),
                    style: line.style,
                    hunk_idx: line.hunk_idx,
                    continuation: true,
                    ..DisplayLine::default()
                });
                rest = &rest[end..];
            }
        }

        self.lines = wrapped;
        self.fix_start_lines();
    }

    /// Split long side-by-side halves into continuation rows.
    fn wrap_side_by_side_lines(&mut self) {
        let tw = self.side_col_width();
        let mut wrapped: Vec<DisplayLine> = Vec::new();

        for line in std::mem::take(&mut self.lines) {
            if !line.is_content() {
                wrapped.push(line);
                continue;
            }
            let left: Vec<char> = line.left.text.chars().collect();
            let right: Vec<char> = line.right.text.chars().collect();
            if left.len() <= tw && right.len() <= tw {
                wrapped.push(line);
                continue;
            }

            let l_end = tw.min(left.len());
            let r_end = tw.min(right.len());
            wrapped.push(DisplayLine {
                style: line.style,
                label: line.label.clone(),
                hunk_idx: line.hunk_idx,
                left: HalfLine {
                    text: left[..l_end].iter().collect(),
                    style: line.left.style,
                    line_no: line.left.line_no,
                },
                right: HalfLine {
                    text: right[..r_end].iter().collect(),
                    style: line.right.style,
                    line_no: line.right.line_no,
                },
                ..DisplayLine::default()
            });

            let mut left_rest = &left[l_end..];
            let mut right_rest = &right[r_end..];
            while !left_rest.is_empty() || !right_rest.is_empty() {
                let l_take = tw.min(left_rest.len());
                let r_take = tw.min(right_rest.len());
                wrapped.push(DisplayLine {
                    style: line.style,
                    hunk_idx: line.hunk_idx,
                    continuation: true,
                    left: HalfLine {
                        text: left_rest[..l_take].iter().collect(),
                        style: line.left.style,
                        line_no: None,
                    },
                    right: HalfLine {
                        text: right_rest[..r_take].iter().collect(),
                        style: line.right.style,
                        line_no: None,
                    },
                    ..DisplayLine::default()
                });
                left_rest = &left_rest[l_take..];
                right_rest = &right_rest[r_take..];
            }
        }

        self.lines = wrapped;
        self.fix_start_lines();
    }

    /// Wrapping shifts indices; re-resolve every hunk's header position
    /// by its label.
    fn fix_start_lines(&mut self) {
        for i in 0..self.lines.len() {
            if self.lines[i].style != LineStyle::HunkHeader {
                continue;
            }
            let Some(label) = self.lines[i].label.clone() else {
                continue;
            };
            if let Some(h) = self.hunk_index_by_label(&label) {
                self.hunks[h].start_line = Some(i);
            }
        }
    }
}

fn context_row(text: &str, hunk_idx: Option<usize>, old_no: u32, new_no: u32) -> DisplayLine {
    DisplayLine {
        text: format!(" {text}"),
        style: LineStyle::Context,
        hunk_idx,
        old_line_no: Some(old_no),
        new_line_no: Some(new_no),
        ..DisplayLine::default()
    }
}

/// Emit side-by-side rows for one hunk's lines: context rows mirror both
/// sides, then runs of consecutive removes pair index-by-index with the
/// following run of adds, the shorter side padded with empty halves.
fn emit_paired_rows(
    lines: &mut Vec<DisplayLine>,
    hunk_lines: &[crate::model::DiffLine],
    hunk_idx: usize,
    old_no: &mut u32,
    new_no: &mut u32,
) {
    let mut j = 0;
    while j < hunk_lines.len() {
        let dl = &hunk_lines[j];

        if dl.op == LineOp::Context {
            lines.push(DisplayLine {
                style: LineStyle::Context,
                hunk_idx: Some(hunk_idx),
                left: HalfLine::new(format!(" {}", dl.content), LineStyle::Context, *old_no),
                right: HalfLine::new(format!(" {}", dl.content), LineStyle::Context, *new_no),
                ..DisplayLine::default()
            });
            *old_no += 1;
            *new_no += 1;
            j += 1;
            continue;
        }

        let mut removes: Vec<(String, u32)> = Vec::new();
        while j < hunk_lines.len() && hunk_lines[j].op == LineOp::Remove {
            removes.push((hunk_lines[j].content.clone(), *old_no));
            *old_no += 1;
            j += 1;
        }
        let mut adds: Vec<(String, u32)> = Vec::new();
        while j < hunk_lines.len() && hunk_lines[j].op == LineOp::Add {
            adds.push((hunk_lines[j].content.clone(), *new_no));
            *new_no += 1;
            j += 1;
        }

        for k in 0..removes.len().max(adds.len()) {
            let left = removes
                .get(k)
                .map(|(text, no)| HalfLine::new(format!("-{text}"), LineStyle::Removed, *no))
                .unwrap_or_default();
            let right = adds
                .get(k)
                .map(|(text, no)| HalfLine::new(format!("+{text}"), LineStyle::Added, *no))
                .unwrap_or_default();
            let style = if !left.is_empty() {
                LineStyle::Removed
            } else if !right.is_empty() {
                LineStyle::Added
            } else {
                LineStyle::Context
            };
            lines.push(DisplayLine {
                style,
                hunk_idx: Some(hunk_idx),
                left,
                right,
                ..DisplayLine::default()
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiffLine;
    use crate::state::viewer_state::ViewerOptions;
    use crate::traits::FileContents;
    use std::collections::HashMap;

    struct StubFiles(HashMap<String, Vec<String>>);

    impl FileContents for StubFiles {
        fn read_new_file(&self, path: &str, _source: &FileSource) -> Option<Vec<String>> {
            self.0.get(path).cloned()
        }
    }

    fn hunk(label: &str, file: &str, old_start: u32, new_start: u32, lines: Vec<DiffLine>) -> Hunk {
        Hunk {
            label: label.to_string(),
            file: file.to_string(),
            raw_header: String::new(),
            comment: "ctx".to_string(),
            old_start,
            new_start,
            lines,
            start_line: None,
            staged: false,
        }
    }

    fn basic_hunk(label: &str, file: &str) -> Hunk {
        hunk(
            label,
            file,
            1,
            1,
            vec![
                DiffLine::context("shared"),
                DiffLine::removed("old one"),
                DiffLine::removed("old two"),
                DiffLine::added("new one"),
                DiffLine::context("tail"),
            ],
        )
    }

    fn state(hunks: Vec<Hunk>) -> ViewerState {
        let mut s = ViewerState::for_tests(ViewerOptions {
            wrap: false,
            ..ViewerOptions::default()
        });
        s.width = 120;
        s.height = 40;
        s.load_hunks(hunks);
        s
    }

    #[test]
    fn inline_build_emits_headers_and_tracked_line_numbers() {
        let s = state(vec![basic_hunk("i", "a.rs")]);

        assert_eq!(s.lines[0].style, LineStyle::FileHeader);
        assert_eq!(s.lines[0].text, "a.rs");
        let start = s.hunks[0].start_line.unwrap();
        assert_eq!(s.lines[start].style, LineStyle::HunkHeader);
        assert_eq!(s.lines[start].label.as_deref(), Some("i"));

        let context = &s.lines[start + 1];
        assert_eq!(context.text, " shared");
        assert_eq!(context.old_line_no, Some(1));
        assert_eq!(context.new_line_no, Some(1));

        let removed = &s.lines[start + 2];
        assert_eq!(removed.text, "-old one");
        assert_eq!(removed.old_line_no, Some(2));
        assert_eq!(removed.new_line_no, None);

        let added = &s.lines[start + 4];
        assert_eq!(added.text, "+new one");
        assert_eq!(added.old_line_no, None);
        assert_eq!(added.new_line_no, Some(2));
    }

    #[test]
    fn added_rows_have_only_new_numbers_and_removed_only_old() {
        let s = state(vec![basic_hunk("i", "a.rs")]);
        for line in &s.lines {
            match line.style {
                LineStyle::Added => {
                    assert_eq!(line.old_line_no, None);
                    assert!(line.new_line_no.is_some());
                }
                LineStyle::Removed => {
                    assert!(line.old_line_no.is_some());
                    assert_eq!(line.new_line_no, None);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn file_header_emitted_once_per_file() {
        let s = state(vec![
            basic_hunk("i", "a.rs"),
            basic_hunk("l", "a.rs"),
            basic_hunk("m", "b.rs"),
        ]);
        let headers: Vec<&str> = s
            .lines
            .iter()
            .filter(|l| l.style == LineStyle::FileHeader)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(headers, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn filter_skips_other_files_and_clears_start_line() {
        let mut s = state(vec![basic_hunk("i", "a.rs"), basic_hunk("l", "b.rs")]);
        s.filter_file = Some("b.rs".to_string());
        s.build_lines();

        assert_eq!(s.hunks[0].start_line, None);
        assert!(s.hunks[1].start_line.is_some());
        assert!(s.lines.iter().all(|l| l.text != "a.rs"));
    }

    #[test]
    fn side_by_side_pairs_removes_with_adds() {
        let mut s = state(vec![basic_hunk("i", "a.rs")]);
        s.side_by_side = true;
        s.build_lines();

        let start = s.hunks[0].start_line.unwrap();
        // First pair: remove 1 with the single add.
        let pair = &s.lines[start + 2];
        assert_eq!(pair.left.text, "-old one");
        assert_eq!(pair.right.text, "+new one");
        assert_eq!(pair.style, LineStyle::Removed);

        // Second remove is unpaired: right half empty, style removed.
        let lone = &s.lines[start + 3];
        assert_eq!(lone.left.text, "-old two");
        assert!(lone.right.is_empty());
        assert_eq!(lone.style, LineStyle::Removed);

        // Context mirrors both sides with respective numbers.
        let ctx = &s.lines[start + 1];
        assert_eq!(ctx.left.text, " shared");
        assert_eq!(ctx.right.text, " shared");
        assert_eq!(ctx.left.line_no, Some(1));
        assert_eq!(ctx.right.line_no, Some(1));
    }

    #[test]
    fn no_wrap_means_no_continuations() {
        let long = "x".repeat(500);
        let s = state(vec![hunk(
            "i",
            "a.rs",
            1,
            1,
            vec![DiffLine::added(long)],
        )]);
        assert!(s.lines.iter().all(|l| !l.continuation));
    }

    #[test]
    fn wrap_splits_long_lines_and_preserves_text() {
        let long: String = ('a'..='z').cycle().take(300).collect();
        let mut s = state(vec![hunk(
            "i",
            "a.rs",
            1,
            1,
            vec![DiffLine::added(long.clone())],
        )]);
        s.wrap = true;
        s.build_lines();

        let first = s
            .lines
            .iter()
            .position(|l| l.style == LineStyle::Added)
            .unwrap();
        assert!(!s.lines[first].continuation);
        assert!(s.lines[first + 1].continuation);
        assert_eq!(s.lines[first].hunk_idx, s.lines[first + 1].hunk_idx);
        assert_eq!(s.lines[first + 1].old_line_no, None);
        assert_eq!(s.lines[first + 1].new_line_no, None);
        assert_eq!(s.lines[first + 1].label, None);

        let rejoined: String = s.lines[first..]
            .iter()
            .take_while(|l| l.style == LineStyle::Added)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(rejoined, format!("+{long}"));

        let tw = s.text_width();
        for line in &s.lines {
            assert!(line.text.chars().count() <= tw || !line.is_content());
        }
    }

    #[test]
    fn wrap_fixes_start_lines_by_label() {
        let long = "y".repeat(400);
        let mut s = state(vec![
            hunk("i", "a.rs", 1, 1, vec![DiffLine::added(long)]),
            basic_hunk("l", "b.rs"),
        ]);
        s.wrap = true;
        s.build_lines();

        for h in &s.hunks {
            let start = h.start_line.unwrap();
            assert_eq!(s.lines[start].style, LineStyle::HunkHeader);
            assert_eq!(s.lines[start].label.as_deref(), Some(h.label.as_str()));
        }
    }

    #[test]
    fn side_by_side_wrap_splits_halves() {
        let long = "z".repeat(400);
        let mut s = state(vec![hunk(
            "i",
            "a.rs",
            1,
            1,
            vec![DiffLine::removed(long.clone()), DiffLine::added("short")],
        )]);
        s.side_by_side = true;
        s.wrap = true;
        s.build_lines();

        let tw = s.side_col_width();
        let first = s
            .lines
            .iter()
            .position(|l| l.style == LineStyle::Removed)
            .unwrap();
        assert!(s.lines[first + 1].continuation);
        let rejoined: String = s.lines[first..]
            .iter()
            .take_while(|l| l.style == LineStyle::Removed)
            .map(|l| l.left.text.as_str())
            .collect();
        assert_eq!(rejoined, format!("-{long}"));
        for line in &s.lines {
            if line.is_content() {
                assert!(line.left.text.chars().count() <= tw);
                assert!(line.right.text.chars().count() <= tw);
            }
        }
    }

    fn full_file_state() -> ViewerState {
        let new_file: Vec<String> = vec![
            "top", "shared", "new one", "tail", "mid", "bottom", "last",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let mut files = HashMap::new();
        files.insert("a.rs".to_string(), new_file);

        let mut s = ViewerState::new(
            ViewerOptions {
                wrap: false,
                ..ViewerOptions::default()
            },
            Box::new(StubFiles(files)),
        );
        s.width = 120;
        s.height = 40;
        // Hunk replaces two old lines with one at line 2.
        s.load_hunks(vec![hunk(
            "i",
            "a.rs",
            2,
            2,
            vec![
                DiffLine::context("shared"),
                DiffLine::removed("old one"),
                DiffLine::removed("old two"),
                DiffLine::added("new one"),
                DiffLine::context("tail"),
            ],
        )]);
        s.full_file = true;
        s.full_file_name = Some("a.rs".to_string());
        s.build_lines();
        s
    }

    #[test]
    fn full_file_emits_gap_context_and_trailing_lines() {
        let s = full_file_state();
        assert_eq!(s.lines[0].style, LineStyle::FileHeader);
        // Line 1 of the file precedes the hunk.
        assert_eq!(s.lines[1].text, " top");
        assert_eq!(s.lines[1].new_line_no, Some(1));
        // Hunk is embedded at its position.
        let start = s.hunks[0].start_line.unwrap();
        assert_eq!(s.lines[start].style, LineStyle::HunkHeader);
        // Trailing file content appears after the hunk.
        let texts: Vec<&str> = s.lines.iter().map(|l| l.text.as_str()).collect();
        assert!(texts.contains(&" mid"));
        assert!(texts.contains(&" last"));
    }

    #[test]
    fn full_file_side_by_side_reconstructs_old_file() {
        let mut s = full_file_state();
        s.side_by_side = true;
        s.build_lines();

        // Old file had "old one"/"old two" where the new file has "new one".
        let rows: Vec<(&str, &str)> = s
            .lines
            .iter()
            .filter(|l| l.is_content())
            .map(|l| (l.left.text.as_str(), l.right.text.as_str()))
            .collect();
        assert!(rows.contains(&("-old one", "+new one")));
        assert!(rows.contains(&("-old two", "")));
        // Shared tail after the hunk pairs identical context.
        assert!(rows.contains(&(" mid", " mid")));
    }

    #[test]
    fn reconstruct_old_file_without_hunks_copies_new() {
        let s = state(vec![basic_hunk("i", "other.rs")]);
        let new_lines: Vec<String> = vec!["a".into(), "b".into()];
        assert_eq!(
            s.reconstruct_old_file("unrelated.rs", &new_lines),
            new_lines
        );
    }

    #[test]
    fn full_file_unreadable_yields_empty_view() {
        let mut s = state(vec![basic_hunk("i", "a.rs")]);
        s.full_file = true;
        s.full_file_name = Some("a.rs".to_string());
        s.build_lines();
        assert!(s.lines.is_empty());
    }
}
