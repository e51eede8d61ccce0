//! The aggregate viewer state, mutated in place by every input event and
//! fully rebuildable on reload without losing the user's position.

use std::time::{Duration, Instant};

use crate::highlight::Highlighter;
use crate::model::{
    build_tree_nodes, tree_file_nodes, tree_files, Hunk, LabelAlphabet, TreeFile, TreeNode,
    TREE_WIDTH,
};
use crate::state::display::{DisplayLine, LineStyle};
use crate::state::pending::Pending;
use crate::theme::UiTheme;
use crate::traits::{FileContents, NoFileContents};

/// Width of the line-number column: `"1234 "`.
pub const LINE_NO_WIDTH: u16 = 5;

/// Startup options for the viewer, taken from the CLI.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub refs: Vec<String>,
    pub staged: bool,
    pub pipe_mode: bool,
    pub side_by_side: bool,
    pub line_numbers: bool,
    pub wrap: bool,
    pub syntax_highlight: bool,
    pub diff_bg: bool,
    pub context_lines: u32,
    pub tree_open: bool,
    pub theme: String,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            refs: Vec::new(),
            staged: false,
            pipe_mode: false,
            side_by_side: false,
            line_numbers: true,
            wrap: true,
            syntax_highlight: true,
            diff_bg: true,
            context_lines: 3,
            tree_open: false,
            theme: String::new(),
        }
    }
}

/// A transient status-bar message.
#[derive(Debug, Clone)]
pub struct Flash {
    pub message: String,
    pub expires: Instant,
}

/// Search state: query, match lines, and the current match cursor.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// True while the user is typing a query.
    pub mode: bool,
    pub query: String,
    /// Display-line indices that match, in order.
    pub matches: Vec<usize>,
    /// Current match; `None` before any navigation.
    pub idx: Option<usize>,
}

/// The whole mutable state of one viewer session.
pub struct ViewerState {
    pub refs: Vec<String>,
    pub staged: bool,
    pub pipe_mode: bool,

    pub hunks: Vec<Hunk>,
    pub lines: Vec<DisplayLine>,

    pub scroll: usize,
    pub scroll_x: usize,
    pub width: u16,
    pub height: u16,

    pub side_by_side: bool,
    pub line_numbers: bool,
    pub wrap: bool,
    pub syntax_highlight: bool,
    pub diff_bg: bool,
    pub context_lines: u32,

    pub full_file: bool,
    pub full_file_name: Option<String>,

    pub tree_open: bool,
    pub tree_focused: bool,
    pub tree_files: Vec<TreeFile>,
    pub tree_nodes: Vec<TreeNode>,
    pub tree_cursor: usize,
    pub tree_scroll: usize,
    /// When set, inline/side-by-side builds show only this file's hunks.
    pub filter_file: Option<String>,

    pub search: SearchState,
    pub pending: Pending,
    /// Last left-click (time, viewport row) for double-click detection.
    pub last_click: Option<(Instant, u16)>,

    pub watch_enabled: bool,
    pub follow_mode: bool,
    pub show_help: bool,
    pub flash: Option<Flash>,

    // Layout cache, recomputed by `update_layout`.
    pub diff_x: u16,
    pub diff_width: u16,
    pub label_gutter: u16,

    pub theme: UiTheme,
    pub highlighter: Highlighter,
    pub alphabet: LabelAlphabet,
    pub reader: Box<dyn FileContents>,
}

impl ViewerState {
    pub fn new(options: ViewerOptions, reader: Box<dyn FileContents>) -> Self {
        Self {
            refs: options.refs,
            staged: options.staged,
            pipe_mode: options.pipe_mode,
            hunks: Vec::new(),
            lines: Vec::new(),
            scroll: 0,
            scroll_x: 0,
            width: 80,
            height: 24,
            side_by_side: options.side_by_side,
            line_numbers: options.line_numbers,
            wrap: options.wrap,
            syntax_highlight: options.syntax_highlight,
            diff_bg: options.diff_bg,
            context_lines: options.context_lines,
            full_file: false,
            full_file_name: None,
            tree_open: options.tree_open,
            tree_focused: options.tree_open,
            tree_files: Vec::new(),
            tree_nodes: Vec::new(),
            tree_cursor: 0,
            tree_scroll: 0,
            filter_file: None,
            search: SearchState::default(),
            pending: Pending::None,
            last_click: None,
            watch_enabled: !options.pipe_mode,
            follow_mode: false,
            show_help: false,
            flash: None,
            diff_x: 0,
            diff_width: 80,
            label_gutter: 4,
            theme: UiTheme::new(&options.theme),
            highlighter: Highlighter::new(&options.theme),
            alphabet: LabelAlphabet::default(),
            reader,
        }
    }

    /// A state backed by no file reader; used in tests.
    #[doc(hidden)]
    pub fn for_tests(options: ViewerOptions) -> Self {
        Self::new(options, Box::new(NoFileContents))
    }

    /// Install a freshly parsed hunk list and rebuild everything derived
    /// from it.
    pub fn load_hunks(&mut self, hunks: Vec<Hunk>) {
        self.hunks = hunks;
        self.rebuild_tree();
        self.build_lines();
        self.clamp_scroll();
    }

    /// Recompute the tree sidebar model from the current hunks.
    pub fn rebuild_tree(&mut self) {
        self.tree_files = tree_files(&self.hunks);
        self.tree_nodes = build_tree_nodes(&self.tree_files);
    }

    // === Layout ===

    /// Compute the diff area position and width from the tree state.
    pub fn update_layout(&mut self) {
        if self.tree_open {
            self.diff_x = TREE_WIDTH + 1; // +1 for the divider
            self.diff_width = self.width.saturating_sub(TREE_WIDTH + 1).max(1);
        } else {
            self.diff_x = 0;
            self.diff_width = self.width.max(1);
        }
    }

    /// Characters used by the widest label; at least 1 so the gutter is
    /// never zero-width.
    pub fn max_label_width(&self) -> u16 {
        self.hunks
            .iter()
            .map(|h| h.label.chars().count() as u16)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Label gutter width: widest label plus the `" │ "` separator.
    pub fn compute_label_gutter(&mut self) {
        self.label_gutter = self.max_label_width() + 3;
    }

    // === Scrolling ===

    pub fn max_scroll(&self) -> usize {
        let visible = self.height.saturating_sub(1) as usize;
        self.lines.len().saturating_sub(visible)
    }

    pub fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll = self.scroll.saturating_add_signed(delta);
        self.clamp_scroll();
    }

    pub fn scroll_to(&mut self, pos: usize) {
        self.scroll = pos;
        self.clamp_scroll();
    }

    // === Hunk lookup ===

    pub fn hunk_index_by_label(&self, label: &str) -> Option<usize> {
        self.hunks.iter().position(|h| h.label == label)
    }

    /// Current hunk labels in hunk order, for pending-label resolution.
    pub fn labels(&self) -> Vec<&str> {
        self.hunks.iter().map(|h| h.label.as_str()).collect()
    }

    /// Index of the hunk at the current scroll position: the last hunk
    /// whose header is at or above the scroll, else the first visible
    /// hunk, else 0.
    pub fn current_hunk_index(&self) -> usize {
        for (i, hunk) in self.hunks.iter().enumerate().rev() {
            if let Some(start) = hunk.start_line {
                if start <= self.scroll {
                    return i;
                }
            }
        }
        self.hunks
            .iter()
            .position(|h| h.start_line.is_some())
            .unwrap_or(0)
    }

    /// File at the current scroll position, found by walking backward to
    /// the nearest file header; falls back to the current hunk's file.
    pub fn current_file(&self) -> Option<String> {
        if !self.lines.is_empty() {
            let top = self.scroll.min(self.lines.len() - 1);
            for i in (0..=top).rev() {
                if self.lines[i].style == LineStyle::FileHeader {
                    return Some(self.lines[i].text.clone());
                }
            }
        }
        self.hunks
            .get(self.current_hunk_index())
            .map(|h| h.file.clone())
    }

    /// New-file line number near the scroll position, for opening an
    /// editor at the right line.
    pub fn current_line_no(&self) -> u32 {
        for i in self.scroll..self.lines.len().min(self.scroll + 5) {
            if let Some(no) = self.lines[i].new_line_no {
                return no;
            }
            // Side-by-side rows carry numbers in the right half.
            if let Some(no) = self.lines[i].right.line_no {
                return no;
            }
        }
        self.hunks
            .get(self.current_hunk_index())
            .map(|h| h.new_start)
            .unwrap_or(1)
    }

    // === Hunk / file navigation ===

    pub fn jump_to_next_hunk(&mut self) {
        let idx = self.current_hunk_index();
        for i in idx + 1..self.hunks.len() {
            if let Some(start) = self.hunks[i].start_line {
                self.scroll_to(start);
                return;
            }
        }
    }

    pub fn jump_to_prev_hunk(&mut self) {
        if self.hunks.is_empty() {
            return;
        }
        let idx = self.current_hunk_index();
        for i in (0..idx).rev() {
            if let Some(start) = self.hunks[i].start_line {
                self.scroll_to(start);
                return;
            }
        }
        if let Some(start) = self.hunks.get(idx).and_then(|h| h.start_line) {
            self.scroll_to(start);
        }
    }

    pub fn jump_to_next_file(&mut self) {
        if self.hunks.is_empty() {
            return;
        }
        let current = self.hunks[self.current_hunk_index()].file.clone();
        for i in self.current_hunk_index() + 1..self.hunks.len() {
            if self.hunks[i].file != current {
                if let Some(start) = self.hunks[i].start_line {
                    self.scroll_to(start);
                    return;
                }
            }
        }
    }

    pub fn jump_to_prev_file(&mut self) {
        if self.hunks.is_empty() {
            return;
        }
        let idx = self.current_hunk_index();
        let current = self.hunks[idx].file.clone();

        let mut target = None;
        for i in (0..idx).rev() {
            if self.hunks[i].file != current && self.hunks[i].start_line.is_some() {
                target = Some(self.hunks[i].file.clone());
                break;
            }
        }

        let Some(target) = target else {
            if let Some(start) = self.hunks.get(idx).and_then(|h| h.start_line) {
                self.scroll_to(start);
            }
            return;
        };

        for i in 0..self.hunks.len() {
            if self.hunks[i].file == target {
                if let Some(start) = self.hunks[i].start_line {
                    self.scroll_to(start);
                    return;
                }
            }
        }
    }

    // === Files ===

    pub fn unique_files(&self) -> usize {
        let mut seen: Vec<&str> = Vec::new();
        for hunk in &self.hunks {
            if !seen.contains(&hunk.file.as_str()) {
                seen.push(&hunk.file);
            }
        }
        seen.len()
    }

    /// File names in the order they appear in the hunk list.
    pub fn ordered_files(&self) -> Vec<String> {
        let mut files: Vec<String> = Vec::new();
        for hunk in &self.hunks {
            if !files.contains(&hunk.file) {
                files.push(hunk.file.clone());
            }
        }
        files
    }

    // === Full-file view ===

    pub fn switch_full_file(&mut self, filename: String) {
        self.filter_file = Some(filename.clone());
        self.full_file_name = Some(filename);
        self.scroll = 0;
        self.build_lines();
        self.clamp_scroll();
    }

    pub fn next_full_file(&mut self) {
        let files = self.ordered_files();
        let Some(current) = self.full_file_name.clone() else {
            return;
        };
        if let Some(pos) = files.iter().position(|f| *f == current) {
            if pos + 1 < files.len() {
                self.switch_full_file(files[pos + 1].clone());
            }
        }
    }

    pub fn prev_full_file(&mut self) {
        let files = self.ordered_files();
        let Some(current) = self.full_file_name.clone() else {
            return;
        };
        if let Some(pos) = files.iter().position(|f| *f == current) {
            if pos > 0 {
                self.switch_full_file(files[pos - 1].clone());
            }
        }
    }

    // === Tree cursor ===

    pub fn clamp_tree_cursor(&mut self) {
        let file_count = tree_file_nodes(&self.tree_nodes).len();
        if file_count == 0 {
            self.tree_cursor = 0;
        } else {
            self.tree_cursor = self.tree_cursor.min(file_count - 1);
        }
    }

    /// File path at the current tree cursor.
    pub fn tree_cursor_path(&mut self) -> Option<String> {
        let file_indices = tree_file_nodes(&self.tree_nodes);
        if file_indices.is_empty() {
            return None;
        }
        self.clamp_tree_cursor();
        self.tree_nodes[file_indices[self.tree_cursor]].path.clone()
    }

    /// Node index for the current tree cursor.
    pub fn tree_cursor_node_index(&mut self) -> Option<usize> {
        let file_indices = tree_file_nodes(&self.tree_nodes);
        if file_indices.is_empty() {
            return None;
        }
        self.clamp_tree_cursor();
        Some(file_indices[self.tree_cursor])
    }

    /// Point the tree cursor at the file currently visible in the diff.
    pub fn init_tree_cursor_from_scroll(&mut self) {
        let Some(current) = self.current_file() else {
            self.tree_cursor = 0;
            return;
        };
        let file_indices = tree_file_nodes(&self.tree_nodes);
        for (ci, ni) in file_indices.iter().enumerate() {
            if self.tree_nodes[*ni].path.as_deref() == Some(current.as_str()) {
                self.tree_cursor = ci;
                return;
            }
        }
        self.tree_cursor = 0;
    }

    /// Rows available for tree nodes (header + separator + status bar
    /// are reserved).
    pub fn tree_visible_rows(&self) -> usize {
        self.height.saturating_sub(3) as usize
    }

    pub fn clamp_tree_scroll(&mut self) {
        let visible = self.tree_visible_rows();
        let max = self.tree_nodes.len().saturating_sub(visible);
        self.tree_scroll = self.tree_scroll.min(max);
    }

    pub fn ensure_tree_cursor_visible(&mut self) {
        let Some(node_idx) = self.tree_cursor_node_index() else {
            return;
        };
        let visible = self.tree_visible_rows().max(1);
        if node_idx < self.tree_scroll {
            self.tree_scroll = node_idx;
        } else if node_idx >= self.tree_scroll + visible {
            self.tree_scroll = node_idx + 1 - visible;
        }
        self.clamp_tree_scroll();
    }

    // === Status bar pieces ===

    /// Display-friendly version of the comparison refs.
    pub fn ref_display(&self) -> String {
        if self.staged {
            if self.refs.is_empty() {
                return "staged".to_string();
            }
            return format!("{} (staged)", self.refs.join(".."));
        }
        if self.refs.is_empty() {
            return "unstaged".to_string();
        }
        self.refs.join("..")
    }

    pub fn show_flash(&mut self, message: impl Into<String>, duration: Duration) {
        self.flash = Some(Flash {
            message: message.into(),
            expires: Instant::now() + duration,
        });
    }

    /// The flash message if it hasn't expired; clears it otherwise.
    pub fn active_flash(&mut self) -> Option<String> {
        match &self.flash {
            Some(flash) if Instant::now() < flash.expires => Some(flash.message.clone()),
            Some(_) => {
                self.flash = None;
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiffLine;

    fn hunk(label: &str, file: &str, old_start: u32, new_start: u32) -> Hunk {
        Hunk {
            label: label.to_string(),
            file: file.to_string(),
            raw_header: format!("@@ -{old_start},2 +{new_start},2 @@"),
            comment: String::new(),
            old_start,
            new_start,
            lines: vec![
                DiffLine::context("shared"),
                DiffLine::removed("before"),
                DiffLine::added("after"),
            ],
            start_line: None,
            staged: false,
        }
    }

    fn state_with_hunks(hunks: Vec<Hunk>) -> ViewerState {
        let mut state = ViewerState::for_tests(ViewerOptions::default());
        state.width = 100;
        state.height = 30;
        state.load_hunks(hunks);
        state
    }

    #[test]
    fn load_assigns_start_lines_and_tree() {
        let state = state_with_hunks(vec![
            hunk("i", "a/b.go", 1, 1),
            hunk("l", "a/b.go", 10, 10),
            hunk("m", "docs/n.txt", 1, 1),
        ]);
        assert_eq!(state.unique_files(), 2);
        assert_eq!(state.tree_files.len(), 2);
        for h in &state.hunks {
            let start = h.start_line.expect("visible hunk has a start line");
            assert_eq!(state.lines[start].style, LineStyle::HunkHeader);
            assert_eq!(state.lines[start].label.as_deref(), Some(h.label.as_str()));
        }
    }

    #[test]
    fn scroll_clamps_to_line_count() {
        let mut state = state_with_hunks(vec![hunk("i", "f.rs", 1, 1)]);
        state.scroll_to(10_000);
        assert_eq!(state.scroll, state.max_scroll());
        state.scroll_by(-20_000);
        assert_eq!(state.scroll, 0);
    }

    #[test]
    fn current_hunk_tracks_scroll() {
        let mut state = state_with_hunks(vec![
            hunk("i", "a.rs", 1, 1),
            hunk("l", "a.rs", 20, 20),
            hunk("m", "b.rs", 1, 1),
        ]);
        state.height = 4; // keep every header reachable by scrolling
        assert_eq!(state.current_hunk_index(), 0);
        state.scroll_to(state.hunks[2].start_line.unwrap());
        assert_eq!(state.current_hunk_index(), 2);
        assert_eq!(state.current_file().as_deref(), Some("b.rs"));
    }

    #[test]
    fn jump_navigation_moves_between_hunks_and_files() {
        let mut state = state_with_hunks(vec![
            hunk("i", "a.rs", 1, 1),
            hunk("l", "a.rs", 20, 20),
            hunk("m", "b.rs", 1, 1),
        ]);
        state.height = 4;
        state.jump_to_next_hunk();
        assert_eq!(state.scroll, state.hunks[1].start_line.unwrap());
        state.jump_to_next_file();
        assert_eq!(state.scroll, state.hunks[2].start_line.unwrap());
        state.jump_to_prev_file();
        assert_eq!(state.scroll, state.hunks[0].start_line.unwrap());
    }

    #[test]
    fn tree_cursor_clamps_into_file_range() {
        let mut state = state_with_hunks(vec![
            hunk("i", "a.rs", 1, 1),
            hunk("l", "b.rs", 1, 1),
            hunk("m", "c.rs", 1, 1),
        ]);
        state.tree_cursor = 100;
        state.clamp_tree_cursor();
        assert_eq!(state.tree_cursor, 2);
        state.tree_cursor = 0;
        state.clamp_tree_cursor();
        assert_eq!(state.tree_cursor, 0);
    }

    #[test]
    fn ref_display_variants() {
        let mut state = ViewerState::for_tests(ViewerOptions::default());
        assert_eq!(state.ref_display(), "unstaged");
        state.staged = true;
        assert_eq!(state.ref_display(), "staged");
        state.staged = false;
        state.refs = vec!["main".into(), "feature".into()];
        assert_eq!(state.ref_display(), "main..feature");
        state.staged = true;
        assert_eq!(state.ref_display(), "main..feature (staged)");
    }

    #[test]
    fn flash_expires() {
        let mut state = ViewerState::for_tests(ViewerOptions::default());
        state.show_flash("hello", Duration::from_secs(2));
        assert_eq!(state.active_flash().as_deref(), Some("hello"));
        state.flash = Some(Flash {
            message: "old".into(),
            expires: Instant::now() - Duration::from_millis(1),
        });
        assert_eq!(state.active_flash(), None);
        assert!(state.flash.is_none());
    }

    #[test]
    fn current_line_no_prefers_nearby_rows() {
        let mut state = state_with_hunks(vec![hunk("i", "a.rs", 5, 7)]);
        let start = state.hunks[0].start_line.unwrap();
        state.scroll_to(start);
        // First row with a new-file number below the header is the
        // context line at new_start.
        assert_eq!(state.current_line_no(), 7);
    }
}
