//! Key and mouse dispatch.
//!
//! Routing priority: help overlay, then search mode, then tree focus,
//! then pending multi-key resolution, then fresh commands. Dispatch
//! mutates the viewer state directly and returns [`Effect`] values for
//! everything that touches the outside world (clipboard, git, editor,
//! timers), which the orchestrating binary executes.

use std::time::{Duration, Instant};

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::model::{tree_file_nodes, TREE_WIDTH};
use crate::state::{
    resolve_timeout, step, BracketDir, DisplayLine, LabelCmd, LineStyle, Pending, StepOutcome,
    ViewerState, LINE_NO_WIDTH,
};

/// How long an ambiguous pending label waits before auto-resolving.
pub const LABEL_TIMEOUT: Duration = Duration::from_millis(500);

/// Two clicks on the same row within this window count as a double-click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// An external action requested by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    /// Re-run the diff source and rebuild (context-line change).
    Reload,
    /// Write to the clipboard; flash `success` or `failure`.
    CopyText {
        text: String,
        success: String,
        failure: String,
    },
    /// Stage or unstage the hunk via the VCS.
    StageHunk { hunk_idx: usize },
    /// Suspend the UI and open the editor.
    OpenEditor { file: String, line: Option<u32> },
    /// (Re)arm the pending-label ambiguity timer.
    ArmLabelTimer,
    CancelLabelTimer,
}

/// Process one key event.
pub fn handle_key(state: &mut ViewerState, key: KeyEvent) -> Vec<Effect> {
    // Any key dismisses the help overlay.
    if state.show_help {
        state.show_help = false;
        return Vec::new();
    }

    if state.search.mode {
        handle_search_key(state, key);
        return Vec::new();
    }

    if state.tree_focused {
        return handle_tree_key(state, key);
    }

    if !state.pending.is_none() {
        return handle_pending_key(state, key);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('d') => state.scroll_by(state.height as isize / 2),
            KeyCode::Char('u') => state.scroll_by(-(state.height as isize) / 2),
            _ => {}
        }
        return Vec::new();
    }

    match key.code {
        KeyCode::Esc => {
            if !state.search.matches.is_empty() {
                state.clear_search();
                return Vec::new();
            }
            return vec![Effect::Quit];
        }
        KeyCode::Tab => {
            if state.tree_open {
                state.tree_focused = true;
                state.init_tree_cursor_from_scroll();
                state.ensure_tree_cursor_visible();
            } else if state.full_file {
                state.next_full_file();
            } else {
                state.jump_to_next_file();
            }
        }
        KeyCode::BackTab => {
            if state.full_file {
                state.prev_full_file();
            } else {
                state.jump_to_prev_file();
            }
        }
        KeyCode::Up => state.scroll_by(-1),
        KeyCode::Down => state.scroll_by(1),
        KeyCode::Left => {
            if !state.wrap || state.side_by_side {
                state.scroll_x = state.scroll_x.saturating_sub(4);
            }
        }
        KeyCode::Right => {
            if !state.wrap || state.side_by_side {
                state.scroll_x += 4;
            }
        }
        KeyCode::Char(c) => return handle_fresh_char(state, c),
        _ => {}
    }
    Vec::new()
}

fn handle_fresh_char(state: &mut ViewerState, c: char) -> Vec<Effect> {
    match c {
        'q' => return vec![Effect::Quit],
        'j' => state.scroll_by(1),
        'k' => state.scroll_by(-1),
        'd' => state.scroll_by(state.height as isize / 2),
        'u' => state.scroll_by(-(state.height as isize) / 2),
        'g' => state.scroll_to(0),
        'G' => state.scroll_to(state.max_scroll()),
        's' => {
            state.side_by_side = !state.side_by_side;
            state.build_lines();
            state.clamp_scroll();
        }
        'n' => {
            if !state.search.matches.is_empty() {
                state.next_match();
            } else {
                state.line_numbers = !state.line_numbers;
                state.build_lines();
                state.clamp_scroll();
            }
        }
        'w' => {
            state.wrap = !state.wrap;
            if state.wrap {
                state.scroll_x = 0;
            }
            state.build_lines();
            state.clamp_scroll();
        }
        'e' => {
            state.tree_open = !state.tree_open;
            if !state.tree_open {
                state.tree_focused = false;
            }
            state.build_lines();
            state.clamp_scroll();
        }
        'h' => state.syntax_highlight = !state.syntax_highlight,
        'b' => state.diff_bg = !state.diff_bg,
        '+' | '=' => {
            if !state.pipe_mode {
                state.context_lines += 1;
                return vec![Effect::Reload];
            }
        }
        '-' => {
            if !state.pipe_mode && state.context_lines > 0 {
                state.context_lines -= 1;
                return vec![Effect::Reload];
            }
        }
        '/' => state.start_search(),
        'N' => state.prev_match(),
        'o' => {
            if let Some(file) = state.current_file() {
                let line = state.current_line_no();
                return vec![Effect::OpenEditor {
                    file,
                    line: Some(line),
                }];
            }
        }
        'W' => {
            if !state.pipe_mode {
                state.watch_enabled = !state.watch_enabled;
                let msg = if state.watch_enabled {
                    "Watch mode enabled"
                } else {
                    "Watch mode disabled"
                };
                state.show_flash(msg, Duration::from_secs(2));
            }
        }
        'F' => {
            if !state.pipe_mode {
                state.follow_mode = !state.follow_mode;
                let msg = if state.follow_mode {
                    "Follow mode enabled"
                } else {
                    "Follow mode disabled"
                };
                state.show_flash(msg, Duration::from_secs(2));
            }
        }
        'f' => {
            state.full_file = !state.full_file;
            if state.full_file {
                state.full_file_name = state
                    .filter_file
                    .clone()
                    .or_else(|| state.current_file())
                    .or_else(|| state.hunks.first().map(|h| h.file.clone()));
            }
            state.build_lines();
            state.clamp_scroll();
        }
        '?' => state.show_help = true,
        ']' => state.pending = Pending::Bracket(BracketDir::Next),
        '[' => state.pending = Pending::Bracket(BracketDir::Prev),
        'y' | 'Y' | 'p' | 'c' | 'A' => {
            if let Some(cmd) = LabelCmd::from_key(c) {
                state.pending = Pending::Label {
                    cmd,
                    acc: String::new(),
                };
            }
        }
        _ => {}
    }
    Vec::new()
}

fn handle_search_key(state: &mut ViewerState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.clear_search(),
        KeyCode::Enter => {
            state.update_matches();
            if !state.search.matches.is_empty() {
                state.search.idx = Some(0);
                state.scroll_to(state.search.matches[0]);
            }
            state.end_search();
        }
        KeyCode::Backspace => {
            if state.search.query.pop().is_some() {
                state.update_matches();
            }
        }
        KeyCode::Char(c) => {
            state.search.query.push(c);
            state.update_matches();
        }
        _ => {}
    }
}

fn handle_tree_key(state: &mut ViewerState, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        KeyCode::Esc => {
            // Clear the filter first; a second escape leaves the tree.
            if state.filter_file.is_some() {
                state.filter_file = None;
                state.build_lines();
                state.clamp_scroll();
            } else {
                state.tree_focused = false;
            }
        }
        KeyCode::Tab | KeyCode::BackTab => state.tree_focused = false,
        KeyCode::Enter => tree_select(state),
        KeyCode::Up => tree_move_cursor(state, -1),
        KeyCode::Down => tree_move_cursor(state, 1),
        KeyCode::Char('q') => return vec![Effect::Quit],
        KeyCode::Char('j') => tree_move_cursor(state, 1),
        KeyCode::Char('k') => tree_move_cursor(state, -1),
        KeyCode::Char('a') => {
            if state.filter_file.is_some() {
                state.filter_file = None;
                state.build_lines();
                state.clamp_scroll();
            }
        }
        KeyCode::Char('o') => {
            if let Some(file) = state.tree_cursor_path() {
                return vec![Effect::OpenEditor { file, line: None }];
            }
        }
        KeyCode::Char('e') => {
            state.tree_open = false;
            state.tree_focused = false;
            state.build_lines();
            state.clamp_scroll();
        }
        KeyCode::Char('g') => {
            state.tree_cursor = 0;
            state.ensure_tree_cursor_visible();
        }
        KeyCode::Char('G') => {
            let files = tree_file_nodes(&state.tree_nodes);
            if !files.is_empty() {
                state.tree_cursor = files.len() - 1;
            }
            state.ensure_tree_cursor_visible();
        }
        _ => {}
    }
    Vec::new()
}

fn tree_move_cursor(state: &mut ViewerState, delta: isize) {
    if tree_file_nodes(&state.tree_nodes).is_empty() {
        return;
    }
    state.tree_cursor = state.tree_cursor.saturating_add_signed(delta);
    state.clamp_tree_cursor();
    state.ensure_tree_cursor_visible();
}

/// Enter on a tree file: toggle the file filter, keep full-file mode
/// pointed at the selection.
fn tree_select(state: &mut ViewerState) {
    let Some(path) = state.tree_cursor_path() else {
        return;
    };

    if state.filter_file.as_deref() == Some(path.as_str()) {
        state.filter_file = None;
    } else {
        state.filter_file = Some(path.clone());
    }
    if state.full_file {
        state.full_file_name = state.filter_file.clone().or(Some(path));
    }
    state.build_lines();
    state.scroll = 0;
    state.clamp_scroll();
}

fn handle_pending_key(state: &mut ViewerState, key: KeyEvent) -> Vec<Effect> {
    let KeyCode::Char(c) = key.code else {
        state.pending = Pending::None;
        return vec![Effect::CancelLabelTimer];
    };

    let labels: Vec<String> = state.hunks.iter().map(|h| h.label.clone()).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let (next, outcome) = step(std::mem::take(&mut state.pending), c, &label_refs);
    state.pending = next;

    match outcome {
        StepOutcome::Run { cmd, label } => {
            let mut effects = vec![Effect::CancelLabelTimer];
            effects.extend(run_label_cmd(state, cmd, &label));
            effects
        }
        StepOutcome::Wait => vec![Effect::ArmLabelTimer],
        StepOutcome::JumpHunk(BracketDir::Next) => {
            state.jump_to_next_hunk();
            Vec::new()
        }
        StepOutcome::JumpHunk(BracketDir::Prev) => {
            state.jump_to_prev_hunk();
            Vec::new()
        }
        StepOutcome::JumpFile(dir) => {
            match (state.full_file, dir) {
                (true, BracketDir::Next) => state.next_full_file(),
                (true, BracketDir::Prev) => state.prev_full_file(),
                (false, BracketDir::Next) => state.jump_to_next_file(),
                (false, BracketDir::Prev) => state.jump_to_prev_file(),
            }
            Vec::new()
        }
        StepOutcome::Dismiss => vec![Effect::CancelLabelTimer],
    }
}

/// Resolve the accumulated pending label when the ambiguity timer fires.
pub fn resolve_pending_label(state: &mut ViewerState) -> Vec<Effect> {
    let labels: Vec<String> = state.hunks.iter().map(|h| h.label.clone()).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let resolved = resolve_timeout(&state.pending, &label_refs);
    state.pending = Pending::None;

    match resolved {
        Some((cmd, label)) => run_label_cmd(state, cmd, &label),
        None => Vec::new(),
    }
}

fn run_label_cmd(state: &mut ViewerState, cmd: LabelCmd, label: &str) -> Vec<Effect> {
    let Some(idx) = state.hunk_index_by_label(label) else {
        return Vec::new();
    };

    if cmd == LabelCmd::Stage {
        return vec![Effect::StageHunk { hunk_idx: idx }];
    }

    let hunk = &state.hunks[idx];
    let (text, success) = match cmd {
        LabelCmd::YankAdded => (
            hunk.added_lines(),
            format!("Yanked added lines from hunk {label}"),
        ),
        LabelCmd::YankRemoved => (
            hunk.removed_lines(),
            format!("Yanked removed lines from hunk {label}"),
        ),
        LabelCmd::YankPatch => (hunk.as_patch(), format!("Yanked patch from hunk {label}")),
        LabelCmd::CopyResult => (
            hunk.result_lines(),
            format!("Copied result from hunk {label}"),
        ),
        LabelCmd::Stage => unreachable!(),
    };

    if text.is_empty() {
        return Vec::new();
    }
    vec![Effect::CopyText {
        text,
        success,
        failure: format!("Yank failed for hunk {label}: could not write to terminal"),
    }]
}

/// Process one mouse event.
pub fn handle_mouse(state: &mut ViewerState, ev: MouseEvent) -> Vec<Effect> {
    match ev.kind {
        MouseEventKind::ScrollUp => {
            state.scroll_by(-3);
            Vec::new()
        }
        MouseEventKind::ScrollDown => {
            state.scroll_by(3);
            Vec::new()
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if state.tree_open && ev.column < TREE_WIDTH {
                handle_tree_click(state, ev.row);
                Vec::new()
            } else if ev.row + 1 < state.height {
                handle_diff_click(state, ev.column, ev.row)
            } else {
                Vec::new()
            }
        }
        MouseEventKind::Down(MouseButton::Right) => {
            if (!state.tree_open || ev.column >= TREE_WIDTH) && ev.row + 1 < state.height {
                copy_clicked_chunk(state, ev.column, ev.row)
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// Left click in the tree: resolve the row to a file node and toggle the
/// filter. Row 0 is the header, row 1 the separator.
fn handle_tree_click(state: &mut ViewerState, row: u16) {
    if row < 2 {
        return;
    }
    let node_idx = state.tree_scroll + (row as usize - 2);
    if node_idx >= state.tree_nodes.len() || state.tree_nodes[node_idx].is_dir {
        return;
    }
    let file_indices = tree_file_nodes(&state.tree_nodes);
    if let Some(cursor) = file_indices.iter().position(|&ni| ni == node_idx) {
        state.tree_cursor = cursor;
        tree_select(state);
    }
}

/// Left click in the diff area: a double-click on the same row copies
/// the chunk under it.
fn handle_diff_click(state: &mut ViewerState, x: u16, y: u16) -> Vec<Effect> {
    let now = Instant::now();
    let is_double = state
        .last_click
        .is_some_and(|(at, row)| now.duration_since(at) < DOUBLE_CLICK_WINDOW && row == y);
    state.last_click = Some((now, y));

    if !is_double {
        return Vec::new();
    }
    copy_clicked_chunk(state, x, y)
}

/// Copy the added or removed side of the hunk at viewport row `y`. In
/// side-by-side mode the click's x position against the column midpoint
/// picks the side.
fn copy_clicked_chunk(state: &mut ViewerState, x: u16, y: u16) -> Vec<Effect> {
    let line_idx = state.scroll + y as usize;
    if line_idx >= state.lines.len() {
        return Vec::new();
    }
    let line: &DisplayLine = &state.lines[line_idx];

    if !line.is_content() {
        return Vec::new();
    }
    // A context row only counts when one of its halves carries a change.
    if line.style == LineStyle::Context
        && line.left.style != LineStyle::Added
        && line.left.style != LineStyle::Removed
        && line.right.style != LineStyle::Added
        && line.right.style != LineStyle::Removed
    {
        return Vec::new();
    }

    let Some(hunk_idx) = line.hunk_idx else {
        return Vec::new();
    };
    let Some(hunk) = state.hunks.get(hunk_idx) else {
        return Vec::new();
    };

    let mut want_added = line.style == LineStyle::Added;
    if state.side_by_side {
        let line_no = if state.line_numbers { LINE_NO_WIDTH } else { 0 };
        let col_width = state.diff_width.saturating_sub(state.label_gutter + 1) / 2;
        let midpoint = state.diff_x + state.label_gutter + line_no + col_width;
        want_added = x >= midpoint;
    }

    let (text, kind) = if want_added {
        (hunk.added_lines(), "added")
    } else {
        (hunk.removed_lines(), "removed")
    };
    if text.is_empty() {
        return Vec::new();
    }

    let label = hunk.label.clone();
    vec![Effect::CopyText {
        text,
        success: format!("Copied {kind} lines from hunk {label}"),
        failure: "Copy failed: could not write to terminal".to_string(),
    }]
}
