//! Tree sidebar: header, node rows with per-file stats, and the
//! vertical divider.

use ratatui::buffer::Buffer;
use ratatui::style::{Modifier, Style};

use super::Pen;
use crate::model::{TreeNode, TREE_WIDTH};
use crate::state::ViewerState;

pub(super) fn draw_tree(state: &mut ViewerState, buf: &mut Buffer) {
    state.clamp_tree_scroll();
    let current_file = state.current_file();
    let cursor_node = if state.tree_focused {
        state.tree_cursor_node_index()
    } else {
        None
    };

    let focused = state.tree_focused;
    let theme = &state.theme;

    let border_style = if focused {
        Style::default().fg(theme.accent)
    } else {
        theme.dim
    };
    let header_style = if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        theme.file_header
    };

    let tree_width = TREE_WIDTH.min(state.width);

    // Header row and separator.
    let mut pen = Pen::new(buf, 0, 0, tree_width);
    pen.put_str(&format!(" Files ({})", state.tree_files.len()), header_style);
    pen.fill(theme.default_style);
    if state.height > 1 {
        let mut pen = Pen::new(buf, 0, 1, tree_width);
        while !pen.done() {
            pen.put('─', border_style);
        }
    }

    // Node rows.
    let visible = state.tree_visible_rows();
    for row in 0..visible {
        let y = row as u16 + 2;
        if y + 1 >= state.height {
            break;
        }
        let node_idx = state.tree_scroll + row;
        let Some(node) = state.tree_nodes.get(node_idx) else {
            continue;
        };
        let is_cursor = cursor_node == Some(node_idx);
        let is_active = !node.is_dir && node.path.as_deref() == current_file.as_deref();
        let is_filtered = !node.is_dir
            && node.path.is_some()
            && node.path.as_deref() == state.filter_file.as_deref();
        draw_node(state, buf, y, node, is_cursor && focused, is_active, is_filtered);
    }

    // Vertical divider between tree and diff.
    if TREE_WIDTH < state.width {
        for y in 0..state.height.saturating_sub(1) {
            buf[(TREE_WIDTH, y)].set_char('│').set_style(border_style);
        }
    }
}

fn draw_node(
    state: &ViewerState,
    buf: &mut Buffer,
    y: u16,
    node: &TreeNode,
    is_cursor: bool,
    is_active: bool,
    is_filtered: bool,
) {
    let theme = &state.theme;
    let row_bg = if is_cursor {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        theme.default_style
    };

    let tree_width = TREE_WIDTH.min(state.width);
    let mut pen = Pen::new(buf, 0, y, tree_width);

    // Indicator column: filter marker beats current-file marker.
    if is_filtered {
        pen.put('*', row_bg.fg(theme.highlight).add_modifier(Modifier::BOLD));
    } else if is_active && !node.is_dir {
        pen.put('▸', row_bg.fg(theme.highlight));
    } else {
        pen.put(' ', row_bg);
    }

    for _ in 0..node.depth * 2 {
        pen.put(' ', row_bg);
    }

    if node.is_dir {
        pen.put_str(&node.display, row_bg.fg(theme.accent));
        pen.fill(row_bg);
        return;
    }

    let add_str = format!("+{}", node.added);
    let rem_str = format!("-{}", node.removed);
    let stats_len = (add_str.len() + 1 + rem_str.len()) as u16;

    let name_style = if is_filtered {
        row_bg.fg(theme.highlight).add_modifier(Modifier::BOLD)
    } else if is_active {
        row_bg.add_modifier(Modifier::BOLD)
    } else {
        row_bg
    };

    // Truncate long names from the left so the basename stays visible.
    let max_name = TREE_WIDTH
        .saturating_sub(stats_len + pen.col() + 1)
        .max(4) as usize;
    let name_chars: Vec<char> = node.display.chars().collect();
    if name_chars.len() > max_name {
        let tail: String = name_chars[name_chars.len() - (max_name - 1)..].iter().collect();
        pen.put_str(&format!("…{tail}"), name_style);
    } else {
        pen.put_str(&node.display, name_style);
    }

    let stats_start = TREE_WIDTH.saturating_sub(stats_len + 1);
    pen.fill_to(stats_start, row_bg);
    pen.put_str(&add_str, row_bg.fg(theme.added));
    pen.put(' ', row_bg);
    pen.put_str(&rem_str, row_bg.fg(theme.removed));
    pen.fill(row_bg);
}

/// Row → tree node resolution used by mouse handling lives in the input
/// module; this helper keeps the two in sync for tests.
#[cfg(test)]
pub(crate) fn node_at_row(state: &ViewerState, row: u16) -> Option<usize> {
    if row < 2 {
        return None;
    }
    let idx = state.tree_scroll + row as usize - 2;
    (idx < state.tree_nodes.len()).then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiffLine, Hunk};
    use crate::state::ViewerOptions;
    use ratatui::layout::Rect;

    fn hunk(label: &str, file: &str) -> Hunk {
        Hunk {
            label: label.to_string(),
            file: file.to_string(),
            raw_header: String::new(),
            comment: String::new(),
            old_start: 1,
            new_start: 1,
            lines: vec![DiffLine::added("x")],
            start_line: None,
            staged: false,
        }
    }

    #[test]
    fn tree_renders_header_and_nodes() {
        let mut state = ViewerState::for_tests(ViewerOptions {
            tree_open: true,
            ..ViewerOptions::default()
        });
        state.width = 100;
        state.height = 20;
        state.load_hunks(vec![hunk("i", "src/a.rs"), hunk("l", "src/b.rs")]);

        let mut buf = Buffer::empty(Rect::new(0, 0, 100, 20));
        draw_tree(&mut state, &mut buf);

        let header: String = (0..12).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(header.contains("Files (2)"));
        // Row 2 is the collapsed src/ directory.
        let row2: String = (0..10).map(|x| buf[(x, 2)].symbol().to_string()).collect();
        assert!(row2.contains("src/"));
    }

    #[test]
    fn node_row_resolution_skips_header_rows() {
        let mut state = ViewerState::for_tests(ViewerOptions::default());
        state.load_hunks(vec![hunk("i", "a.rs")]);
        assert_eq!(node_at_row(&state, 0), None);
        assert_eq!(node_at_row(&state, 1), None);
        assert_eq!(node_at_row(&state, 2), Some(0));
        assert_eq!(node_at_row(&state, 3), None);
    }
}
