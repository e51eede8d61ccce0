//! Status bar and search input bar.

use ratatui::buffer::Buffer;
use ratatui::style::{Modifier, Style};

use super::Pen;
use crate::state::ViewerState;

/// Bottom row: flash message when active, otherwise the composed status
/// text with right-aligned key hints.
pub(super) fn draw_status_bar(state: &mut ViewerState, buf: &mut Buffer) {
    let y = state.height.saturating_sub(1);
    let width = state.width;

    if let Some(message) = state.active_flash() {
        let mut pen = Pen::new(buf, 0, y, width);
        pen.put_str(&format!(" {message} "), state.theme.flash);
        pen.fill(state.theme.flash);
        return;
    }

    let mut status = if state.pipe_mode {
        format!(" wiff (pipe) • {} hunks", state.hunks.len())
    } else {
        format!(
            " wiff {} • {} files • {} hunks",
            state.ref_display(),
            state.unique_files(),
            state.hunks.len()
        )
    };

    if let Some(filter) = &state.filter_file {
        if !state.full_file {
            status.push_str(&format!(" • viewing: {filter}"));
        }
    }
    if state.tree_focused {
        status.push_str(" [TREE]");
    }
    if !state.pipe_mode && !state.watch_enabled {
        status.push_str(" [watch off]");
    }

    if !state.search.matches.is_empty() && !state.search.query.is_empty() {
        match state.search.idx {
            Some(idx) => status.push_str(&format!(
                " • \"{}\" [{}/{}]",
                state.search.query,
                idx + 1,
                state.search.matches.len()
            )),
            None => status.push_str(&format!(
                " • \"{}\" [{} matches]",
                state.search.query,
                state.search.matches.len()
            )),
        }
    }

    if let Some(pending) = state.pending.display() {
        status.push_str(&format!(" [{pending}…]"));
    }

    let help = if state.tree_focused {
        "j/k:nav enter:select a:all tab:diff esc:back q:quit"
    } else {
        "(s)plit (n)ums (w)rap (e)xpl (h)l (/)search (+/-)ctx (q)uit"
    };
    let status_len = status.chars().count() as i32;
    let pad = width as i32 - status_len - help.chars().count() as i32 - 1;
    if pad > 0 {
        status.push_str(&" ".repeat(pad as usize));
        status.push_str(help);
    }

    let mut pen = Pen::new(buf, 0, y, width);
    pen.put_str(&status, state.theme.status_bar);
    pen.fill(state.theme.status_bar);
}

/// Search input on the row above the status bar: `/query` plus a
/// reverse-video cursor cell.
pub(super) fn draw_search_bar(state: &ViewerState, buf: &mut Buffer) {
    let y = state.height.saturating_sub(2);
    let mut pen = Pen::new(buf, 0, y, state.width);
    pen.put('/', state.theme.file_header);
    pen.put_str(&state.search.query, state.theme.file_header);
    pen.put(' ', Style::default().add_modifier(Modifier::REVERSED));
}
