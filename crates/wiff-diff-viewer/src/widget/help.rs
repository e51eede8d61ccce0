//! Help overlay: a centered bordered box with the keybinding table,
//! dismissed by any key.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::state::ViewerState;

const BOX_WIDTH: u16 = 60;
const BOX_HEIGHT: u16 = 27;

const HELP_LINES: &[&str] = &[
    "Navigation                    Modes & Display",
    "j/k     scroll up/down        s   side-by-side",
    "d/u     half page down/up     n   line numbers",
    "g/G     top/bottom            w   wrap",
    "^D/^U   half page             e   file explorer",
    "Tab     next file             h   syntax highlight",
    "S-Tab   prev file             b   diff background",
    "                              f   full file view",
    "Hunks & Files                 W   watch mode",
    "]c/[c   next/prev hunk",
    "]f/[f   next/prev file        Search",
    "+/-     more/less context     /   start search",
    "mouse   scroll + tree click   n   next match",
    "dbl-clk copy chunk            N   prev match",
    "right-clk copy chunk          Esc clear search",
    "Yank (copies to clipboard)",
    "y+label yank added lines      File Tree",
    "Y+label yank removed lines    Tab focus tree",
    "p+label yank as patch         Enter select file",
    "o       open in $EDITOR       a   show all files",
    "?       help  q/Esc   quit",
];

pub(super) fn draw_help_overlay(state: &ViewerState, buf: &mut Buffer) {
    let width = BOX_WIDTH.min(state.width);
    let height = BOX_HEIGHT.min(state.height);
    let x = state.width.saturating_sub(width) / 2;
    let y = state.height.saturating_sub(height) / 2;
    let area = Rect::new(x, y, width, height);

    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(state.theme.dim);
    let inner = block.inner(area);
    block.render(area, buf);

    let title = "wiff - keyboard shortcuts";
    let title_x = x + width.saturating_sub(title.len() as u16) / 2;
    if inner.height > 0 {
        buf.set_stringn(
            title_x,
            inner.y,
            title,
            inner.width as usize,
            state
                .theme
                .default_style
                .add_modifier(Modifier::BOLD),
        );
    }

    for (i, line) in HELP_LINES.iter().enumerate() {
        let row = inner.y + 2 + i as u16;
        if row >= inner.y + inner.height {
            break;
        }
        buf.set_stringn(
            inner.x + 1,
            row,
            line,
            inner.width.saturating_sub(2) as usize,
            state.theme.default_style,
        );
    }

    let hint = "press any key to close";
    let hint_x = x + width.saturating_sub(hint.len() as u16) / 2;
    let hint_y = y + height.saturating_sub(2);
    if hint_y > inner.y {
        buf.set_stringn(hint_x, hint_y, hint, inner.width as usize, state.theme.dim);
    }
}
