//! Frame rendering: diff area, tree sidebar, status bar, search bar,
//! and the help overlay, drawn cell-by-cell into the ratatui buffer.

mod diff;
mod help;
mod status;
mod tree;

use ratatui::buffer::Buffer;
use ratatui::style::Style;
use ratatui::Frame;

use crate::state::ViewerState;

/// Draw one frame of the viewer.
pub fn render(state: &mut ViewerState, frame: &mut Frame) {
    let buf = frame.buffer_mut();
    render_to_buffer(state, buf);
}

/// Buffer-level entry point, split out so rendering is testable without
/// a terminal backend.
pub fn render_to_buffer(state: &mut ViewerState, buf: &mut Buffer) {
    state.update_layout();

    if state.tree_open {
        tree::draw_tree(state, buf);
    }

    diff::draw_diff_area(state, buf);

    if state.search.mode {
        status::draw_search_bar(state, buf);
    }
    status::draw_status_bar(state, buf);

    if state.show_help {
        help::draw_help_overlay(state, buf);
    }
}

/// A clipped left-to-right writer for one buffer row.
pub(crate) struct Pen<'a> {
    buf: &'a mut Buffer,
    x: u16,
    y: u16,
    max_x: u16,
}

impl<'a> Pen<'a> {
    pub(crate) fn new(buf: &'a mut Buffer, x: u16, y: u16, max_x: u16) -> Self {
        // Clip to the buffer so degenerate terminal sizes can't write
        // out of bounds.
        let mut max_x = max_x.min(buf.area.right());
        if y >= buf.area.bottom() {
            max_x = x;
        }
        Self { buf, x, y, max_x }
    }

    pub(crate) fn col(&self) -> u16 {
        self.x
    }

    pub(crate) fn done(&self) -> bool {
        self.x >= self.max_x
    }

    pub(crate) fn put(&mut self, ch: char, style: Style) {
        if self.x < self.max_x {
            self.buf[(self.x, self.y)].set_char(ch).set_style(style);
            self.x += 1;
        }
    }

    pub(crate) fn put_str(&mut self, text: &str, style: Style) {
        for ch in text.chars() {
            if self.done() {
                break;
            }
            self.put(ch, style);
        }
    }

    /// Write spaces up to `end` (clipped to the pen's right edge).
    pub(crate) fn fill_to(&mut self, end: u16, style: Style) {
        while self.x < end && self.x < self.max_x {
            self.put(' ', style);
        }
    }

    pub(crate) fn fill(&mut self, style: Style) {
        let end = self.max_x;
        self.fill_to(end, style);
    }
}
