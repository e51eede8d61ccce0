//! Diff-area rendering: inline and side-by-side rows with the label
//! gutter, line numbers, syntax highlighting, diff backgrounds, and
//! search-match overlays.

use ratatui::buffer::Buffer;
use ratatui::style::{Modifier, Style};

use super::Pen;
use crate::highlight::Highlighter;
use crate::model::Hunk;
use crate::state::{DisplayLine, LineStyle, ViewerState, LINE_NO_WIDTH};
use crate::theme::UiTheme;

/// Everything row drawing needs, split off the state so the highlighter
/// can be borrowed mutably while the rest is read.
struct RenderCtx<'a> {
    theme: &'a UiTheme,
    highlighter: &'a mut Highlighter,
    hunks: &'a [Hunk],
    wrap: bool,
    side_by_side: bool,
    line_numbers: bool,
    syntax: bool,
    diff_bg: bool,
    scroll_x: usize,
    diff_x: u16,
    diff_width: u16,
    label_gutter: u16,
    max_label: u16,
    query: String,
    have_matches: bool,
}

impl RenderCtx<'_> {
    fn right_edge(&self) -> u16 {
        self.diff_x + self.diff_width
    }

    fn base_style(&self, style: LineStyle) -> Style {
        match style {
            LineStyle::FileHeader => self.theme.file_header,
            LineStyle::HunkHeader => self.theme.hunk_header,
            LineStyle::Added => self.theme.diff_added,
            LineStyle::Removed => self.theme.diff_removed,
            _ => self.theme.default_style,
        }
    }

    fn with_diff_bg(&self, style: Style, line_style: LineStyle) -> Style {
        if !self.diff_bg {
            return style;
        }
        match line_style {
            LineStyle::Added => style.bg(self.theme.bg_added),
            LineStyle::Removed => style.bg(self.theme.bg_removed),
            _ => style,
        }
    }

    fn match_style(&self, base: Style, is_current: bool) -> Style {
        if is_current {
            self.theme.search_current
        } else {
            base.add_modifier(Modifier::REVERSED)
        }
    }

    /// Positions of the query within `text`, as a per-char mask.
    fn search_mask(&self, text: &str) -> Vec<bool> {
        if self.query.is_empty() || !self.have_matches {
            return Vec::new();
        }
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        let query: Vec<char> = self.query.to_lowercase().chars().collect();
        if query.is_empty() || chars.len() < query.len() {
            return Vec::new();
        }
        let mut mask = vec![false; chars.len()];
        for i in 0..=chars.len() - query.len() {
            if chars[i..i + query.len()] == query[..] {
                for flag in &mut mask[i..i + query.len()] {
                    *flag = true;
                }
            }
        }
        mask
    }
}

/// Draw all visible display rows, applying the sticky label once.
pub(super) fn draw_diff_area(state: &mut ViewerState, buf: &mut Buffer) {
    let mut visible = state.height.saturating_sub(1) as usize;
    if state.search.mode {
        // One more row is reserved for the search input.
        visible = visible.saturating_sub(1);
    }

    // Sticky label: when the current hunk's header has scrolled off the
    // top, its first visible content row inherits the label.
    let mut sticky: Option<(String, usize)> = None;
    if !state.hunks.is_empty() {
        let idx = state.current_hunk_index();
        if let Some(hunk) = state.hunks.get(idx) {
            if hunk.start_line.is_some_and(|start| start < state.scroll) {
                sticky = Some((hunk.label.clone(), idx));
            }
        }
    }

    let scroll = state.scroll;
    let current_match_line = state
        .search
        .idx
        .and_then(|i| state.search.matches.get(i))
        .copied();

    let ViewerState {
        ref theme,
        ref mut highlighter,
        ref hunks,
        ref lines,
        ref search,
        wrap,
        side_by_side,
        line_numbers,
        syntax_highlight,
        diff_bg,
        scroll_x,
        diff_x,
        diff_width,
        label_gutter,
        ..
    } = *state;

    let max_label = hunks
        .iter()
        .map(|h| h.label.chars().count() as u16)
        .max()
        .unwrap_or(1)
        .max(1);

    let mut ctx = RenderCtx {
        theme,
        highlighter,
        hunks,
        wrap,
        side_by_side,
        line_numbers,
        syntax: syntax_highlight,
        diff_bg,
        scroll_x,
        diff_x,
        diff_width,
        label_gutter,
        max_label,
        query: search.query.clone(),
        have_matches: !search.matches.is_empty(),
    };

    let mut sticky_used = false;
    for row in 0..visible {
        let Some(line) = lines.get(scroll + row) else {
            break;
        };
        let line_idx = scroll + row;

        let mut line = line.clone();
        if !sticky_used && line.label.is_none() && line.is_content() {
            if let Some((label, hunk_idx)) = &sticky {
                if line.hunk_idx == Some(*hunk_idx) {
                    line.label = Some(label.clone());
                    sticky_used = true;
                }
            }
        }

        let is_current = current_match_line == Some(line_idx);
        if ctx.side_by_side {
            draw_side_by_side_line(&mut ctx, buf, row as u16, &line, is_current);
        } else {
            draw_inline_line(&mut ctx, buf, row as u16, &line, is_current);
        }
    }
}

/// `── filename ────` across the diff area.
fn draw_file_header(ctx: &RenderCtx, buf: &mut Buffer, y: u16, text: &str) {
    let mut pen = Pen::new(buf, ctx.diff_x, y, ctx.right_edge());
    pen.put_str("── ", ctx.theme.dim);
    pen.put_str(text, ctx.theme.file_header);
    pen.put(' ', ctx.theme.dim);
    while !pen.done() {
        pen.put('─', ctx.theme.dim);
    }
}

/// Label gutter: label text padded to the widest label, then `" │ "`.
fn draw_gutter(ctx: &RenderCtx, pen: &mut Pen, line: &DisplayLine) {
    let label = line.label.as_deref().unwrap_or("");
    pen.put_str(label, ctx.theme.label);
    for _ in label.chars().count() as u16..ctx.max_label {
        pen.put(' ', ctx.theme.dim);
    }
    pen.put(' ', ctx.theme.dim);
    pen.put('│', ctx.theme.dim);
    pen.put(' ', ctx.theme.dim);
}

fn draw_line_no(ctx: &RenderCtx, pen: &mut Pen, no: Option<u32>) {
    match no {
        Some(no) => pen.put_str(&format!("{no:>4} "), ctx.theme.line_no),
        None => {
            for _ in 0..LINE_NO_WIDTH {
                pen.put(' ', ctx.theme.default_style);
            }
        }
    }
}

/// Apply horizontal scrolling by dropping leading chars.
fn scrolled(text: &str, offset: usize) -> String {
    if offset == 0 {
        return text.to_string();
    }
    text.chars().skip(offset).collect()
}

fn draw_inline_line(ctx: &mut RenderCtx, buf: &mut Buffer, y: u16, line: &DisplayLine, is_current: bool) {
    if line.style == LineStyle::FileHeader {
        draw_file_header(ctx, buf, y, &line.text);
        return;
    }
    if line.style == LineStyle::Normal {
        return;
    }

    let right_edge = ctx.right_edge();
    let mut pen = Pen::new(buf, ctx.diff_x, y, right_edge);
    draw_gutter(ctx, &mut pen, line);

    if ctx.line_numbers && line.style != LineStyle::HunkHeader {
        let no = if line.style == LineStyle::Removed {
            line.old_line_no
        } else {
            line.new_line_no
        };
        draw_line_no(ctx, &mut pen, no);
    }

    let text = if !ctx.wrap && line.style != LineStyle::HunkHeader {
        scrolled(&line.text, ctx.scroll_x)
    } else {
        line.text.clone()
    };

    let style = ctx.with_diff_bg(ctx.base_style(line.style), line.style);

    if ctx.syntax && line.style != LineStyle::HunkHeader {
        draw_syntax_text(ctx, &mut pen, &text, style, line, line.style, is_current);
    } else {
        draw_plain_text(ctx, &mut pen, &text, style, is_current);
    }

    if ctx.diff_bg {
        let bg = ctx.with_diff_bg(ctx.theme.default_style, line.style);
        pen.fill(bg);
    }
}

/// Plain (non-syntax) text with the search overlay.
fn draw_plain_text(ctx: &RenderCtx, pen: &mut Pen, text: &str, base: Style, is_current: bool) {
    let mask = ctx.search_mask(text);
    for (i, ch) in text.chars().enumerate() {
        if pen.done() {
            break;
        }
        let style = if mask.get(i).copied().unwrap_or(false) {
            ctx.match_style(base, is_current)
        } else {
            base
        };
        pen.put(ch, style);
    }
}

/// Syntax-highlighted content: the op prefix keeps the diff style, the
/// rest is tokenized, with diff-bg and search overlays composed on top.
fn draw_syntax_text(
    ctx: &mut RenderCtx,
    pen: &mut Pen,
    text: &str,
    diff_style: Style,
    line: &DisplayLine,
    row_style: LineStyle,
    is_current: bool,
) {
    let Some(filename) = line.hunk_idx.and_then(|i| ctx.hunks.get(i)).map(|h| h.file.clone())
    else {
        draw_plain_text(ctx, pen, text, diff_style, is_current);
        return;
    };

    let mask = ctx.search_mask(text);
    let dimmed = row_style == LineStyle::Removed && !ctx.diff_bg;

    let mut content = text;
    let mut pos = 0usize;
    // The leading op char is diff-colored, not tokenized.
    let op_visible = !line.continuation && (ctx.wrap || ctx.scroll_x == 0);
    if op_visible {
        let mut chars = text.chars();
        if let Some(op) = chars.next() {
            pen.put(op, diff_style);
            content = chars.as_str();
            pos = 1;
        }
    }

    let spans = ctx.highlighter.highlight(&filename, content);
    for span in spans {
        let mut style = span.style;
        if dimmed {
            style = style.add_modifier(Modifier::DIM);
        }
        style = ctx.with_diff_bg(style, row_style);
        for ch in span.text.chars() {
            if pen.done() {
                return;
            }
            let draw = if mask.get(pos).copied().unwrap_or(false) {
                ctx.match_style(style, is_current)
            } else {
                style
            };
            pen.put(ch, draw);
            pos += 1;
        }
    }
}

fn draw_side_by_side_line(
    ctx: &mut RenderCtx,
    buf: &mut Buffer,
    y: u16,
    line: &DisplayLine,
    is_current: bool,
) {
    match line.style {
        LineStyle::FileHeader => {
            draw_file_header(ctx, buf, y, &line.text);
            return;
        }
        LineStyle::Normal => return,
        _ => {}
    }

    let line_no_extra = if ctx.line_numbers { LINE_NO_WIDTH } else { 0 };
    let col_width = ctx.diff_width.saturating_sub(ctx.label_gutter + 1) / 2;
    let content_width = col_width.saturating_sub(line_no_extra);
    let right_edge = ctx.right_edge();

    let mut pen = Pen::new(buf, ctx.diff_x, y, right_edge);
    draw_gutter(ctx, &mut pen, line);

    if line.style == LineStyle::HunkHeader {
        // Function context mirrored on both columns.
        if ctx.line_numbers {
            draw_line_no(ctx, &mut pen, None);
        }
        let left_end = (ctx.diff_x + ctx.label_gutter + line_no_extra + content_width).min(right_edge);
        for ch in line.text.chars() {
            if pen.col() >= left_end {
                break;
            }
            pen.put(ch, ctx.theme.hunk_header);
        }
        pen.fill_to(left_end, ctx.theme.default_style);
        pen.put('│', ctx.theme.dim);
        if ctx.line_numbers {
            draw_line_no(ctx, &mut pen, None);
        }
        pen.put_str(&line.text, ctx.theme.hunk_header);
        return;
    }

    let left_text = scrolled(&line.left.text, ctx.scroll_x);
    let right_text = scrolled(&line.right.text, ctx.scroll_x);

    // Left half.
    if ctx.line_numbers {
        draw_line_no(ctx, &mut pen, line.left.line_no);
    }
    let left_end = ctx.diff_x + ctx.label_gutter + line_no_extra + content_width;
    draw_half(ctx, &mut pen, &left_text, line, true, content_width, is_current);
    let left_bg = ctx.with_diff_bg(ctx.theme.default_style, line.left.style);
    pen.fill_to(left_end.min(right_edge), left_bg);

    // Divider and right half.
    pen.put('│', ctx.theme.dim);
    if ctx.line_numbers {
        draw_line_no(ctx, &mut pen, line.right.line_no);
    }
    draw_half(ctx, &mut pen, &right_text, line, false, content_width, is_current);
    let right_bg = ctx.with_diff_bg(ctx.theme.default_style, line.right.style);
    pen.fill(right_bg);
}

/// One half of a side-by-side row, clipped to `max_chars`.
#[allow(clippy::too_many_arguments)]
fn draw_half(
    ctx: &mut RenderCtx,
    pen: &mut Pen,
    text: &str,
    line: &DisplayLine,
    is_left: bool,
    max_chars: u16,
    is_current: bool,
) {
    let half_style = if is_left {
        line.left.style
    } else {
        line.right.style
    };
    let mask = ctx.search_mask(text);

    let syntax_file = if ctx.syntax && !text.is_empty() {
        line.hunk_idx.and_then(|i| ctx.hunks.get(i)).map(|h| h.file.clone())
    } else {
        None
    };

    if let Some(filename) = syntax_file {
        let dimmed = !ctx.diff_bg && half_style == LineStyle::Removed;

        let mut drawn = 0u16;
        let mut content = text;
        let mut pos = 0usize;
        if !line.continuation {
            let mut chars = text.chars();
            if let Some(op) = chars.next() {
                let op_style = ctx.with_diff_bg(ctx.base_style(half_style), half_style);
                pen.put(op, op_style);
                drawn = 1;
                content = chars.as_str();
                pos = 1;
            }
        }

        let spans = ctx.highlighter.highlight(&filename, content);
        for span in spans {
            let mut style = span.style;
            if dimmed {
                style = style.add_modifier(Modifier::DIM);
            }
            style = ctx.with_diff_bg(style, half_style);
            for ch in span.text.chars() {
                if drawn >= max_chars || pen.done() {
                    return;
                }
                let draw = if mask.get(pos).copied().unwrap_or(false) {
                    ctx.match_style(style, is_current)
                } else {
                    style
                };
                pen.put(ch, draw);
                drawn += 1;
                pos += 1;
            }
        }
        return;
    }

    let base = ctx.with_diff_bg(ctx.base_style(half_style), half_style);
    let mut drawn = 0u16;
    for (i, ch) in text.chars().enumerate() {
        if drawn >= max_chars || pen.done() {
            break;
        }
        let style = if mask.get(i).copied().unwrap_or(false) {
            ctx.match_style(base, is_current)
        } else {
            base
        };
        pen.put(ch, style);
        drawn += 1;
    }
}
