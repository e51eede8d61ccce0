//! Display-line types: the post-layout, pre-render model of the viewport.

/// Style of one viewport row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Blank spacer row.
    #[default]
    Normal,
    FileHeader,
    HunkHeader,
    Added,
    Removed,
    Context,
}

/// One side of a side-by-side row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalfLine {
    pub text: String,
    pub style: LineStyle,
    pub line_no: Option<u32>,
}

impl HalfLine {
    pub fn new(text: impl Into<String>, style: LineStyle, line_no: u32) -> Self {
        Self {
            text: text.into(),
            style,
            line_no: Some(line_no),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One row of the viewport, pre- or post-wrap. Inline rows use `text`;
/// side-by-side rows use the `left`/`right` halves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayLine {
    pub text: String,
    pub style: LineStyle,
    /// Label shown in the gutter, possibly inherited from a sticky header.
    pub label: Option<String>,
    /// Index into the hunk list; `None` for headers and blank rows.
    pub hunk_idx: Option<usize>,
    pub old_line_no: Option<u32>,
    pub new_line_no: Option<u32>,
    /// This row is a wrap of the previous row; no label or line numbers.
    pub continuation: bool,
    pub left: HalfLine,
    pub right: HalfLine,
}

impl DisplayLine {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn file_header(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: LineStyle::FileHeader,
            ..Self::default()
        }
    }

    pub fn hunk_header(comment: impl Into<String>, label: impl Into<String>, hunk_idx: usize) -> Self {
        Self {
            text: comment.into(),
            style: LineStyle::HunkHeader,
            label: Some(label.into()),
            hunk_idx: Some(hunk_idx),
            ..Self::default()
        }
    }

    /// Whether this row holds diff content (as opposed to a header or a
    /// blank spacer). Only content rows wrap and take search highlights.
    pub fn is_content(&self) -> bool {
        matches!(
            self.style,
            LineStyle::Added | LineStyle::Removed | LineStyle::Context
        )
    }
}
