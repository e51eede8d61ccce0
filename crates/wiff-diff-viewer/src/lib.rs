//! # wiff-diff-viewer
//!
//! The interactive viewing engine behind the `wiff` terminal diff
//! viewer: the diff model with stable hunk labels, the display-line
//! builders (inline, side-by-side, full-file, wrapping), search, the
//! pending multi-key input machine, and the widgets that draw it all.
//!
//! ## Design
//!
//! The crate is instrumented rather than effectful. Input dispatch
//! mutates [`ViewerState`] and returns [`Effect`] values; the
//! orchestrating application executes them against the clipboard, git,
//! the editor, and timers. File content for the full-file view arrives
//! through the [`traits::FileContents`] trait. This keeps every piece
//! testable without a terminal or a repository.

pub mod highlight;
pub mod input;
pub mod model;
pub mod parser;
pub mod state;
pub mod theme;
pub mod traits;
pub mod widget;

pub use highlight::{Highlighter, StyledSpan};
pub use input::{
    handle_key, handle_mouse, resolve_pending_label, Effect, DOUBLE_CLICK_WINDOW, LABEL_TIMEOUT,
};
pub use model::{DiffLine, Hunk, LabelAlphabet, LineOp, TreeFile, TreeNode};
pub use parser::{parse_diff, ParseError};
pub use state::{DisplayLine, HalfLine, LineStyle, Pending, ViewerOptions, ViewerState};
pub use theme::{theme_names, UiTheme, DEFAULT_THEME};
pub use traits::{FileContents, FileSource, NoFileContents};
