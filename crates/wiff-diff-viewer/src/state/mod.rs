//! Viewer state: display lines, search, pending input, and the
//! aggregate [`ViewerState`].

mod display;
mod lines;
mod pending;
mod search;
mod viewer_state;

pub use display::{DisplayLine, HalfLine, LineStyle};
pub use pending::{resolve_timeout, step, BracketDir, LabelCmd, Pending, StepOutcome};
pub use viewer_state::{Flash, SearchState, ViewerOptions, ViewerState, LINE_NO_WIDTH};
