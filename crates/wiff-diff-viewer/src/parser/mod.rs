//! Unified-diff parsing.

mod unified;

pub use unified::{parse_diff, ParseError};
