//! Data model: hunks, labels, and the file tree.

mod diff;
mod labels;
mod tree;

pub use diff::{DiffLine, Hunk, LineOp};
pub use labels::{KeyBinding, LabelAlphabet, KEY_BINDINGS};
pub use tree::{build_tree_nodes, tree_file_nodes, tree_files, TreeFile, TreeNode, TREE_WIDTH};
