//! File tree model for the sidebar.
//!
//! Builds a rendering-ready flat node list from the changed-file list,
//! collapsing single-child directory chains into one node.

use std::collections::HashMap;

use crate::model::{Hunk, LineOp};

/// Width of the tree sidebar in columns.
pub const TREE_WIDTH: u16 = 30;

/// A changed file with cumulative line stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    pub path: String,
    pub added: usize,
    pub removed: usize,
}

/// A flattened entry for rendering the tree sidebar: either a directory
/// (possibly a collapsed chain like `src/pkg/`) or a file leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Text to display (dir chain with trailing `/`, or file basename).
    pub display: String,
    /// Full file path; `None` for directories.
    pub path: Option<String>,
    /// Indentation depth; a collapsed chain counts as one level.
    pub depth: usize,
    pub is_dir: bool,
    pub added: usize,
    pub removed: usize,
}

/// Derive the ordered changed-file list with per-file add/remove counts
/// by walking all hunks.
pub fn tree_files(hunks: &[Hunk]) -> Vec<TreeFile> {
    let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for hunk in hunks {
        let entry = stats.entry(hunk.file.as_str()).or_insert_with(|| {
            order.push(hunk.file.as_str());
            (0, 0)
        });
        for line in &hunk.lines {
            match line.op {
                LineOp::Add => entry.0 += 1,
                LineOp::Remove => entry.1 += 1,
                LineOp::Context => {}
            }
        }
    }

    order
        .into_iter()
        .map(|path| {
            let (added, removed) = stats[path];
            TreeFile {
                path: path.to_string(),
                added,
                removed,
            }
        })
        .collect()
}

/// Intermediate trie node used while building the hierarchy.
#[derive(Default)]
struct DirNode<'a> {
    children: HashMap<&'a str, DirNode<'a>>,
    order: Vec<&'a str>,
    files: Vec<&'a TreeFile>,
}

impl<'a> DirNode<'a> {
    fn child(&mut self, name: &'a str) -> &mut DirNode<'a> {
        if !self.children.contains_key(name) {
            self.order.push(name);
        }
        self.children.entry(name).or_default()
    }
}

/// Convert the flat file list into a hierarchical node list, collapsing
/// single-child directory chains.
pub fn build_tree_nodes(files: &[TreeFile]) -> Vec<TreeNode> {
    if files.is_empty() {
        return Vec::new();
    }

    let mut root = DirNode::default();
    for file in files {
        let mut node = &mut root;
        let parts: Vec<&str> = file.path.split('/').collect();
        for part in &parts[..parts.len() - 1] {
            node = node.child(part);
        }
        node.files.push(file);
    }

    let mut nodes = Vec::new();
    flatten(&root, 0, &mut nodes);
    nodes
}

fn flatten(node: &DirNode, depth: usize, out: &mut Vec<TreeNode>) {
    // Directories first, alphabetically; then files by basename.
    let mut dir_keys = node.order.clone();
    dir_keys.sort_unstable();

    let mut files: Vec<&TreeFile> = node.files.clone();
    files.sort_by(|a, b| basename(&a.path).cmp(basename(&b.path)));

    for key in dir_keys {
        let mut child = &node.children[key];
        let mut display = key.to_string();
        // Merge single-child chains with no files into one node.
        while child.children.len() == 1 && child.files.is_empty() {
            let sub_key = child.order[0];
            display.push('/');
            display.push_str(sub_key);
            child = &child.children[sub_key];
        }
        display.push('/');
        out.push(TreeNode {
            display,
            path: None,
            depth,
            is_dir: true,
            added: 0,
            removed: 0,
        });
        flatten(child, depth + 1, out);
    }

    for file in files {
        out.push(TreeNode {
            display: basename(&file.path).to_string(),
            path: Some(file.path.clone()),
            depth,
            is_dir: false,
            added: file.added,
            removed: file.removed,
        });
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Indices of the file (non-directory) nodes.
pub fn tree_file_nodes(nodes: &[TreeNode]) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| !n.is_dir)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, added: usize, removed: usize) -> TreeFile {
        TreeFile {
            path: path.to_string(),
            added,
            removed,
        }
    }

    #[test]
    fn collapses_shared_directory_chain() {
        let files = vec![
            file("src/pkg/a.go", 2, 1),
            file("src/pkg/b.go", 3, 0),
            file("README.md", 1, 0),
        ];
        let nodes = build_tree_nodes(&files);

        let dirs: Vec<_> = nodes.iter().filter(|n| n.is_dir).collect();
        let leaves: Vec<_> = nodes.iter().filter(|n| !n.is_dir).collect();
        assert_eq!(dirs.len(), 1);
        assert_eq!(leaves.len(), 3);

        assert_eq!(nodes[0].display, "src/pkg/");
        assert_eq!(nodes[0].depth, 0);
        assert_eq!(nodes[1].display, "a.go");
        assert_eq!(nodes[1].depth, 1);
        assert_eq!(nodes[2].display, "b.go");
        assert_eq!(nodes[3].display, "README.md");
        assert_eq!(nodes[3].depth, 0);
    }

    #[test]
    fn collapses_single_path() {
        let files = vec![file("a/b/c/file.go", 1, 1)];
        let nodes = build_tree_nodes(&files);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].display, "a/b/c/");
        assert!(nodes[0].is_dir);
        assert_eq!(nodes[1].display, "file.go");
        assert_eq!(nodes[1].path.as_deref(), Some("a/b/c/file.go"));
    }

    #[test]
    fn directories_before_files_both_sorted() {
        let files = vec![
            file("zeta.rs", 0, 0),
            file("alpha.rs", 0, 0),
            file("dir2/x.rs", 0, 0),
            file("dir1/y.rs", 0, 0),
        ];
        let nodes = build_tree_nodes(&files);
        let names: Vec<&str> = nodes.iter().map(|n| n.display.as_str()).collect();
        assert_eq!(names, vec!["dir1/", "y.rs", "dir2/", "x.rs", "alpha.rs", "zeta.rs"]);
    }

    #[test]
    fn does_not_collapse_dir_with_files_and_subdir() {
        let files = vec![file("src/lib.rs", 1, 0), file("src/util/io.rs", 1, 0)];
        let nodes = build_tree_nodes(&files);
        let names: Vec<&str> = nodes.iter().map(|n| n.display.as_str()).collect();
        assert_eq!(names, vec!["src/", "util/", "io.rs", "lib.rs"]);
        assert_eq!(nodes[1].depth, 1);
        assert_eq!(nodes[2].depth, 2);
        assert_eq!(nodes[3].depth, 1);
    }

    #[test]
    fn empty_input_yields_empty_tree() {
        assert!(build_tree_nodes(&[]).is_empty());
    }

    #[test]
    fn file_node_indices_skip_directories() {
        let files = vec![file("src/a.rs", 0, 0), file("top.rs", 0, 0)];
        let nodes = build_tree_nodes(&files);
        let indices = tree_file_nodes(&nodes);
        assert_eq!(indices.len(), 2);
        for i in indices {
            assert!(!nodes[i].is_dir);
        }
    }
}
