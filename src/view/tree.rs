//! Path-indexed navigation tree built from the flat tree feed.

use std::collections::BTreeMap;

use crate::api::types::{Entry, ROOT_PATH};

/// One directory or symlink position in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    /// Full path relative to the share root; `.` for the root itself.
    pub path: String,
    pub is_symlink: bool,
    pub symlink_target: Option<String>,
    /// Children keyed by base name; map order is the render order.
    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    /// The root node every tree starts from, named `/` at path `.`.
    pub fn root() -> Self {
        Self {
            name: "/".to_string(),
            path: ROOT_PATH.to_string(),
            is_symlink: false,
            symlink_target: None,
            children: BTreeMap::new(),
        }
    }

    fn placeholder(name: &str, path: String) -> Self {
        Self {
            name: name.to_string(),
            path,
            is_symlink: false,
            symlink_target: None,
            children: BTreeMap::new(),
        }
    }
}

/// Build the navigation tree from the flat entry list of the tree feed.
///
/// Only non-hidden directories and symlinks become nodes; files never do.
/// Ancestors missing from the feed are created as plain placeholders, and an
/// entry whose path names an existing node overwrites that node's symlink
/// fields, so feed order does not change the result and reprocessing an
/// entry is a no-op. Entries with no usable path segments are skipped.
pub fn build(entries: &[Entry]) -> TreeNode {
    let mut root = TreeNode::root();
    for entry in entries {
        if !entry.is_navigable() || entry.is_hidden() {
            continue;
        }
        insert(&mut root, entry);
    }
    root
}

fn insert(root: &mut TreeNode, entry: &Entry) {
    let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return;
    }

    let mut node = root;
    let mut walked = String::new();
    for &seg in &segments {
        if !walked.is_empty() {
            walked.push('/');
        }
        walked.push_str(seg);
        node = node
            .children
            .entry(seg.to_string())
            .or_insert_with(|| TreeNode::placeholder(seg, walked.clone()));
    }
    node.is_symlink = entry.is_symlink;
    node.symlink_target = entry.symlink_target.clone();
}
