//! Resolution of the current path to a chain of tree nodes.

use crate::api::types::ROOT_PATH;
use crate::view::tree::TreeNode;

/// Resolve `path` to the chain of nodes from the root down to it.
///
/// The chain is what a front end marks active and keeps expanded. The root
/// sentinel resolves to the root alone; a path with any unknown segment
/// (stale tree, concurrent delete) resolves to `None` and the caller shows
/// no highlight.
pub fn resolve<'a>(root: &'a TreeNode, path: &str) -> Option<Vec<&'a TreeNode>> {
    if path == ROOT_PATH {
        return Some(vec![root]);
    }

    let mut trail = vec![root];
    let mut node = root;
    for seg in path.split('/').filter(|s| !s.is_empty()) {
        node = node.children.get(seg)?;
        trail.push(node);
    }
    Some(trail)
}
