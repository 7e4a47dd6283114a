use super::Tree;
use crate::libs::phylo::node::NodeId;

pub fn get_path_from_root(tree: &Tree, id: &NodeId) -> Result<Vec<NodeId>, String> {
    let mut path = Vec::new();
    let mut current = *id;

    if tree.get_node(current).is_none() {
        return Err(format!("Node {} not found", current));
    }

    loop {
        path.push(current);
        match tree.nodes[current].parent {
            Some(p) => current = p,
            None => break,
        }
    }

    path.reverse();
    // Validate root
    if let Some(root) = tree.root {
        if path[0] != root {
            return Err("Node is detached from root".to_string());
        }
    }

    Ok(path)
}

/// Get node ID by name. Returns first match.
pub fn get_node_by_name(tree: &Tree, name: &str) -> Option<NodeId> {
    tree.nodes
        .iter()
        .find(|n| n.name.as_deref() == Some(name))
        .map(|n| n.id)
}

/// Leaves reachable from the root, in preorder.
pub fn get_leaves(tree: &Tree) -> Vec<NodeId> {
    match tree.root {
        Some(root) => super::traversal::preorder(tree, root)
            .into_iter()
            .filter(|&id| tree.nodes[id].is_leaf())
            .collect(),
        None => Vec::new(),
    }
}

/// Branch lengths of all non-root nodes reachable from the root, sorted ascending.
pub fn branch_lengths(tree: &Tree) -> Vec<f64> {
    let root = match tree.root {
        Some(root) => root,
        None => return Vec::new(),
    };

    let mut lengths: Vec<f64> = super::traversal::preorder(tree, root)
        .into_iter()
        .filter(|&id| id != root)
        .filter_map(|id| tree.nodes[id].length)
        .collect();
    lengths.sort_by(|a, b| a.total_cmp(b));
    lengths
}
