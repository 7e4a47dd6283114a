use super::Tree;
use crate::libs::phylo::node::NodeId;

/// Add a child to a parent node.
/// Updates both parent's `children` list and child's `parent` field.
pub fn add_child(tree: &mut Tree, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
    // Validation
    if parent_id == child_id {
        return Err("Cannot add node as child of itself".to_string());
    }
    if tree.get_node(parent_id).is_none() {
        return Err(format!("Parent node {} not found", parent_id));
    }
    if tree.get_node(child_id).is_none() {
        return Err(format!("Child node {} not found", child_id));
    }

    // Check if child already has a parent
    if let Some(old_parent) = tree.nodes[child_id].parent {
        return Err(format!(
            "Node {} already has parent {}",
            child_id, old_parent
        ));
    }

    // Link
    tree.nodes[child_id].parent = Some(parent_id);
    tree.nodes[parent_id].children.push(child_id);

    Ok(())
}

/// Reroot the tree at the specified node.
/// This reverses the direction of edges along the path from the old root to the new root.
/// Every node on the path takes over the branch length of its former child on the path.
pub fn reroot_at(tree: &mut Tree, new_root_id: NodeId) -> Result<(), String> {
    if tree.get_node(new_root_id).is_none() {
        return Err(format!("Node {} not found", new_root_id));
    }

    let old_root_id = tree.root.ok_or("Tree has no root")?;
    if old_root_id == new_root_id {
        return Ok(());
    }

    // 1. Get path from old root to new root
    let path = tree.get_path_from_root(&new_root_id)?;

    // 2. Collect edge lengths along the path
    // path[i]'s length represents edge (path[i-1] -> path[i])
    let lengths: Vec<Option<f64>> = path.iter().map(|&id| tree.nodes[id].length).collect();

    // 3. Reverse edges
    for i in (1..path.len()).rev() {
        let child_id = path[i];
        let parent_id = path[i - 1];

        // a. Remove child from parent's children
        tree.nodes[parent_id].children.retain(|&x| x != child_id);

        // b. Add parent to child's children
        tree.nodes[child_id].children.push(parent_id);

        // c. Update parent's parent pointer and length
        tree.nodes[parent_id].parent = Some(child_id);
        tree.nodes[parent_id].length = lengths[i];
    }

    // 4. Finalize new root
    tree.nodes[new_root_id].parent = None;
    tree.nodes[new_root_id].length = None;

    tree.root = Some(new_root_id);

    Ok(())
}

/// Make the ancestral node the child of a synthetic root, so that the
/// likelihood recursion starts from it.
///
/// The ancestor is cut from its parent, the remaining tree is rerooted at that
/// parent, and a new `NEWROOT` node joins both halves. The branch between the
/// ancestor and the new root has length zero; the former parent keeps the
/// ancestor's original branch length. Nothing happens when the ancestor is
/// already the structural root.
pub fn root_at_ancestor(tree: &mut Tree) -> Result<(), String> {
    let ancestor = tree.ancestor.ok_or("Tree has no ancestral node")?;
    let old_root = tree.root.ok_or("Tree has no root")?;
    if ancestor == old_root {
        return Ok(());
    }

    let parent = tree.nodes[ancestor]
        .parent
        .ok_or_else(|| format!("Ancestral node {} is detached from the root", ancestor))?;
    let length = tree.nodes[ancestor].length;
    let slot = tree.nodes[parent]
        .children
        .iter()
        .position(|&c| c == ancestor)
        .unwrap_or(0);

    tree.nodes[parent].children.retain(|&c| c != ancestor);
    tree.nodes[ancestor].parent = None;

    reroot_at(tree, parent)?;
    tree.nodes[parent].length = length;

    let new_root = tree.add_node();
    tree.nodes[new_root].set_name("NEWROOT");
    tree.nodes[ancestor].length = Some(0.0);

    // The ancestor keeps the side it had under its old parent
    if slot == 0 {
        add_child(tree, new_root, ancestor)?;
        add_child(tree, new_root, parent)?;
    } else {
        add_child(tree, new_root, parent)?;
        add_child(tree, new_root, ancestor)?;
    }
    tree.root = Some(new_root);

    Ok(())
}

/// Flag every leaf whose path to the structural root avoids the ancestral node.
/// Must run before `root_at_ancestor`. Returns the outgroup leaves.
pub fn identify_outgroups(tree: &mut Tree) -> Result<Vec<NodeId>, String> {
    let ancestor = tree.ancestor.ok_or("Tree has no ancestral node")?;

    let mut outgroups = Vec::new();
    for leaf in tree.get_leaves() {
        let mut current = Some(leaf);
        let mut inside = false;
        while let Some(id) = current {
            if id == ancestor {
                inside = true;
                break;
            }
            current = tree.nodes[id].parent;
        }

        tree.nodes[leaf].outgroup = !inside;
        if !inside {
            outgroups.push(leaf);
        }
    }

    Ok(outgroups)
}
