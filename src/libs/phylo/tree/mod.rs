pub mod ops;
pub mod query;
pub mod traversal;

use super::node::{Node, NodeId};

#[derive(Debug, Default, Clone)]
pub struct Tree {
    /// Arena storage for all nodes
    pub(super) nodes: Vec<Node>,

    /// Optional root ID (a tree might be empty or in construction)
    pub(super) root: Option<NodeId>,

    /// The designated ancestral node, marked with `@` in the Newick input
    pub(super) ancestor: Option<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node to the tree. Returns the new node's ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        let node = Node::new(id);
        self.nodes.push(node);
        id
    }

    /// Get number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get root ID
    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a reference to a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Set a node as the root of the tree.
    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    /// The designated ancestral node.
    pub fn get_ancestor(&self) -> Option<NodeId> {
        self.ancestor
    }

    pub fn set_ancestor(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.ancestor = Some(id);
        }
    }

    /// Branch length scaled by the rate parameter.
    /// The structural root, and any node without a length, has zero.
    pub fn distalpha(&self, id: NodeId, alpha: f64) -> f64 {
        if self.root == Some(id) {
            return 0.0;
        }
        self.get_node(id)
            .and_then(|n| n.length)
            .map(|l| l * alpha)
            .unwrap_or(0.0)
    }

    // --- Delegation to ops ---

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
        ops::add_child(self, parent_id, child_id)
    }

    pub fn reroot_at(&mut self, new_root_id: NodeId) -> Result<(), String> {
        ops::reroot_at(self, new_root_id)
    }

    pub fn root_at_ancestor(&mut self) -> Result<(), String> {
        ops::root_at_ancestor(self)
    }

    pub fn identify_outgroups(&mut self) -> Result<Vec<NodeId>, String> {
        ops::identify_outgroups(self)
    }

    // --- Delegation to traversal ---

    pub fn preorder(&self, start_node: &NodeId) -> Result<Vec<NodeId>, String> {
        Ok(traversal::preorder(self, *start_node))
    }

    pub fn postorder(&self, start_node: &NodeId) -> Result<Vec<NodeId>, String> {
        Ok(traversal::postorder(self, *start_node))
    }

    // --- Delegation to query ---

    pub fn get_path_from_root(&self, id: &NodeId) -> Result<Vec<NodeId>, String> {
        query::get_path_from_root(self, id)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        query::get_node_by_name(self, name)
    }

    pub fn get_leaves(&self) -> Vec<NodeId> {
        query::get_leaves(self)
    }

    pub fn get_outgroups(&self) -> Vec<NodeId> {
        self.get_leaves()
            .into_iter()
            .filter(|&id| self.nodes[id].outgroup)
            .collect()
    }

    /// Branch lengths of all non-root nodes reachable from the root, sorted.
    pub fn branch_lengths(&self) -> Vec<f64> {
        query::branch_lengths(self)
    }
}
