/// NodeId is an index into the Tree's node vector.
/// It is lightweight (Copy) and safe (no pointers).
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for the node (index in the arena)
    pub id: NodeId,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// Child node IDs, at most two for the trees used here
    pub children: Vec<NodeId>,

    // --- Payload ---
    /// Node name/label. Unnamed internal nodes get `IN<k>` from the parser.
    pub name: Option<String>,

    /// Branch length to parent
    /// In rooted trees, edge length is an attribute of the child node.
    pub length: Option<f64>,

    /// Leaf lying outside the clade of the ancestral node
    pub outgroup: bool,
}

impl Node {
    /// Create a new empty node with a specific ID
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
            outgroup: false,
        }
    }

    /// Set the name of the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if the node is a leaf (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The label, or `#<id>` for a node without one.
    pub fn name_or_id(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{}", self.id))
    }
}
