//! Arena representation of a parsed tree.
//!
//! Nodes live in a `Vec` and refer to each other by [`NodeId`]. A child is
//! always pushed after its parent, and the root is node 0.

/// Index of a node in [`Tree::nodes`].
pub type NodeId = usize;

/// What a node holds: a taxon index for leaves, children for internal nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(usize),
    Internal(Vec<NodeId>),
}

/// A node together with the edge leading to it from its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Length of the edge to the parent, if one was given
    pub branch_length: Option<f64>,
}

impl Node {
    /// Child ids, empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Internal(children) => children,
        }
    }
}

/// A rooted tree whose leaves carry taxon indices.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    n_leaves: usize,
}

impl Tree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent,
            branch_length: None,
        });
        if let Some(parent) = parent {
            if let NodeKind::Internal(children) = &mut self.nodes[parent].kind {
                children.push(id);
            }
        }
        id
    }

    /// Adds an internal node below `parent` (or the root when `None`).
    pub(crate) fn add_internal(&mut self, parent: Option<NodeId>) -> NodeId {
        self.push(NodeKind::Internal(Vec::new()), parent)
    }

    /// Adds a leaf for taxon `taxon` below `parent` (or as a lone root).
    pub(crate) fn add_leaf(&mut self, parent: Option<NodeId>, taxon: usize) -> NodeId {
        self.n_leaves += 1;
        self.push(NodeKind::Leaf(taxon), parent)
    }

    pub(crate) fn set_branch_length(&mut self, id: NodeId, length: f64) {
        self.nodes[id].branch_length = Some(length);
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Taxon indices of all leaves, in input order.
    pub fn leaf_taxa(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().filter_map(|node| match node.kind {
            NodeKind::Leaf(taxon) => Some(taxon),
            NodeKind::Internal(_) => None,
        })
    }

    /// Node ids in post-order (every child before its parent).
    ///
    /// Uses an explicit stack, so very deep trees do not grow the call stack.
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        if self.nodes.is_empty() {
            return order;
        }

        // (node, whether its children were already pushed)
        let mut stack = vec![(self.root(), false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.nodes[id].children().iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }
}
