//! Per-node context handed to tree checkers during the walk.

use taglint_tree::{DocumentServices, NodeId, StructureTree};

/// Everything a tree checker can see at one node.
///
/// Roles are resolved through the document's role-alias map. `children`
/// lists only structural children; marked-content and object-reference
/// leaves are reachable through `tree` but excluded from role-sequence
/// computations.
pub struct ElementContext<'a> {
    pub node: NodeId,
    pub role: &'a str,
    pub parent_role: Option<&'a str>,
    pub children: &'a [(NodeId, String)],
    pub tree: &'a StructureTree,
    pub services: &'a dyn DocumentServices,
}

impl ElementContext<'_> {
    /// Resolved roles of the structural children, in document order.
    #[must_use]
    pub fn child_roles(&self) -> Vec<&str> {
        self.children.iter().map(|(_, role)| role.as_str()).collect()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node == self.tree.root()
    }
}
