//! Arena-based structure tree for tagged documents.
//!
//! Nodes are addressed by [`NodeId`] indices into an arena owned by
//! [`StructureTree`]; parent/child links are stored as indices rather than
//! bidirectional pointers. The tree is a strict forest rooted at one
//! synthetic root node created at construction.

mod services;

pub use services::{DocumentServices, Rect};

use std::collections::HashMap;
use thiserror::Error;

/// Role of the synthetic root node.
pub const ROOT_ROLE: &str = "StructTreeRoot";

/// Alias chains longer than this are treated as cyclic and cut off.
const MAX_ALIAS_HOPS: usize = 32;

/// Identifier of a structure node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a non-content object (e.g. an annotation) in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// One-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageNumber(u32);

impl PageNumber {
    #[must_use]
    pub const fn new(page: u32) -> Self {
        Self(page)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PageNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered child of a structure node.
///
/// Order is significant (reading order). Only `Node` children participate in
/// role-sequence computations; the two leaf kinds point out of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    /// Another structure node.
    Node(NodeId),
    /// A run of page content, addressed by a per-page numeric identifier.
    MarkedContent { page: PageNumber, mcid: u32 },
    /// A non-content object such as an annotation.
    ObjectRef(ObjectId),
}

/// Errors from the five structural mutation primitives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} is not a child of {1:?}")]
    NotAChild(NodeId, NodeId),
    #[error("node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),
    #[error("child index {index} out of range for node {parent:?} ({len} children)")]
    IndexOutOfRange {
        parent: NodeId,
        index: usize,
        len: usize,
    },
    #[error("cannot move node {0:?} into its own subtree")]
    MoveIntoSubtree(NodeId),
    #[error("the root node cannot be mutated this way")]
    RootImmutable,
}

#[derive(Debug, Clone)]
struct NodeData {
    role: String,
    parent: Option<NodeId>,
    children: Vec<Child>,
}

/// The semantic structure tree of one document.
///
/// Every non-root node has exactly one parent. Detached nodes (freshly
/// created, or removed from their parent) stay in the arena and can be
/// re-attached; node identities persist across detection and remediation.
#[derive(Debug, Clone)]
pub struct StructureTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    role_aliases: HashMap<String, String>,
}

impl Default for StructureTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureTree {
    /// Create an empty tree holding only the synthetic root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                role: ROOT_ROLE.to_string(),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            role_aliases: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, including the root and detached nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Register a document-wide role alias (`from` is read as `to`).
    pub fn add_role_alias(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.role_aliases.insert(from.into(), to.into());
    }

    /// The raw role-alias map.
    #[must_use]
    pub const fn role_aliases(&self) -> &HashMap<String, String> {
        &self.role_aliases
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Raw (unresolved) role of a node.
    #[must_use]
    pub fn role(&self, id: NodeId) -> &str {
        &self.node(id).role
    }

    /// Role after applying the document's role-alias map.
    ///
    /// Alias chains are followed up to a fixed hop bound, so a cyclic alias
    /// map degrades to the last role reached instead of looping.
    #[must_use]
    pub fn resolved_role(&self, id: NodeId) -> &str {
        self.resolve_role(&self.node(id).role)
    }

    /// Resolve an arbitrary role name through the alias map.
    #[must_use]
    pub fn resolve_role<'a>(&'a self, role: &'a str) -> &'a str {
        let mut current = role;
        for _ in 0..MAX_ALIAS_HOPS {
            match self.role_aliases.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Ordered children of a node, leaves included.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[Child] {
        &self.node(id).children
    }

    /// Ordered structural children only (marked-content and object-reference
    /// leaves excluded).
    #[must_use]
    pub fn structural_children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .children
            .iter()
            .filter_map(|child| match child {
                Child::Node(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Position of `node` within `parent`'s full child list.
    #[must_use]
    pub fn child_index(&self, parent: NodeId, node: NodeId) -> Option<usize> {
        self.node(parent)
            .children
            .iter()
            .position(|c| *c == Child::Node(node))
    }

    /// True if `ancestor` lies on the parent chain of `node` (or is `node`).
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Topmost ancestor of `node` below the root (or `node` itself when it
    /// hangs directly off the root).
    #[must_use]
    pub fn top_level_container(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.node(current).parent {
            if parent == self.root {
                break;
            }
            current = parent;
        }
        current
    }

    /// Create a new, detached structure node.
    pub fn create_node(&mut self, role: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            role: role.into(),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Attach a detached node as a child of `parent` at `index`.
    pub fn add_child(&mut self, parent: NodeId, index: usize, node: NodeId) -> Result<(), TreeError> {
        if node == self.root {
            return Err(TreeError::RootImmutable);
        }
        if self.node(node).parent.is_some() {
            return Err(TreeError::AlreadyAttached(node));
        }
        let len = self.node(parent).children.len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { parent, index, len });
        }
        self.node_mut(parent).children.insert(index, Child::Node(node));
        self.node_mut(node).parent = Some(parent);
        Ok(())
    }

    /// Attach a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), TreeError> {
        let len = self.node(parent).children.len();
        self.add_child(parent, len, node)
    }

    /// Append a marked-content reference leaf.
    pub fn append_marked_content(&mut self, parent: NodeId, page: PageNumber, mcid: u32) {
        self.node_mut(parent)
            .children
            .push(Child::MarkedContent { page, mcid });
    }

    /// Append an object-reference leaf.
    pub fn append_object_ref(&mut self, parent: NodeId, object: ObjectId) {
        self.node_mut(parent).children.push(Child::ObjectRef(object));
    }

    /// Detach `node` from `parent`. The node's subtree stays intact and the
    /// node can be re-attached elsewhere.
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), TreeError> {
        let Some(index) = self.child_index(parent, node) else {
            return Err(TreeError::NotAChild(node, parent));
        };
        self.node_mut(parent).children.remove(index);
        self.node_mut(node).parent = None;
        Ok(())
    }

    /// Move `node` from `from` into `to`, at `index` or at the end.
    pub fn move_child(
        &mut self,
        from: NodeId,
        node: NodeId,
        to: NodeId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        if self.child_index(from, node).is_none() {
            return Err(TreeError::NotAChild(node, from));
        }
        if self.is_ancestor_or_self(node, to) {
            return Err(TreeError::MoveIntoSubtree(node));
        }
        self.remove_child(from, node)?;
        match index {
            Some(i) => self.add_child(to, i, node),
            None => self.append_child(to, node),
        }
    }

    /// Change a node's role.
    pub fn set_role(&mut self, node: NodeId, role: impl Into<String>) -> Result<(), TreeError> {
        if node == self.root {
            return Err(TreeError::RootImmutable);
        }
        self.node_mut(node).role = role.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (StructureTree, NodeId, NodeId, NodeId) {
        let mut tree = StructureTree::new();
        let doc = tree.create_node("Document");
        let p1 = tree.create_node("P");
        let p2 = tree.create_node("P");
        tree.append_child(tree.root(), doc).unwrap();
        tree.append_child(doc, p1).unwrap();
        tree.append_child(doc, p2).unwrap();
        (tree, doc, p1, p2)
    }

    #[test]
    fn new_tree_has_only_root() {
        let tree = StructureTree::new();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.role(tree.root()), ROOT_ROLE);
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn children_keep_insertion_order() {
        let (tree, doc, p1, p2) = sample_tree();
        assert_eq!(tree.structural_children(doc), vec![p1, p2]);
        assert_eq!(tree.parent(p1), Some(doc));
    }

    #[test]
    fn add_child_at_index() {
        let (mut tree, doc, p1, _) = sample_tree();
        let h = tree.create_node("H1");
        tree.add_child(doc, 0, h).unwrap();
        assert_eq!(tree.structural_children(doc)[0], h);
        assert_eq!(tree.child_index(doc, p1), Some(1));
    }

    #[test]
    fn add_child_rejects_attached_node() {
        let (mut tree, doc, p1, _) = sample_tree();
        assert_eq!(
            tree.add_child(doc, 0, p1),
            Err(TreeError::AlreadyAttached(p1))
        );
    }

    #[test]
    fn add_child_rejects_out_of_range_index() {
        let (mut tree, doc, _, _) = sample_tree();
        let n = tree.create_node("P");
        assert!(matches!(
            tree.add_child(doc, 7, n),
            Err(TreeError::IndexOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn remove_child_detaches_subtree_intact() {
        let (mut tree, doc, p1, p2) = sample_tree();
        let span = tree.create_node("Span");
        tree.append_child(p1, span).unwrap();

        tree.remove_child(doc, p1).unwrap();
        assert_eq!(tree.parent(p1), None);
        assert_eq!(tree.structural_children(doc), vec![p2]);
        // Subtree below the detached node is untouched.
        assert_eq!(tree.structural_children(p1), vec![span]);
    }

    #[test]
    fn remove_child_rejects_non_child() {
        let (mut tree, _, p1, p2) = sample_tree();
        assert_eq!(tree.remove_child(p1, p2), Err(TreeError::NotAChild(p2, p1)));
    }

    #[test]
    fn move_child_reparents() {
        let (mut tree, doc, p1, p2) = sample_tree();
        tree.move_child(doc, p2, p1, None).unwrap();
        assert_eq!(tree.structural_children(doc), vec![p1]);
        assert_eq!(tree.parent(p2), Some(p1));
    }

    #[test]
    fn move_child_rejects_own_subtree() {
        let (mut tree, doc, p1, _) = sample_tree();
        assert_eq!(
            tree.move_child(tree.root(), doc, p1, None),
            Err(TreeError::MoveIntoSubtree(doc))
        );
    }

    #[test]
    fn set_role_rejects_root() {
        let mut tree = StructureTree::new();
        let root = tree.root();
        assert_eq!(tree.set_role(root, "Document"), Err(TreeError::RootImmutable));
    }

    #[test]
    fn resolved_role_follows_alias_chain() {
        let (mut tree, _, p1, _) = sample_tree();
        tree.add_role_alias("P", "Para");
        tree.add_role_alias("Para", "Paragraph");
        assert_eq!(tree.role(p1), "P");
        assert_eq!(tree.resolved_role(p1), "Paragraph");
    }

    #[test]
    fn resolved_role_survives_alias_cycle() {
        let (mut tree, _, p1, _) = sample_tree();
        tree.add_role_alias("P", "Para");
        tree.add_role_alias("Para", "P");
        // Bounded hop count: resolution terminates on some member of the cycle.
        let resolved = tree.resolved_role(p1);
        assert!(resolved == "P" || resolved == "Para");
    }

    #[test]
    fn structural_children_exclude_leaves() {
        let (mut tree, doc, p1, p2) = sample_tree();
        tree.append_marked_content(p1, PageNumber::new(1), 0);
        tree.append_object_ref(doc, ObjectId::new(99));
        assert_eq!(tree.structural_children(doc), vec![p1, p2]);
        assert_eq!(tree.children(doc).len(), 3);
        assert!(tree.structural_children(p1).is_empty());
        assert_eq!(tree.children(p1).len(), 1);
    }

    #[test]
    fn top_level_container_walks_to_below_root() {
        let (mut tree, doc, p1, _) = sample_tree();
        let span = tree.create_node("Span");
        tree.append_child(p1, span).unwrap();
        assert_eq!(tree.top_level_container(span), doc);
        assert_eq!(tree.top_level_container(doc), doc);
    }
}
