//! Remedial tree edits.
//!
//! The fix hierarchy is a closed tagged enum so the invalidation relation
//! can be matched exhaustively on kind pairs instead of relying on dynamic
//! type identity. Every fix is expressed purely in terms of the five
//! structural mutation primitives on [`StructureTree`]; no fix touches page
//! content directly.

use taglint_tree::{NodeId, StructureTree, TreeError};
use thiserror::Error;

const LIST_ITEM_ROLE: &str = "LI";
const LABEL_ROLE: &str = "Lbl";
const BODY_ROLE: &str = "LBody";

/// Errors raised while applying a fix. Caught per fix by the orchestrator
/// and folded into a `Failed` resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("fix no longer applicable: {0}")]
    NotApplicable(String),
}

/// A remedial tree edit, paired 1:1 with the issue it remediates.
///
/// Fixes are created during detection and hold nothing beyond the node ids
/// they close over. `apply` is idempotent: re-applying to an already-fixed
/// tree leaves the structure unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fix {
    /// Multi-child fix: wrap a list parent's children into `LI { Lbl,
    /// LBody }` groups, two children per group.
    WrapListItems {
        parent: NodeId,
        /// Structural children at detection time, in document order.
        children: Vec<NodeId>,
    },
    /// Single-child fix: wrap one offending child in an allowed container.
    WrapChild {
        parent: NodeId,
        child: NodeId,
        wrapper_role: String,
    },
    /// Remove a structural node that has no children of any kind.
    RemoveEmptyNode {
        parent: NodeId,
        node: NodeId,
        /// Role at detection time, for the description.
        role: String,
    },
}

impl Fix {
    /// Try to construct the multi-child list wrap for `parent`.
    ///
    /// Accepts when every child is structural and either all children share
    /// one resolved role with an even count, or the children already
    /// alternate `Lbl`/`LBody` exactly. Declines otherwise (the caller
    /// falls back to a single-child fix).
    #[must_use]
    pub fn try_wrap_list_items(tree: &StructureTree, parent: NodeId) -> Option<Self> {
        let all_children = tree.children(parent);
        let structural = tree.structural_children(parent);
        if structural.len() != all_children.len() {
            // Interleaved content leaves: too risky to restructure wholesale.
            return None;
        }
        if structural.len() < 2 || structural.len() % 2 != 0 {
            return None;
        }

        let roles: Vec<&str> = structural.iter().map(|&c| tree.resolved_role(c)).collect();
        let uniform = roles.iter().all(|r| *r == roles[0]);
        let alternating = roles
            .chunks(2)
            .all(|pair| matches!(pair, [LABEL_ROLE, BODY_ROLE]));
        if !(uniform || alternating) {
            return None;
        }

        Some(Self::WrapListItems {
            parent,
            children: structural,
        })
    }

    /// Application order key; lower runs first. Coarse structural fixes get
    /// lower numbers so they apply, and are consulted for invalidation,
    /// before narrower ones.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        match self {
            Self::WrapListItems { .. } => 10,
            Self::WrapChild { .. } => 20,
            Self::RemoveEmptyNode { .. } => 30,
        }
    }

    #[must_use]
    pub const fn group_label(&self) -> &'static str {
        match self {
            Self::WrapListItems { .. } => "list-restructure",
            Self::WrapChild { .. } => "child-wrap",
            Self::RemoveEmptyNode { .. } => "empty-node-removal",
        }
    }

    /// Human-readable description, used for resolution notes.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::WrapListItems { children, .. } => format!(
                "wrap {} children into {} LI(Lbl, LBody) pairs",
                children.len(),
                children.len() / 2
            ),
            Self::WrapChild { wrapper_role, .. } => {
                format!("wrap stray child in a new <{wrapper_role}>")
            }
            Self::RemoveEmptyNode { role, .. } => format!("remove empty <{role}> node"),
        }
    }

    /// Declared conflict relation: does applying `self` make `other`
    /// redundant or stale?
    ///
    /// Evaluated pairwise by the orchestrator against previously *applied*
    /// fixes only; deliberately not transitively closed.
    #[must_use]
    pub fn invalidates(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::WrapListItems { parent: a, .. },
                Self::WrapListItems { parent: b, .. },
            ) => a == b,
            (
                Self::WrapListItems {
                    parent: a,
                    children,
                },
                Self::WrapChild {
                    parent: b, child, ..
                },
            ) => a == b || children.contains(child) || children.contains(b),
            (Self::WrapListItems { children, .. }, Self::RemoveEmptyNode { node, .. }) => {
                children.contains(node)
            }
            (Self::WrapChild { child: a, .. }, Self::WrapChild { child: b, .. }) => a == b,
            (Self::WrapChild { child, .. }, Self::RemoveEmptyNode { node, .. }) => child == node,
            (Self::WrapChild { .. }, Self::WrapListItems { .. }) => false,
            (Self::RemoveEmptyNode { node, .. }, Self::WrapChild { child, .. }) => node == child,
            (
                Self::RemoveEmptyNode { node, .. },
                Self::WrapListItems { parent, children },
            ) => node == parent || children.contains(node),
            (
                Self::RemoveEmptyNode { node: a, .. },
                Self::RemoveEmptyNode { node: b, .. },
            ) => a == b,
        }
    }

    /// Apply the edit to the tree.
    pub fn apply(&self, tree: &mut StructureTree) -> Result<(), FixError> {
        match self {
            Self::WrapListItems { parent, children } => {
                // Idempotence: once any recorded child has been reparented,
                // the wrap already happened.
                if children.iter().any(|&c| tree.parent(c) != Some(*parent)) {
                    return Ok(());
                }
                for pair in children.chunks(2) {
                    let &[label, body] = pair else { continue };
                    let item = tree.create_node(LIST_ITEM_ROLE);
                    let index = tree.child_index(*parent, label).ok_or_else(|| {
                        FixError::NotApplicable("recorded child vanished from parent".into())
                    })?;
                    tree.add_child(*parent, index, item)?;
                    tree.move_child(*parent, label, item, None)?;
                    tree.move_child(*parent, body, item, None)?;
                    tree.set_role(label, LABEL_ROLE)?;
                    tree.set_role(body, BODY_ROLE)?;
                }
                Ok(())
            }
            Self::WrapChild {
                parent,
                child,
                wrapper_role,
            } => {
                if tree.parent(*child) != Some(*parent) {
                    return Ok(());
                }
                let wrapper = tree.create_node(wrapper_role.clone());
                let index = tree.child_index(*parent, *child).ok_or_else(|| {
                    FixError::NotApplicable("recorded child vanished from parent".into())
                })?;
                tree.add_child(*parent, index, wrapper)?;
                tree.move_child(*parent, *child, wrapper, None)?;
                Ok(())
            }
            Self::RemoveEmptyNode { parent, node, .. } => {
                if tree.parent(*node) != Some(*parent) {
                    return Ok(());
                }
                if !tree.children(*node).is_empty() {
                    return Err(FixError::NotApplicable(
                        "node gained children since detection".into(),
                    ));
                }
                tree.remove_child(*parent, *node)?;
                Ok(())
            }
        }
    }
}
