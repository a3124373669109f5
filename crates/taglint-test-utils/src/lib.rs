//! Synthetic tree fixtures and a stub document-services collaborator.
//!
//! Tests across the workspace describe trees declaratively with
//! [`NodeSpec`] values and realize them with [`build_tree`]:
//!
//! ```
//! use taglint_test_utils::{build_tree, content, elem};
//!
//! let tree = build_tree(vec![elem(
//!     "Document",
//!     vec![elem("P", vec![content(1, 0)])],
//! )]);
//! assert_eq!(tree.structural_children(tree.root()).len(), 1);
//! ```

use std::collections::HashMap;
use taglint_tree::{
    DocumentServices, NodeId, ObjectId, PageNumber, Rect, StructureTree,
};

/// Declarative description of a subtree.
#[derive(Debug, Clone)]
pub enum NodeSpec {
    Elem {
        role: String,
        children: Vec<NodeSpec>,
    },
    Content {
        page: u32,
        mcid: u32,
    },
    ObjectRef(u64),
}

/// A structure element with children.
#[must_use]
pub fn elem(role: impl Into<String>, children: Vec<NodeSpec>) -> NodeSpec {
    NodeSpec::Elem {
        role: role.into(),
        children,
    }
}

/// A marked-content reference leaf.
#[must_use]
pub const fn content(page: u32, mcid: u32) -> NodeSpec {
    NodeSpec::Content { page, mcid }
}

/// An object-reference leaf.
#[must_use]
pub const fn objref(object: u64) -> NodeSpec {
    NodeSpec::ObjectRef(object)
}

/// Build a tree with the given specs attached under the synthetic root.
#[must_use]
pub fn build_tree(specs: Vec<NodeSpec>) -> StructureTree {
    let mut tree = StructureTree::new();
    let root = tree.root();
    for spec in specs {
        attach(&mut tree, root, spec);
    }
    tree
}

fn attach(tree: &mut StructureTree, parent: NodeId, spec: NodeSpec) {
    match spec {
        NodeSpec::Elem { role, children } => {
            let node = tree.create_node(role);
            tree.append_child(parent, node)
                .expect("fixture node attaches cleanly");
            for child in children {
                attach(tree, node, child);
            }
        }
        NodeSpec::Content { page, mcid } => {
            tree.append_marked_content(parent, PageNumber::new(page), mcid);
        }
        NodeSpec::ObjectRef(object) => {
            tree.append_object_ref(parent, ObjectId::new(object));
        }
    }
}

/// Hash-map-backed [`DocumentServices`] implementation.
#[derive(Debug, Default)]
pub struct StubServices {
    pages: HashMap<ObjectId, PageNumber>,
    bounds: HashMap<(PageNumber, u32), Rect>,
    text: HashMap<(PageNumber, u32), String>,
    annotations: HashMap<ObjectId, Rect>,
}

impl StubServices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_object_page(mut self, object: u64, page: u32) -> Self {
        self.pages
            .insert(ObjectId::new(object), PageNumber::new(page));
        self
    }

    #[must_use]
    pub fn with_content_bounds(mut self, page: u32, mcid: u32, rect: Rect) -> Self {
        self.bounds.insert((PageNumber::new(page), mcid), rect);
        self
    }

    #[must_use]
    pub fn with_content_text(mut self, page: u32, mcid: u32, text: impl Into<String>) -> Self {
        self.text.insert((PageNumber::new(page), mcid), text.into());
        self
    }

    #[must_use]
    pub fn with_annotation_bounds(mut self, object: u64, rect: Rect) -> Self {
        self.annotations.insert(ObjectId::new(object), rect);
        self
    }
}

impl DocumentServices for StubServices {
    fn page_number_for(&self, object: ObjectId) -> Option<PageNumber> {
        self.pages.get(&object).copied()
    }

    fn marked_content_bounds(&self, page: PageNumber, mcid: u32) -> Option<Rect> {
        self.bounds.get(&(page, mcid)).copied()
    }

    fn marked_content_text(&self, page: PageNumber, mcid: u32) -> Option<String> {
        self.text.get(&(page, mcid)).cloned()
    }

    fn annotation_bounds(&self, object: ObjectId) -> Option<Rect> {
        self.annotations.get(&object).copied()
    }
}
