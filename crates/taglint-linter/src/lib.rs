//! Schema-driven linting for tagged-document structure trees.
//!
//! Detection runs a set of checkers over a [`StructureTree`]: document-level
//! checkers evaluate once, tree checkers share a single dependency-ordered
//! depth-first traversal. Each violation becomes an issue, some carrying a
//! remediation fix; a separate remediation pass applies those fixes in
//! priority order and settles every fix-bearing issue into exactly one
//! terminal resolution.
//!
//! ```
//! use std::sync::Arc;
//! use taglint_linter::{CheckConfig, Linter};
//! use taglint_schema::Schema;
//! use taglint_test_utils::{build_tree, elem, StubServices};
//!
//! let tree = build_tree(vec![elem("Document", vec![elem("P", vec![])])]);
//! let linter = Linter::new(CheckConfig::default());
//! let issues = linter
//!     .detect(&tree, Arc::new(Schema::recommended()), &StubServices::new())
//!     .unwrap();
//! assert!(!issues.is_empty());
//! ```
//!
//! [`StructureTree`]: taglint_tree::StructureTree

pub mod checkers;
mod config;
mod context;
mod error;
mod linter;
pub mod registry;
mod traits;
mod traversal;

pub use config::{CheckConfig, CheckerSeverity};
pub use context::ElementContext;
pub use error::ConfigError;
pub use linter::{Linter, RemediationReport};
pub use traits::{Checker, CheckerId, DocumentChecker, TreeChecker};
pub use traversal::TraversalEngine;
