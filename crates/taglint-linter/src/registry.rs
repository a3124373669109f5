//! Built-in checker registry.

use crate::checkers::{
    EmptyNodeChecker, PageGroupingChecker, RoleMapChecker, SchemaValidationChecker, EMPTY_NODES,
    PAGE_GROUPING, ROLE_MAP, SCHEMA_VALIDATION,
};
use crate::traits::{CheckerId, DocumentChecker, TreeChecker};
use std::sync::Arc;
use taglint_schema::Schema;

/// Every built-in checker id, in registration order.
#[must_use]
pub fn all_checker_ids() -> &'static [CheckerId] {
    &[SCHEMA_VALIDATION, EMPTY_NODES, PAGE_GROUPING, ROLE_MAP]
}

/// Document-level checkers, evaluated once before the traversal.
#[must_use]
pub fn document_checkers(schema: &Arc<Schema>) -> Vec<Box<dyn DocumentChecker>> {
    vec![Box::new(RoleMapChecker::new(Arc::clone(schema)))]
}

/// Tree checkers riding the shared traversal, in registration order; the
/// traversal engine reorders them by prerequisites.
#[must_use]
pub fn tree_checkers(schema: Arc<Schema>) -> Vec<Box<dyn TreeChecker>> {
    vec![
        Box::new(SchemaValidationChecker::new(schema)),
        Box::new(EmptyNodeChecker::new()),
        Box::new(PageGroupingChecker::new()),
    ]
}
