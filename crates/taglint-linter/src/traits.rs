//! Checker trait hierarchy.
//!
//! Document checkers evaluate once per session, before the walk; tree
//! checkers ride along a single depth-first traversal and may declare
//! prerequisite checkers that must run before them at every node.

use crate::context::ElementContext;
use taglint_fixes::{Issue, Severity};
use taglint_tree::{DocumentServices, StructureTree};

/// Stable identifier of a checker, also used in configuration.
pub type CheckerId = &'static str;

/// Base trait for all checkers.
pub trait Checker {
    /// Unique identifier (e.g. `"schema_validation"`).
    fn id(&self) -> CheckerId;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Severity issues carry unless overridden by configuration.
    fn default_severity(&self) -> Severity;
}

/// Document-level rule with a single evaluation.
pub trait DocumentChecker: Checker {
    fn check(&mut self, tree: &StructureTree, services: &dyn DocumentServices) -> Vec<Issue>;
}

/// Rule that participates in the shared tree traversal.
///
/// A checker is stateful only for the duration of one traversal; it
/// accumulates its own issues and hands them over via [`take_issues`]
/// once the walk (and `after_traversal`) has completed.
///
/// [`take_issues`]: TreeChecker::take_issues
pub trait TreeChecker: Checker {
    /// Checkers that must run before this one at every node.
    fn prerequisites(&self) -> &[CheckerId] {
        &[]
    }

    /// Called on every node in pre-order. Returning `false` suppresses
    /// this checker's visitation of the node's subtree; other checkers
    /// still visit it.
    fn enter_element(&mut self, ctx: &ElementContext<'_>) -> bool {
        let _ = ctx;
        true
    }

    /// Called as the node is exited, children already visited.
    fn leave_element(&mut self, ctx: &ElementContext<'_>) {
        let _ = ctx;
    }

    /// Called once after the whole tree has been walked, for checks that
    /// need whole-tree information.
    fn after_traversal(&mut self, tree: &StructureTree, services: &dyn DocumentServices) {
        let _ = (tree, services);
    }

    /// Drain the issues accumulated during this traversal.
    fn take_issues(&mut self) -> Vec<Issue>;
}
