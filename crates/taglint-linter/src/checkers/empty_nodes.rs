//! Flags structure nodes with no children of any kind.
//!
//! Empty grouping elements are a common artifact of authoring tools and
//! carry no content for assistive technology; they can be removed safely.

use crate::checkers::EMPTY_NODES;
use crate::context::ElementContext;
use crate::traits::{Checker, CheckerId, TreeChecker};
use taglint_fixes::{Fix, Issue, IssueKind, Location, Severity};

#[derive(Default)]
pub struct EmptyNodeChecker {
    issues: Vec<Issue>,
}

impl EmptyNodeChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checker for EmptyNodeChecker {
    fn id(&self) -> CheckerId {
        EMPTY_NODES
    }

    fn description(&self) -> &'static str {
        "Flags structure nodes without children or content, with a removal fix"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
}

impl TreeChecker for EmptyNodeChecker {
    fn enter_element(&mut self, ctx: &ElementContext<'_>) -> bool {
        if ctx.is_root() || !ctx.tree.children(ctx.node).is_empty() {
            return true;
        }
        let Some(parent) = ctx.tree.parent(ctx.node) else {
            return true;
        };
        self.issues.push(
            Issue::new(
                IssueKind::EmptyNode,
                Severity::Warning,
                Location::Node(ctx.node),
                format!("`{}` element has no children and no content", ctx.role),
            )
            .with_fix(Fix::RemoveEmptyNode {
                parent,
                node: ctx.node,
                role: ctx.role.to_string(),
            }),
        );
        true
    }

    fn take_issues(&mut self) -> Vec<Issue> {
        std::mem::take(&mut self.issues)
    }
}
