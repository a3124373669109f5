//! The principal checker: validates every node against the schema.
//!
//! At each node the five checks run independently, in a fixed order:
//! unknown role, wrong parent, wrong child count, wrong child, wrong child
//! pattern. Fix construction happens only for wrong-child violations, at
//! the first offending child of a parent: a multi-child fix spanning the
//! whole child list is tried first, then a single-child fix scoped to the
//! offender. Conflict resolution at apply time re-validates overlaps.

use crate::checkers::SCHEMA_VALIDATION;
use crate::context::ElementContext;
use crate::traits::{Checker, CheckerId, TreeChecker};
use std::sync::Arc;
use taglint_fixes::{Fix, Issue, IssueKind, Location, Severity};
use taglint_schema::{Schema, SchemaRule};
use taglint_tree::NodeId;

pub struct SchemaValidationChecker {
    schema: Arc<Schema>,
    issues: Vec<Issue>,
}

impl SchemaValidationChecker {
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            issues: Vec::new(),
        }
    }

    fn check_unknown_role(&mut self, ctx: &ElementContext<'_>) -> bool {
        if self.schema.contains(ctx.role) {
            return true;
        }
        let suggestion = self
            .schema
            .closest_role(ctx.role)
            .map(|known| format!(" (did you mean `{known}`?)"))
            .unwrap_or_default();
        self.issues.push(Issue::new(
            IssueKind::UnknownRole,
            Severity::Error,
            Location::Node(ctx.node),
            format!("unknown role `{}`{suggestion}", ctx.role),
        ));
        false
    }

    fn check_parent(&mut self, ctx: &ElementContext<'_>, rule: &SchemaRule) {
        let (Some(allowed), Some(parent_role)) = (rule.parent_must_be(), ctx.parent_role) else {
            return;
        };
        if !allowed.contains(parent_role) {
            let mut expected: Vec<&str> = allowed.iter().map(String::as_str).collect();
            expected.sort_unstable();
            self.issues.push(Issue::new(
                IssueKind::WrongParent,
                Severity::Error,
                Location::Node(ctx.node),
                format!(
                    "`{}` must have a parent in [{}], found `{parent_role}`",
                    ctx.role,
                    expected.join(", ")
                ),
            ));
        }
    }

    fn check_child_count(&mut self, ctx: &ElementContext<'_>, rule: &SchemaRule) {
        let count = ctx.children.len();
        if let Some(min) = rule.min_children() {
            if count < min {
                self.issues.push(Issue::new(
                    IssueKind::WrongChildCount,
                    Severity::Error,
                    Location::Node(ctx.node),
                    format!(
                        "`{}` has {count} structural children, expected at least {min}",
                        ctx.role
                    ),
                ));
            }
        }
        if let Some(max) = rule.max_children() {
            if count > max {
                self.issues.push(Issue::new(
                    IssueKind::WrongChildCount,
                    Severity::Error,
                    Location::Node(ctx.node),
                    format!(
                        "`{}` has {count} structural children, expected at most {max}",
                        ctx.role
                    ),
                ));
            }
        }
    }

    fn check_children(&mut self, ctx: &ElementContext<'_>, rule: &SchemaRule) {
        let Some(allowed) = rule.allowed_children() else {
            return;
        };
        if allowed.is_empty() {
            return;
        }

        let mut fix = None;
        let mut first = true;
        for (child, child_role) in ctx.children {
            if allowed.contains(child_role.as_str()) {
                continue;
            }
            if first {
                fix = self.build_child_fix(ctx, rule, *child, child_role);
                first = false;
            }
            let mut issue = Issue::new(
                IssueKind::WrongChild,
                Severity::Error,
                Location::Node(*child),
                format!(
                    "`{child_role}` is not an allowed child of `{}`",
                    ctx.role
                ),
            );
            // Only the first offending child of a parent carries a fix; a
            // multi-child fix is expected to subsume the siblings.
            if let Some(fix) = fix.take() {
                issue = issue.with_fix(fix);
            }
            self.issues.push(issue);
        }
    }

    /// Fix construction for a wrong-child violation: multi-child candidates
    /// first, then the single-child fallback.
    fn build_child_fix(
        &self,
        ctx: &ElementContext<'_>,
        rule: &SchemaRule,
        child: NodeId,
        child_role: &str,
    ) -> Option<Fix> {
        if rule.permits_child("LI") {
            if let Some(fix) = Fix::try_wrap_list_items(ctx.tree, ctx.node) {
                return Some(fix);
            }
        }

        let mut candidates: Vec<&str> = rule
            .allowed_children()?
            .iter()
            .map(String::as_str)
            .collect();
        candidates.sort_unstable();

        // The roles the parent's pattern repeats are where a stray child
        // belongs; one-shot roles like captions come last, and only when
        // their own rule accepts the offender.
        if let Some(pattern) = rule.child_pattern() {
            let repeatable = pattern.repeatable_literals();
            if let Some(&candidate) = candidates.iter().find(|c| repeatable.contains(c)) {
                return Some(Fix::WrapChild {
                    parent: ctx.node,
                    child,
                    wrapper_role: candidate.to_string(),
                });
            }
        }
        for candidate in candidates {
            if self
                .schema
                .lookup(candidate)
                .is_some_and(|wrapper_rule| wrapper_rule.permits_child(child_role))
            {
                return Some(Fix::WrapChild {
                    parent: ctx.node,
                    child,
                    wrapper_role: candidate.to_string(),
                });
            }
        }
        None
    }

    fn check_child_pattern(&mut self, ctx: &ElementContext<'_>, rule: &SchemaRule) {
        let Some(pattern) = rule.child_pattern() else {
            return;
        };
        if !pattern.full_match(&ctx.child_roles()) {
            self.issues.push(Issue::new(
                IssueKind::WrongChildPattern,
                Severity::Warning,
                Location::Node(ctx.node),
                format!(
                    "children of `{}` do not match the pattern `{}`",
                    ctx.role,
                    pattern.source()
                ),
            ));
        }
    }
}

impl Checker for SchemaValidationChecker {
    fn id(&self) -> CheckerId {
        SCHEMA_VALIDATION
    }

    fn description(&self) -> &'static str {
        "Validates roles, parent/child relationships and child ordering against the schema"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }
}

impl TreeChecker for SchemaValidationChecker {
    fn enter_element(&mut self, ctx: &ElementContext<'_>) -> bool {
        // The synthetic root is not a document element.
        if ctx.is_root() {
            return true;
        }
        if !self.check_unknown_role(ctx) {
            // No rule: the remaining checks have nothing to validate
            // against, but the subtree is still visited.
            return true;
        }
        let schema = Arc::clone(&self.schema);
        if let Some(rule) = schema.lookup(ctx.role) {
            self.check_parent(ctx, rule);
            self.check_child_count(ctx, rule);
            self.check_children(ctx, rule);
            self.check_child_pattern(ctx, rule);
        }
        true
    }

    fn take_issues(&mut self) -> Vec<Issue> {
        std::mem::take(&mut self.issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taglint_test_utils::{build_tree, elem, StubServices};
    use taglint_tree::{DocumentServices, StructureTree};

    fn run_checker(tree: &StructureTree) -> Vec<Issue> {
        let services = StubServices::new();
        run_checker_with(tree, &services)
    }

    fn run_checker_with(tree: &StructureTree, services: &dyn DocumentServices) -> Vec<Issue> {
        let checker = SchemaValidationChecker::new(Arc::new(Schema::recommended()));
        let mut engine =
            crate::traversal::TraversalEngine::new(vec![Box::new(checker) as Box<dyn TreeChecker>])
                .unwrap();
        let mut grouped = engine.run(tree, services);
        grouped.remove(0).1
    }

    #[test]
    fn conformant_tree_yields_no_issues() {
        let tree = build_tree(vec![elem(
            "Document",
            vec![elem(
                "L",
                vec![elem("LI", vec![elem("Lbl", vec![]), elem("LBody", vec![])])],
            )],
        )]);
        let issues = run_checker(&tree);
        assert!(
            issues.iter().all(|i| i.kind() != IssueKind::WrongChild),
            "unexpected issues: {issues:?}"
        );
    }

    #[test]
    fn unknown_role_reported_with_suggestion() {
        let tree = build_tree(vec![elem("Document", vec![elem("Tabel", vec![])])]);
        let issues = run_checker(&tree);
        let unknown: Vec<_> = issues
            .iter()
            .filter(|i| i.kind() == IssueKind::UnknownRole)
            .collect();
        assert_eq!(unknown.len(), 1);
        assert!(unknown[0].message().contains("did you mean `Table`"));
    }

    #[test]
    fn alias_resolution_feeds_lookup() {
        let mut tree = build_tree(vec![elem("Document", vec![elem("Para", vec![])])]);
        tree.add_role_alias("Para", "P");
        let issues = run_checker(&tree);
        assert!(
            issues.iter().all(|i| i.kind() != IssueKind::UnknownRole),
            "aliased role should resolve: {issues:?}"
        );
    }

    #[test]
    fn wrong_parent_reported() {
        let tree = build_tree(vec![elem("Document", vec![elem("TR", vec![])])]);
        let issues = run_checker(&tree);
        assert!(issues.iter().any(|i| i.kind() == IssueKind::WrongParent));
    }

    #[test]
    fn wrong_child_count_reported() {
        // L requires at least one child.
        let tree = build_tree(vec![elem("Document", vec![elem("L", vec![])])]);
        let issues = run_checker(&tree);
        assert!(issues.iter().any(|i| i.kind() == IssueKind::WrongChildCount));
    }

    #[test]
    fn multi_child_fix_attached_once() {
        let tree = build_tree(vec![elem(
            "Document",
            vec![elem(
                "L",
                vec![
                    elem("P", vec![]),
                    elem("P", vec![]),
                    elem("P", vec![]),
                    elem("P", vec![]),
                ],
            )],
        )]);
        let issues = run_checker(&tree);
        let wrong_children: Vec<_> = issues
            .iter()
            .filter(|i| i.kind() == IssueKind::WrongChild)
            .collect();
        assert_eq!(wrong_children.len(), 4);
        let with_fix: Vec<_> = wrong_children.iter().filter(|i| i.fix().is_some()).collect();
        assert_eq!(with_fix.len(), 1, "exactly one fix for the parent");
        assert!(matches!(
            with_fix[0].fix(),
            Some(Fix::WrapListItems { children, .. }) if children.len() == 4
        ));
    }

    #[test]
    fn single_child_fix_when_multi_declines() {
        // Odd count: the multi-child wrap declines, the first offender
        // gets a single-child fix.
        let tree = build_tree(vec![elem(
            "Document",
            vec![elem(
                "L",
                vec![elem("P", vec![]), elem("P", vec![]), elem("P", vec![])],
            )],
        )]);
        let issues = run_checker(&tree);
        let with_fix: Vec<_> = issues
            .iter()
            .filter(|i| i.kind() == IssueKind::WrongChild && i.fix().is_some())
            .collect();
        assert_eq!(with_fix.len(), 1);
        // The list's pattern repeats LI, so LI is the wrapper, not Caption.
        assert!(matches!(
            with_fix[0].fix(),
            Some(Fix::WrapChild { wrapper_role, .. }) if wrapper_role == "LI"
        ));
    }

    #[test]
    fn wrong_child_pattern_reported() {
        // Caption must precede the items.
        let tree = build_tree(vec![elem(
            "Document",
            vec![elem(
                "L",
                vec![
                    elem("LI", vec![elem("LBody", vec![])]),
                    elem("Caption", vec![]),
                ],
            )],
        )]);
        let issues = run_checker(&tree);
        assert!(issues
            .iter()
            .any(|i| i.kind() == IssueKind::WrongChildPattern));
    }
}
