//! Priority-ordered, conflict-aware fix application.

use crate::fix::Fix;
use crate::issue::{Issue, IssueList};
use taglint_tree::StructureTree;

/// Apply every fix carried by `issues`, in ascending priority order, and
/// record a terminal resolution on each fix-bearing issue. Returns the
/// issues that ended up `Resolved`.
///
/// Conflict handling: before a fix runs it is tested against every
/// previously *applied* fix's `invalidates` relation; a superseded fix is
/// skipped without running. Skipped and failed fixes never enter the
/// applied set, so failure does not cascade conflicts. The relation is
/// consulted pairwise and lazily; no transitive closure is computed.
#[tracing::instrument(skip_all, fields(total = issues.len()))]
pub fn apply_fixes(tree: &mut StructureTree, issues: &mut IssueList) -> Vec<Issue> {
    // Stable sort: equal priorities keep detection order, which is itself
    // deterministic (document-level issues first, then traversal order).
    let mut order: Vec<(usize, i32)> = issues
        .fixable()
        .filter_map(|(index, issue)| issue.fix().map(|fix| (index, fix.priority())))
        .collect();
    order.sort_by_key(|&(_, priority)| priority);
    tracing::debug!(fixable = order.len(), "applying fixes");

    let mut applied: Vec<Fix> = Vec::new();
    for (index, _) in order {
        let Some(fix) = issues.get(index).and_then(Issue::fix).cloned() else {
            continue;
        };

        if let Some(winner) = applied.iter().find(|prior| prior.invalidates(&fix)) {
            let note = format!("superseded by {}", winner.describe());
            tracing::debug!(fix = %fix.describe(), %note, "skipping fix");
            if let Some(issue) = issues.get_mut(index) {
                issue.skip(note);
            }
            continue;
        }

        match fix.apply(tree) {
            Ok(()) => {
                tracing::debug!(fix = %fix.describe(), "fix applied");
                if let Some(issue) = issues.get_mut(index) {
                    issue.resolve(fix.describe());
                }
                applied.push(fix);
            }
            Err(error) => {
                tracing::warn!(fix = %fix.describe(), %error, "fix failed");
                if let Some(issue) = issues.get_mut(index) {
                    issue.fail(format!("{}: {error}", fix.describe()));
                }
            }
        }
    }

    issues
        .iter()
        .filter(|issue| issue.is_resolved())
        .cloned()
        .collect()
}
