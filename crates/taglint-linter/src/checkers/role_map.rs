//! Role-alias map hygiene: cycles and aliases that resolve to nothing.
//!
//! Role resolution follows alias chains with a bounded hop count, so a
//! cyclic map does not hang the linter, but every role on the cycle
//! silently resolves to an arbitrary member. Chains whose terminus is not
//! a schema role are equally suspect: every node tagged with them will be
//! reported as unknown anyway, and the alias map is where to repair that.

use crate::checkers::ROLE_MAP;
use crate::traits::{Checker, CheckerId, DocumentChecker};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use taglint_fixes::{Issue, IssueKind, Location, Severity};
use taglint_schema::Schema;
use taglint_tree::{DocumentServices, StructureTree};

pub struct RoleMapChecker {
    schema: Arc<Schema>,
}

impl RoleMapChecker {
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }
}

impl Checker for RoleMapChecker {
    fn id(&self) -> CheckerId {
        ROLE_MAP
    }

    fn description(&self) -> &'static str {
        "Detects cycles and dead ends in the document role-alias map"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
}

impl DocumentChecker for RoleMapChecker {
    fn check(&mut self, tree: &StructureTree, _services: &dyn DocumentServices) -> Vec<Issue> {
        let aliases = tree.role_aliases();
        let mut issues = Vec::new();
        let mut on_cycle: HashSet<&str> = HashSet::new();
        let mut dead_ends: BTreeSet<&str> = BTreeSet::new();

        // Sorted start points keep reports deterministic across runs.
        let mut starts: Vec<&str> = aliases.keys().map(String::as_str).collect();
        starts.sort_unstable();

        for start in starts {
            if on_cycle.contains(start) {
                continue;
            }
            let mut seen: Vec<&str> = Vec::new();
            let mut current = start;
            loop {
                if on_cycle.contains(current) {
                    // Chain runs into a cycle already reported from
                    // another start point.
                    break;
                }
                if let Some(pos) = seen.iter().position(|&r| r == current) {
                    // Members before `pos` lead into the cycle but are not on it.
                    let mut cycle: Vec<&str> = seen[pos..].to_vec();
                    on_cycle.extend(cycle.iter().copied());
                    cycle.sort_unstable();
                    issues.push(Issue::new(
                        IssueKind::RoleMapCycle,
                        Severity::Warning,
                        Location::Document,
                        format!("role map contains a cycle through [{}]", cycle.join(", ")),
                    ));
                    break;
                }
                seen.push(current);
                match aliases.get(current) {
                    Some(next) => current = next,
                    None => {
                        if !self.schema.contains(current) {
                            dead_ends.insert(current);
                        }
                        break;
                    }
                }
            }
        }

        for terminus in dead_ends {
            issues.push(Issue::new(
                IssueKind::UnknownRole,
                Severity::Warning,
                Location::Document,
                format!("role aliases resolve to `{terminus}`, which is not a schema role"),
            ));
        }
        issues
    }
}
