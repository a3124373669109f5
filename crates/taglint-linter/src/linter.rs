//! The linting session facade: configured detection plus remediation.

use crate::config::CheckConfig;
use crate::error::ConfigError;
use crate::registry;
use crate::traits::TreeChecker;
use crate::traversal::TraversalEngine;
use std::collections::HashSet;
use std::sync::Arc;
use taglint_fixes::{apply_fixes, Issue, IssueList, Resolution};
use taglint_schema::Schema;
use taglint_tree::{DocumentServices, StructureTree};

/// Outcome of one remediation pass.
#[derive(Debug, Default)]
pub struct RemediationReport {
    /// Issues whose fix was applied, in detection order.
    pub resolved: Vec<Issue>,
    pub failed: usize,
    pub skipped: usize,
    /// Issues still open after the pass (no fix, or checker-only findings).
    pub remaining_open: usize,
}

impl RemediationReport {
    /// True when every fix-bearing issue was applied cleanly.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// A configured linting session over one document.
///
/// Detection never mutates the tree; remediation happens only through
/// [`Linter::remediate`], on the issues detection produced.
#[derive(Debug, Default)]
pub struct Linter {
    config: CheckConfig,
}

impl Linter {
    #[must_use]
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run every enabled checker over the tree and collect their issues,
    /// document-level checkers first, then the shared traversal.
    ///
    /// A disabled checker that an enabled one declares as prerequisite
    /// still runs, for ordering; its issues are discarded.
    #[tracing::instrument(skip_all, fields(nodes = tree.node_count()))]
    pub fn detect(
        &self,
        tree: &StructureTree,
        schema: Arc<Schema>,
        services: &dyn DocumentServices,
    ) -> Result<IssueList, ConfigError> {
        self.config.validate()?;

        let mut issues = IssueList::new();

        for mut checker in registry::document_checkers(&schema) {
            if !self.config.is_enabled(checker.id()) {
                continue;
            }
            let severity = self.config.severity_override(checker.id());
            let mut found = checker.check(tree, services);
            tracing::debug!(checker = checker.id(), issues = found.len(), "document check");
            if let Some(severity) = severity {
                for issue in &mut found {
                    issue.set_severity(severity);
                }
            }
            issues.extend(found);
        }

        let all = registry::tree_checkers(schema);
        let keep = self.enabled_with_prerequisites(&all);
        let selected: Vec<Box<dyn TreeChecker>> = all
            .into_iter()
            .filter(|checker| keep.contains(checker.id()))
            .collect();

        let mut engine = TraversalEngine::new(selected)?;
        for (id, mut found) in engine.run(tree, services) {
            if !self.config.is_enabled(id) {
                continue;
            }
            if let Some(severity) = self.config.severity_override(id) {
                for issue in &mut found {
                    issue.set_severity(severity);
                }
            }
            issues.extend(found);
        }

        tracing::info!(total = issues.len(), "detection finished");
        Ok(issues)
    }

    /// Apply the fixes carried by `issues` and summarize the outcome.
    #[tracing::instrument(skip_all, fields(issues = issues.len()))]
    pub fn remediate(&self, tree: &mut StructureTree, issues: &mut IssueList) -> RemediationReport {
        let resolved = apply_fixes(tree, issues);
        let mut report = RemediationReport {
            resolved,
            ..RemediationReport::default()
        };
        for issue in issues.iter() {
            match issue.resolution() {
                Resolution::Open => report.remaining_open += 1,
                Resolution::Failed(_) => report.failed += 1,
                Resolution::Skipped(_) => report.skipped += 1,
                Resolution::Resolved(_) => {}
            }
        }
        report
    }

    /// Enabled tree-checker ids plus, transitively, the prerequisites the
    /// enabled ones declare.
    fn enabled_with_prerequisites(&self, all: &[Box<dyn TreeChecker>]) -> HashSet<&'static str> {
        let mut keep: HashSet<&'static str> = all
            .iter()
            .map(|checker| checker.id())
            .filter(|id| self.config.is_enabled(id))
            .collect();
        loop {
            let missing: Vec<&'static str> = all
                .iter()
                .filter(|checker| keep.contains(checker.id()))
                .flat_map(|checker| checker.prerequisites().iter().copied())
                .filter(|prerequisite| !keep.contains(prerequisite))
                .collect();
            if missing.is_empty() {
                break;
            }
            keep.extend(missing);
        }
        keep
    }
}
