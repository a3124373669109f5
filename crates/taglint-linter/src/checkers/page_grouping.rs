//! Checks that each page's content hangs under a single top-level container.
//!
//! Content scattered across several top-level containers usually means the
//! reading order interleaves unrelated branches of the tree. The checker
//! records, per page, every top-level container that owns content on that
//! page, and reports after the walk.

use crate::checkers::{PAGE_GROUPING, SCHEMA_VALIDATION};
use crate::context::ElementContext;
use crate::traits::{Checker, CheckerId, TreeChecker};
use std::collections::{BTreeMap, BTreeSet};
use taglint_fixes::{Issue, IssueKind, Location, Severity};
use taglint_tree::{Child, DocumentServices, NodeId, PageNumber, StructureTree};

#[derive(Default)]
pub struct PageGroupingChecker {
    containers_by_page: BTreeMap<PageNumber, BTreeSet<NodeId>>,
    issues: Vec<Issue>,
}

impl PageGroupingChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checker for PageGroupingChecker {
    fn id(&self) -> CheckerId {
        PAGE_GROUPING
    }

    fn description(&self) -> &'static str {
        "Reports pages whose content is split across several top-level containers"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }
}

impl TreeChecker for PageGroupingChecker {
    fn prerequisites(&self) -> &[CheckerId] {
        &[SCHEMA_VALIDATION]
    }

    fn enter_element(&mut self, ctx: &ElementContext<'_>) -> bool {
        if ctx.is_root() {
            return true;
        }
        let container = ctx.tree.top_level_container(ctx.node);
        for child in ctx.tree.children(ctx.node) {
            let page = match child {
                Child::Node(_) => continue,
                Child::MarkedContent { page, .. } => Some(*page),
                Child::ObjectRef(object) => ctx.services.page_number_for(*object),
            };
            match page {
                Some(page) => {
                    self.containers_by_page
                        .entry(page)
                        .or_default()
                        .insert(container);
                }
                None => self.issues.push(Issue::new(
                    IssueKind::MalformedTree,
                    Severity::Info,
                    Location::Node(ctx.node),
                    format!(
                        "object reference under `{}` cannot be resolved to a page",
                        ctx.role
                    ),
                )),
            }
        }
        true
    }

    fn after_traversal(&mut self, tree: &StructureTree, _services: &dyn DocumentServices) {
        for (page, containers) in &self.containers_by_page {
            if containers.len() > 1 {
                let roles: Vec<&str> = containers
                    .iter()
                    .map(|&container| tree.resolved_role(container))
                    .collect();
                self.issues.push(Issue::new(
                    IssueKind::UngroupedPageContent,
                    Severity::Info,
                    Location::Page(*page),
                    format!(
                        "content on page {page} is split across {} top-level containers [{}]",
                        containers.len(),
                        roles.join(", ")
                    ),
                ));
            }
        }
        self.containers_by_page.clear();
    }

    fn take_issues(&mut self) -> Vec<Issue> {
        std::mem::take(&mut self.issues)
    }
}
