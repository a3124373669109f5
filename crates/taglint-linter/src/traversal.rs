//! Dependency-ordered, single-pass traversal over one structure tree.
//!
//! The engine topologically sorts its tree checkers by declared
//! prerequisites once, up front (a configuration error fails fast, never a
//! runtime one), then performs one depth-first pre-order walk invoking
//! every checker per node in that fixed order.

use crate::context::ElementContext;
use crate::error::ConfigError;
use crate::traits::{CheckerId, TreeChecker};
use std::collections::HashMap;
use taglint_fixes::Issue;
use taglint_tree::{DocumentServices, NodeId, StructureTree};

pub struct TraversalEngine {
    /// Checkers in dependency order.
    checkers: Vec<Box<dyn TreeChecker>>,
}

impl std::fmt::Debug for TraversalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalEngine")
            .field("checkers", &self.order())
            .finish()
    }
}

impl TraversalEngine {
    /// Order the checkers by prerequisites. Unknown prerequisites and
    /// cycles are configuration errors, detected before any traversal.
    pub fn new(checkers: Vec<Box<dyn TreeChecker>>) -> Result<Self, ConfigError> {
        Ok(Self {
            checkers: topological_order(checkers)?,
        })
    }

    /// Checker ids in the order they will run.
    #[must_use]
    pub fn order(&self) -> Vec<CheckerId> {
        self.checkers.iter().map(|c| c.id()).collect()
    }

    /// Walk the tree once, then run every checker's after-traversal hook,
    /// and return each checker's issues, grouped in dependency order.
    #[tracing::instrument(skip_all, fields(checkers = self.checkers.len()))]
    pub fn run(
        &mut self,
        tree: &StructureTree,
        services: &dyn DocumentServices,
    ) -> Vec<(CheckerId, Vec<Issue>)> {
        // One skip marker per checker: the depth at which it opted out of
        // its subtree, if any.
        let mut skip: Vec<Option<usize>> = vec![None; self.checkers.len()];
        self.visit(tree, services, tree.root(), 0, &mut skip);

        for checker in &mut self.checkers {
            tracing::trace!(checker = checker.id(), "after_traversal");
            checker.after_traversal(tree, services);
        }

        self.checkers
            .iter_mut()
            .map(|checker| (checker.id(), checker.take_issues()))
            .collect()
    }

    fn visit(
        &mut self,
        tree: &StructureTree,
        services: &dyn DocumentServices,
        node: NodeId,
        depth: usize,
        skip: &mut [Option<usize>],
    ) {
        let children: Vec<(NodeId, String)> = tree
            .structural_children(node)
            .into_iter()
            .map(|child| (child, tree.resolved_role(child).to_string()))
            .collect();
        let ctx = ElementContext {
            node,
            role: tree.resolved_role(node),
            parent_role: tree.parent(node).map(|p| tree.resolved_role(p)),
            children: &children,
            tree,
            services,
        };

        for i in 0..self.checkers.len() {
            if skip[i].is_none() && !self.checkers[i].enter_element(&ctx) {
                skip[i] = Some(depth);
            }
        }

        for (child, _) in &children {
            self.visit(tree, services, *child, depth + 1, skip);
        }

        for i in 0..self.checkers.len() {
            match skip[i] {
                None => self.checkers[i].leave_element(&ctx),
                // The node where the checker opted out still gets its leave
                // call; only the subtree below was suppressed.
                Some(d) if d == depth => {
                    skip[i] = None;
                    self.checkers[i].leave_element(&ctx);
                }
                Some(_) => {}
            }
        }
    }
}

/// Stable topological sort: among checkers whose prerequisites are
/// satisfied, registration order wins.
fn topological_order(
    checkers: Vec<Box<dyn TreeChecker>>,
) -> Result<Vec<Box<dyn TreeChecker>>, ConfigError> {
    let index_of: HashMap<CheckerId, usize> = checkers
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id(), i))
        .collect();

    let mut deps: Vec<Vec<usize>> = Vec::with_capacity(checkers.len());
    for checker in &checkers {
        let mut indices = Vec::new();
        for prerequisite in checker.prerequisites() {
            match index_of.get(prerequisite) {
                Some(&i) => indices.push(i),
                None => {
                    return Err(ConfigError::UnknownPrerequisite {
                        checker: checker.id().to_string(),
                        prerequisite: (*prerequisite).to_string(),
                    })
                }
            }
        }
        deps.push(indices);
    }

    let mut slots: Vec<Option<Box<dyn TreeChecker>>> = checkers.into_iter().map(Some).collect();
    let mut emitted = vec![false; slots.len()];
    let mut ordered = Vec::with_capacity(slots.len());

    while ordered.len() < slots.len() {
        let next = (0..slots.len())
            .find(|&i| !emitted[i] && deps[i].iter().all(|&d| emitted[d]));
        match next {
            Some(i) => {
                emitted[i] = true;
                if let Some(checker) = slots[i].take() {
                    ordered.push(checker);
                }
            }
            None => {
                let members = (0..slots.len())
                    .filter(|&i| !emitted[i])
                    .filter_map(|i| slots[i].as_ref().map(|c| c.id()))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ConfigError::PrerequisiteCycle { members });
            }
        }
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Checker;
    use std::cell::RefCell;
    use std::rc::Rc;
    use taglint_fixes::Severity;
    use taglint_test_utils::{build_tree, elem, StubServices};

    /// Records enter/leave events; optionally prunes one role's subtree.
    struct Recorder {
        id: CheckerId,
        prerequisites: Vec<CheckerId>,
        prune_role: Option<&'static str>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn new(id: CheckerId, log: Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                id,
                prerequisites: Vec::new(),
                prune_role: None,
                log,
            }
        }

        fn with_prerequisites(mut self, prerequisites: Vec<CheckerId>) -> Self {
            self.prerequisites = prerequisites;
            self
        }

        fn pruning(mut self, role: &'static str) -> Self {
            self.prune_role = Some(role);
            self
        }
    }

    impl Checker for Recorder {
        fn id(&self) -> CheckerId {
            self.id
        }

        fn description(&self) -> &'static str {
            "test recorder"
        }

        fn default_severity(&self) -> Severity {
            Severity::Info
        }
    }

    impl TreeChecker for Recorder {
        fn prerequisites(&self) -> &[CheckerId] {
            &self.prerequisites
        }

        fn enter_element(&mut self, ctx: &ElementContext<'_>) -> bool {
            self.log
                .borrow_mut()
                .push(format!("{}:enter:{}", self.id, ctx.role));
            self.prune_role != Some(ctx.role)
        }

        fn leave_element(&mut self, ctx: &ElementContext<'_>) {
            self.log
                .borrow_mut()
                .push(format!("{}:leave:{}", self.id, ctx.role));
        }

        fn take_issues(&mut self) -> Vec<Issue> {
            Vec::new()
        }
    }

    fn engine(checkers: Vec<Box<dyn TreeChecker>>) -> TraversalEngine {
        TraversalEngine::new(checkers).unwrap()
    }

    #[test]
    fn unconstrained_checkers_keep_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let e = engine(vec![
            Box::new(Recorder::new("b", Rc::clone(&log))),
            Box::new(Recorder::new("a", Rc::clone(&log))),
        ]);
        assert_eq!(e.order(), vec!["b", "a"]);
    }

    #[test]
    fn prerequisites_reorder_checkers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let e = engine(vec![
            Box::new(Recorder::new("late", Rc::clone(&log)).with_prerequisites(vec!["early"])),
            Box::new(Recorder::new("early", Rc::clone(&log))),
        ]);
        assert_eq!(e.order(), vec!["early", "late"]);
    }

    #[test]
    fn debug_output_lists_checkers_in_run_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let e = engine(vec![
            Box::new(Recorder::new("late", Rc::clone(&log)).with_prerequisites(vec!["early"])),
            Box::new(Recorder::new("early", log)),
        ]);
        assert_eq!(
            format!("{e:?}"),
            r#"TraversalEngine { checkers: ["early", "late"] }"#
        );
    }

    #[test]
    fn unknown_prerequisite_is_a_config_error() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let err = TraversalEngine::new(vec![Box::new(
            Recorder::new("a", log).with_prerequisites(vec!["ghost"]),
        ) as Box<dyn TreeChecker>])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownPrerequisite {
                checker: "a".to_string(),
                prerequisite: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn cyclic_prerequisites_fail_before_traversal() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let err = TraversalEngine::new(vec![
            Box::new(Recorder::new("a", Rc::clone(&log)).with_prerequisites(vec!["b"]))
                as Box<dyn TreeChecker>,
            Box::new(Recorder::new("b", Rc::clone(&log)).with_prerequisites(vec!["a"])),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::PrerequisiteCycle { ref members } if members.contains('a') && members.contains('b')));
    }

    #[test]
    fn walk_is_preorder_with_matched_leaves() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut e = engine(vec![Box::new(Recorder::new("w", Rc::clone(&log)))]);
        let tree = build_tree(vec![elem(
            "Document",
            vec![elem("P", vec![]), elem("L", vec![])],
        )]);
        e.run(&tree, &StubServices::new());

        assert_eq!(
            *log.borrow(),
            vec![
                "w:enter:StructTreeRoot",
                "w:enter:Document",
                "w:enter:P",
                "w:leave:P",
                "w:enter:L",
                "w:leave:L",
                "w:leave:Document",
                "w:leave:StructTreeRoot",
            ]
        );
    }

    #[test]
    fn pruning_affects_only_the_pruning_checker() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut e = engine(vec![
            Box::new(Recorder::new("pruner", Rc::clone(&log)).pruning("Document")),
            Box::new(Recorder::new("full", Rc::clone(&log))),
        ]);
        let tree = build_tree(vec![elem("Document", vec![elem("P", vec![])])]);
        e.run(&tree, &StubServices::new());

        let events = log.borrow();
        // The pruner never sees P but still leaves Document.
        assert!(!events.contains(&"pruner:enter:P".to_string()));
        assert!(events.contains(&"pruner:leave:Document".to_string()));
        // The other checker visits the whole subtree.
        assert!(events.contains(&"full:enter:P".to_string()));
        assert!(events.contains(&"full:leave:P".to_string()));
    }
}
