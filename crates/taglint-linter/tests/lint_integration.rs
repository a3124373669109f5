//! End-to-end detection and remediation through the public API.

use std::sync::Arc;
use taglint_fixes::{IssueKind, Resolution, Severity};
use taglint_linter::{CheckConfig, Linter};
use taglint_schema::Schema;
use taglint_test_utils::{build_tree, content, elem, StubServices};

fn recommended() -> Arc<Schema> {
    Arc::new(Schema::recommended())
}

#[test]
fn conformant_document_is_clean() {
    let tree = build_tree(vec![elem(
        "Document",
        vec![elem(
            "L",
            vec![elem(
                "LI",
                vec![
                    elem("Lbl", vec![content(1, 0)]),
                    elem("LBody", vec![content(1, 1)]),
                ],
            )],
        )],
    )]);
    let linter = Linter::new(CheckConfig::default());
    let issues = linter
        .detect(&tree, recommended(), &StubServices::new())
        .unwrap();
    assert!(issues.is_empty(), "unexpected: {:?}", issues.as_slice());
}

#[test]
fn flat_paragraph_list_is_restructured_into_item_pairs() {
    // A list whose four paragraphs should be two LI(Lbl, LBody) items.
    let mut tree = build_tree(vec![elem(
        "Document",
        vec![elem(
            "L",
            vec![
                elem("P", vec![content(1, 0)]),
                elem("P", vec![content(1, 1)]),
                elem("P", vec![content(1, 2)]),
                elem("P", vec![content(1, 3)]),
            ],
        )],
    )]);
    let linter = Linter::new(CheckConfig::default());
    let mut issues = linter
        .detect(&tree, recommended(), &StubServices::new())
        .unwrap();

    let wrong_children: Vec<_> = issues
        .iter()
        .filter(|i| i.kind() == IssueKind::WrongChild)
        .collect();
    assert_eq!(wrong_children.len(), 4);
    assert_eq!(
        wrong_children.iter().filter(|i| i.fix().is_some()).count(),
        1,
        "one fix per offending parent"
    );

    let report = linter.remediate(&mut tree, &mut issues);
    assert_eq!(report.resolved.len(), 1);
    assert!(report.is_clean());
    assert_eq!(
        report.resolved[0].resolution(),
        &Resolution::Resolved("wrap 4 children into 2 LI(Lbl, LBody) pairs".to_string())
    );

    // The list now holds two items, each a Lbl/LBody pair, content intact.
    let doc = tree.structural_children(tree.root())[0];
    let list = tree.structural_children(doc)[0];
    let items = tree.structural_children(list);
    assert_eq!(items.len(), 2);
    for item in items {
        assert_eq!(tree.resolved_role(item), "LI");
        let parts = tree.structural_children(item);
        assert_eq!(parts.len(), 2);
        assert_eq!(tree.resolved_role(parts[0]), "Lbl");
        assert_eq!(tree.resolved_role(parts[1]), "LBody");
        assert_eq!(tree.children(parts[0]).len(), 1);
        assert_eq!(tree.children(parts[1]).len(), 1);
    }

    // A second detection pass over the remediated tree finds no
    // wrong-child violations.
    let issues = linter
        .detect(&tree, recommended(), &StubServices::new())
        .unwrap();
    assert!(issues.iter().all(|i| i.kind() != IssueKind::WrongChild));
}

#[test]
fn empty_node_removal_reported_end_to_end() {
    let mut tree = build_tree(vec![elem(
        "Document",
        vec![elem("P", vec![content(1, 0)]), elem("Sect", vec![])],
    )]);
    let linter = Linter::new(CheckConfig::default());
    let mut issues = linter
        .detect(&tree, recommended(), &StubServices::new())
        .unwrap();
    let report = linter.remediate(&mut tree, &mut issues);

    assert_eq!(report.resolved.len(), 1);
    assert_eq!(report.resolved[0].kind(), IssueKind::EmptyNode);
    let doc = tree.structural_children(tree.root())[0];
    assert_eq!(tree.structural_children(doc).len(), 1);
}

#[test]
fn yaml_config_disables_and_reclassifies_checkers() {
    let yaml = r"
checkers:
  empty_nodes: off
  page_grouping: warning
";
    let config: CheckConfig = serde_yaml::from_str(yaml).unwrap();
    let tree = build_tree(vec![
        elem("Document", vec![elem("P", vec![content(1, 0)]), elem("Sect", vec![])]),
        elem("Part", vec![elem("P", vec![content(1, 1)])]),
    ]);
    let linter = Linter::new(config);
    let issues = linter
        .detect(&tree, recommended(), &StubServices::new())
        .unwrap();

    assert!(issues.iter().all(|i| i.kind() != IssueKind::EmptyNode));
    let ungrouped: Vec<_> = issues
        .iter()
        .filter(|i| i.kind() == IssueKind::UngroupedPageContent)
        .collect();
    assert_eq!(ungrouped.len(), 1);
    assert_eq!(ungrouped[0].severity(), Severity::Warning);
}

#[test]
fn role_map_cycle_is_reported_alongside_tree_issues() {
    let mut tree = build_tree(vec![elem("Document", vec![elem("P", vec![content(1, 0)])])]);
    tree.add_role_alias("A", "B");
    tree.add_role_alias("B", "A");
    let linter = Linter::new(CheckConfig::default());
    let issues = linter
        .detect(&tree, recommended(), &StubServices::new())
        .unwrap();
    assert!(issues.iter().any(|i| i.kind() == IssueKind::RoleMapCycle));
}
