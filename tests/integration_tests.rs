//! Integration tests for option tree resolution and validation
//!
//! These tests drive the public API end to end: documents are built either
//! with the builders or from JSON/YAML, then resolved and validated.

use once_cell::sync::Lazy;
use option_tree_rs::options::condition::{evaluate, parse, ConditionExpr};
use option_tree_rs::options::loader::{DocumentFormat, DocumentLoader};
use option_tree_rs::options::selections::LineItemOptionSelections;
use option_tree_rs::options::tree::{
    resolve, resolve_visible_nodes, validate_document, validate_option_tree_v2, BranchEdge,
    NodeKind, OptionNode, OptionTree, ValidationError,
};
use serde_json::{json, Value};

// ============================================================================
// Fixtures
// ============================================================================

/// Two-question tree: Q2 only appears when Q1 is answered "yes"
static YES_NO_TREE: Lazy<OptionTree> = Lazy::new(|| {
    OptionTree::new(vec!["Q1"])
        .with_node(
            OptionNode::new("Q1", NodeKind::Question, "Need hemming?").with_child(
                BranchEdge::to("Q2")
                    .when(ConditionExpr::equals("Q1", "yes"))
                    .tagged("finishing"),
            ),
        )
        .with_node(OptionNode::new("Q2", NodeKind::Question, "Hem style"))
});

/// Banner tree authored as YAML, with shared descendants and sort orders
const BANNER_YAML: &str = r#"
schemaVersion: 2
rootNodeIds: [material, size]
meta:
  title: Banner
nodes:
  material:
    id: material
    kind: question
    label: Material
    ui: { sortOrder: 1 }
    edges:
      children:
        - toNodeId: laminate
          effectTag: coating
          when: { op: equals, ref: material, value: vinyl }
        - toNodeId: grommets
          when: { op: truthy, ref: material }
  size:
    id: size
    kind: question
    label: Size
    edges:
      children:
        - toNodeId: grommets
          effectTag: hardware
  laminate:
    id: laminate
    kind: question
    label: Laminate
    ui: { sortOrder: 5 }
  grommets:
    id: grommets
    kind: question
    label: Grommets
    ui: { sortOrder: 2 }
    visibility:
      condition:
        op: not
        arg: { op: equals, ref: size, value: tiny }
"#;

static BANNER_TREE: Lazy<OptionTree> = Lazy::new(|| {
    DocumentLoader::parse(BANNER_YAML, DocumentFormat::Yaml).expect("banner fixture parses")
});

fn selections(pairs: &[(&str, Value)]) -> LineItemOptionSelections {
    let mut sel = LineItemOptionSelections::new();
    for (reference, value) in pairs {
        sel.select(*reference, value.clone());
    }
    sel
}

fn chain_tree() -> OptionTree {
    OptionTree::new(vec!["A"])
        .with_node(OptionNode::new("A", NodeKind::Question, "A").with_child(BranchEdge::to("B")))
        .with_node(OptionNode::new("B", NodeKind::Group, "B").with_child(BranchEdge::to("C")))
        .with_node(OptionNode::new("C", NodeKind::Question, "C"))
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_branch_follows_answer() {
    let yes = selections(&[("Q1", json!("yes"))]);
    assert_eq!(resolve_visible_nodes(&YES_NO_TREE, &yes), vec!["Q1", "Q2"]);

    let no = selections(&[("Q1", json!("no"))]);
    assert_eq!(resolve_visible_nodes(&YES_NO_TREE, &no), vec!["Q1"]);

    let unanswered = LineItemOptionSelections::new();
    assert_eq!(resolve_visible_nodes(&YES_NO_TREE, &unanswered), vec!["Q1"]);
}

#[test]
fn test_path_tags_follow_taken_edges() {
    let yes = selections(&[("Q1", json!("yes"))]);
    assert_eq!(resolve(&YES_NO_TREE, &yes).path_tags, vec!["finishing"]);

    let no = selections(&[("Q1", json!("no"))]);
    assert!(resolve(&YES_NO_TREE, &no).path_tags.is_empty());
}

#[test]
fn test_hidden_node_hides_subtree() {
    let tree = chain_tree();
    let sel = LineItemOptionSelections::new();
    assert_eq!(resolve_visible_nodes(&tree, &sel), vec!["A", "B", "C"]);

    // C goes with B
    let hidden = tree.with_node(
        OptionNode::new("B", NodeKind::Group, "B")
            .with_child(BranchEdge::to("C"))
            .with_visibility(ConditionExpr::truthy("showB")),
    );
    assert_eq!(resolve_visible_nodes(&hidden, &sel), vec!["A"]);

    let show = selections(&[("showB", json!(true))]);
    assert_eq!(resolve_visible_nodes(&hidden, &show), vec!["A", "B", "C"]);
}

#[test]
fn test_order_independent_of_edge_order() {
    let children = ["c2", "c1", "c3"];
    let build = |order: &[&str]| {
        let mut root = OptionNode::new("root", NodeKind::Group, "root");
        for id in order {
            root = root.with_child(BranchEdge::to(*id));
        }
        OptionTree::new(vec!["root"])
            .with_node(root)
            .with_node(OptionNode::new("c1", NodeKind::Question, "c1").with_sort_order(2.0))
            .with_node(OptionNode::new("c2", NodeKind::Question, "c2").with_sort_order(1.0))
            .with_node(OptionNode::new("c3", NodeKind::Question, "c3").with_sort_order(1.0))
    };

    let sel = LineItemOptionSelections::new();
    let expected = vec!["root", "c2", "c3", "c1"];
    for order in [
        children,
        ["c1", "c2", "c3"],
        ["c3", "c1", "c2"],
        ["c3", "c2", "c1"],
    ] {
        assert_eq!(resolve_visible_nodes(&build(&order), &sel), expected);
    }
}

#[test]
fn test_yaml_banner_resolution() {
    let vinyl = selections(&[("material", json!("vinyl")), ("size", json!("large"))]);
    let resolution = resolve(&BANNER_TREE, &vinyl);
    assert_eq!(
        resolution.visible_node_ids,
        vec!["material", "grommets", "laminate", "size"]
    );
    assert_eq!(resolution.path_tags, vec!["coating"]);

    // hidden grommets is not retried through size's edge
    let tiny = selections(&[("material", json!("vinyl")), ("size", json!("tiny"))]);
    assert_eq!(
        resolve_visible_nodes(&BANNER_TREE, &tiny),
        vec!["material", "laminate", "size"]
    );

    let unanswered = LineItemOptionSelections::new();
    let resolution = resolve(&BANNER_TREE, &unanswered);
    assert_eq!(resolution.visible_node_ids, vec!["material", "size", "grommets"]);
    assert_eq!(resolution.path_tags, vec!["hardware"]);
}

#[test]
fn test_resolution_is_idempotent() {
    let sel = selections(&[("material", json!("vinyl"))]);
    let first = resolve(&BANNER_TREE, &sel);
    let second = resolve(&BANNER_TREE, &sel);
    assert_eq!(first, second);
}

#[test]
fn test_cyclic_tree_still_resolves() {
    let tree = chain_tree().with_node(
        OptionNode::new("C", NodeKind::Question, "C").with_child(BranchEdge::to("A")),
    );
    let sel = LineItemOptionSelections::new();
    assert_eq!(resolve_visible_nodes(&tree, &sel), vec!["A", "B", "C"]);
}

#[test]
fn test_unvalidated_document_degrades_fail_closed() {
    let tree: OptionTree = serde_json::from_value(json!({
        "schemaVersion": 2,
        "rootNodeIds": ["A", 5, null],
        "nodes": {
            "A": {"id": "A", "kind": "question"}
        }
    }))
    .unwrap();
    assert_eq!(
        resolve_visible_nodes(&tree, &LineItemOptionSelections::new()),
        vec!["A"]
    );
}

#[test]
fn test_refresh_resolved_cache() {
    let mut sel = selections(&[("Q1", json!("yes"))]);
    let cache = sel.refresh_resolved(&YES_NO_TREE).clone();
    assert_eq!(cache.visible_node_ids, vec!["Q1", "Q2"]);
    assert_eq!(sel.resolved.as_ref(), Some(&cache));

    let doc = serde_json::to_value(&sel).unwrap();
    assert_eq!(
        doc["resolved"],
        json!({"visibleNodeIds": ["Q1", "Q2"], "pathTags": ["finishing"]})
    );

    sel.select("Q1", "no");
    assert!(sel.resolved.is_none());
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn test_missing_refs_fail_closed() {
    let sel = LineItemOptionSelections::new();
    let selected = &sel.selected;

    assert!(!evaluate(&ConditionExpr::equals("x", Value::Null), selected));
    assert!(!evaluate(&ConditionExpr::not_equals("x", "a"), selected));
    assert!(!evaluate(&ConditionExpr::truthy("x"), selected));
    assert!(!evaluate(&ConditionExpr::contains("x", "a"), selected));
    assert!(evaluate(
        &ConditionExpr::not(ConditionExpr::truthy("x")),
        selected
    ));
}

#[test]
fn test_shorthand_and_json_agree() {
    let sel = selections(&[
        ("finish", json!("gloss")),
        ("addons", json!(["rush", "proof"])),
        ("qty", json!(250)),
    ]);

    let shorthand =
        parse("finish == 'gloss' and (addons contains 'rush' or not truthy(qty))").unwrap();
    let from_json: ConditionExpr = serde_json::from_value(json!({
        "op": "and",
        "args": [
            {"op": "equals", "ref": "finish", "value": "gloss"},
            {"op": "or", "args": [
                {"op": "contains", "ref": "addons", "value": "rush"},
                {"op": "not", "arg": {"op": "truthy", "ref": "qty"}}
            ]}
        ]
    }))
    .unwrap();

    assert_eq!(shorthand, from_json);
    assert!(evaluate(&shorthand, &sel.selected));
}

#[test]
fn test_numeric_values_compare_by_value() {
    let sel = selections(&[("qty", json!(100))]);
    assert!(evaluate(&ConditionExpr::equals("qty", 100.0), &sel.selected));
    assert!(!evaluate(&ConditionExpr::equals("qty", "100"), &sel.selected));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_fixtures_are_valid() {
    assert!(validate_option_tree_v2(&YES_NO_TREE).is_ok());
    assert!(validate_option_tree_v2(&BANNER_TREE).is_ok());
    assert!(validate_option_tree_v2(&chain_tree()).is_ok());
}

#[test]
fn test_cycle_detected_then_fixed() {
    let cyclic = OptionTree::new(vec!["A"])
        .with_node(OptionNode::new("A", NodeKind::Question, "A").with_child(BranchEdge::to("B")))
        .with_node(OptionNode::new("B", NodeKind::Question, "B").with_child(BranchEdge::to("A")));

    let report = validate_option_tree_v2(&cyclic);
    assert!(!report.is_ok());
    assert!(report
        .errors()
        .iter()
        .any(|e| matches!(e, ValidationError::Cycle(_))));

    let fixed = cyclic.with_node(OptionNode::new("B", NodeKind::Question, "B"));
    assert!(validate_option_tree_v2(&fixed).is_ok());
}

#[test]
fn test_dangling_edge_reported_once() {
    let tree = OptionTree::new(vec!["A"])
        .with_node(OptionNode::new("A", NodeKind::Question, "A").with_child(BranchEdge::to("Z")));

    let report = validate_option_tree_v2(&tree);
    let messages = report.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("A -> Z"));
}

#[test]
fn test_raw_document_accumulates_errors() {
    let doc = json!({
        "schemaVersion": 1,
        "rootNodeIds": ["A", "missing"],
        "nodes": {
            "A": {"id": "A", "kind": "question", "label": "A",
                  "edges": {"children": [{"toNodeId": "Z"}]}},
            "B": {"id": "not-b", "kind": "question", "label": "B"}
        }
    });

    let report = validate_document(&doc);
    let messages = report.messages();
    assert!(messages.iter().any(|m| m.contains("schemaVersion")));
    assert!(messages.iter().any(|m| m.contains("missing")));
    assert!(messages.iter().any(|m| m.contains("A -> Z")));
    assert!(messages.iter().any(|m| m.contains("not-b")));

    let serialized = serde_json::to_value(&report).unwrap();
    assert_eq!(serialized["ok"], json!(false));
    assert_eq!(serialized["errors"].as_array().unwrap().len(), messages.len());
}

#[test]
fn test_loosely_typed_node_keeps_structural_checks() {
    let doc = json!({
        "schemaVersion": 2,
        "rootNodeIds": ["A"],
        "nodes": {
            "A": {"id": "A", "kind": "question",
                  "edges": {"children": [{"toNodeId": "B"}]}},
            "B": {"id": "B", "kind": "question",
                  "ui": {"sortOrder": 1.5},
                  "pricingImpact": [{"kind": "tiered"}],
                  "edges": {"children": [{"toNodeId": "A"}]}}
        }
    });

    let report = validate_document(&doc);
    assert_eq!(report.messages(), vec!["cycle detected at node: A"]);

    // a node the typed model rejects still counts as existing
    let mut broken = doc.clone();
    broken["nodes"]["B"]["kind"] = json!("spaceship");
    let messages = validate_document(&broken).messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("malformed node 'B'"));
    assert_eq!(messages[1], "cycle detected at node: A");
    assert!(!messages.iter().any(|m| m.contains("A -> B")));
}

#[test]
fn test_valid_report_serializes_ok() {
    let raw: Value = DocumentLoader::parse(BANNER_YAML, DocumentFormat::Yaml).unwrap();
    let report = validate_document(&raw);
    assert_eq!(serde_json::to_value(&report).unwrap(), json!({"ok": true}));
}
