//! Structural validation of option trees
//!
//! Checks run in a fixed order and every violation is collected, so one call
//! yields the complete diagnostic list for an editor:
//!
//! 1. `schemaVersion` is 2
//! 2. `rootNodeIds` is a non-empty array
//! 3. `nodes` is an object
//! 4. every node's `id` matches its key
//! 5. every root exists
//! 6. every edge target exists
//! 7. nothing reachable from the roots forms a cycle
//!
//! Refs named inside conditions are not checked against the node set.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use super::types::{OptionNode, OptionTree, SCHEMA_VERSION};

/// One structural violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("schemaVersion must be 2 (found {0})")]
    SchemaVersion(String),

    #[error("rootNodeIds must be a non-empty array")]
    EmptyRoots,

    #[error("nodes must be an object")]
    NodesNotObject,

    #[error("node key '{key}' does not match its id '{id}'")]
    IdMismatch { key: String, id: String },

    #[error("root node not found: {0}")]
    MissingRoot(String),

    #[error("edge target not found: {from} -> {to}")]
    DanglingEdge { from: String, to: String },

    #[error("cycle detected at node: {0}")]
    Cycle(String),

    #[error("malformed {location}: {message}")]
    Malformed { location: String, message: String },
}

/// Outcome of a validation pass, serialized as `{"ok": true}` or
/// `{"ok": false, "errors": [...]}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Human-readable messages, in check order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire {
            ok: bool,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            errors: Vec<String>,
        }
        Wire {
            ok: self.is_ok(),
            errors: self.messages(),
        }
        .serialize(serializer)
    }
}

/// Validate a typed schema-2 option tree
pub fn validate_option_tree_v2(tree: &OptionTree) -> ValidationReport {
    let mut errors = Vec::new();

    if tree.schema_version != SCHEMA_VERSION {
        errors.push(ValidationError::SchemaVersion(tree.schema_version.to_string()));
    }
    if tree.root_node_ids.is_empty() {
        errors.push(ValidationError::EmptyRoots);
    }
    check_structure(&Outline::of_tree(tree), &mut errors);

    ValidationReport { errors }
}

/// Validate a raw tree document
///
/// Every check runs on the JSON itself, so a document that would not even
/// deserialize still gets a full report. A node that fails to decode is
/// reported as malformed in addition to, never instead of, the structural
/// findings: its `id` and edge targets still take part in checks 4 to 7.
pub fn validate_document(doc: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    let schema_version = doc.get("schemaVersion");
    if schema_version.and_then(Value::as_i64) != Some(SCHEMA_VERSION) {
        let found = schema_version.map_or_else(|| "nothing".to_string(), Value::to_string);
        errors.push(ValidationError::SchemaVersion(found));
    }

    let mut roots = Vec::new();
    match doc.get("rootNodeIds") {
        Some(Value::Array(raw_roots)) if !raw_roots.is_empty() => {
            for root in raw_roots {
                match root.as_str() {
                    Some(id) => roots.push(id),
                    None => errors.push(ValidationError::MissingRoot(root.to_string())),
                }
            }
        }
        _ => errors.push(ValidationError::EmptyRoots),
    }

    let mut nodes = BTreeMap::new();
    match doc.get("nodes") {
        Some(Value::Object(raw_nodes)) => {
            for (key, raw) in raw_nodes {
                if let Err(e) = OptionNode::deserialize(raw) {
                    errors.push(ValidationError::Malformed {
                        location: format!("node '{}'", key),
                        message: e.to_string(),
                    });
                }
                nodes.insert(key.as_str(), OutlineNode::of_raw(raw));
            }
        }
        _ => errors.push(ValidationError::NodesNotObject),
    }

    check_structure(&Outline { roots, nodes }, &mut errors);
    ValidationReport { errors }
}

/// Ids and edge targets only: what checks 4 to 7 look at
struct Outline<'a> {
    roots: Vec<&'a str>,
    nodes: BTreeMap<&'a str, OutlineNode<'a>>,
}

struct OutlineNode<'a> {
    /// `None` when the raw node has no string `id`
    id: Option<&'a str>,
    targets: Vec<&'a str>,
}

impl<'a> Outline<'a> {
    fn of_tree(tree: &'a OptionTree) -> Self {
        Self {
            roots: tree.root_node_ids.iter().map(String::as_str).collect(),
            nodes: tree
                .nodes
                .iter()
                .map(|(key, node)| {
                    let outline = OutlineNode {
                        id: Some(node.id.as_str()),
                        targets: node.children().iter().map(|e| e.to_node_id.as_str()).collect(),
                    };
                    (key.as_str(), outline)
                })
                .collect(),
        }
    }
}

impl<'a> OutlineNode<'a> {
    fn of_raw(raw: &'a Value) -> Self {
        let targets = raw
            .pointer("/edges/children")
            .and_then(Value::as_array)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|edge| edge.get("toNodeId").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            id: raw.get("id").and_then(Value::as_str),
            targets,
        }
    }
}

/// Checks 4 through 7
fn check_structure(outline: &Outline<'_>, errors: &mut Vec<ValidationError>) {
    for (key, node) in &outline.nodes {
        if let Some(id) = node.id {
            if id != *key {
                errors.push(ValidationError::IdMismatch {
                    key: key.to_string(),
                    id: id.to_string(),
                });
            }
        }
    }

    for root in &outline.roots {
        if !outline.nodes.contains_key(root) {
            errors.push(ValidationError::MissingRoot(root.to_string()));
        }
    }

    for (key, node) in &outline.nodes {
        for target in &node.targets {
            if !outline.nodes.contains_key(target) {
                errors.push(ValidationError::DanglingEdge {
                    from: key.to_string(),
                    to: target.to_string(),
                });
            }
        }
    }

    let mut detector = CycleDetector {
        outline,
        visited: HashSet::new(),
        on_stack: HashSet::new(),
        errors,
    };
    for &root in &outline.roots {
        if outline.nodes.contains_key(root) {
            detector.visit(root);
        }
    }
}

/// DFS tracking the current path apart from finished nodes. A diamond (two
/// paths into one node) is not a cycle.
struct CycleDetector<'o, 'a, 'e> {
    outline: &'o Outline<'a>,
    visited: HashSet<&'a str>,
    on_stack: HashSet<&'a str>,
    errors: &'e mut Vec<ValidationError>,
}

impl<'o, 'a, 'e> CycleDetector<'o, 'a, 'e> {
    fn visit(&mut self, node_id: &'a str) {
        if self.on_stack.contains(node_id) {
            self.errors
                .push(ValidationError::Cycle(node_id.to_string()));
            return;
        }
        if !self.visited.insert(node_id) {
            return;
        }

        let Some(node) = self.outline.nodes.get(node_id) else {
            return;
        };

        self.on_stack.insert(node_id);
        for &target in &node.targets {
            if self.outline.nodes.contains_key(target) {
                self.visit(target);
            }
        }
        self.on_stack.remove(node_id);
    }
}
