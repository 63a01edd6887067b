//! Option tree document types
//!
//! An `OptionTree` is an arena: `nodes` owns every node and edges refer to
//! their targets by id. Nothing here guarantees the edges are sound; run the
//! validator before trusting a tree that came from an editor.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::options::condition::ConditionExpr;
use crate::options::impact::{Declared, Effect, PricingImpact, WeightImpact};

/// The only supported document schema version
pub const SCHEMA_VERSION: i64 = 2;

/// The full option graph for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionTree {
    /// Must be 2
    #[serde(default)]
    pub schema_version: i64,
    /// Traversal seeds, visited in this order. Non-string entries are
    /// dropped on load.
    #[serde(default, deserialize_with = "string_ids")]
    pub root_node_ids: Vec<String>,
    /// All nodes, keyed by their id
    #[serde(default)]
    pub nodes: BTreeMap<String, OptionNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<TreeMeta>,
}

/// Product-level metadata carried alongside the graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_weight_oz: Option<f64>,
    /// Pricing aggregator configuration, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Value>,
    /// Shipping configuration, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_images: Vec<ProductImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<f64>,
}

/// What a node represents in the configurator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Asks the customer for a value
    Question,
    /// Groups other nodes under a heading
    Group,
    /// Derived value, never answered directly
    Computed,
}

/// One configuration element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionNode {
    /// Must equal the key this node is stored under
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub ui: UiHints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Gates this node and everything beneath it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub edges: Edges,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pricing_impact: Vec<Declared<PricingImpact>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weight_impact: Vec<Declared<WeightImpact>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Declared<Effect>>,
}

/// Rendering hints; only `sortOrder` affects resolution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UiHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Any other hints, preserved for the UI
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Input specification for leaf questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputSpec {
    #[serde(rename = "type")]
    pub input_type: InputType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<InputConstraints>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    Select,
    MultiSelect,
    Text,
    Number,
    Boolean,
    File,
    /// Input types this crate does not know about yet
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// A selectable answer for `select`/`multiSelect` questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub value: Value,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Visibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionExpr>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Edges {
    #[serde(default)]
    pub children: Vec<BranchEdge>,
}

/// Directed, optionally conditional link to a child node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchEdge {
    pub to_node_id: String,
    /// Edge is only followed while this holds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<ConditionExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_tag: Option<String>,
}

impl OptionTree {
    /// Create an empty schema-2 tree seeded with `roots`
    pub fn new<S: Into<String>>(roots: Vec<S>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            root_node_ids: roots.into_iter().map(Into::into).collect(),
            nodes: BTreeMap::new(),
            meta: None,
        }
    }

    /// Insert a node under its own id
    pub fn with_node(mut self, node: OptionNode) -> Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    pub fn node(&self, id: &str) -> Option<&OptionNode> {
        self.nodes.get(id)
    }

    /// Display order of two child targets: `sortOrder` (missing counts as
    /// 0), then id. Unknown ids sort as if they had sortOrder 0.
    pub fn child_order(&self, a: &str, b: &str) -> Ordering {
        let order = |id: &str| self.node(id).map_or(0.0, OptionNode::sort_order);
        order(a).total_cmp(&order(b)).then_with(|| a.cmp(b))
    }
}

fn string_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|id| match id {
            Value::String(id) => Some(id),
            other => {
                log::debug!("Dropping non-string root id {}", other);
                None
            }
        })
        .collect())
}

impl OptionNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            description: None,
            ui: UiHints::default(),
            input: None,
            choices: Vec::new(),
            visibility: None,
            edges: Edges::default(),
            pricing_impact: Vec::new(),
            weight_impact: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_child(mut self, edge: BranchEdge) -> Self {
        self.edges.children.push(edge);
        self
    }

    pub fn with_visibility(mut self, condition: ConditionExpr) -> Self {
        self.visibility = Some(Visibility {
            condition: Some(condition),
        });
        self
    }

    pub fn with_sort_order(mut self, sort_order: f64) -> Self {
        self.ui.sort_order = Some(sort_order);
        self
    }

    pub fn sort_order(&self) -> f64 {
        self.ui.sort_order.unwrap_or(0.0)
    }

    pub fn visibility_condition(&self) -> Option<&ConditionExpr> {
        self.visibility.as_ref().and_then(|v| v.condition.as_ref())
    }

    pub fn children(&self) -> &[BranchEdge] {
        &self.edges.children
    }
}

impl BranchEdge {
    /// Unconditional edge to `node_id`
    pub fn to(node_id: impl Into<String>) -> Self {
        Self {
            to_node_id: node_id.into(),
            when: None,
            effect_tag: None,
        }
    }

    pub fn when(mut self, condition: ConditionExpr) -> Self {
        self.when = Some(condition);
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.effect_tag = Some(tag.into());
        self
    }
}
