// SPDX-License-Identifier: MIT

//! Per-line-item selections document
//!
//! `selected` is the only part the evaluator and resolver read. `resolved` is
//! a display cache written back after resolving; any mutation through
//! [`LineItemOptionSelections::select`] or [`LineItemOptionSelections::clear`]
//! drops it, and callers must refresh it after changing the tree.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::options::tree::{resolve, OptionTree, SCHEMA_VERSION};

/// Selections keyed by node/ref id
pub type Selected = BTreeMap<String, SelectedValue>;

/// One answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SelectedValue {
    /// `None` when the entry has no `value` key at all; conditions treat that
    /// as unanswered. An explicit `null` is `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SelectedValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            note: None,
        }
    }

    pub fn with_note(value: impl Into<Value>, note: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            note: Some(note.into()),
        }
    }
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Cached output of the last resolution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCache {
    #[serde(default)]
    pub visible_node_ids: Vec<String>,
    #[serde(default)]
    pub path_tags: Vec<String>,
}

/// The customer's or staff member's current answers for one line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemOptionSelections {
    #[serde(default = "default_schema_version")]
    pub schema_version: i64,
    #[serde(default)]
    pub selected: Selected,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedCache>,
}

fn default_schema_version() -> i64 {
    SCHEMA_VERSION
}

impl Default for LineItemOptionSelections {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemOptionSelections {
    /// Create an empty selections document
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            selected: Selected::new(),
            resolved: None,
        }
    }

    /// Current value for a ref, if answered
    pub fn get(&self, reference: &str) -> Option<&Value> {
        self.selected.get(reference).and_then(|s| s.value.as_ref())
    }

    /// Record an answer, replacing any previous one
    pub fn select(&mut self, reference: impl Into<String>, value: impl Into<Value>) {
        self.set(reference.into(), SelectedValue::new(value));
    }

    /// Record an answer with a free-text note
    pub fn select_with_note(
        &mut self,
        reference: impl Into<String>,
        value: impl Into<Value>,
        note: impl Into<String>,
    ) {
        self.set(reference.into(), SelectedValue::with_note(value, note));
    }

    fn set(&mut self, reference: String, selected: SelectedValue) {
        self.selected.insert(reference, selected);
        self.resolved = None;
    }

    /// Remove an answer, returning what was there
    pub fn clear(&mut self, reference: &str) -> Option<SelectedValue> {
        let removed = self.selected.remove(reference);
        if removed.is_some() {
            self.resolved = None;
        }
        removed
    }

    /// Recompute the `resolved` cache against `tree` and store it
    pub fn refresh_resolved(&mut self, tree: &OptionTree) -> &ResolvedCache {
        let resolution = resolve(tree, self);
        self.resolved.insert(ResolvedCache {
            visible_node_ids: resolution.visible_node_ids,
            path_tags: resolution.path_tags,
        })
    }
}
