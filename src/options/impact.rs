// SPDX-License-Identifier: MIT

//! Pricing, weight and side-effect declarations attached to nodes
//!
//! These are data only. The pricing aggregator and order services downstream
//! evaluate `applyWhen`/`when` and apply the amounts; this crate never does.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::condition::ConditionExpr;

/// A declaration as found on a node. Entries this crate does not understand
/// (a new pricing kind, an effect type added downstream) are kept verbatim
/// instead of failing the whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Declared<T> {
    Known(T),
    Unrecognized(Value),
}

impl<T> Declared<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Declared::Known(item) => Some(item),
            Declared::Unrecognized(_) => None,
        }
    }
}

/// Conditional monetary adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingImpact {
    #[serde(flatten)]
    pub rule: PricingRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_when: Option<ConditionExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// How a pricing adjustment is computed, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PricingRule {
    /// Once per line item
    Flat {
        #[serde(rename = "amountCents")]
        amount_cents: i64,
    },
    /// Multiplied by quantity
    PerUnit {
        #[serde(rename = "amountCents")]
        amount_cents: i64,
    },
    /// Percentage of the running subtotal
    Percent { percent: f64 },
    /// Multiplied by printed area
    PerSquareFoot {
        #[serde(rename = "amountCents")]
        amount_cents: i64,
    },
}

/// Conditional shipping-weight adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeightImpact {
    #[serde(flatten)]
    pub rule: WeightRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_when: Option<ConditionExpr>,
}

/// How a weight adjustment is computed, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WeightRule {
    Flat { oz: f64 },
    PerUnit { oz: f64 },
    PerSquareFoot { oz: f64 },
}

/// Side effect raised when a node is answered, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Effect {
    #[serde(flatten)]
    pub action: EffectAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<ConditionExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EffectAction {
    /// Raise a review flag on the order
    Flag {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Block production until artwork is uploaded
    RequireArtwork {
        #[serde(rename = "minFiles", default, skip_serializing_if = "Option::is_none")]
        min_files: Option<u32>,
    },
    /// Pin the production material
    ForceMaterial {
        #[serde(rename = "materialId")]
        material_id: String,
    },
}

impl PricingImpact {
    pub fn new(rule: PricingRule) -> Self {
        Self {
            rule,
            apply_when: None,
            label: None,
        }
    }
}

impl Effect {
    /// Short machine name for the action, matching its `type` tag
    pub fn type_name(&self) -> &'static str {
        match self.action {
            EffectAction::Flag { .. } => "flag",
            EffectAction::RequireArtwork { .. } => "requireArtwork",
            EffectAction::ForceMaterial { .. } => "forceMaterial",
        }
    }
}
