// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for condition expressions

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A condition expression, serialized as an object tagged by `op`
///
/// ```json
/// {"op": "and", "args": [
///   {"op": "equals", "ref": "finish", "value": "gloss"},
///   {"op": "not", "arg": {"op": "truthy", "ref": "rush"}}
/// ]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ConditionExpr {
    /// Selected value under `ref` equals `value`
    Equals {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default)]
        value: Value,
    },
    /// Selected value under `ref` differs from `value`
    NotEquals {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default)]
        value: Value,
    },
    /// Selected value under `ref` is truthy
    Truthy {
        #[serde(rename = "ref")]
        reference: String,
    },
    /// Selected array under `ref` has `value` as a member
    Contains {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default)]
        value: Value,
    },
    /// Logical AND over any number of operands
    And {
        #[serde(default)]
        args: Vec<ConditionExpr>,
    },
    /// Logical OR over any number of operands
    Or {
        #[serde(default)]
        args: Vec<ConditionExpr>,
    },
    /// Logical NOT
    Not { arg: Box<ConditionExpr> },
}

impl ConditionExpr {
    pub fn equals(reference: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            reference: reference.into(),
            value: value.into(),
        }
    }

    pub fn not_equals(reference: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEquals {
            reference: reference.into(),
            value: value.into(),
        }
    }

    pub fn truthy(reference: impl Into<String>) -> Self {
        Self::Truthy {
            reference: reference.into(),
        }
    }

    pub fn contains(reference: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Contains {
            reference: reference.into(),
            value: value.into(),
        }
    }

    pub fn and(args: Vec<ConditionExpr>) -> Self {
        Self::And { args }
    }

    pub fn or(args: Vec<ConditionExpr>) -> Self {
        Self::Or { args }
    }

    pub fn not(arg: ConditionExpr) -> Self {
        Self::Not { arg: Box::new(arg) }
    }

    /// Every selection ref named anywhere in the expression, in first-seen
    /// order without duplicates.
    ///
    /// Nothing checks these against the tree's node ids; a ref that is never
    /// populated simply keeps its leaf false.
    pub fn refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_refs(self, &mut out);
        out
    }
}

fn collect_refs<'a>(expr: &'a ConditionExpr, out: &mut Vec<&'a str>) {
    match expr {
        ConditionExpr::Equals { reference, .. }
        | ConditionExpr::NotEquals { reference, .. }
        | ConditionExpr::Truthy { reference }
        | ConditionExpr::Contains { reference, .. } => {
            if !out.contains(&reference.as_str()) {
                out.push(reference);
            }
        }
        ConditionExpr::And { args } | ConditionExpr::Or { args } => {
            for arg in args {
                collect_refs(arg, out);
            }
        }
        ConditionExpr::Not { arg } => collect_refs(arg, out),
    }
}

/// Renders the shorthand accepted by [`super::parse`]. Values are written as
/// JSON literals, so scalar conditions round-trip through the parser.
impl std::fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionExpr::Equals { reference, value } => write!(f, "{} == {}", reference, value),
            ConditionExpr::NotEquals { reference, value } => {
                write!(f, "{} != {}", reference, value)
            }
            ConditionExpr::Truthy { reference } => write!(f, "truthy({})", reference),
            ConditionExpr::Contains { reference, value } => {
                write!(f, "{} contains {}", reference, value)
            }
            ConditionExpr::And { args } => write_joined(f, args, "and", "true"),
            ConditionExpr::Or { args } => write_joined(f, args, "or", "false"),
            ConditionExpr::Not { arg } => write!(f, "not ({})", arg),
        }
    }
}

fn write_joined(
    f: &mut std::fmt::Formatter<'_>,
    args: &[ConditionExpr],
    joiner: &str,
    empty: &str,
) -> std::fmt::Result {
    if args.is_empty() {
        return write!(f, "{}", empty);
    }
    write!(f, "(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", joiner)?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_tagged_leaf() {
        let expr: ConditionExpr =
            serde_json::from_value(json!({"op": "notEquals", "ref": "size", "value": 4}))
                .unwrap();
        assert_eq!(expr, ConditionExpr::not_equals("size", 4));
    }

    #[test]
    fn test_deserialize_nested() {
        let expr: ConditionExpr = serde_json::from_value(json!({
            "op": "or",
            "args": [
                {"op": "truthy", "ref": "rush"},
                {"op": "not", "arg": {"op": "contains", "ref": "addons", "value": "foil"}}
            ]
        }))
        .unwrap();
        assert_eq!(
            expr,
            ConditionExpr::or(vec![
                ConditionExpr::truthy("rush"),
                ConditionExpr::not(ConditionExpr::contains("addons", "foil")),
            ])
        );
    }

    #[test]
    fn test_missing_value_defaults_to_null() {
        let expr: ConditionExpr =
            serde_json::from_value(json!({"op": "equals", "ref": "x"})).unwrap();
        assert_eq!(expr, ConditionExpr::equals("x", Value::Null));
    }

    #[test]
    fn test_unknown_op_rejected() {
        let result: Result<ConditionExpr, _> =
            serde_json::from_value(json!({"op": "greaterThan", "ref": "x", "value": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_uses_ref_key() {
        let value = serde_json::to_value(ConditionExpr::truthy("proof")).unwrap();
        assert_eq!(value, json!({"op": "truthy", "ref": "proof"}));
    }

    #[test]
    fn test_refs_deduplicated_in_order() {
        let expr = ConditionExpr::and(vec![
            ConditionExpr::equals("b", 1),
            ConditionExpr::or(vec![
                ConditionExpr::truthy("a"),
                ConditionExpr::not(ConditionExpr::equals("b", 2)),
            ]),
        ]);
        assert_eq!(expr.refs(), vec!["b", "a"]);
    }

    #[test]
    fn test_display() {
        let expr = ConditionExpr::and(vec![
            ConditionExpr::equals("paper", "matte"),
            ConditionExpr::not(ConditionExpr::truthy("rush")),
        ]);
        assert_eq!(expr.to_string(), r#"(paper == "matte" and not (truthy(rush)))"#);
        assert_eq!(ConditionExpr::or(vec![]).to_string(), "false");
    }
}
