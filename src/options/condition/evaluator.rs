//! Condition expression evaluator
//!
//! Every leaf is fail-closed: a ref with no selection, or a selection of the
//! wrong shape, makes the leaf false. `notEquals` is no exception, so an
//! unanswered question never reveals a node.

use super::ast::ConditionExpr;
use crate::options::selections::Selected;
use serde_json::Value;

/// Evaluate a condition expression against the current selections
pub fn evaluate(expr: &ConditionExpr, selected: &Selected) -> bool {
    match expr {
        ConditionExpr::Equals { reference, value } => {
            lookup(selected, reference).is_some_and(|v| strict_equals(v, value))
        }
        ConditionExpr::NotEquals { reference, value } => {
            lookup(selected, reference).is_some_and(|v| !strict_equals(v, value))
        }
        ConditionExpr::Truthy { reference } => lookup(selected, reference).is_some_and(is_truthy),
        ConditionExpr::Contains { reference, value } => match lookup(selected, reference) {
            Some(Value::Array(items)) => items.iter().any(|item| strict_equals(item, value)),
            _ => false,
        },
        ConditionExpr::And { args } => args.iter().all(|arg| evaluate(arg, selected)),
        ConditionExpr::Or { args } => args.iter().any(|arg| evaluate(arg, selected)),
        ConditionExpr::Not { arg } => !evaluate(arg, selected),
    }
}

fn lookup<'a>(selected: &'a Selected, reference: &str) -> Option<&'a Value> {
    selected.get(reference).and_then(|s| s.value.as_ref())
}

/// Same type and same scalar value. Numbers compare numerically so `1` and
/// `1.0` agree. Arrays and objects have no identity across documents and
/// never compare equal, so `notEquals` against one is always true.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
                return x == y;
            }
            match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(_), _) | (Value::Object(_), _) => false,
        _ => left == right,
    }
}

/// Boolean coercion: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
