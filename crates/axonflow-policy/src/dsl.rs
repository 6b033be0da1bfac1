//! Dynamic policy condition evaluator.
//!
//! `DynamicPolicy.conditions` is an ordered list of `{field, operator,
//! value}` triples (spec.md §3); all conditions must hold for the policy
//! to match. `field` names either a top-level request attribute
//! (`query`, `request_type`) or a `context.<key>` path, the same
//! resolution scheme as the teacher's expression DSL.

use crate::model::{Condition, Operator};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Context a dynamic policy's conditions are evaluated against.
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    pub query: &'a str,
    pub request_type: &'a str,
    pub context: &'a HashMap<String, JsonValue>,
}

/// Evaluate every condition; all must hold (AND semantics across the
/// ordered list, per spec.md's "ordered list of conditions").
pub fn evaluate_conditions(conditions: &[Condition], ctx: &EvalContext) -> bool {
    conditions.iter().all(|c| evaluate_condition(c, ctx))
}

fn evaluate_condition(condition: &Condition, ctx: &EvalContext) -> bool {
    let field_val = resolve_field(&condition.field, ctx);
    match condition.operator {
        Operator::Equals => field_val.as_ref() == Some(&condition.value),
        Operator::NotEquals => field_val.as_ref() != Some(&condition.value),
        Operator::GreaterThan => match (field_val.and_then(|v| v.as_f64()), condition.value.as_f64()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        Operator::Contains => match (field_val.as_ref().and_then(|v| v.as_str()), condition.value.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        Operator::ContainsAny => {
            let haystack = field_val.as_ref().and_then(|v| v.as_str());
            let needles = condition.value.as_array();
            match (haystack, needles) {
                (Some(haystack), Some(needles)) => needles
                    .iter()
                    .filter_map(|n| n.as_str())
                    .any(|n| haystack.contains(n)),
                _ => false,
            }
        }
        Operator::In => match condition.value.as_array() {
            Some(arr) => field_val.as_ref().map(|v| arr.contains(v)).unwrap_or(false),
            None => false,
        },
        Operator::Regex => {
            let haystack = field_val.as_ref().and_then(|v| v.as_str());
            let pattern = condition.value.as_str();
            match (haystack, pattern) {
                (Some(haystack), Some(pattern)) => regex::Regex::new(pattern)
                    .map(|re| re.is_match(haystack))
                    .unwrap_or(false),
                _ => false,
            }
        }
    }
}

fn resolve_field(field: &str, ctx: &EvalContext) -> Option<JsonValue> {
    match field {
        "query" => Some(JsonValue::String(ctx.query.to_string())),
        "request_type" => Some(JsonValue::String(ctx.request_type.to_string())),
        other => other
            .strip_prefix("context.")
            .and_then(|key| ctx.context.get(key))
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx<'a>(query: &'a str, request_type: &'a str, context: &'a HashMap<String, JsonValue>) -> EvalContext<'a> {
        EvalContext { query, request_type, context }
    }

    #[test]
    fn equals_on_request_type() {
        let empty = HashMap::new();
        let c = Condition { field: "request_type".into(), operator: Operator::Equals, value: json!("sql") };
        assert!(evaluate_conditions(&[c], &ctx("select 1", "sql", &empty)));
    }

    #[test]
    fn greater_than_on_context_field() {
        let mut context = HashMap::new();
        context.insert("amount".to_string(), json!(15000));
        let c = Condition { field: "context.amount".into(), operator: Operator::GreaterThan, value: json!(10000) };
        assert!(evaluate_conditions(&[c], &ctx("q", "chat", &context)));
    }

    #[test]
    fn contains_any_on_query() {
        let empty = HashMap::new();
        let c = Condition {
            field: "query".into(),
            operator: Operator::ContainsAny,
            value: json!(["DROP", "DELETE"]),
        };
        assert!(evaluate_conditions(&[c], &ctx("DROP TABLE users", "sql", &empty)));
        assert!(!evaluate_conditions(&[c], &ctx("SELECT 1", "sql", &empty)));
    }

    #[test]
    fn all_conditions_must_hold() {
        let mut context = HashMap::new();
        context.insert("amount".to_string(), json!(500));
        let conditions = vec![
            Condition { field: "request_type".into(), operator: Operator::Equals, value: json!("sql") },
            Condition { field: "context.amount".into(), operator: Operator::GreaterThan, value: json!(10000) },
        ];
        assert!(!evaluate_conditions(&conditions, &ctx("q", "sql", &context)));
    }
}
