//! Operator application over resolved JSON values.
//!
//! There is no implicit coercion: ordering operators compare numbers with
//! numbers and strings with strings, string operators require string
//! operands, and `in`/`nin` require a sequence comparison value. Every type
//! mismatch evaluates to false.

use serde_json::Value;
use std::cmp::Ordering;

use super::Operator;

/// Apply `operator` to the resolved attribute (`lhs`) and comparison value
/// (`rhs`).
pub(super) fn apply(operator: Operator, lhs: &Value, rhs: &Value) -> bool {
    match operator {
        Operator::Eq => lhs == rhs,
        Operator::Neq => lhs != rhs,
        Operator::In => rhs.as_array().is_some_and(|items| items.contains(lhs)),
        Operator::Nin => rhs.as_array().is_some_and(|items| !items.contains(lhs)),
        Operator::Gt => ordering(lhs, rhs).is_some_and(Ordering::is_gt),
        Operator::Gte => ordering(lhs, rhs).is_some_and(Ordering::is_ge),
        Operator::Lt => ordering(lhs, rhs).is_some_and(Ordering::is_lt),
        Operator::Lte => ordering(lhs, rhs).is_some_and(Ordering::is_le),
        Operator::Contains => strings(lhs, rhs).is_some_and(|(s, needle)| s.contains(needle)),
        Operator::StartsWith => strings(lhs, rhs).is_some_and(|(s, needle)| s.starts_with(needle)),
        Operator::EndsWith => strings(lhs, rhs).is_some_and(|(s, needle)| s.ends_with(needle)),
        Operator::Unknown => false,
    }
}

fn ordering(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn strings<'a>(lhs: &'a Value, rhs: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((lhs.as_str()?, rhs.as_str()?))
}
