//! Predicate evaluation over JSON records
//!
//! Stored values are read as text and converted with the same rules as
//! filter literals, so a field compares exactly like its filter value would.
//! Missing and `null` values never match, mirroring SQL three-valued logic.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value as Json;

use crate::domain::filters::accent::fold;
use crate::domain::filters::convert::convert_value;
use crate::domain::filters::{Bound, Operand, PredicateNode, Value};

pub fn matches(node: &PredicateNode, record: &Json) -> bool {
    match node {
        PredicateNode::True => true,
        PredicateNode::And { children } => children.iter().all(|c| matches(c, record)),
        PredicateNode::Or { children } => children.iter().any(|c| matches(c, record)),
        PredicateNode::Equals { operand, value } => {
            operand_value(operand, record).is_some_and(|v| v == *value)
        }
        PredicateNode::NotEquals { operand, value } => {
            operand_value(operand, record).is_some_and(|v| v != *value)
        }
        PredicateNode::Contains { operand, needle } => operand_text(operand, record)
            .is_some_and(|text| fold(&text).contains(needle.as_str())),
        PredicateNode::FoldedEquals { operand, value } => {
            operand_text(operand, record).is_some_and(|text| fold(&text) == *value)
        }
        PredicateNode::Range { operand, min, max } => operand_value(operand, record)
            .is_some_and(|v| above(&v, min.as_ref()) && below(&v, max.as_ref())),
    }
}

fn above(value: &Value, min: Option<&Bound>) -> bool {
    let Some(min) = min else {
        return true;
    };
    match value.partial_cmp(&min.value) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => min.inclusive,
        _ => false,
    }
}

fn below(value: &Value, max: Option<&Bound>) -> bool {
    let Some(max) = max else {
        return true;
    };
    match value.partial_cmp(&max.value) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => max.inclusive,
        _ => false,
    }
}

/// Typed value of `operand` in `record`
pub fn operand_value(operand: &Operand, record: &Json) -> Option<Value> {
    match operand {
        Operand::Field(path) => {
            let text = operand_text(operand, record)?;
            convert_value(path, &text).ok()
        }
        Operand::Json(_) => operand_text(operand, record).map(|t| Value::Text(t.into_owned())),
    }
}

/// Text of `operand` in `record`
pub fn operand_text<'a>(operand: &Operand, record: &'a Json) -> Option<Cow<'a, str>> {
    match operand {
        Operand::Field(path) => scalar_text(lookup(record, &path.segments)?),
        Operand::Json(path) => path.extract_text(lookup(record, &path.column.segments)?),
    }
}

fn lookup<'a>(record: &'a Json, segments: &[String]) -> Option<&'a Json> {
    segments
        .iter()
        .try_fold(record, |current, segment| current.get(segment))
        .filter(|value| !value.is_null())
}

fn scalar_text(value: &Json) -> Option<Cow<'_, str>> {
    match value {
        Json::Null => None,
        Json::String(s) => Some(Cow::Borrowed(s.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}
