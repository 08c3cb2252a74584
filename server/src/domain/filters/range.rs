//! Range merging for numeric and temporal fields
//!
//! All `operator:literal` tokens under one key fold into a single pair of
//! bounds. Bounds only tighten: a later, weaker bound is discarded. `gt`/`lt`
//! also replace an equal inclusive bound, which turns `gte:10` followed by
//! `gt:10` into the exclusive bound `> 10`.

use std::cmp::Ordering;

use super::accent::fold;
use super::convert::convert_value;
use super::error::FilterError;
use super::operator::{Operator, parse_token};
use super::options::DateFallback;
use super::predicate::{Bound, PredicateNode};
use super::schema::{FieldPath, Operand};
use super::value::Value;

/// Accumulated minimum and maximum for one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBound {
    pub min: Option<Bound>,
    pub max: Option<Bound>,
}

impl RangeBound {
    /// Apply a bound operator. Returns `false` for `eq`/`ne`, which are not bounds.
    pub fn apply(&mut self, operator: Operator, value: Value) -> bool {
        match operator {
            Operator::Gte => tighten(&mut self.min, value, true, Ordering::Greater),
            Operator::Gt => tighten(&mut self.min, value, false, Ordering::Greater),
            Operator::Lte => tighten(&mut self.max, value, true, Ordering::Less),
            Operator::Lt => tighten(&mut self.max, value, false, Ordering::Less),
            Operator::Eq | Operator::Ne => return false,
        }
        true
    }

    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Replace `slot` when unset or when `value` is strictly tighter. An
/// exclusive candidate also replaces an equal bound.
fn tighten(slot: &mut Option<Bound>, value: Value, inclusive: bool, tighter: Ordering) {
    let replace = match slot {
        None => true,
        Some(current) => match value.partial_cmp(&current.value) {
            Some(Ordering::Equal) => !inclusive,
            Some(ordering) => ordering == tighter,
            None => false,
        },
    };
    if replace {
        *slot = Some(Bound { value, inclusive });
    }
}

/// Compile every raw value of a ranged key into one predicate.
///
/// `eq`/`ne` tokens become standalone nodes; bound operators merge into one
/// `Range` node. The result is the conjunction of all of them, or `True`
/// when nothing was produced.
pub fn merge_range(
    field: &FieldPath,
    raw_values: &[String],
    date_fallback: DateFallback,
) -> Result<PredicateNode, FilterError> {
    let operand = Operand::Field(field.clone());
    let mut bound = RangeBound::default();
    let mut nodes = Vec::new();

    for raw in raw_values {
        let token = parse_token(raw);
        let value = match convert_value(field, token.literal) {
            Ok(value) => value,
            Err(err) if field.ty.is_temporal() && date_fallback == DateFallback::Substring => {
                tracing::debug!(
                    field = %field.key(),
                    value = %raw,
                    error = %err,
                    "Unparsable date in range token, matching as text"
                );
                nodes.push(PredicateNode::Contains {
                    operand: operand.clone(),
                    needle: fold(raw),
                });
                continue;
            }
            Err(err) => return Err(err),
        };

        match token.operator {
            Operator::Eq => nodes.push(PredicateNode::Equals {
                operand: operand.clone(),
                value,
            }),
            Operator::Ne => nodes.push(PredicateNode::NotEquals {
                operand: operand.clone(),
                value,
            }),
            operator => {
                bound.apply(operator, value);
            }
        }
    }

    if bound.is_set() {
        nodes.push(PredicateNode::Range {
            operand,
            min: bound.min,
            max: bound.max,
        });
    }

    Ok(PredicateNode::and(nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::filters::schema::SemanticType;

    fn int_field() -> FieldPath {
        FieldPath::new(vec!["estoque".into()], SemanticType::Integer32)
    }

    fn date_field() -> FieldPath {
        FieldPath::new(vec!["dataCriacao".into()], SemanticType::Date)
    }

    fn values(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn range_of(node: PredicateNode) -> (Option<Bound>, Option<Bound>) {
        match node {
            PredicateNode::Range { min, max, .. } => (min, max),
            other => panic!("expected range, got {:?}", other),
        }
    }

    #[test]
    fn test_gte_keeps_tightest_regardless_of_order() {
        for raw in [["gte:10", "gte:5"], ["gte:5", "gte:10"]] {
            let node = merge_range(&int_field(), &values(&raw), DateFallback::Substring).unwrap();
            let (min, max) = range_of(node);
            assert_eq!(min, Some(Bound::inclusive(Value::Int32(10))), "{:?}", raw);
            assert_eq!(max, None);
        }
    }

    #[test]
    fn test_gt_after_equal_gte_becomes_exclusive() {
        let node = merge_range(
            &int_field(),
            &values(&["gte:10", "gt:10"]),
            DateFallback::Substring,
        )
        .unwrap();
        let (min, _) = range_of(node);
        assert_eq!(min, Some(Bound::exclusive(Value::Int32(10))));
    }

    #[test]
    fn test_gte_after_equal_gt_is_discarded() {
        let node = merge_range(
            &int_field(),
            &values(&["gt:10", "gte:10"]),
            DateFallback::Substring,
        )
        .unwrap();
        let (min, _) = range_of(node);
        assert_eq!(min, Some(Bound::exclusive(Value::Int32(10))));
    }

    #[test]
    fn test_upper_bounds_tighten_downward() {
        let node = merge_range(
            &int_field(),
            &values(&["lte:50", "lt:80", "lte:20"]),
            DateFallback::Substring,
        )
        .unwrap();
        let (min, max) = range_of(node);
        assert_eq!(min, None);
        assert_eq!(max, Some(Bound::inclusive(Value::Int32(20))));

        let node = merge_range(
            &int_field(),
            &values(&["lte:20", "lt:20"]),
            DateFallback::Substring,
        )
        .unwrap();
        assert_eq!(range_of(node).1, Some(Bound::exclusive(Value::Int32(20))));
    }

    #[test]
    fn test_inclusive_date_range() {
        let node = merge_range(
            &date_field(),
            &values(&["gte:2023-01-01", "lte:2023-12-31"]),
            DateFallback::Substring,
        )
        .unwrap();
        let (min, max) = range_of(node);
        assert_eq!(min, Some(Bound::inclusive(date(2023, 1, 1))));
        assert_eq!(max, Some(Bound::inclusive(date(2023, 12, 31))));
    }

    #[test]
    fn test_eq_and_ne_are_standalone_nodes() {
        let node = merge_range(
            &int_field(),
            &values(&["ne:3", "7", "gte:1"]),
            DateFallback::Substring,
        )
        .unwrap();
        let PredicateNode::And { children } = node else {
            panic!("expected conjunction");
        };
        assert_eq!(children.len(), 3);
        assert!(matches!(
            &children[0],
            PredicateNode::NotEquals { value: Value::Int32(3), .. }
        ));
        assert!(matches!(
            &children[1],
            PredicateNode::Equals { value: Value::Int32(7), .. }
        ));
        assert!(matches!(&children[2], PredicateNode::Range { .. }));
    }

    #[test]
    fn test_malformed_number_fails() {
        let err = merge_range(&int_field(), &values(&["gte:abc"]), DateFallback::Substring)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_FILTER_VALUE");
    }

    #[test]
    fn test_malformed_date_degrades_to_substring() {
        let node = merge_range(
            &date_field(),
            &values(&["gte:01/2023"]),
            DateFallback::Substring,
        )
        .unwrap();
        assert_eq!(
            node,
            PredicateNode::Contains {
                operand: Operand::Field(date_field()),
                needle: "gte:01/2023".into(),
            }
        );
    }

    #[test]
    fn test_malformed_date_rejected_when_configured() {
        let err = merge_range(&date_field(), &values(&["gte:01/2023"]), DateFallback::Reject)
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::conversion("dataCriacao", "01/2023", SemanticType::Date)
        );
    }

    #[test]
    fn test_range_bound_apply_ignores_equality() {
        let mut bound = RangeBound::default();
        assert!(!bound.apply(Operator::Eq, Value::Int32(1)));
        assert!(!bound.apply(Operator::Ne, Value::Int32(1)));
        assert!(!bound.is_set());
        assert!(bound.apply(Operator::Lt, Value::Int32(1)));
        assert!(bound.is_set());
    }
}
