//! Predicate tree
//!
//! Backend-neutral boolean expression produced by the compiler. Adapters in
//! `data::sql` and `data::memory` render or evaluate it.

use std::fmt;

use serde::Serialize;

use super::schema::Operand;
use super::value::Value;

/// One side of a range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bound {
    pub value: Value,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: Value) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: Value) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PredicateNode {
    /// Conjunction identity, matches everything
    True,
    And {
        children: Vec<PredicateNode>,
    },
    Or {
        children: Vec<PredicateNode>,
    },
    Equals {
        operand: Operand,
        value: Value,
    },
    NotEquals {
        operand: Operand,
        value: Value,
    },
    /// Folded operand contains the (already folded) needle
    Contains {
        operand: Operand,
        needle: String,
    },
    /// Folded operand equals the (already folded) value
    FoldedEquals {
        operand: Operand,
        value: String,
    },
    Range {
        operand: Operand,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<Bound>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<Bound>,
    },
}

impl PredicateNode {
    /// Conjunction of `children`, flattening nested `And` and dropping `True`.
    /// No children gives `True`, one child is returned as is.
    pub fn and(children: impl IntoIterator<Item = PredicateNode>) -> Self {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Self::True => {}
                Self::And { children } => flat.extend(children),
                other => flat.push(other),
            }
        }
        if flat.len() <= 1 {
            return flat.pop().unwrap_or(Self::True);
        }
        Self::And { children: flat }
    }

    /// Disjunction of `children`, flattening nested `Or`. A `True` child makes
    /// the whole disjunction `True`; one child is returned as is.
    pub fn or(children: impl IntoIterator<Item = PredicateNode>) -> Self {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Self::True => return Self::True,
                Self::Or { children } => flat.extend(children),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.swap_remove(0);
        }
        Self::Or { children: flat }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }
}

impl fmt::Display for PredicateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "TRUE"),
            Self::And { children } => write_joined(f, children, " AND "),
            Self::Or { children } => write_joined(f, children, " OR "),
            Self::Equals { operand, value } => write!(f, "{} = {:?}", operand, value.to_string()),
            Self::NotEquals { operand, value } => {
                write!(f, "{} <> {:?}", operand, value.to_string())
            }
            Self::Contains { operand, needle } => write!(f, "fold({}) ~ {:?}", operand, needle),
            Self::FoldedEquals { operand, value } => {
                write!(f, "fold({}) = {:?}", operand, value)
            }
            Self::Range { operand, min, max } => {
                let mut parts = Vec::with_capacity(2);
                if let Some(min) = min {
                    let op = if min.inclusive { ">=" } else { ">" };
                    parts.push(format!("{} {} {:?}", operand, op, min.value.to_string()));
                }
                if let Some(max) = max {
                    let op = if max.inclusive { "<=" } else { "<" };
                    parts.push(format!("{} {} {:?}", operand, op, max.value.to_string()));
                }
                write!(f, "{}", parts.join(" AND "))
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[PredicateNode], sep: &str) -> fmt::Result {
    if children.is_empty() {
        return write!(f, "{}", if sep == " OR " { "FALSE" } else { "TRUE" });
    }
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filters::schema::{FieldPath, SemanticType};

    fn contains(field: &str, needle: &str) -> PredicateNode {
        PredicateNode::Contains {
            operand: Operand::Field(FieldPath::new(vec![field.into()], SemanticType::Text)),
            needle: needle.into(),
        }
    }

    #[test]
    fn test_and_of_nothing_is_true() {
        assert_eq!(PredicateNode::and(Vec::new()), PredicateNode::True);
        assert_eq!(
            PredicateNode::and(vec![PredicateNode::True, PredicateNode::True]),
            PredicateNode::True
        );
    }

    #[test]
    fn test_and_single_child_collapses() {
        let node = PredicateNode::and(vec![PredicateNode::True, contains("nome", "cafe")]);
        assert_eq!(node, contains("nome", "cafe"));
    }

    #[test]
    fn test_and_flattens_nested_conjunctions() {
        let inner = PredicateNode::and(vec![contains("a", "1"), contains("b", "2")]);
        let node = PredicateNode::and(vec![inner, contains("c", "3")]);
        let PredicateNode::And { children } = node else {
            panic!("expected conjunction");
        };
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn test_or_with_true_child_is_true() {
        let node = PredicateNode::or(vec![contains("a", "1"), PredicateNode::True]);
        assert!(node.is_true());
    }

    #[test]
    fn test_display() {
        let node = PredicateNode::or(vec![contains("categoria", "bebidas"), contains("subcategoria", "bebidas")]);
        assert_eq!(
            node.to_string(),
            r#"(fold(categoria) ~ "bebidas" OR fold(subcategoria) ~ "bebidas")"#
        );
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(contains("nome", "cafe")).unwrap();
        assert_eq!(json["op"], "contains");
        assert_eq!(json["operand"]["kind"], "field");
        assert_eq!(json["operand"]["segments"][0], "nome");
        assert_eq!(json["needle"], "cafe");
    }
}
