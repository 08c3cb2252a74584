//! Operator tokens embedded in filter values
//!
//! A value like `gte:10` carries its comparison operator before the first `:`.
//! Values without a `:` are plain equality.

use std::fmt;

use serde::Serialize;

/// Separator between an operator name and its literal
pub const OPERATOR_SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    /// Case-insensitive operator name lookup
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorToken<'a> {
    pub operator: Operator,
    pub literal: &'a str,
}

/// Split a raw value on its first `:` into operator and literal.
///
/// No `:` means `eq` over the whole value. An unrecognised operator name
/// also degrades to `eq` over the text after the separator.
pub fn parse_token(raw: &str) -> OperatorToken<'_> {
    match raw.split_once(OPERATOR_SEPARATOR) {
        Some((name, literal)) => {
            let operator = Operator::parse(name).unwrap_or_else(|| {
                tracing::debug!(operator = name, "Unknown filter operator, using eq");
                Operator::Eq
            });
            OperatorToken { operator, literal }
        }
        None => OperatorToken {
            operator: Operator::Eq,
            literal: raw,
        },
    }
}
