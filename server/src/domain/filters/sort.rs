//! Dynamic sort injection

use std::fmt;

use serde::Serialize;

use super::error::FilterError;
use super::schema::{FieldResolver, Operand};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` (any case) is descending, everything else ascending
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            Some(t) if t.trim().eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn is_desc(&self) -> bool {
        matches!(self, Self::Desc)
    }
}

/// Single-field ordering clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderClause {
    pub operand: Operand,
    pub direction: SortDirection,
}

impl fmt::Display for OrderClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        write!(f, "{} {}", self.operand, dir)
    }
}

/// Resolve `sort_by` against the schema. A missing or blank field name
/// leaves ordering unspecified.
pub fn build_order<R: FieldResolver + ?Sized>(
    resolver: &R,
    sort_by: Option<&str>,
    direction: Option<&str>,
) -> Result<Option<OrderClause>, FilterError> {
    let Some(field) = sort_by.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(None);
    };
    let operand = resolver.resolve(field)?;
    Ok(Some(OrderClause {
        operand,
        direction: SortDirection::parse(direction),
    }))
}
