//! Compile-time behaviour switches
//!
//! Defaults reproduce the lenient behaviour API clients already rely on;
//! each switch can be tightened from the `filters` config section.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What to do when one branch of an OR-group fails to compile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrGroupErrors {
    /// Drop the branch, record it in the compilation result
    #[default]
    Skip,
    /// Fail the whole compilation
    Fail,
}

/// How distinct OR-group keys combine with each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupCombinator {
    /// Any group may match; the disjunction of groups joins the conjunction
    #[default]
    Or,
    /// Every group must match
    And,
}

/// How several values under one JSON path key are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonValueCombinator {
    #[default]
    And,
    Or,
}

/// What to do with an unparsable date in an operator token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFallback {
    /// Degrade to a folded substring match on the raw token
    #[default]
    Substring,
    /// Fail with a value conversion error
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileOptions {
    pub or_group_errors: OrGroupErrors,
    pub or_groups: GroupCombinator,
    pub json_values: JsonValueCombinator,
    pub date_fallback: DateFallback,
}

impl fmt::Display for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "or_group_errors={:?}, or_groups={:?}, json_values={:?}, date_fallback={:?}",
            self.or_group_errors, self.or_groups, self.json_values, self.date_fallback
        )
    }
}
