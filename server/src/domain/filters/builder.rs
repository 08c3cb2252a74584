//! Predicate builder
//!
//! Turns a [`FilterRequest`] into a [`CompiledQuery`]:
//!
//! - plain keys resolve to one field and are AND-ed into the result
//! - `a!b` keys are OR-groups: every branch sees the same values and the
//!   branches are OR-ed; distinct groups are OR-ed with each other (or AND-ed,
//!   per [`GroupCombinator`]) and the result joins the conjunction
//! - multiple values under one key mean "any of these", except on JSON
//!   paths where [`JsonValueCombinator`] decides
//! - numeric and date values carrying `op:` go through range merging

use serde::Serialize;

use super::accent::fold;
use super::convert::{Literal, convert_literal};
use super::error::FilterError;
use super::json_path::JsonPath;
use super::options::{CompileOptions, GroupCombinator, JsonValueCombinator, OrGroupErrors};
use super::predicate::PredicateNode;
use super::range::merge_range;
use super::request::FilterRequest;
use super::schema::{FieldPath, FieldResolver, Operand};
use super::sort::{OrderClause, build_order};
use super::value::Value;

/// Separates field names in an OR-group key (`categoria!subcategoria`)
pub const GROUP_SEPARATOR: char = '!';
/// Separates alternatives in a single text value (`ATIVO!INATIVO`)
pub const ALTERNATION_MARKER: char = '!';

/// OR-group branch dropped during compilation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedBranch {
    pub group: String,
    pub key: String,
    pub code: &'static str,
    pub message: String,
}

/// Compilation output handed to a query executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub predicate: PredicateNode,
    pub order: Option<OrderClause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedBranch>,
}

pub struct PredicateBuilder<'a, R: FieldResolver + ?Sized> {
    resolver: &'a R,
    options: CompileOptions,
}

impl<'a, R: FieldResolver + ?Sized> PredicateBuilder<'a, R> {
    pub fn new(resolver: &'a R, options: CompileOptions) -> Self {
        Self { resolver, options }
    }

    /// Compile every filter key plus the requested ordering.
    ///
    /// A failing plain key fails the whole compilation; nothing partial is
    /// returned.
    pub fn compile(&self, request: &FilterRequest) -> Result<CompiledQuery, FilterError> {
        let mut conjunction = Vec::new();
        let mut groups = Vec::new();
        let mut skipped = Vec::new();

        for (key, values) in request.filters() {
            if values.is_empty() {
                continue;
            }
            tracing::trace!(key, values = values.len(), "Compiling filter key");

            if key.contains(GROUP_SEPARATOR) {
                if let Some(node) = self.build_group(key, values, &mut skipped)? {
                    groups.push(node);
                }
            } else {
                conjunction.push(self.build_key(key, values)?);
            }
        }

        if !groups.is_empty() {
            conjunction.push(match self.options.or_groups {
                GroupCombinator::Or => PredicateNode::or(groups),
                GroupCombinator::And => PredicateNode::and(groups),
            });
        }

        let sort = request.sort_spec();
        let order = build_order(
            self.resolver,
            sort.field.as_deref(),
            sort.direction.as_deref(),
        )?;

        let predicate = PredicateNode::and(conjunction);
        tracing::debug!(
            record = self.resolver.record_name(),
            predicate = %predicate,
            ordered = order.is_some(),
            skipped = skipped.len(),
            "Compiled filter request"
        );

        Ok(CompiledQuery {
            predicate,
            order,
            skipped,
        })
    }

    /// OR over each branch of `group`. Returns `None` when every branch was
    /// skipped.
    fn build_group(
        &self,
        group: &str,
        values: &[String],
        skipped: &mut Vec<SkippedBranch>,
    ) -> Result<Option<PredicateNode>, FilterError> {
        let mut branches = Vec::new();

        for key in group
            .split(GROUP_SEPARATOR)
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            match self.build_key(key, values) {
                Ok(node) => branches.push(node),
                Err(err) if self.options.or_group_errors == OrGroupErrors::Skip => {
                    tracing::warn!(
                        group,
                        key,
                        code = err.code(),
                        error = %err,
                        "Skipping OR-group branch"
                    );
                    skipped.push(SkippedBranch {
                        group: group.to_string(),
                        key: key.to_string(),
                        code: err.code(),
                        message: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        if branches.is_empty() {
            return Ok(None);
        }
        Ok(Some(PredicateNode::or(branches)))
    }

    fn build_key(&self, key: &str, values: &[String]) -> Result<PredicateNode, FilterError> {
        match self.resolver.resolve(key)? {
            Operand::Json(path) => Ok(self.build_json(path, values)),
            Operand::Field(field) => self.build_field(field, values),
        }
    }

    /// JSON values are always folded substring matches
    fn build_json(&self, path: JsonPath, values: &[String]) -> PredicateNode {
        let operand = Operand::Json(path);
        let nodes = values.iter().map(|value| PredicateNode::Contains {
            operand: operand.clone(),
            needle: fold(value),
        });
        match self.options.json_values {
            JsonValueCombinator::And => PredicateNode::and(nodes),
            JsonValueCombinator::Or => PredicateNode::or(nodes),
        }
    }

    fn build_field(&self, field: FieldPath, values: &[String]) -> Result<PredicateNode, FilterError> {
        let mut typed = Vec::with_capacity(values.len());
        let mut ranged = false;
        for raw in values {
            match convert_literal(&field, raw)? {
                Literal::Typed(value) => typed.push(value),
                Literal::Ranged(_) => ranged = true,
            }
        }

        // One operator token routes every value of the key through range merging
        if ranged {
            return merge_range(&field, values, self.options.date_fallback);
        }

        let operand = Operand::Field(field);

        if let [value] = typed.as_slice()
            && let Some(alternatives) = alternation(value)
        {
            return Ok(PredicateNode::or(alternatives.map(|alt| {
                PredicateNode::FoldedEquals {
                    operand: operand.clone(),
                    value: fold(alt),
                }
            })));
        }

        Ok(PredicateNode::or(typed.into_iter().map(|value| match value {
            Value::Text(text) => PredicateNode::Contains {
                operand: operand.clone(),
                needle: fold(&text),
            },
            value => PredicateNode::Equals {
                operand: operand.clone(),
                value,
            },
        })))
    }
}

/// Split a string value on the alternation marker
fn alternation(value: &Value) -> Option<impl Iterator<Item = &str>> {
    let text = match value {
        Value::Text(text) | Value::Raw(text) => text,
        _ => return None,
    };
    if !text.contains(ALTERNATION_MARKER) {
        return None;
    }
    Some(
        text.split(ALTERNATION_MARKER)
            .map(str::trim)
            .filter(|alt| !alt.is_empty()),
    )
}
