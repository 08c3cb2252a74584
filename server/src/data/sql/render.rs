//! Predicate tree to SQL rendering
//!
//! Produces a `WHERE` fragment with dialect placeholders and the matching
//! bound parameters, in binding order. Columns reached through relations are
//! qualified with an alias built from the relation path (`fornecedor__pais`);
//! the executor owns the joins and gets the aliases in [`RenderedSql::joins`].

use serde::Serialize;

use super::SqlDialect;
use crate::domain::filters::{
    Bound, CompiledQuery, FieldPath, JsonPath, Operand, OrderClause, PredicateNode, SemanticType,
    Value,
};
use crate::utils::sql::{escape_like_pattern, quote_literal};

const ALIAS_SEPARATOR: &str = "__";

/// Bound parameters, in placeholder order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SqlParams {
    pub values: Vec<Value>,
}

impl SqlParams {
    /// Bind `value`, returning its 1-based index
    pub fn push(&mut self, value: Value) -> usize {
        self.values.push(value);
        self.values.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSql {
    pub dialect: &'static str,
    pub where_clause: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<String>,
    pub statement: String,
    pub params: Vec<Value>,
}

pub struct SqlRenderer<'a> {
    dialect: &'a dyn SqlDialect,
    params: SqlParams,
    joins: Vec<String>,
}

impl<'a> SqlRenderer<'a> {
    pub fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            dialect,
            params: SqlParams::default(),
            joins: Vec::new(),
        }
    }

    /// Render `compiled` as a `SELECT` over `table`, with an optional
    /// `(limit, offset)` page
    pub fn render(
        mut self,
        table: &str,
        compiled: &CompiledQuery,
        page: Option<(u32, u64)>,
    ) -> RenderedSql {
        let where_clause = self.predicate(&compiled.predicate);
        let order_by = compiled.order.as_ref().map(|order| self.order(order));

        let mut statement = format!(
            "SELECT * FROM {} WHERE {}",
            self.dialect.quote_ident(table),
            where_clause
        );
        if let Some(order_by) = &order_by {
            statement.push_str(" ORDER BY ");
            statement.push_str(order_by);
        }
        if let Some((limit, offset)) = page {
            statement.push(' ');
            statement.push_str(&self.dialect.limit_offset(limit, offset));
        }

        RenderedSql {
            dialect: self.dialect.name(),
            where_clause,
            order_by,
            joins: self.joins,
            statement,
            params: self.params.values,
        }
    }

    fn predicate(&mut self, node: &PredicateNode) -> String {
        match node {
            PredicateNode::True => "1=1".to_string(),
            PredicateNode::And { children } => self.joined(children, " AND ", "1=1"),
            PredicateNode::Or { children } => self.joined(children, " OR ", "1=0"),
            PredicateNode::Equals { operand, value } => {
                let col = self.operand(operand);
                format!("{} = {}", col, self.bind(value.clone()))
            }
            PredicateNode::NotEquals { operand, value } => {
                let col = self.operand(operand);
                format!("{} <> {}", col, self.bind(value.clone()))
            }
            PredicateNode::Contains { operand, needle } => {
                let col = self.folded(operand);
                let pattern = format!("%{}%", escape_like_pattern(needle));
                format!("{} LIKE {} ESCAPE '\\'", col, self.bind(Value::Text(pattern)))
            }
            PredicateNode::FoldedEquals { operand, value } => {
                let col = self.folded(operand);
                format!("{} = {}", col, self.bind(Value::Text(value.clone())))
            }
            PredicateNode::Range { operand, min, max } => self.range(operand, min, max),
        }
    }

    fn joined(&mut self, children: &[PredicateNode], sep: &str, empty: &str) -> String {
        if children.is_empty() {
            return empty.to_string();
        }
        let parts: Vec<String> = children.iter().map(|c| self.predicate(c)).collect();
        format!("({})", parts.join(sep))
    }

    fn range(&mut self, operand: &Operand, min: &Option<Bound>, max: &Option<Bound>) -> String {
        let col = self.operand(operand);
        if let (Some(lo), Some(hi)) = (min, max)
            && lo.inclusive
            && hi.inclusive
        {
            let lo = self.bind(lo.value.clone());
            let hi = self.bind(hi.value.clone());
            return format!("{} BETWEEN {} AND {}", col, lo, hi);
        }

        let mut parts = Vec::with_capacity(2);
        if let Some(lo) = min {
            let op = if lo.inclusive { ">=" } else { ">" };
            parts.push(format!("{} {} {}", col, op, self.bind(lo.value.clone())));
        }
        if let Some(hi) = max {
            let op = if hi.inclusive { "<=" } else { "<" };
            parts.push(format!("{} {} {}", col, op, self.bind(hi.value.clone())));
        }
        match parts.len() {
            0 => "1=1".to_string(),
            1 => parts.remove(0),
            _ => format!("({})", parts.join(" AND ")),
        }
    }

    fn order(&mut self, order: &OrderClause) -> String {
        // Dialects may repeat the column expression, so JSON keys are inlined
        let col = match &order.operand {
            Operand::Field(path) => self.column(path),
            Operand::Json(path) => self.json_extract(path, true),
        };
        self.dialect
            .order_by_with_nulls(&col, order.direction.is_desc(), true)
    }

    fn operand(&mut self, operand: &Operand) -> String {
        match operand {
            Operand::Field(path) => self.column(path),
            Operand::Json(path) => self.json_extract(path, false),
        }
    }

    /// Folded text expression; non-text columns are cast first
    fn folded(&mut self, operand: &Operand) -> String {
        let expr = match operand {
            Operand::Field(path) if path.ty == SemanticType::Text => self.column(path),
            Operand::Field(path) => {
                let col = self.column(path);
                self.dialect.cast_to_string(&col)
            }
            Operand::Json(path) => self.json_extract(path, false),
        };
        self.dialect.fold_text(&expr)
    }

    fn column(&mut self, path: &FieldPath) -> String {
        let name = self.dialect.quote_ident(path.name());
        let relations = path.relations();
        if relations.is_empty() {
            return name;
        }
        let alias = relations.join(ALIAS_SEPARATOR);
        let qualified = format!("{}.{}", self.dialect.quote_ident(&alias), name);
        if !self.joins.contains(&alias) {
            self.joins.push(alias);
        }
        qualified
    }

    fn json_extract(&mut self, path: &JsonPath, inline: bool) -> String {
        let col = self.column(&path.column);
        let placeholders: Vec<String> = self
            .dialect
            .json_path_params(&path.keys)
            .into_iter()
            .map(|param| {
                if inline {
                    quote_literal(&param)
                } else {
                    self.bind(Value::Text(param))
                }
            })
            .collect();
        self.dialect.json_extract_text(&col, &placeholders)
    }

    fn bind(&mut self, value: Value) -> String {
        let index = self.params.push(value);
        self.dialect.placeholder(index)
    }
}
