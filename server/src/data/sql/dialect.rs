//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax.

/// SQL dialect trait for generating database-specific SQL
///
/// Different databases have different syntax for:
/// - Parameter placeholders (? vs $1)
/// - JSON path extraction
/// - Type casting
/// - NULL ordering
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Quote an identifier
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Cast a column to string type
    ///
    /// - PostgreSQL: `col::TEXT`
    /// - SQLite: `CAST(col AS TEXT)`
    fn cast_to_string(&self, col: &str) -> String;

    /// Accent and case folded text expression
    ///
    /// Both dialects rely on an `unaccent` function being available. SQLite
    /// connections must register one as a scalar function.
    fn fold_text(&self, expr: &str) -> String {
        format!("unaccent(lower({}))", expr)
    }

    /// Bound parameters that address `keys` inside a JSON document
    ///
    /// - PostgreSQL: one text parameter per key
    /// - SQLite: a single JSON path (`$."a"."b"`)
    fn json_path_params(&self, keys: &[String]) -> Vec<String>;

    /// Extract a JSON sub-field as text, given the placeholders for the
    /// parameters from [`SqlDialect::json_path_params`]
    ///
    /// - PostgreSQL: `jsonb_extract_path_text(col, $1, $2)`
    /// - SQLite: `CAST(json_extract(col, ?) AS TEXT)`
    fn json_extract_text(&self, col: &str, placeholders: &[String]) -> String;

    /// Generate LIMIT/OFFSET clause
    ///
    /// Most databases use `LIMIT x OFFSET y`, but syntax may vary.
    fn limit_offset(&self, limit: u32, offset: u64) -> String {
        format!("LIMIT {} OFFSET {}", limit, offset)
    }

    /// Generate ORDER BY clause with NULL handling
    ///
    /// - PostgreSQL: `col DESC NULLS LAST`
    /// - SQLite: Doesn't support NULLS FIRST/LAST
    fn order_by_with_nulls(&self, col: &str, desc: bool, nulls_last: bool) -> String;
}
