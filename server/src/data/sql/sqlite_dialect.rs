//! SQLite SQL dialect implementation

use super::SqlDialect;

/// SQLite SQL dialect
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn cast_to_string(&self, col: &str) -> String {
        format!("CAST({} AS TEXT)", col)
    }

    fn json_path_params(&self, keys: &[String]) -> Vec<String> {
        let mut path = String::from("$");
        for key in keys {
            path.push_str(&format!(".\"{}\"", key.replace('"', "\\\"")));
        }
        vec![path]
    }

    fn json_extract_text(&self, col: &str, placeholders: &[String]) -> String {
        // SQLite stores JSON as TEXT; json_extract returns the SQL value
        format!("CAST(json_extract({}, {}) AS TEXT)", col, placeholders.join(", "))
    }

    fn order_by_with_nulls(&self, col: &str, desc: bool, nulls_last: bool) -> String {
        // SQLite doesn't support NULLS FIRST/LAST, emulate with CASE
        let dir = if desc { "DESC" } else { "ASC" };
        if nulls_last {
            format!(
                "CASE WHEN {} IS NULL THEN 1 ELSE 0 END, {} {}",
                col, col, dir
            )
        } else {
            format!(
                "CASE WHEN {} IS NULL THEN 0 ELSE 1 END, {} {}",
                col, col, dir
            )
        }
    }
}
