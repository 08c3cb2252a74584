//! SQL text helpers

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Patterns built with this must be matched with `ESCAPE '\'`.
///
/// # Example
///
/// ```
/// use sieve_server::utils::sql::escape_like_pattern;
///
/// let needle = "100% cafe_moido";
/// let pattern = format!("%{}%", escape_like_pattern(needle));
/// assert_eq!(pattern, "%100\\% cafe\\_moido%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Single-quoted SQL string literal
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern() {
        assert_eq!(escape_like_pattern("queijo"), "queijo");
        assert_eq!(escape_like_pattern("100%"), "100\\%");
        assert_eq!(escape_like_pattern("pao_de"), "pao\\_de");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
        assert_eq!(escape_like_pattern("%_\\"), "\\%\\_\\\\");
        assert_eq!(escape_like_pattern(""), "");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("endereco"), "'endereco'");
        assert_eq!(quote_literal("d'agua"), "'d''agua'");
    }
}
