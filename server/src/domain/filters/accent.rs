//! Accent and case folding
//!
//! Both sides of every text comparison go through [`fold`], so `"São"` and
//! `"SAO"` compare equal regardless of how the stored data is cased or accented.

use unicode_normalization::UnicodeNormalization;

/// Lower-case `value`, decompose it to NFD and drop combining diacritical marks.
pub fn fold(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_diacritical_mark(*c))
        .collect()
}

/// Combining Diacritical Marks block (U+0300..U+036F)
fn is_diacritical_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_case() {
        assert_eq!(fold("São Paulo"), "sao paulo");
        assert_eq!(fold("AÇÚCAR Mascavo"), "acucar mascavo");
        assert_eq!(fold("Crème Brûlée"), "creme brulee");
    }

    #[test]
    fn test_fold_plain_ascii_only_lowercases() {
        assert_eq!(fold("Bebidas"), "bebidas");
        assert_eq!(fold("abc-123"), "abc-123");
    }

    #[test]
    fn test_fold_is_idempotent() {
        let once = fold("Ação Ñandú");
        assert_eq!(fold(&once), once);
        assert_eq!(once, "acao nandu");
    }

    #[test]
    fn test_fold_precomposed_and_decomposed_match() {
        // "é" precomposed vs "e" + U+0301
        assert_eq!(fold("caf\u{00E9}"), fold("cafe\u{0301}"));
    }

    #[test]
    fn test_fold_keeps_non_latin_text() {
        assert_eq!(fold("東京"), "東京");
        assert_eq!(fold(""), "");
    }
}
