//! Keyword normalization for noisy statement text.
//!
//! Card processors decorate merchant strings ("SQ *", "TST*", "DD *", "POS"),
//! and statements add store numbers and punctuation. The normalized form is
//! shown to the oracle next to the raw text; it is never used to pick a
//! category locally.

use regex::Regex;
use std::sync::LazyLock;

static PROCESSOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(?:SQ|TST|DD)\s*\*").expect("valid regex"));
static LEADING_TERMINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:POS|AUTH)\s+").expect("valid regex"));
static STORE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*\d+").expect("valid regex"));
static APOSTROPHE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"['’]").expect("valid regex"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Uppercase `text` and strip processor tokens, store numbers, punctuation
/// and repeated whitespace.
pub fn normalize_keywords(text: &str) -> String {
    let upper = text.trim().to_uppercase();
    let s = LEADING_TERMINAL.replace(&upper, "");
    let s = PROCESSOR_PREFIX.replace_all(&s, " ");
    let s = STORE_NUMBER.replace_all(&s, " ");
    let s = APOSTROPHE.replace_all(&s, "");
    let s = NON_WORD.replace_all(&s, " ");
    WHITESPACE.replace_all(&s, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_square_and_toast_prefixes() {
        assert_eq!(normalize_keywords("SQ *BLUE BOTTLE COFFEE"), "BLUE BOTTLE COFFEE");
        assert_eq!(normalize_keywords(" SQ *PRALINE FRENCH PATISS"), "PRALINE FRENCH PATISS");
        assert_eq!(normalize_keywords("TST* TATTE BAKERY"), "TATTE BAKERY");
        assert_eq!(normalize_keywords(" DD *SOBOL"), "SOBOL");
    }

    #[test]
    fn test_strips_terminal_prefix_and_store_numbers() {
        assert_eq!(normalize_keywords("POS WALGREENS #0042"), "WALGREENS");
        assert_eq!(normalize_keywords("Starbucks #1234"), "STARBUCKS");
    }

    #[test]
    fn test_punctuation_and_whitespace() {
        assert_eq!(normalize_keywords("Lyft * Ride"), "LYFT RIDE");
        assert_eq!(normalize_keywords("*PEPITA COFFEE CO."), "PEPITA COFFEE CO");
        assert_eq!(normalize_keywords("Trader Joe’s   Coffee Bar"), "TRADER JOES COFFEE BAR");
        assert_eq!(normalize_keywords("MBTA-550008588372 "), "MBTA 550008588372");
    }

    #[test]
    fn test_keeps_brand_names_containing_prefix_letters() {
        assert_eq!(normalize_keywords("DoorDash * Shake Shack"), "DOORDASH SHAKE SHACK");
        assert_eq!(normalize_keywords("POSTMATES"), "POSTMATES");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_keywords("   "), "");
    }
}
