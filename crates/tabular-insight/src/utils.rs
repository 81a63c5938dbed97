//! Shared helpers for token matching and text-to-number cleanup.
//!
//! These are the small string routines used by both the value normalizer and
//! the analyzers, kept here so the two always agree on what a boolean token or
//! a numeric string looks like.

// =============================================================================
// Boolean Tokens
// =============================================================================

/// Tokens recognised as booleans, compared case-insensitively.
pub const BOOLEAN_TOKENS: [&str; 6] = ["true", "false", "yes", "no", "0", "1"];

/// Check if a string is one of the boolean tokens.
#[inline]
pub fn is_boolean_token(s: &str) -> bool {
    parse_boolean_token(s).is_some()
}

/// Map a boolean token to its value.
///
/// Returns `None` for anything outside [`BOOLEAN_TOKENS`].
pub fn parse_boolean_token(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Numeric Strings
// =============================================================================

/// Parse a plain number, ignoring thousands separators.
///
/// ```rust,ignore
/// use tabular_insight::utils::parse_plain_number;
///
/// assert_eq!(parse_plain_number("1,234.5"), Some(1234.5));
/// assert_eq!(parse_plain_number("$5"), None);
/// ```
pub fn parse_plain_number(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Keep only digits, dots and minus signs.
pub fn strip_to_numeric_chars(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Parse a currency amount after dropping symbols, codes and separators.
pub fn parse_currency_amount(s: &str) -> Option<f64> {
    let cleaned = strip_to_numeric_chars(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// First character that is not part of a number or whitespace.
pub fn leading_symbol(s: &str) -> Option<char> {
    s.chars()
        .find(|c| !(c.is_ascii_digit() || *c == '.' || *c == '-' || c.is_whitespace()))
}

// =============================================================================
// Character Classes
// =============================================================================

/// Non-empty and made only of numeric characters.
pub fn is_all_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_numeric)
}

/// Non-empty and made only of alphabetic characters.
pub fn is_all_alphabetic(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

/// Non-empty and made only of letters and digits.
pub fn is_all_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Boolean token tests ====================

    #[test]
    fn test_parse_boolean_token() {
        assert_eq!(parse_boolean_token("YES"), Some(true));
        assert_eq!(parse_boolean_token("False"), Some(false));
        assert_eq!(parse_boolean_token("1"), Some(true));
        assert_eq!(parse_boolean_token("0"), Some(false));
        assert_eq!(parse_boolean_token("maybe"), None);
        assert_eq!(parse_boolean_token("1.0"), None);
    }

    #[test]
    fn test_is_boolean_token() {
        for token in BOOLEAN_TOKENS {
            assert!(is_boolean_token(token));
            assert!(is_boolean_token(&token.to_uppercase()));
        }
        assert!(!is_boolean_token("y"));
    }

    // ==================== Numeric string tests ====================

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_plain_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_plain_number(" -3 "), Some(-3.0));
        assert_eq!(parse_plain_number("1e3"), Some(1000.0));
        assert_eq!(parse_plain_number("abc"), None);
        assert_eq!(parse_plain_number(""), None);
    }

    #[test]
    fn test_parse_currency_amount() {
        assert_eq!(parse_currency_amount("$1,000.00"), Some(1000.0));
        assert_eq!(parse_currency_amount("USD -25"), Some(-25.0));
        assert_eq!(parse_currency_amount("€"), None);
        assert_eq!(parse_currency_amount("1-2"), None);
    }

    #[test]
    fn test_leading_symbol() {
        assert_eq!(leading_symbol("$1,000"), Some('$'));
        assert_eq!(leading_symbol(" 5 €"), Some('€'));
        assert_eq!(leading_symbol("-12.5"), None);
    }

    // ==================== Character class tests ====================

    #[test]
    fn test_character_classes() {
        assert!(is_all_numeric("00123"));
        assert!(!is_all_numeric("-1"));
        assert!(!is_all_numeric(""));
        assert!(is_all_alphabetic("abc"));
        assert!(!is_all_alphabetic("ab1"));
        assert!(is_all_alphanumeric("AB12"));
        assert!(!is_all_alphanumeric("AB-12"));
    }
}
