//! Shared string utilities for the listing pipeline.
//!
//! These helpers handle the formatting quirks shared by several portal
//! fields: currency decoration, French decimal commas, the literal `none`
//! marker and comma-separated value lists.

// =============================================================================
// Numeric Formatting Utilities
// =============================================================================

/// Characters used to decorate monetary amounts that should be stripped.
pub const CURRENCY_FORMAT_CHARS: [char; 4] = ['$', '€', '£', ','];

/// Marker the portal writes when a feature is explicitly absent.
pub const NONE_MARKER: &str = "none";

/// Clean a monetary string by removing currency symbols, thousands
/// separators and every kind of whitespace (including non-breaking spaces).
///
/// # Example
///
/// ```rust,ignore
/// use listing_processing::utils::clean_currency_string;
///
/// assert_eq!(clean_currency_string("300 000 $"), "300000");
/// assert_eq!(clean_currency_string("$1,250"), "1250");
/// ```
pub fn clean_currency_string(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_FORMAT_CHARS.contains(c))
        .collect()
}

/// Return the leading run of ASCII digits, if any.
pub fn leading_digits(s: &str) -> Option<&str> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    (end > 0).then(|| &s[..end])
}

/// Parse a number written with a comma decimal separator and spaces as
/// thousands separators (`"1 200,5"` -> `1200.5`).
pub fn parse_locale_decimal(s: &str) -> Option<f64> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.trim_end_matches(',');
    if compact.is_empty() {
        return None;
    }
    compact.replace(',', ".").parse::<f64>().ok()
}

/// Text preceding the first `/`, where the portal appends units or
/// alternate measurements.
pub fn before_slash(s: &str) -> &str {
    s.split('/').next().unwrap_or(s)
}

// =============================================================================
// Marker and List Utilities
// =============================================================================

/// Check if a string is the portal's explicit "none" marker.
pub fn is_none_marker(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case(NONE_MARKER)
}

/// Split a separated list into trimmed, non-empty items.
pub fn split_list(s: &str, separator: char) -> impl Iterator<Item = &str> {
    s.split(separator).map(str::trim).filter(|item| !item.is_empty())
}

/// Treat empty or whitespace-only values as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_currency_string() {
        assert_eq!(clean_currency_string("300 000 $"), "300000");
        assert_eq!(clean_currency_string("$1,250"), "1250");
        assert_eq!(clean_currency_string("450\u{a0}000\u{a0}$"), "450000");
        assert_eq!(clean_currency_string("€ 99"), "99");
    }

    #[test]
    fn test_leading_digits() {
        assert_eq!(leading_digits("1234.56"), Some("1234"));
        assert_eq!(leading_digits("42"), Some("42"));
        assert_eq!(leading_digits("abc"), None);
        assert_eq!(leading_digits(""), None);
    }

    #[test]
    fn test_parse_locale_decimal() {
        assert_eq!(parse_locale_decimal("1 200,5"), Some(1200.5));
        assert_eq!(parse_locale_decimal("1200 "), Some(1200.0));
        assert_eq!(parse_locale_decimal("1 200,"), Some(1200.0));
        assert_eq!(parse_locale_decimal("   "), None);
        assert_eq!(parse_locale_decimal("1,2,3"), None);
    }

    #[test]
    fn test_before_slash() {
        assert_eq!(before_slash("1200 pc / 111,5 m²"), "1200 pc ");
        assert_eq!(before_slash("no slash"), "no slash");
    }

    #[test]
    fn test_is_none_marker() {
        assert!(is_none_marker("None"));
        assert!(is_none_marker(" NONE "));
        assert!(!is_none_marker("Nonexistent"));
    }

    #[test]
    fn test_split_list() {
        let items: Vec<&str> = split_list(" a , b,, c ", ',').collect();
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("x")), Some("x"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
