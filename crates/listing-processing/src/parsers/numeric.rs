//! Integer parsers: currency amounts and the various count fields.

use crate::utils::{clean_currency_string, leading_digits, split_list};
use once_cell::sync::Lazy;
use regex::Regex;

/// Parking spots assumed when the listing does not mention parking.
pub const DEFAULT_PARKING: i64 = 1;

static PARENTHESIZED_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d+)\)").expect("Invalid regex: parenthesized count"));

static INTEGER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("Invalid regex: integer token"));

/// Parse a monetary amount into whole units.
///
/// Grammar: strip `$ € £ ,` and all whitespace, then read the leading run
/// of ASCII digits. Anything after it (a decimal part, trailing text) is
/// ignored. Absent or digit-less values are zero-filled.
pub fn parse_currency(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };
    let cleaned = clean_currency_string(raw);
    leading_digits(&cleaned)
        .and_then(|digits| digits.parse::<i64>().ok())
        .unwrap_or(0)
}

/// Total parking spots: the sum of every `(n)` count in the text.
///
/// An absent field means one spot; present text without any count sums to 0.
/// Totals saturate at `i64::MAX`.
pub fn parse_parking(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_PARKING;
    };
    PARENTHESIZED_COUNT
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<i64>().ok())
        .fold(0, i64::saturating_add)
}

/// Sum of `+`-separated integers, as in `"2 + 1"` washrooms or bedrooms.
///
/// Tokens that are not integers are skipped. Absent → 0. Totals saturate at
/// `i64::MAX`.
pub fn sum_plus_separated(raw: Option<&str>) -> i64 {
    raw.map(|raw| {
        split_list(raw, '+')
            .filter_map(|item| item.parse::<i64>().ok())
            .fold(0, i64::saturating_add)
    })
    .unwrap_or(0)
}

/// First integer token found anywhere in the text, or 0.
pub fn first_integer(raw: Option<&str>) -> i64 {
    raw.and_then(|raw| INTEGER_TOKEN.find(raw))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency_formats() {
        assert_eq!(parse_currency(Some("300 000 $")), 300_000);
        assert_eq!(parse_currency(Some("$1,250,000")), 1_250_000);
        assert_eq!(parse_currency(Some("5000")), 5000);
        assert_eq!(parse_currency(Some("  42 ")), 42);
        assert_eq!(parse_currency(Some("415\u{a0}000\u{a0}$")), 415_000);
    }

    #[test]
    fn test_parse_currency_zero_fill() {
        assert_eq!(parse_currency(None), 0);
        assert_eq!(parse_currency(Some("")), 0);
        assert_eq!(parse_currency(Some("Non disponible")), 0);
        assert_eq!(parse_currency(Some("$")), 0);
    }

    #[test]
    fn test_parse_currency_ignores_decimal_part() {
        assert_eq!(parse_currency(Some("1234.56 $")), 1234);
    }

    #[test]
    fn test_parse_parking() {
        assert_eq!(parse_parking(None), 1);
        assert_eq!(parse_parking(Some("(2) (1)")), 3);
        assert_eq!(parse_parking(Some("Allée (2), Garage (1)")), 3);
        assert_eq!(parse_parking(Some("Allée")), 0);
    }

    #[test]
    fn test_sum_plus_separated() {
        assert_eq!(sum_plus_separated(None), 0);
        assert_eq!(sum_plus_separated(Some("2")), 2);
        assert_eq!(sum_plus_separated(Some("2 + 1")), 3);
        assert_eq!(sum_plus_separated(Some("3+1+x")), 4);
    }

    #[test]
    fn test_large_counts_saturate() {
        assert_eq!(parse_parking(Some("(9223372036854775807) (1)")), i64::MAX);
        assert_eq!(sum_plus_separated(Some("9223372036854775807 + 1")), i64::MAX);
        assert_eq!(
            sum_plus_separated(Some("9223372036854775800 + 9223372036854775800")),
            i64::MAX
        );
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer(Some("6 logements")), 6);
        assert_eq!(first_integer(Some("approx. 12")), 12);
        assert_eq!(first_integer(Some("aucun")), 0);
        assert_eq!(first_integer(None), 0);
    }
}
