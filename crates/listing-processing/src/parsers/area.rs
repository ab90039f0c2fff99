//! Two-tier area resolution for living and yard surfaces.
//!
//! Tier 1 reads a direct measurement ("1 200 pc / 111,5 m²"). Tier 2 falls
//! back to a dimensions field ("30 X 40 pi") and multiplies the first two
//! numbers. Both tiers only look at the text before the first `/`.

use crate::utils::{before_slash, parse_locale_decimal};
use once_cell::sync::Lazy;
use regex::Regex;

static AREA_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d\s,]*").expect("Invalid regex: area run"));

static DIMENSION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+,\d+|\d+").expect("Invalid regex: dimension token"));

/// Tier 1: the first run of digits, spaces and commas before the `/`.
pub fn parse_direct_area(raw: Option<&str>) -> Option<f64> {
    let head = before_slash(raw?);
    let run = AREA_RUN.find(head)?;
    parse_locale_decimal(run.as_str())
}

/// Tier 2: product of the first two numeric tokens before the `/`.
pub fn parse_dimensions_product(raw: Option<&str>) -> Option<f64> {
    let head = before_slash(raw?);
    let mut tokens = DIMENSION_TOKEN
        .find_iter(head)
        .filter_map(|m| parse_locale_decimal(m.as_str()));
    let width = tokens.next()?;
    let length = tokens.next()?;
    Some(width * length)
}

/// Resolve an area, returning `NaN` when neither tier yields a value.
///
/// The dimensions field is only consulted when the direct field does not
/// parse.
pub fn parse_area(direct: Option<&str>, dimensions: Option<&str>) -> f64 {
    parse_direct_area(direct)
        .or_else(|| parse_dimensions_product(dimensions))
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_area_formats() {
        assert_eq!(parse_direct_area(Some("1200/pi2")), Some(1200.0));
        assert_eq!(parse_direct_area(Some("1 200 pc / 111,5 m²")), Some(1200.0));
        assert_eq!(parse_direct_area(Some("111,5 m²")), Some(111.5));
        assert_eq!(parse_direct_area(Some("env. 5 000 pc")), Some(5000.0));
    }

    #[test]
    fn test_direct_area_without_digits() {
        assert_eq!(parse_direct_area(Some("pc / 200")), None);
        assert_eq!(parse_direct_area(Some("")), None);
        assert_eq!(parse_direct_area(None), None);
    }

    #[test]
    fn test_dimensions_product() {
        assert_eq!(parse_dimensions_product(Some("30 X 40 pi")), Some(1200.0));
        assert_eq!(
            parse_dimensions_product(Some("10,5 x 20 m / 34 x 65 pi")),
            Some(210.0)
        );
        assert_eq!(parse_dimensions_product(Some("30 pi")), None);
        assert_eq!(parse_dimensions_product(Some("irrégulier / 30 x 40")), None);
    }

    #[test]
    fn test_tier_one_takes_precedence() {
        assert_eq!(parse_area(Some("1500 pc"), Some("10 x 10")), 1500.0);
    }

    #[test]
    fn test_falls_back_to_dimensions() {
        assert_eq!(parse_area(Some("n/d"), Some("25 X 40")), 1000.0);
        assert_eq!(parse_area(None, Some("25 X 40")), 1000.0);
    }

    #[test]
    fn test_both_tiers_fail() {
        assert!(parse_area(None, None).is_nan());
        assert!(parse_area(Some("inconnue"), Some("irrégulier")).is_nan());
    }
}
