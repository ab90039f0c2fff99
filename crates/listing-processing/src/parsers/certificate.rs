//! Location certificate ("Cert. de localisation") parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tokens meaning "a certificate exists", matched case-sensitively so that
/// words such as "Louis" never count.
pub const AFFIRMATIVE_TOKENS: [&str; 2] = ["Oui", "Yes"];

static PARENTHESIZED_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d{4})\)").expect("Invalid regex: parenthesized year"));

/// Presence, year and overdue status of a location certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub has_certificate: bool,
    /// Year in parentheses, or 0 when unknown.
    pub year: i32,
    pub overdue: bool,
}

/// Parse a certificate field such as `"Oui (2015)"`.
///
/// Without an affirmative token the result is `(false, 0, false)`. A
/// certificate is overdue when `reference_year - year > max_age`.
pub fn parse_certificate(raw: Option<&str>, reference_year: i32, max_age: i32) -> CertificateInfo {
    let Some(raw) = raw else {
        return CertificateInfo::default();
    };
    if !AFFIRMATIVE_TOKENS.iter().any(|token| raw.contains(token)) {
        return CertificateInfo::default();
    }

    let year = PARENTHESIZED_YEAR
        .captures(raw)
        .and_then(|caps| caps.get(1)?.as_str().parse::<i32>().ok());

    match year {
        Some(year) => CertificateInfo {
            has_certificate: true,
            year,
            overdue: reference_year - year > max_age,
        },
        None => CertificateInfo {
            has_certificate: true,
            ..CertificateInfo::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_certificate() {
        let info = parse_certificate(Some("Oui (2015)"), 2024, 10);
        assert_eq!(
            info,
            CertificateInfo {
                has_certificate: true,
                year: 2015,
                overdue: false
            }
        );
    }

    #[test]
    fn test_overdue_certificate() {
        let info = parse_certificate(Some("Oui (2010)"), 2024, 10);
        assert!(info.has_certificate);
        assert_eq!(info.year, 2010);
        assert!(info.overdue);

        // exactly max_age years old is not overdue
        assert!(!parse_certificate(Some("Oui (2014)"), 2024, 10).overdue);
    }

    #[test]
    fn test_affirmative_without_year() {
        let info = parse_certificate(Some("Oui"), 2024, 10);
        assert!(info.has_certificate);
        assert_eq!(info.year, 0);
        assert!(!info.overdue);
    }

    #[test]
    fn test_english_affirmative() {
        let info = parse_certificate(Some("Yes (2020)"), 2024, 10);
        assert!(info.has_certificate);
        assert_eq!(info.year, 2020);
    }

    #[test]
    fn test_no_affirmative_token() {
        assert_eq!(
            parse_certificate(Some("Non (2015)"), 2024, 10),
            CertificateInfo::default()
        );
        assert_eq!(parse_certificate(None, 2024, 10), CertificateInfo::default());
    }
}
