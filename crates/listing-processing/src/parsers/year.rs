//! Year extraction from free text.

use once_cell::sync::Lazy;
use regex::Regex;

static YEAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("Invalid regex: year token"));

/// First standalone 4-digit token in scan order.
pub fn extract_first_year(raw: Option<&str>) -> Option<i32> {
    YEAR_TOKEN
        .find(raw?)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Every standalone 4-digit token, in scan order.
pub fn extract_all_years(raw: &str) -> Vec<i32> {
    YEAR_TOKEN
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .collect()
}

/// Most recent year mentioned, used for renovation histories.
pub fn extract_latest_year(raw: Option<&str>) -> Option<i32> {
    extract_all_years(raw?).into_iter().max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_year_wins() {
        assert_eq!(extract_first_year(Some("1978, rénové en 2005")), Some(1978));
        assert_eq!(extract_first_year(Some("Construit en 1925")), Some(1925));
    }

    #[test]
    fn test_no_year() {
        assert_eq!(extract_first_year(Some("Nouvelle construction")), None);
        assert_eq!(extract_first_year(Some("12345")), None);
        assert_eq!(extract_first_year(None), None);
    }

    #[test]
    fn test_latest_year() {
        assert_eq!(
            extract_latest_year(Some("Toiture 2012, fenêtres 2019, cuisine 2015")),
            Some(2019)
        );
        assert_eq!(extract_latest_year(Some("Salle de bain refaite")), None);
        assert_eq!(extract_all_years("2001 et 1999"), vec![2001, 1999]);
    }
}
