//! Category normalizers for free-text listing fields.
//!
//! Raw values mix French and English, capitalization and punctuation. The
//! normalizers map them onto a small canonical label set by case-insensitive
//! substring search over a [`CanonicalizationTable`].

mod tables;

pub use tables::{
    CanonicalizationTable, HEATING_CATEGORIES, HEATING_TYPES, POOL_TYPES, SERVICE_KEYWORDS,
    SERVICES, WATER_BODIES,
};

use crate::utils::{is_none_marker, split_list};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Presence flag plus resolved label of a categorical feature.
///
/// `present` can be true while `label` is `None`: the listing mentions the
/// feature but no keyword matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub present: bool,
    pub label: Option<&'static str>,
}

impl CategoryMatch {
    pub const ABSENT: Self = Self {
        present: false,
        label: None,
    };
}

/// Resolve raw text against a table.
///
/// Absent text or the literal `none` marker means the feature is absent.
pub fn normalize_category(raw: Option<&str>, table: &CanonicalizationTable) -> CategoryMatch {
    let Some(raw) = raw else {
        return CategoryMatch::ABSENT;
    };
    if is_none_marker(raw) {
        return CategoryMatch::ABSENT;
    }

    let label = table.lookup(&raw.to_lowercase());
    if label.is_none() {
        trace!("No {} keyword matched '{}'", table.name(), raw);
    }
    CategoryMatch {
        present: true,
        label,
    }
}

/// Water-body proximity ("Plan d'eau").
pub fn standardize_water(raw: Option<&str>) -> CategoryMatch {
    normalize_category(raw, &WATER_BODIES)
}

/// Pool presence and type ("Piscine").
pub fn standardize_pool(raw: Option<&str>) -> CategoryMatch {
    normalize_category(raw, &POOL_TYPES)
}

/// Normalize a comma-separated heating description.
///
/// Each token is mapped to its canonical label, or kept verbatim (trimmed)
/// when no keyword matches. An absent field resolves to `default_label`; the
/// `none` marker resolves to no labels at all.
pub fn standardize_heating(raw: Option<&str>, default_label: &str) -> Vec<String> {
    let Some(raw) = raw else {
        return vec![default_label.to_string()];
    };
    if is_none_marker(raw) {
        return Vec::new();
    }
    split_list(raw, ',')
        .map(|token| {
            HEATING_TYPES
                .lookup(&token.to_lowercase())
                .map(str::to_string)
                .unwrap_or_else(|| token.to_string())
        })
        .collect()
}

/// Indicator per [`HEATING_CATEGORIES`] entry: true when the category label
/// appears (case-insensitively) in the normalized heating description.
pub fn heating_indicators(heating: &[String]) -> [bool; HEATING_CATEGORIES.len()] {
    let joined = heating.join(", ").to_lowercase();
    HEATING_CATEGORIES.map(|(label, _)| joined.contains(&label.to_lowercase()))
}

/// Indicator per [`SERVICES`] entry for a comma-separated services list.
///
/// A token sets the service it names exactly, plus every service whose
/// keyword it contains, so "Thermopompe et climatiseur" sets two flags.
pub fn detect_services(raw: Option<&str>) -> [bool; SERVICES.len()] {
    let mut flags = [false; SERVICES.len()];
    let Some(raw) = raw else {
        return flags;
    };
    if is_none_marker(raw) {
        return flags;
    }

    for token in split_list(raw, ',') {
        let lowered = token.to_lowercase();
        let exact = SERVICES
            .iter()
            .map(|(service, _)| *service)
            .find(|service| *service == token);

        for label in exact.into_iter().chain(SERVICE_KEYWORDS.all_matches(&lowered)) {
            if let Some(index) = SERVICES.iter().position(|(service, _)| *service == label) {
                flags[index] = true;
            }
        }
    }
    flags
}
