//! Raw portal field labels and their canonical names.
//!
//! The portal exports French labels. Ten of them are renamed to canonical
//! snake_case names before parsing; the rest are read under their raw label
//! and only their derived features reach the output.

pub const PRICE: &str = "price";
pub const UNITS: &str = "units";
pub const INCOME: &str = "income";
pub const BUILD_TYPE: &str = "build_type";
pub const BUILD_EVAL: &str = "build_eval";
pub const LAND_EVAL: &str = "land_eval";
pub const RENOVATIONS: &str = "renovations";
pub const ROOMS: &str = "rooms";
pub const BEDROOMS: &str = "bedrooms";
pub const WASHROOMS: &str = "washrooms";

pub const ADDRESS: &str = "Addresse";
pub const YEAR_BUILT: &str = "YearBuilt";
pub const LIVING_AREA: &str = "Superficie habitable";
pub const BUILDING_DIMENSIONS: &str = "Dimensions du bâtiment";
pub const YARD_AREA: &str = "Superficie du terrain";
pub const YARD_DIMENSIONS: &str = "Dimensions du terrain";
pub const CERTIFICATE: &str = "Cert. de localisation";
pub const WATER_BODY: &str = "Plan d'eau";
pub const POOL: &str = "Piscine";
pub const PARKING: &str = "Stationnement (total)";
pub const HEATING: &str = "Chauffage";
pub const WATER_ACCESS: &str = "Eau (accès)";
pub const FIREPLACE: &str = "Foyers-Poêles";
pub const SERVICES: &str = "Équip./Serv.";

/// Raw label to canonical name, applied before any parsing.
pub const RENAMES: [(&str, &str); 10] = [
    ("Prix", PRICE),
    ("Un. rés.", UNITS),
    ("Rev. brut. pot.", INCOME),
    ("Type de bâtiment", BUILD_TYPE),
    ("Éval. bâtiment", BUILD_EVAL),
    ("Éval. terrain", LAND_EVAL),
    ("Rénovations", RENOVATIONS),
    ("Nbre pièces", ROOMS),
    ("Nbre chambres (hors-sol + sous-sol)", BEDROOMS),
    ("Nbre salles de bains + salles d'eau", WASHROOMS),
];

/// Raw labels consumed without renaming.
pub const DIRECT_FIELDS: [&str; 14] = [
    ADDRESS,
    YEAR_BUILT,
    LIVING_AREA,
    BUILDING_DIMENSIONS,
    YARD_AREA,
    YARD_DIMENSIONS,
    CERTIFICATE,
    WATER_BODY,
    POOL,
    PARKING,
    HEATING,
    WATER_ACCESS,
    FIREPLACE,
    SERVICES,
];

/// Canonical name for a raw label, or the label itself when it is not renamed.
pub fn canonical_name(raw_label: &str) -> &str {
    RENAMES
        .iter()
        .find(|(raw, _)| *raw == raw_label)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(raw_label)
}

/// Every raw column label the input schema must carry.
pub fn required_columns() -> Vec<&'static str> {
    RENAMES
        .iter()
        .map(|(raw, _)| *raw)
        .chain(DIRECT_FIELDS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("Prix"), "price");
        assert_eq!(canonical_name("Rev. brut. pot."), "income");
        assert_eq!(canonical_name("Piscine"), "Piscine");
    }

    #[test]
    fn test_required_columns_are_unique() {
        let columns = required_columns();
        assert_eq!(columns.len(), 24);
        let mut sorted = columns.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), columns.len());
    }
}
