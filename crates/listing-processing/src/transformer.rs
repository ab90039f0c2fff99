//! Record transformer: one raw listing in, one cleaned listing or a drop
//! reason out.
//!
//! The transformer is stateless apart from its configuration and can be
//! shared across threads.

use crate::config::PipelineConfig;
use crate::fields;
use crate::normalizers::{
    detect_services, heating_indicators, standardize_heating, standardize_pool, standardize_water,
};
use crate::parsers::{
    extract_first_year, extract_latest_year, first_integer, parse_area, parse_certificate,
    parse_currency, parse_parking, sum_plus_separated,
};
use crate::types::{CleanedListing, DropReason, RawListing};

/// Access value meaning the water body cannot be navigated.
pub const NON_NAVIGABLE: &str = "Non navigable";

/// Token marking a fireplace as not working.
pub const FIREPLACE_NEGATION: &str = "non";

/// Applies every field parser and normalizer to a single listing.
#[derive(Debug, Clone)]
pub struct ListingTransformer {
    income_floor: i64,
    reference_year: i32,
    certificate_max_age: i32,
    default_heating: String,
}

impl ListingTransformer {
    /// Create a transformer, resolving the reference year once.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            income_floor: config.income_floor,
            reference_year: config.effective_reference_year(),
            certificate_max_age: config.certificate_max_age,
            default_heating: config.default_heating.clone(),
        }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Transform one listing.
    ///
    /// Mandatory fields are checked in the order year built, living area,
    /// yard area, then the income floor. The first failing check is the
    /// returned [`DropReason`].
    pub fn transform(&self, raw: &RawListing) -> Result<CleanedListing, DropReason> {
        let income = parse_currency(raw.get(fields::INCOME));

        let year_built =
            extract_first_year(raw.get(fields::YEAR_BUILT)).ok_or(DropReason::MissingYearBuilt)?;

        let living_area = parse_area(
            raw.get(fields::LIVING_AREA),
            raw.get(fields::BUILDING_DIMENSIONS),
        );
        if living_area.is_nan() {
            return Err(DropReason::MissingLivingArea);
        }

        let yard_area = parse_area(raw.get(fields::YARD_AREA), raw.get(fields::YARD_DIMENSIONS));
        if yard_area.is_nan() {
            return Err(DropReason::MissingYardArea);
        }

        if income < self.income_floor {
            return Err(DropReason::IncomeBelowFloor);
        }

        let certificate = parse_certificate(
            raw.get(fields::CERTIFICATE),
            self.reference_year,
            self.certificate_max_age,
        );
        let water = standardize_water(raw.get(fields::WATER_BODY));
        let pool = standardize_pool(raw.get(fields::POOL));
        let heating = standardize_heating(raw.get(fields::HEATING), &self.default_heating);
        let fireplace = raw.get(fields::FIREPLACE);
        let renovations = raw.get(fields::RENOVATIONS);

        Ok(CleanedListing {
            address: raw.get(fields::ADDRESS).map(str::to_string),
            build_type: raw.get(fields::BUILD_TYPE).map(str::to_string),
            price: parse_currency(raw.get(fields::PRICE)),
            income,
            build_eval: parse_currency(raw.get(fields::BUILD_EVAL)),
            land_eval: parse_currency(raw.get(fields::LAND_EVAL)),
            units: first_integer(raw.get(fields::UNITS)),
            rooms: first_integer(raw.get(fields::ROOMS)),
            bedrooms: sum_plus_separated(raw.get(fields::BEDROOMS)),
            washrooms: sum_plus_separated(raw.get(fields::WASHROOMS)),
            year_built,
            living_area,
            yard_area,
            has_certificate: certificate.has_certificate,
            year_certificate: certificate.year,
            due_certificate: certificate.overdue,
            near_water: water.present,
            water_name: water.label.map(str::to_string),
            has_pool: pool.present,
            pool_type: pool.label.map(str::to_string),
            total_parking: parse_parking(raw.get(fields::PARKING)),
            heating_flags: heating_indicators(&heating),
            heating: heating.join(", "),
            water_access: has_water_access(raw.get(fields::WATER_ACCESS)),
            has_fireplace: fireplace.is_some(),
            fireplace_func: fireplace.is_some_and(|text| {
                !text.to_lowercase().contains(FIREPLACE_NEGATION)
            }),
            has_reno: renovations.is_some(),
            last_year_reno: extract_latest_year(renovations).unwrap_or(0),
            service_flags: detect_services(raw.get(fields::SERVICES)),
        })
    }
}

/// Navigable access unless the field is absent or says otherwise.
fn has_water_access(raw: Option<&str>) -> bool {
    raw.is_some_and(|access| access.trim() != NON_NAVIGABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transformer() -> ListingTransformer {
        let config = PipelineConfig::builder()
            .reference_year(2024)
            .build()
            .unwrap();
        ListingTransformer::new(&config)
    }

    fn base_listing() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Prix", "300 000 $"),
            ("Rev. brut. pot.", "5000"),
            ("YearBuilt", "1978"),
            ("Superficie habitable", "1200/pi2"),
            ("Superficie du terrain", "3000"),
            ("Cert. de localisation", "Oui (2015)"),
            ("Plan d'eau", "Fleuve St-Laurent"),
        ]
    }

    fn with(overrides: &[(&'static str, &'static str)]) -> RawListing {
        let mut pairs = base_listing();
        for (label, value) in overrides {
            pairs.retain(|(existing, _)| existing != label);
            pairs.push((*label, *value));
        }
        RawListing::from_pairs(pairs)
    }

    fn without(label: &str) -> RawListing {
        RawListing::from_pairs(base_listing().into_iter().filter(|(l, _)| *l != label))
    }

    #[test]
    fn test_end_to_end_listing() {
        let cleaned = transformer().transform(&with(&[])).unwrap();
        assert_eq!(cleaned.price, 300_000);
        assert_eq!(cleaned.income, 5000);
        assert_eq!(cleaned.year_built, 1978);
        assert_eq!(cleaned.living_area, 1200.0);
        assert_eq!(cleaned.yard_area, 3000.0);
        assert!(cleaned.has_certificate);
        assert_eq!(cleaned.year_certificate, 2015);
        assert!(!cleaned.due_certificate);
        assert!(cleaned.near_water);
        assert_eq!(cleaned.water_name.as_deref(), Some("Fleuve St-Laurent"));
    }

    #[test]
    fn test_optional_defaults() {
        let cleaned = transformer().transform(&with(&[])).unwrap();
        assert_eq!(cleaned.total_parking, 1);
        assert_eq!(cleaned.washrooms, 0);
        assert_eq!(cleaned.build_eval, 0);
        assert_eq!(cleaned.heating, "Plinthes électriques");
        assert!(cleaned.heating_flags[0]);
        assert!(!cleaned.has_pool);
        assert_eq!(cleaned.pool_type, None);
        assert!(!cleaned.water_access);
        assert!(!cleaned.has_fireplace);
        assert!(!cleaned.fireplace_func);
        assert!(!cleaned.has_reno);
        assert_eq!(cleaned.last_year_reno, 0);
        assert!(cleaned.service_flags.iter().all(|flag| !flag));
    }

    #[test]
    fn test_drop_reasons() {
        let t = transformer();
        assert_eq!(
            t.transform(&without("YearBuilt")),
            Err(DropReason::MissingYearBuilt)
        );
        assert_eq!(
            t.transform(&without("Superficie habitable")),
            Err(DropReason::MissingLivingArea)
        );
        assert_eq!(
            t.transform(&without("Superficie du terrain")),
            Err(DropReason::MissingYardArea)
        );
        assert_eq!(
            t.transform(&with(&[("Rev. brut. pot.", "1500")])),
            Err(DropReason::IncomeBelowFloor)
        );
    }

    #[test]
    fn test_first_failing_check_wins() {
        let raw = RawListing::from_pairs([("Rev. brut. pot.", "100")]);
        assert_eq!(
            transformer().transform(&raw),
            Err(DropReason::MissingYearBuilt)
        );
    }

    #[test]
    fn test_income_floor_is_inclusive() {
        let cleaned = transformer().transform(&with(&[("Rev. brut. pot.", "2 000 $")]));
        assert!(cleaned.is_ok());
    }

    #[test]
    fn test_area_falls_back_to_dimensions() {
        let mut pairs: Vec<(&str, &str)> = base_listing()
            .into_iter()
            .filter(|(l, _)| *l != "Superficie habitable")
            .collect();
        pairs.push(("Dimensions du bâtiment", "30 X 40 pi"));
        let cleaned = transformer()
            .transform(&RawListing::from_pairs(pairs))
            .unwrap();
        assert_eq!(cleaned.living_area, 1200.0);
    }

    #[test]
    fn test_water_access_and_fireplace() {
        let t = transformer();
        let cleaned = t
            .transform(&with(&[
                ("Eau (accès)", "Navigable"),
                ("Foyers-Poêles", "Foyer au bois"),
            ]))
            .unwrap();
        assert!(cleaned.water_access);
        assert!(cleaned.has_fireplace);
        assert!(cleaned.fireplace_func);

        let cleaned = t
            .transform(&with(&[
                ("Eau (accès)", "Non navigable"),
                ("Foyers-Poêles", "Foyer Non fonctionnel"),
            ]))
            .unwrap();
        assert!(!cleaned.water_access);
        assert!(cleaned.has_fireplace);
        assert!(!cleaned.fireplace_func);
    }

    #[test]
    fn test_padded_non_navigable_has_no_access() {
        let cleaned = transformer()
            .transform(&with(&[("Eau (accès)", "  Non navigable ")]))
            .unwrap();
        assert!(!cleaned.water_access);
    }

    #[test]
    fn test_none_marker_clears_every_category() {
        let cleaned = transformer()
            .transform(&with(&[
                ("Chauffage", "none"),
                ("Plan d'eau", "NONE"),
                ("Piscine", "None"),
                ("Équip./Serv.", "none"),
            ]))
            .unwrap();
        assert_eq!(cleaned.heating, "");
        assert_eq!(cleaned.get("heating"), Some(crate::types::FeatureValue::Text(None)));
        assert!(cleaned.heating_flags.iter().all(|flag| !flag));
        assert!(!cleaned.near_water);
        assert_eq!(cleaned.water_name, None);
        assert!(!cleaned.has_pool);
        assert_eq!(cleaned.pool_type, None);
        assert!(cleaned.service_flags.iter().all(|flag| !flag));
    }

    #[test]
    fn test_renovations() {
        let cleaned = transformer()
            .transform(&with(&[("Rénovations", "Toiture 2012, Cuisine 2019")]))
            .unwrap();
        assert!(cleaned.has_reno);
        assert_eq!(cleaned.last_year_reno, 2019);

        let cleaned = transformer()
            .transform(&with(&[("Rénovations", "Salle de bain")]))
            .unwrap();
        assert!(cleaned.has_reno);
        assert_eq!(cleaned.last_year_reno, 0);
    }

    #[test]
    fn test_counts() {
        let cleaned = transformer()
            .transform(&with(&[
                ("Nbre salles de bains + salles d'eau", "2 + 1"),
                ("Nbre chambres (hors-sol + sous-sol)", "3 + 1"),
                ("Nbre pièces", "9"),
                ("Un. rés.", "4"),
                ("Stationnement (total)", "Allée (2), Garage (1)"),
            ]))
            .unwrap();
        assert_eq!(cleaned.washrooms, 3);
        assert_eq!(cleaned.bedrooms, 4);
        assert_eq!(cleaned.rooms, 9);
        assert_eq!(cleaned.units, 4);
        assert_eq!(cleaned.total_parking, 3);
    }
}
