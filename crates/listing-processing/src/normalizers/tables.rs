//! Canonicalization tables for the categorical listing fields.
//!
//! Each table is an ordered list of `(keyword, label)` pairs. Lookups are
//! first-match-wins in declared order, so more specific keywords that share
//! a prefix with a different label must be declared first.

use once_cell::sync::Lazy;

/// Ordered keyword-to-label mapping for one categorical domain.
#[derive(Debug, Clone)]
pub struct CanonicalizationTable {
    name: &'static str,
    entries: Vec<(String, &'static str)>,
}

impl CanonicalizationTable {
    /// Build a table, lower-casing every keyword.
    pub fn new(name: &'static str, entries: &[(&str, &'static str)]) -> Self {
        Self {
            name,
            entries: entries
                .iter()
                .map(|(keyword, label)| (keyword.to_lowercase(), *label))
                .collect(),
        }
    }

    /// Domain name, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Label of the first keyword contained in `lowered`.
    ///
    /// `lowered` must already be lower-cased.
    pub fn lookup(&self, lowered: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword.as_str()))
            .map(|(_, label)| *label)
    }

    /// Distinct labels of every keyword contained in `lowered`, in
    /// declaration order.
    pub fn all_matches<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        let mut seen: Vec<&'static str> = Vec::new();
        self.entries
            .iter()
            .filter(move |(keyword, _)| lowered.contains(keyword.as_str()))
            .filter_map(move |(_, label)| {
                if seen.contains(label) {
                    None
                } else {
                    seen.push(*label);
                    Some(*label)
                }
            })
    }

    /// Distinct labels in declaration order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = Vec::new();
        for (_, label) in &self.entries {
            if !labels.contains(label) {
                labels.push(*label);
            }
        }
        labels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub const ST_LAWRENCE: &str = "Fleuve St-Laurent";
pub const LACHINE_CANAL: &str = "Canal de Lachine";

/// Water bodies near a property ("Plan d'eau").
pub static WATER_BODIES: Lazy<CanonicalizationTable> = Lazy::new(|| {
    CanonicalizationTable::new(
        "water_body",
        &[
            ("fleuve st-laurent", ST_LAWRENCE),
            ("st-lawrence river", ST_LAWRENCE),
            ("st-laurent river", ST_LAWRENCE),
            ("st lawrence", ST_LAWRENCE),
            ("st-lawrence", ST_LAWRENCE),
            ("canal de lachine", LACHINE_CANAL),
            ("canal lachine", LACHINE_CANAL),
            ("canal de l'aqueduc", LACHINE_CANAL),
            ("lachine canal", LACHINE_CANAL),
            ("rivière des prairies", "Rivière des Prairies"),
            ("rivière-des-prairies", "Rivière des Prairies"),
            ("municipal", "Municipal"),
            ("municipality", "Municipal"),
            ("city", "Ville"),
            ("ville", "Ville"),
            ("louis veuillot", "Louis Veuillot"),
        ],
    )
});

/// Pool descriptions ("Piscine").
pub static POOL_TYPES: Lazy<CanonicalizationTable> = Lazy::new(|| {
    CanonicalizationTable::new(
        "pool_type",
        &[
            // Compound pool types sit above the generic keyword they contain
            // so they keep their own label instead of collapsing into it.
            ("chauffée au mazout", "Chauffée au mazout"),
            ("chauffée", "Chauffée"),
            ("semi-creusé / sel", "Au sel"),
            ("semi-creusée", "Semi-creusée"),
            ("creusée", "Creusée"),
            ("semi hors terre", "Hors-Terre"),
            ("hors terre", "Hors-Terre"),
            ("hors-terre", "Hors-Terre"),
            ("au locataire", "Au locataire"),
            ("spa", "Spa"),
            ("étang à poisson", "Étang à poisson"),
            ("béton", "Creusée"),
            ("thermopompe", "Chauffée"),
            ("inground", "Creusée"),
            ("above ground", "Hors-Terre"),
            ("heated", "Chauffée"),
            ("toile", "Inconnu"),
        ],
    )
});

/// Heating system variants ("Chauffage"), matched per comma-separated token.
pub static HEATING_TYPES: Lazy<CanonicalizationTable> = Lazy::new(|| {
    CanonicalizationTable::new(
        "heating",
        &[
            ("plinthes électriques", "Plinthes électriques"),
            ("plinthes à convection", "Convecteurs"),
            ("convecteur", "Convecteurs"),
            ("eau chaude", "Eau chaude"),
            ("air soufflé", "Air soufflé (pulsé)"),
            ("radiant", "Radiant"),
            ("thermopom", "Thermopompe"),
            ("themo pomp", "Thermopompe"),
            ("gaz naturel", "Gaz naturel"),
            ("poêle à bois", "Poêle à bois"),
            ("foyer au gaz", "Foyer au gaz"),
            ("foyer ayu gaz", "Foyer au gaz"),
            ("baseboard", "Plinthes électriques"),
            ("hot water", "Eau chaude"),
            ("forced air", "Air soufflé (pulsé)"),
            ("heat pump", "Thermopompe"),
            ("natural gas", "Gaz naturel"),
            ("wood stove", "Poêle à bois"),
        ],
    )
});

/// Heating categories that each get an indicator column.
pub const HEATING_CATEGORIES: [(&str, &str); 9] = [
    ("Plinthes électriques", "heating_electric_baseboard"),
    ("Convecteurs", "heating_convector"),
    ("Eau chaude", "heating_hot_water"),
    ("Air soufflé (pulsé)", "heating_forced_air"),
    ("Radiant", "heating_radiant"),
    ("Thermopompe", "heating_heat_pump"),
    ("Gaz naturel", "heating_natural_gas"),
    ("Poêle à bois", "heating_wood_stove"),
    ("Foyer au gaz", "heating_gas_fireplace"),
];

/// Auxiliary services ("Équip./Serv.") that each get an indicator column.
pub const SERVICES: [(&str, &str); 16] = [
    ("Porte de garage électrique", "service_garage_door_opener"),
    ("Buanderie", "service_laundry"),
    ("Climatiseur", "service_air_conditioner"),
    ("Aspirateur centrale", "service_central_vacuum"),
    ("Spa", "service_spa"),
    ("Détecteur d'incendie(relié)", "service_fire_detector_connected"),
    ("Détecteur d'incendie(non relié)", "service_fire_detector_standalone"),
    ("Adapté pour personne à mobilité réduite", "service_reduced_mobility"),
    ("Interphone", "service_intercom"),
    ("Fournaise", "service_furnace"),
    ("Thermopompe", "service_heat_pump"),
    ("Planchers chauffant", "service_heated_floors"),
    ("Ascenseur", "service_elevator"),
    ("Échangeur d'air", "service_air_exchanger"),
    ("Système d'alarme", "service_alarm_system"),
    ("Borne de recharge", "service_charging_station"),
];

/// Keywords mapping free-text services onto [`SERVICES`] labels.
pub static SERVICE_KEYWORDS: Lazy<CanonicalizationTable> = Lazy::new(|| {
    CanonicalizationTable::new(
        "service",
        &[
            ("garage", "Porte de garage électrique"),
            ("climatiseur", "Climatiseur"),
            ("climatisation", "Climatiseur"),
            ("air conditioning", "Climatiseur"),
            ("buanderie", "Buanderie"),
            ("laundry", "Buanderie"),
            ("aspirateur", "Aspirateur centrale"),
            ("central vacuum", "Aspirateur centrale"),
            ("thermo", "Thermopompe"),
            ("heat pump", "Thermopompe"),
            ("planchers chauffant", "Planchers chauffant"),
            ("heated floor", "Planchers chauffant"),
            ("fournaise", "Fournaise"),
            ("furnace", "Fournaise"),
            ("spa", "Spa"),
            ("ascenseur", "Ascenseur"),
            ("elevator", "Ascenseur"),
            ("borne", "Borne de recharge"),
            ("charging station", "Borne de recharge"),
            ("interphone", "Interphone"),
            ("intercom", "Interphone"),
            ("échangeur d'air", "Échangeur d'air"),
            ("air exchanger", "Échangeur d'air"),
            ("alarme", "Système d'alarme"),
            ("alarm", "Système d'alarme"),
        ],
    )
});
