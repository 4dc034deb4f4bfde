//! Zone Classification
//!
//! Three macro-climate zones, each tied to a hand-curated list of Algerian
//! wilayas. A pair of genera lands in exactly one zone, decided by a fixed
//! priority table over its averaged traits and salinity level.

use serde::Serialize;

use crate::data::TraitColumns;
use crate::traits::AveragedTraits;
use crate::utils::DefaultsPolicy;

/// Salinity above which a pair is coastal regardless of other traits
pub const COASTAL_SALINITY: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Zone {
    /// Hot, arid south; woody heat-tolerant pairs
    Sahara,

    /// Cooler inland plateaus
    #[serde(rename = "High Plateau")]
    HighPlateau,

    /// Mediterranean coast; also the home of salt-tolerant pairs
    Coastal,
}

const SAHARA_REGIONS: &[&str] = &[
    "Adrar",
    "Tamanrasset",
    "Biskra",
    "Ouargla",
    "Bechar",
    "Tindouf",
    "El Oued",
    "Ghardaia",
    "Illizi",
    "Timimoun",
    "In Salah",
];

const HIGH_PLATEAU_REGIONS: &[&str] = &[
    "Setif",
    "Djelfa",
    "Tiaret",
    "Batna",
    "Bordj Bou Arreridj",
    "M'Sila",
    "Saida",
    "Medea",
    "Khenchela",
    "Tebessa",
    "Souk Ahras",
];

const COASTAL_REGIONS: &[&str] = &[
    "Algiers",
    "Tipaza",
    "Oran",
    "Annaba",
    "Skikda",
    "Bejaia",
    "Boumerdes",
    "Tizi Ouzou",
    "Jijel",
    "Mostaganem",
    "Ain Temouchent",
];

impl Zone {
    /// Classify a pair, first matching rule wins:
    ///
    /// 1. salinity > 50                  -> Coastal
    /// 2. tavg > 0.6 and wood > 0.4      -> Sahara
    /// 3. tavg > 0.5 and wood < 0.2      -> Coastal
    /// 4. tavg < 0.5                     -> High Plateau
    /// 5. otherwise                      -> Coastal
    ///
    /// The policy defaults (tavg 0.5, wood 0) stand in only for a column
    /// the trait table lacks. A present column feeds its averaged value
    /// as is, sentinel included, so a pair with unknown tavg lands on the
    /// High Plateau.
    pub fn classify(traits: &AveragedTraits, salinity_level: f64, columns: &TraitColumns) -> Self {
        let policy = DefaultsPolicy::STANDARD;
        let tavg = if columns.tavg {
            traits.tavg
        } else {
            policy.zone_temperature
        };
        let wood = if columns.perc_wood {
            traits.perc_wood
        } else {
            policy.zone_wood
        };

        if salinity_level > COASTAL_SALINITY {
            return Zone::Coastal;
        }

        if tavg > 0.6 && wood > 0.4 {
            return Zone::Sahara;
        }

        if tavg > 0.5 && wood < 0.2 {
            return Zone::Coastal;
        }

        if tavg < 0.5 {
            return Zone::HighPlateau;
        }

        Zone::Coastal
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Zone::Sahara => "Sahara",
            Zone::HighPlateau => "High Plateau",
            Zone::Coastal => "Coastal",
        }
    }

    /// Recommended regions, in curated order
    pub fn regions(&self) -> &'static [&'static str] {
        match self {
            Zone::Sahara => SAHARA_REGIONS,
            Zone::HighPlateau => HIGH_PLATEAU_REGIONS,
            Zone::Coastal => COASTAL_REGIONS,
        }
    }

    /// Case-insensitive substring match of a user filter against the name
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.display_name()
            .to_lowercase()
            .contains(&filter.to_lowercase())
    }

    pub fn all() -> &'static [Zone] {
        &[Zone::Sahara, Zone::HighPlateau, Zone::Coastal]
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::TraitRow;

    fn averaged(wood: Option<f64>, tavg: Option<f64>) -> AveragedTraits {
        let mut row = TraitRow::new("A", "F");
        if let Some(w) = wood {
            row = row.with_wood(w);
        }
        if let Some(t) = tavg {
            row = row.with_temperature(t);
        }
        AveragedTraits::of(&row, &row)
    }

    #[test]
    fn test_salinity_overrides_everything() {
        let traits = averaged(Some(0.9), Some(0.9));
        assert_eq!(Zone::classify(&traits, 50.1, &TraitColumns::ALL), Zone::Coastal);
        assert_eq!(Zone::classify(&traits, 50.0, &TraitColumns::ALL), Zone::Sahara);
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(Zone::classify(&averaged(Some(0.5), Some(0.7)), 0.0, &TraitColumns::ALL), Zone::Sahara);
        assert_eq!(Zone::classify(&averaged(Some(0.1), Some(0.55)), 0.0, &TraitColumns::ALL), Zone::Coastal);
        assert_eq!(Zone::classify(&averaged(Some(0.3), Some(0.4)), 0.0, &TraitColumns::ALL), Zone::HighPlateau);
        // tavg in (0.5, 0.6], wood between the bands: default
        assert_eq!(Zone::classify(&averaged(Some(0.3), Some(0.55)), 0.0, &TraitColumns::ALL), Zone::Coastal);
        // exactly 0.5 is neither above nor below
        assert_eq!(Zone::classify(&averaged(Some(0.3), Some(0.5)), 0.0, &TraitColumns::ALL), Zone::Coastal);
    }

    #[test]
    fn test_unknown_traits_use_raw_average() {
        let all = TraitColumns::ALL;
        // both unknown: tavg -999 < 0.5
        assert_eq!(Zone::classify(&averaged(None, None), 0.0, &all), Zone::HighPlateau);
        // known warm tavg, unknown wood -999 < 0.2
        assert_eq!(Zone::classify(&averaged(None, Some(0.7)), 0.0, &all), Zone::Coastal);
        // unknown tavg, known wood
        assert_eq!(Zone::classify(&averaged(Some(0.3), None), 0.0, &all), Zone::HighPlateau);
    }

    #[test]
    fn test_one_unknown_matches_both_unknown() {
        let all = TraitColumns::ALL;
        let known = TraitRow::new("C", "F").with_wood(0.3).with_temperature(0.4);
        let unknown = TraitRow::new("A", "F").with_wood(0.3);

        let mixed = AveragedTraits::of(&unknown, &known);
        let both = AveragedTraits::of(&unknown, &unknown);
        assert_eq!(Zone::classify(&mixed, 0.0, &all), Zone::HighPlateau);
        assert_eq!(Zone::classify(&both, 0.0, &all), Zone::HighPlateau);
    }

    #[test]
    fn test_absent_columns_take_policy_defaults() {
        let no_climate = TraitColumns {
            perc_wood: false,
            tavg: false,
            ..TraitColumns::ALL
        };
        // tavg -> 0.5, wood -> 0.0: no rule fires, default Coastal
        assert_eq!(Zone::classify(&averaged(None, None), 0.0, &no_climate), Zone::Coastal);

        let no_wood = TraitColumns {
            perc_wood: false,
            ..TraitColumns::ALL
        };
        // wood 0 < 0.2 under warm tavg
        assert_eq!(Zone::classify(&averaged(None, Some(0.7)), 0.0, &no_wood), Zone::Coastal);
        // known cool tavg wins regardless of wood
        assert_eq!(Zone::classify(&averaged(None, Some(0.2)), 0.0, &no_wood), Zone::HighPlateau);
        // present column values are ignored once the column is declared absent
        assert_eq!(Zone::classify(&averaged(Some(0.9), Some(0.7)), 0.0, &no_wood), Zone::Coastal);
    }

    #[test]
    fn test_regions_are_static() {
        for zone in Zone::all() {
            assert_eq!(zone.regions().len(), 11);
            assert!(std::ptr::eq(zone.regions(), zone.regions()));
        }
        assert_eq!(Zone::Sahara.regions()[0], "Adrar");
        assert_eq!(Zone::HighPlateau.regions()[10], "Souk Ahras");
        assert_eq!(Zone::Coastal.regions()[0], "Algiers");
    }

    #[test]
    fn test_filter_matching() {
        assert!(Zone::HighPlateau.matches_filter("plateau"));
        assert!(Zone::HighPlateau.matches_filter("HIGH"));
        assert!(Zone::Coastal.matches_filter(""));
        assert!(!Zone::Sahara.matches_filter("coast"));
    }

    #[test]
    fn test_serializes_display_name() {
        let json = serde_json::to_string(&Zone::HighPlateau).unwrap();
        assert_eq!(json, "\"High Plateau\"");
        assert_eq!(Zone::Sahara.to_string(), "Sahara");
    }
}
