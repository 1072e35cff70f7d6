// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `FuelCategory` enum, which represents the canonical
//! fuel category of a facility or a regional mix entry.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Represents the canonical fuel category of a generation source.
///
/// Raw fuel codes reported by the source datasets need to be converted to
/// this type with [`FuelCategory::from_code`] before any grouping happens, so
/// that facilities reported under different primary-fuel mappings end up in
/// the same group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FuelCategory {
    Coal,
    Gas,
    Oil,
    Nuclear,
    Hydro,
    Wind,
    Solar,
    SolarThermal,
    Geothermal,
    Biomass,
    /// Other fuels, e.g. tire-derived fuel or purchased steam.
    Othf,
    /// Other fossil gases, e.g. blast furnace gas.
    Ofsl,
    /// No single fuel reaches the primary-fuel dominance threshold.
    Mixed,
}

impl FuelCategory {
    /// Resolves a raw fuel code to its canonical category.
    ///
    /// Both EIA primary fuel codes (`"BIT"`, `"NG"`, `"WAT"`, ...) and the
    /// canonical names themselves (`"COAL"`, `"GAS"`, ...) are accepted,
    /// case-insensitively.  Anything else is a mapping error.
    pub fn from_code(raw: &str) -> Result<Self, Error> {
        let code = raw.trim().to_ascii_uppercase();
        let category = match code.as_str() {
            "BIT" | "SUB" | "LIG" | "RC" | "ANT" | "SGC" | "SC" | "WOC" | "WC" | "COAL" => {
                FuelCategory::Coal
            }
            "NG" | "GAS" => FuelCategory::Gas,
            "DFO" | "RFO" | "WO" | "KER" | "JF" | "PG" | "PC" | "SGP" | "OIL" => FuelCategory::Oil,
            "NUC" | "NUCLEAR" => FuelCategory::Nuclear,
            "WAT" | "HYDRO" => FuelCategory::Hydro,
            "WND" | "WIND" => FuelCategory::Wind,
            "SUN" | "SOLAR" => FuelCategory::Solar,
            "SOLARTHERMAL" => FuelCategory::SolarThermal,
            "GEO" | "GEOTHERMAL" => FuelCategory::Geothermal,
            "BLQ" | "WDS" | "WDL" | "MSB" | "LFG" | "AB" | "OBL" | "SLW" | "OBG" | "OBS"
            | "BIOMASS" => FuelCategory::Biomass,
            "MSN" | "WH" | "OTH" | "TDF" | "PUR" | "MWH" | "OTHF" => FuelCategory::Othf,
            "OG" | "BFG" | "OFSL" => FuelCategory::Ofsl,
            "MIXED" => FuelCategory::Mixed,
            _ => {
                return Err(Error::mapping(format!(
                    "Fuel code '{}' does not map to a fuel category.",
                    raw.trim()
                )))
            }
        };
        Ok(category)
    }

    /// Returns the category a facility should be grouped under, given the
    /// share of its generation that comes from its primary fuel.
    ///
    /// Facilities whose primary fuel does not reach `threshold` are `MIXED`.
    pub fn with_dominance(self, primary_fuel_share: f64, threshold: f64) -> Self {
        if primary_fuel_share < threshold {
            FuelCategory::Mixed
        } else {
            self
        }
    }
}

impl Display for FuelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FuelCategory::Coal => write!(f, "COAL"),
            FuelCategory::Gas => write!(f, "GAS"),
            FuelCategory::Oil => write!(f, "OIL"),
            FuelCategory::Nuclear => write!(f, "NUCLEAR"),
            FuelCategory::Hydro => write!(f, "HYDRO"),
            FuelCategory::Wind => write!(f, "WIND"),
            FuelCategory::Solar => write!(f, "SOLAR"),
            FuelCategory::SolarThermal => write!(f, "SOLARTHERMAL"),
            FuelCategory::Geothermal => write!(f, "GEOTHERMAL"),
            FuelCategory::Biomass => write!(f, "BIOMASS"),
            FuelCategory::Othf => write!(f, "OTHF"),
            FuelCategory::Ofsl => write!(f, "OFSL"),
            FuelCategory::Mixed => write!(f, "MIXED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(FuelCategory::from_code("BIT"), Ok(FuelCategory::Coal));
        assert_eq!(FuelCategory::from_code(" lig "), Ok(FuelCategory::Coal));
        assert_eq!(FuelCategory::from_code("NG"), Ok(FuelCategory::Gas));
        assert_eq!(FuelCategory::from_code("gas"), Ok(FuelCategory::Gas));
        assert_eq!(FuelCategory::from_code("WAT"), Ok(FuelCategory::Hydro));
        assert_eq!(FuelCategory::from_code("LFG"), Ok(FuelCategory::Biomass));
        assert_eq!(FuelCategory::from_code("BFG"), Ok(FuelCategory::Ofsl));
        assert_eq!(FuelCategory::from_code("mixed"), Ok(FuelCategory::Mixed));
        assert!(FuelCategory::from_code("HPS").is_err_and(|e| e
            == Error::mapping("Fuel code 'HPS' does not map to a fuel category.")));
        assert!(FuelCategory::from_code("").is_err());
    }

    #[test]
    fn test_round_trip_display() {
        for category in [
            FuelCategory::Coal,
            FuelCategory::Gas,
            FuelCategory::Oil,
            FuelCategory::Nuclear,
            FuelCategory::Hydro,
            FuelCategory::Wind,
            FuelCategory::Solar,
            FuelCategory::SolarThermal,
            FuelCategory::Geothermal,
            FuelCategory::Biomass,
            FuelCategory::Othf,
            FuelCategory::Ofsl,
            FuelCategory::Mixed,
        ] {
            assert_eq!(FuelCategory::from_code(&category.to_string()), Ok(category));
        }
    }

    #[test]
    fn test_dominance() {
        assert_eq!(
            FuelCategory::Coal.with_dominance(0.95, 0.9),
            FuelCategory::Coal
        );
        assert_eq!(
            FuelCategory::Coal.with_dominance(0.9, 0.9),
            FuelCategory::Coal
        );
        assert_eq!(
            FuelCategory::Coal.with_dominance(0.6, 0.9),
            FuelCategory::Mixed
        );
    }
}
