// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The tabular records exchanged between the pipeline stages and their
//! collaborators.

use serde::{Deserialize, Serialize};

use crate::{region::RegionCodes, FuelCategory};

/// The type of a flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowType {
    /// Exchanged with the environment, e.g. an emission to air.
    Elementary,
    /// A technosphere product, e.g. electricity at grid.
    Product,
    /// A technosphere waste.
    Waste,
}

/// Identifies a flow by name, compartment and unit.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowRef {
    pub name: String,
    /// Slash separated compartment path, e.g. `"emission/air"`.
    pub compartment: String,
    pub unit: String,
}

impl FlowRef {
    pub fn new(
        name: impl Into<String>,
        compartment: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            compartment: compartment.into(),
            unit: unit.into(),
        }
    }
}

/// A pedigree-style data quality vector, one score between 1 (best) and 5
/// (worst) per indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub reliability: u8,
    pub temporal_correlation: u8,
    pub geographical_correlation: u8,
    pub technological_correlation: u8,
    pub data_collection: u8,
}

impl DataQuality {
    pub fn new(scores: [u8; 5]) -> Self {
        let [reliability, temporal_correlation, geographical_correlation, technological_correlation, data_collection] =
            scores.map(|s| s.clamp(1, 5));
        Self {
            reliability,
            temporal_correlation,
            geographical_correlation,
            technological_correlation,
            data_collection,
        }
    }

    pub fn scores(&self) -> [u8; 5] {
        [
            self.reliability,
            self.temporal_correlation,
            self.geographical_correlation,
            self.technological_correlation,
            self.data_collection,
        ]
    }
}

impl Default for DataQuality {
    fn default() -> Self {
        Self::new([5; 5])
    }
}

/// The amount of a flow emitted (or consumed) by a facility in the reporting
/// period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionAmount {
    pub flow: FlowRef,
    pub amount: f64,
}

/// One row of facility-level generation and emissions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub facility_id: String,
    pub regions: RegionCodes,
    /// The raw fuel code, resolved through [`FuelCategory::from_code`].
    pub fuel_code: String,
    /// Share of the facility's generation from its primary fuel, in `[0, 1]`.
    pub primary_fuel_share: f64,
    /// Net generation in MWh.  `None` when the source has no value.
    pub generation: Option<f64>,
    pub emissions: Vec<EmissionAmount>,
    pub data_quality: DataQuality,
}

/// Aggregated statistics of one flow for a (region, fuel category) group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmissionStats {
    pub flow: FlowRef,
    /// Total amount emitted by the group.
    pub total_amount: f64,
    /// Weighted mean emission factor, in flow units per MWh.
    pub emission_factor: f64,
    /// Weighted geometric mean of the facility emission factors.
    pub geometric_mean: Option<f64>,
    /// Weighted geometric standard deviation of the facility emission
    /// factors.
    pub geometric_sd: Option<f64>,
    pub min_factor: f64,
    pub max_factor: f64,
    pub facility_count: usize,
    /// Weighted mean data quality scores, same order as
    /// [`DataQuality::scores`].
    pub data_quality: [f64; 5],
}

/// The generation of one fuel category within one region.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionalMixEntry {
    pub region: String,
    pub fuel: FuelCategory,
    /// Total electricity generated, in MWh.
    pub electricity: f64,
    /// Fraction of the region's total generation.
    pub generation_ratio: f64,
    pub facility_count: usize,
    pub emissions: Vec<EmissionStats>,
}

/// One traded amount between two regions of the same scope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeTransaction {
    pub importer: String,
    pub exporter: String,
    pub amount: f64,
    pub year: u16,
}

impl TradeTransaction {
    pub fn new(
        importer: impl Into<String>,
        exporter: impl Into<String>,
        amount: f64,
        year: u16,
    ) -> Self {
        Self {
            importer: importer.into(),
            exporter: exporter.into(),
            amount,
            year,
        }
    }
}

/// The resolved share of one fuel category in a region's consumption mix.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsumptionMixEntry {
    pub region: String,
    pub fuel: FuelCategory,
    pub ratio: f64,
}
