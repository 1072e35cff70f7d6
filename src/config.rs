// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the model configuration that is threaded through
//! every stage of the pipeline.

use serde::Deserialize;

use crate::{region::RegionLevel, Error};

/// The regional aggregation chosen for the model run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum RegionalAggregation {
    #[serde(rename = "eGRID")]
    EGrid,
    #[serde(rename = "NERC")]
    Nerc,
    #[serde(rename = "BA")]
    Ba,
    #[serde(rename = "FERC")]
    Ferc,
    #[serde(rename = "US")]
    Us,
}

impl RegionalAggregation {
    /// Returns the region level that facility records are grouped by.
    ///
    /// FERC and US consumption mixes are built from balancing-authority
    /// generation mixes, so both aggregate facilities to the BA level.
    pub fn generation_level(&self) -> RegionLevel {
        match self {
            RegionalAggregation::EGrid => RegionLevel::EGrid,
            RegionalAggregation::Nerc => RegionLevel::Nerc,
            RegionalAggregation::Ba | RegionalAggregation::Ferc | RegionalAggregation::Us => {
                RegionLevel::BalancingAuthority
            }
        }
    }

    /// Returns the region level of the consumption and distribution mixes.
    pub fn consumption_level(&self) -> RegionLevel {
        match self {
            RegionalAggregation::EGrid => RegionLevel::EGrid,
            RegionalAggregation::Nerc => RegionLevel::Nerc,
            RegionalAggregation::Ba => RegionLevel::BalancingAuthority,
            RegionalAggregation::Ferc => RegionLevel::Ferc,
            RegionalAggregation::Us => RegionLevel::National,
        }
    }
}

/// How consumption mixes are derived from generation mixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsumptionPolicy {
    /// Pre-aggregated multi-region trading pools feed consumption mixes
    /// through a fixed lookup table.
    SurplusPool,
    /// Each region's mix is blended with its trading partners' mixes using
    /// the normalized trade matrix.
    NetTrading,
    /// Every region consumes exactly what it generates.
    SelfGeneration,
}

/// The statistical weight used when averaging per-facility values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum WeightingBasis {
    /// Weight by the facility's generation quantity.
    #[default]
    Generation,
    /// Weight by the facility's emitted amount of the flow being averaged.
    FlowAmount,
}

/// What to do when input data is incomplete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum SparseDataPolicy {
    /// Log a warning, apply the documented default and continue.
    #[default]
    Lenient,
    /// Treat every data-sparsity condition as an error.
    Strict,
}

impl SparseDataPolicy {
    /// Reports a data-sparsity condition.
    ///
    /// Returns an error under the `Strict` policy, and logs a warning
    /// otherwise.
    pub(crate) fn report(&self, desc: impl Into<String>) -> Result<(), Error> {
        let desc = desc.into();
        match self {
            SparseDataPolicy::Lenient => {
                tracing::warn!("{}", desc);
                Ok(())
            }
            SparseDataPolicy::Strict => Err(Error::sparse_data(desc)),
        }
    }
}

/// Configuration options for a model run.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// The regional aggregation of the generated processes.
    pub regional_aggregation: RegionalAggregation,

    /// Whether to derive consumption mixes from balancing-authority trade
    /// data.
    pub net_trading: bool,

    /// Whether to derive consumption mixes from the eGRID surplus pools.
    #[serde(rename = "EPA_eGRID_trading")]
    pub epa_egrid_trading: bool,

    /// Whether EIA data replaces the eGRID reference data.
    pub replace_egrid: bool,

    /// Whether upstream fuel-cycle processes are part of the run.
    pub include_upstream_processes: bool,

    /// The eGRID data year.
    pub egrid_year: u16,

    /// The EIA generation data year.
    pub eia_gen_year: u16,

    /// The year of the trade data.
    #[serde(rename = "NETL_IO_trading_year")]
    pub trade_year: u16,

    /// Minimum share of a facility's generation that its primary fuel must
    /// reach for the facility to be categorized under that fuel.
    pub primary_fuel_threshold: f64,

    /// Whether facilities below the primary fuel threshold are kept as
    /// `MIXED`, instead of being dropped.
    pub keep_mixed_plant_category: bool,

    /// Geometric standard deviation assigned to groups with a single member.
    pub default_geometric_sd: f64,

    /// The statistical weight used for emission factors and data quality.
    pub weighting_basis: WeightingBasis,

    /// Efficiency of the distribution grid, used when no loss rate is known
    /// for a region or the nation.
    pub efficiency_of_distribution_grid: f64,

    /// Input-output trade fractions smaller than this share of an importer's
    /// total are dropped.
    pub io_trade_threshold: f64,

    /// What to do when input data is incomplete.
    pub sparse_data_policy: SparseDataPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            regional_aggregation: RegionalAggregation::Ba,
            net_trading: true,
            epa_egrid_trading: false,
            replace_egrid: true,
            include_upstream_processes: false,
            egrid_year: 2016,
            eia_gen_year: 2016,
            trade_year: 2016,
            primary_fuel_threshold: 0.9,
            keep_mixed_plant_category: true,
            default_geometric_sd: 1.0,
            weighting_basis: WeightingBasis::Generation,
            efficiency_of_distribution_grid: 0.95,
            io_trade_threshold: 1e-5,
            sparse_data_policy: SparseDataPolicy::Lenient,
        }
    }
}

impl ModelConfig {
    /// Checks that the configuration describes a runnable model.
    pub fn validate(&self) -> Result<(), Error> {
        if self.epa_egrid_trading && self.net_trading {
            return Err(Error::configuration(
                "EPA eGRID trading and net trading can't be combined in one run.",
            ));
        }
        if self.epa_egrid_trading && self.regional_aggregation != RegionalAggregation::EGrid {
            return Err(Error::configuration(format!(
                "EPA trading method is not compatible with selected regional aggregation - {}",
                self.regional_aggregation.consumption_level()
            )));
        }
        if self.net_trading
            && !matches!(
                self.regional_aggregation,
                RegionalAggregation::Ba | RegionalAggregation::Ferc | RegionalAggregation::Us
            )
        {
            return Err(Error::configuration(format!(
                "Net trading requires BA, FERC or US aggregation, not {}.",
                self.regional_aggregation.consumption_level()
            )));
        }
        if !self.replace_egrid
            && self.include_upstream_processes
            && self.egrid_year != self.eia_gen_year
        {
            return Err(Error::configuration(format!(
                "When using egrid data and adding upstream processes, egrid_year ({}) \
                 should match eia_gen_year ({}).",
                self.egrid_year, self.eia_gen_year
            )));
        }
        for (name, value) in [
            ("primary_fuel_threshold", self.primary_fuel_threshold),
            (
                "efficiency_of_distribution_grid",
                self.efficiency_of_distribution_grid,
            ),
            ("io_trade_threshold", self.io_trade_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::configuration(format!(
                    "{name} must be between 0 and 1, got {value}."
                )));
            }
        }
        if !(self.default_geometric_sd >= 1.0) {
            return Err(Error::configuration(format!(
                "default_geometric_sd must be at least 1, got {}.",
                self.default_geometric_sd
            )));
        }
        Ok(())
    }

    /// Returns the consumption-mix policy selected by this configuration.
    pub fn consumption_policy(&self) -> ConsumptionPolicy {
        if self.epa_egrid_trading {
            ConsumptionPolicy::SurplusPool
        } else if self.net_trading {
            ConsumptionPolicy::NetTrading
        } else {
            ConsumptionPolicy::SelfGeneration
        }
    }

    /// Returns the loss rate to use when neither the region nor the nation
    /// have a known loss rate.
    pub fn default_loss_rate(&self) -> f64 {
        1.0 - self.efficiency_of_distribution_grid
    }
}
