// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Regional transmission and distribution loss rates.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    config::ModelConfig,
    records::FacilityRecord,
    region::{RegionLevel, NATIONAL_REGION},
    Error,
};

/// Transmission and distribution loss fractions per region, plus a
/// scope-wide average used when a region has no loss rate of its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LossRateTable {
    regional: BTreeMap<String, f64>,
    national: Option<f64>,
}

impl LossRateTable {
    /// Creates a table from precomputed regional loss fractions.
    pub fn new(regional: BTreeMap<String, f64>, national: Option<f64>) -> Self {
        Self { regional, national }
    }

    /// Computes generation-weighted regional loss fractions from per-state
    /// loss fractions.
    ///
    /// Each facility contributes its state's loss rate, weighted by its
    /// generation, to the region it belongs to at `level`.  Facilities
    /// without generation, a state, or a known state rate don't contribute.
    pub fn from_state_rates(
        records: &[FacilityRecord],
        state_rates: &BTreeMap<String, f64>,
        level: RegionLevel,
    ) -> Self {
        let mut regional_sums: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let mut national_sums = (0.0, 0.0);

        for record in records {
            let Some(generation) = record.generation.filter(|g| *g > 0.0) else {
                continue;
            };
            let Some(rate) = record
                .regions
                .at(RegionLevel::State, &record.facility_id)
                .and_then(|state| state_rates.get(state))
            else {
                tracing::debug!(
                    "No state loss rate for facility {}, skipping.",
                    record.facility_id
                );
                continue;
            };
            national_sums.0 += rate * generation;
            national_sums.1 += generation;
            if let Some(region) = record.regions.at(level, &record.facility_id) {
                let sums = regional_sums.entry(region.to_string()).or_default();
                sums.0 += rate * generation;
                sums.1 += generation;
            }
        }

        let regional = regional_sums
            .into_iter()
            .map(|(region, (weighted, total))| (region, weighted / total))
            .collect();
        let national = (national_sums.1 > 0.0).then(|| national_sums.0 / national_sums.1);

        Self { regional, national }
    }

    /// Returns the loss rate of a region.
    ///
    /// Falls back to the national average, and then to the loss implied by
    /// the configured distribution grid efficiency, reporting each fallback
    /// through the configured sparse data policy.
    pub fn lookup(&self, region: &str, config: &ModelConfig) -> Result<f64, Error> {
        if let Some(rate) = self.regional.get(region) {
            return Ok(*rate);
        }
        if region == NATIONAL_REGION {
            if let Some(rate) = self.national {
                return Ok(rate);
            }
        }
        if let Some(rate) = self.national {
            config.sparse_data_policy.report(format!(
                "Failed to find T&D losses for '{region}', using US average."
            ))?;
            return Ok(rate);
        }
        config.sparse_data_policy.report(format!(
            "Failed to find T&D losses for '{region}' or a US average, \
             using distribution grid efficiency."
        ))?;
        Ok(config.default_loss_rate())
    }

    /// Returns the scope-wide average loss rate, if known.
    pub fn national(&self) -> Option<f64> {
        self.national
    }
}
