// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Aggregation of facility-level generation and emissions into regional
//! generation mixes.

mod data_quality;
mod losses;
mod statistics;

pub use data_quality::{data_collection_score, technological_correlation_score};
pub use losses::LossRateTable;

use std::collections::BTreeMap;

use crate::{
    config::{ModelConfig, SparseDataPolicy, WeightingBasis},
    records::{FacilityRecord, FlowRef, RegionalMixEntry},
    region::RegionLevel,
    Error, FuelCategory,
};
use statistics::Sample;

/// Collapses facility records into per-(region, fuel category) statistics.
pub struct RegionalAggregator<'a> {
    config: &'a ModelConfig,
}

/// A facility that passed filtering, with its resolved group key.
struct Member<'a> {
    record: &'a FacilityRecord,
    generation: f64,
}

impl<'a> RegionalAggregator<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self { config }
    }

    /// Aggregates `records` to the regions of `level`.
    ///
    /// Rows with a missing, negative or non-finite generation are excluded
    /// with a warning.  Raw fuel codes are resolved to their canonical
    /// category before grouping; unmapped fuel or region codes are errors
    /// under the strict sparse data policy, and are skipped with an error log
    /// otherwise.  Regions whose total generation is zero are dropped.
    ///
    /// Returns an `EmptyAggregation` error if no region remains.
    pub fn aggregate(
        &self,
        records: &[FacilityRecord],
        level: RegionLevel,
        weighting_basis: WeightingBasis,
    ) -> Result<Vec<RegionalMixEntry>, Error> {
        let mut groups: BTreeMap<(String, FuelCategory), Vec<Member>> = BTreeMap::new();

        for record in records {
            let generation = match record.generation {
                Some(generation) if generation >= 0.0 && generation.is_finite() => generation,
                other => {
                    tracing::warn!(
                        "Excluding facility {} from aggregation: invalid generation {:?}.",
                        record.facility_id,
                        other
                    );
                    continue;
                }
            };

            let Some(region) = record.regions.at(level, &record.facility_id) else {
                self.unmapped(Error::mapping(format!(
                    "Facility {} has no {} region code.",
                    record.facility_id, level
                )))?;
                continue;
            };

            let fuel = match FuelCategory::from_code(&record.fuel_code) {
                Ok(fuel) => fuel,
                Err(err) => {
                    self.unmapped(err)?;
                    continue;
                }
            };
            let fuel =
                fuel.with_dominance(record.primary_fuel_share, self.config.primary_fuel_threshold);
            if fuel == FuelCategory::Mixed && !self.config.keep_mixed_plant_category {
                tracing::warn!(
                    "Dropping facility {}: primary fuel share {} is below {}.",
                    record.facility_id,
                    record.primary_fuel_share,
                    self.config.primary_fuel_threshold
                );
                continue;
            }

            groups
                .entry((region.to_string(), fuel))
                .or_default()
                .push(Member { record, generation });
        }

        if groups.is_empty() {
            return Err(Error::empty_aggregation(format!(
                "No usable facility records remain out of {} rows.",
                records.len()
            )));
        }

        let mut region_totals: BTreeMap<&str, f64> = BTreeMap::new();
        for ((region, _), members) in &groups {
            *region_totals.entry(region.as_str()).or_default() +=
                members.iter().map(|m| m.generation).sum::<f64>();
        }
        for (region, total) in &region_totals {
            if *total <= 0.0 {
                tracing::warn!("Dropping region {}: zero total generation.", region);
            }
        }

        let mut entries = vec![];
        for ((region, fuel), members) in &groups {
            let total = region_totals.get(region.as_str()).copied().unwrap_or(0.0);
            if total <= 0.0 {
                continue;
            }
            entries.push(self.mix_entry(region, *fuel, members, total, weighting_basis));
        }

        if entries.is_empty() {
            return Err(Error::empty_aggregation(format!(
                "All {} aggregated regions have zero total generation.",
                region_totals.len()
            )));
        }

        tracing::info!(
            "Aggregated {} facility records into {} {} mix entries.",
            records.len(),
            entries.len(),
            level
        );
        Ok(entries)
    }

    fn mix_entry(
        &self,
        region: &str,
        fuel: FuelCategory,
        members: &[Member],
        region_total: f64,
        weighting_basis: WeightingBasis,
    ) -> RegionalMixEntry {
        let electricity: f64 = members.iter().map(|m| m.generation).sum();

        let mut samples: BTreeMap<&FlowRef, Vec<Sample>> = BTreeMap::new();
        for member in members {
            for emission in &member.record.emissions {
                if !emission.amount.is_finite() {
                    tracing::warn!(
                        "Skipping non-finite {} amount of facility {}.",
                        emission.flow.name,
                        member.record.facility_id
                    );
                    continue;
                }
                samples.entry(&emission.flow).or_default().push(Sample {
                    generation: member.generation,
                    amount: emission.amount,
                    data_quality: member.record.data_quality,
                });
            }
        }

        let primary_share = statistics::weighted_mean(
            &members
                .iter()
                .map(|m| (m.record.primary_fuel_share, m.generation))
                .collect::<Vec<_>>(),
        )
        .unwrap_or(0.0);
        let technological_score = f64::from(technological_correlation_score(primary_share));

        let emissions = samples
            .into_iter()
            .map(|(flow, samples)| {
                let mut stats = statistics::flow_statistics(
                    flow.clone(),
                    &samples,
                    electricity,
                    weighting_basis,
                    self.config.default_geometric_sd,
                );
                stats.data_quality[3] = technological_score;
                stats
            })
            .collect();

        RegionalMixEntry {
            region: region.to_string(),
            fuel,
            electricity,
            generation_ratio: electricity / region_total,
            facility_count: members.len(),
            emissions,
        }
    }

    /// Handles a record whose fuel or region code doesn't map.
    fn unmapped(&self, err: Error) -> Result<(), Error> {
        match self.config.sparse_data_policy {
            SparseDataPolicy::Strict => Err(err),
            SparseDataPolicy::Lenient => {
                tracing::error!("{}; skipping record.", err);
                Ok(())
            }
        }
    }
}
