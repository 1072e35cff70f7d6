// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Generation processes: one per region and fuel category.

use crate::{
    graph::{Exchange, Flow, Location, ProcessNode, Uncertainty},
    process_kind::{ProcessKey, ProcessKind},
    records::{EmissionStats, RegionalMixEntry},
    Error,
};

use super::ProcessGraphBuilder;

impl ProcessGraphBuilder<'_> {
    /// Adds a generation process for every regional mix entry.
    ///
    /// Each process produces one MWh of electricity at grid and emits the
    /// group's mean emission factor of every flow.  Factors that are
    /// negative or not finite are skipped with a warning.
    pub fn add_generation(&mut self, entries: &[RegionalMixEntry]) -> Result<&mut Self, Error> {
        self.enter_stage(ProcessKind::Generation)?;
        let level = self.config.regional_aggregation.generation_level();
        let grid = Flow::electricity_at_grid();

        for entry in entries {
            let key = ProcessKey::generation(entry.region.as_str(), level, entry.fuel);
            let location = Location::new(entry.region.as_str());
            let mut process = ProcessNode::new(key, &location, Exchange::reference(&grid));

            for stats in &entry.emissions {
                if !stats.emission_factor.is_finite() || stats.emission_factor < 0.0 {
                    tracing::warn!(
                        "Skipping {} of {}, its emission factor is {}.",
                        stats.flow.name,
                        process.name,
                        stats.emission_factor
                    );
                    continue;
                }
                let flow = Flow::elementary(&stats.flow);
                process.push_exchange(
                    Exchange::output(&flow, stats.emission_factor)
                        .with_uncertainty(uncertainty(stats))
                        .with_data_quality(&stats.data_quality),
                );
                self.graph.insert_flow(flow);
            }

            self.add_process(process, location);
        }
        if !entries.is_empty() {
            self.graph.insert_flow(grid);
        }

        tracing::debug!("Added {} generation processes.", entries.len());
        Ok(self)
    }
}

/// Log-normal uncertainty of a flow, when both parameters are known.
fn uncertainty(stats: &EmissionStats) -> Option<Uncertainty> {
    match (stats.geometric_mean, stats.geometric_sd) {
        (Some(geometric_mean), Some(geometric_sd))
            if geometric_mean.is_finite() && geometric_sd.is_finite() =>
        {
            Some(Uncertainty {
                geometric_mean,
                geometric_sd,
            })
        }
        _ => None,
    }
}
