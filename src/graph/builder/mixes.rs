// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Mix processes: generation mixes, surplus pools and consumption mixes.
//! Each takes electricity at grid from its providers in fixed fractions.

use std::collections::BTreeMap;

use crate::{
    consumption::{ConsumptionMix, MixSource},
    graph::{Exchange, Flow, Location, ProcessNode},
    process_kind::{ProcessKey, ProcessKind},
    records::RegionalMixEntry,
    Error,
};

use super::ProcessGraphBuilder;

impl ProcessGraphBuilder<'_> {
    /// Adds a generation mix process for every region in `entries`, drawing
    /// from the region's generation processes by generation ratio.
    pub fn add_generation_mixes(
        &mut self,
        entries: &[RegionalMixEntry],
    ) -> Result<&mut Self, Error> {
        self.enter_stage(ProcessKind::GenerationMix)?;
        let level = self.config.regional_aggregation.generation_level();

        let mut regions: BTreeMap<&str, Vec<MixSource>> = BTreeMap::new();
        for entry in entries {
            regions
                .entry(entry.region.as_str())
                .or_default()
                .push(MixSource {
                    provider: ProcessKey::generation(entry.region.as_str(), level, entry.fuel),
                    fraction: entry.generation_ratio,
                });
        }

        for (region, sources) in &regions {
            self.add_mix(ProcessKey::generation_mix(*region, level), sources);
        }
        tracing::debug!("Added {} generation mix processes.", regions.len());
        Ok(self)
    }

    /// Adds a process for every surplus pool mix.
    pub fn add_surplus_pools(
        &mut self,
        pools: &BTreeMap<String, ConsumptionMix>,
    ) -> Result<&mut Self, Error> {
        self.enter_stage(ProcessKind::SurplusPool)?;
        for mix in pools.values() {
            self.add_mix(ProcessKey::surplus_pool(mix.region.as_str()), &mix.sources);
        }
        tracing::debug!("Added {} surplus pool processes.", pools.len());
        Ok(self)
    }

    /// Adds an at-grid consumption mix process for every consumption mix.
    pub fn add_consumption_mixes(
        &mut self,
        mixes: &BTreeMap<String, ConsumptionMix>,
    ) -> Result<&mut Self, Error> {
        self.enter_stage(ProcessKind::ConsumptionMix)?;
        for mix in mixes.values() {
            self.add_mix(
                ProcessKey::consumption_mix(mix.region.as_str(), mix.scope),
                &mix.sources,
            );
        }
        tracing::debug!("Added {} consumption mix processes.", mixes.len());
        Ok(self)
    }

    fn add_mix(&mut self, key: ProcessKey, sources: &[MixSource]) {
        let grid = Flow::electricity_at_grid();
        let location = Location::new(key.region.as_str());
        let mut process = ProcessNode::new(key, &location, Exchange::reference(&grid));
        for source in sources {
            let provider = self.provider(&source.provider, &process.key);
            process.push_exchange(Exchange::input(&grid, source.fraction, provider));
        }
        self.graph.insert_flow(grid);
        self.add_process(process, location);
    }
}
