// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Distribution processes: electricity at user, after grid losses.

use std::collections::BTreeMap;

use crate::{
    aggregation::LossRateTable,
    consumption::ConsumptionMix,
    graph::{Exchange, Flow, Location, ProcessNode},
    process_kind::{ProcessKey, ProcessKind},
    Error,
};

use super::ProcessGraphBuilder;

impl ProcessGraphBuilder<'_> {
    /// Adds an at-user process for every consumption mix.
    ///
    /// Delivering one MWh to users takes `1 + loss` MWh from the region's
    /// at-grid consumption mix.  Must be called after all consumption mixes
    /// are added.
    pub fn add_distribution(
        &mut self,
        mixes: &BTreeMap<String, ConsumptionMix>,
        loss_rates: &LossRateTable,
    ) -> Result<&mut Self, Error> {
        self.enter_stage(ProcessKind::Distribution)?;
        let grid = Flow::electricity_at_grid();
        let user = Flow::electricity_at_user();

        for mix in mixes.values() {
            let loss = loss_rates.lookup(&mix.region, self.config)?;
            let key = ProcessKey::distribution(mix.region.as_str(), mix.scope);
            let location = Location::new(mix.region.as_str());
            let mut process = ProcessNode::new(key, &location, Exchange::reference(&user));

            let provider = self.provider(
                &ProcessKey::consumption_mix(mix.region.as_str(), mix.scope),
                &process.key,
            );
            process.push_exchange(Exchange::input(&grid, 1.0 + loss, provider));
            self.add_process(process, location);
        }
        if !mixes.is_empty() {
            self.graph.insert_flow(grid);
            self.graph.insert_flow(user);
        }

        tracing::debug!("Added {} distribution processes.", mixes.len());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::{
        aggregation::LossRateTable,
        config::{ModelConfig, SparseDataPolicy},
        consumption::{ConsumptionMix, MixSource},
        graph::{Flow, ProcessGraphBuilder},
        process_kind::ProcessKey,
        region::RegionLevel,
        Error, ErrorKind,
    };

    fn mixes(regions: &[&str]) -> BTreeMap<String, ConsumptionMix> {
        regions
            .iter()
            .map(|r| {
                (
                    r.to_string(),
                    ConsumptionMix {
                        region: r.to_string(),
                        scope: RegionLevel::BalancingAuthority,
                        entries: vec![],
                        sources: vec![MixSource {
                            provider: ProcessKey::generation_mix(*r, RegionLevel::BalancingAuthority),
                            fraction: 1.0,
                        }],
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_distribution() -> Result<(), Error> {
        let config = ModelConfig::default();
        let mixes = mixes(&["X", "Y"]);
        let loss_rates = LossRateTable::new(BTreeMap::from([("X".to_string(), 0.05)]), Some(0.07));

        let mut builder = ProcessGraphBuilder::new(&config);
        builder
            .add_consumption_mixes(&mixes)?
            .add_distribution(&mixes, &loss_rates)?;
        let graph = builder.finish();

        let ba = RegionLevel::BalancingAuthority;
        let dist_x = graph.find_process(&ProcessKey::distribution("X", ba)).unwrap();
        let cons_x = graph.find_process(&ProcessKey::consumption_mix("X", ba)).unwrap();
        assert_eq!(dist_x.name, "Electricity; at user; consumption mix - X - BA");
        assert_eq!(
            dist_x.quantitative_reference().map(|e| e.flow),
            Some(Flow::electricity_at_user().id)
        );
        assert!((dist_x.exchanges[1].amount - 1.05).abs() < 1e-12);
        assert_eq!(dist_x.exchanges[1].default_provider, Some(cons_x.id));

        let dist_y = graph.find_process(&ProcessKey::distribution("Y", ba)).unwrap();
        assert!((dist_y.exchanges[1].amount - 1.07).abs() < 1e-12);
        assert_eq!(graph.product_systems().len(), 2);
        Ok(())
    }

    #[test]
    fn test_strict_missing_loss_rate() {
        let config = ModelConfig {
            sparse_data_policy: SparseDataPolicy::Strict,
            ..Default::default()
        };
        let mixes = mixes(&["X"]);
        let mut builder = ProcessGraphBuilder::new(&config);
        assert!(builder
            .add_distribution(&mixes, &LossRateTable::default())
            .is_err_and(|e| e.kind() == ErrorKind::SparseData));
    }
}
