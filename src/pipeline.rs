// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The end-to-end model run: aggregation, trade, consumption mixes and the
//! finalized process graph.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    aggregation::{LossRateTable, RegionalAggregator},
    config::{ConsumptionPolicy, ModelConfig},
    consumption::{ConsumptionMix, ConsumptionMixResolver, NoTrade, SurplusPoolTable},
    graph::{GraphContext, IntegrityReport, ProcessGraphBuilder},
    records::{FacilityRecord, RegionalMixEntry, TradeTransaction},
    region::RegionLevel,
    trade::{io_model, TradeBalance, TradeMatrix},
    Error, ProcessGraph,
};

/// The tables a model run starts from.
#[derive(Clone, Debug, Default)]
pub struct PipelineInputs {
    pub facilities: Vec<FacilityRecord>,
    /// Physical trade between regions of the generation level.  Only used by
    /// net trading runs.
    pub trade_transactions: Vec<TradeTransaction>,
    /// Net generation per region of the generation level.  When present,
    /// net trading runs attribute consumption through the input-output trade
    /// model.  Otherwise each region's aggregated generation is taken as its
    /// disposition, and its imports as a share of it.
    pub net_generation: Option<BTreeMap<String, f64>>,
    /// Only used by surplus pool runs.
    pub surplus_pools: SurplusPoolTable,
    /// Transmission and distribution loss fractions per state.
    pub state_loss_rates: BTreeMap<String, f64>,
}

/// Everything a model run produces.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub generation_mixes: Vec<RegionalMixEntry>,
    /// Empty unless the run used net trading.
    pub trade_balances: Vec<TradeBalance>,
    /// Empty unless the run used surplus pools.
    pub surplus_pools: BTreeMap<String, ConsumptionMix>,
    pub consumption_mixes: BTreeMap<String, ConsumptionMix>,
    pub loss_rates: LossRateTable,
    pub graph: ProcessGraph,
    pub integrity: IntegrityReport,
}

/// Runs the model for `inputs` with the given configuration.
///
/// Returns the validated, finalized process graph along with the tables it
/// was built from.
pub fn run(inputs: &PipelineInputs, config: &ModelConfig) -> Result<PipelineOutput, Error> {
    config.validate()?;
    let generation_level = config.regional_aggregation.generation_level();
    let scope = config.regional_aggregation.consumption_level();

    let generation_mixes = RegionalAggregator::new(config).aggregate(
        &inputs.facilities,
        generation_level,
        config.weighting_basis,
    )?;
    let regions = generation_mixes
        .iter()
        .map(|e| e.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();

    let resolver = ConsumptionMixResolver::new(config, &generation_mixes);
    let mut trade_balances = vec![];
    let mut surplus_pools = BTreeMap::new();

    let consumption_mixes = match config.consumption_policy() {
        ConsumptionPolicy::SurplusPool => {
            let mut pool_regions = regions.clone();
            pool_regions.extend(
                inputs
                    .surplus_pools
                    .members()
                    .map(|(region, _)| region.to_string())
                    .filter(|region| !regions.contains(region)),
            );
            let resolved = resolver.resolve_surplus_pools(&inputs.surplus_pools, &pool_regions)?;
            surplus_pools = resolved.pools;
            resolved.consumption
        }
        ConsumptionPolicy::NetTrading => {
            let raw = TradeMatrix::build_matrix(&inputs.trade_transactions, &regions, config)?;
            trade_balances = raw.balances();
            // Amounts of each importer's consumption sourced from each region.
            let supply = match &inputs.net_generation {
                Some(net_generation) => {
                    io_model::consumption_matrix(net_generation, &raw, config.io_trade_threshold)?
                }
                None => raw.with_local_generation(&region_generation(&generation_mixes)),
            };

            if scope == generation_level {
                resolver.resolve_all(&regions, &supply.normalize_rows())?
            } else {
                // Rolled up in MWh, so each member weighs in by how much it
                // consumes.
                let table = supply.rollup(&importer_map(&inputs.facilities, generation_level, scope));
                let coarse = table.regions().collect::<Vec<_>>();
                resolver.resolve_all(&coarse, &table)?
            }
        }
        ConsumptionPolicy::SelfGeneration => {
            if scope == generation_level {
                resolver.resolve_all(&regions, &NoTrade)?
            } else {
                // Coarse regions consume the generation of their member
                // regions, weighted by how much each generates.
                let mut own_supply = TradeMatrix::new(&regions);
                for (region, electricity) in region_generation(&generation_mixes) {
                    own_supply.set_cell(&region, &region, electricity)?;
                }
                let table =
                    own_supply.rollup(&importer_map(&inputs.facilities, generation_level, scope));
                let coarse = table.regions().collect::<Vec<_>>();
                resolver.resolve_all(&coarse, &table)?
            }
        }
    };

    let loss_rates =
        LossRateTable::from_state_rates(&inputs.facilities, &inputs.state_loss_rates, scope);

    let mut graph = ProcessGraphBuilder::build(
        config,
        GraphContext {
            generation_mixes: &generation_mixes,
            surplus_pools: &surplus_pools,
            consumption_mixes: &consumption_mixes,
            loss_rates: &loss_rates,
        },
    )?;
    let integrity = graph.finalize();
    graph.validate()?;

    tracing::info!(
        "Model run finished: {} generation mix entries, {} {} consumption mixes, {} processes.",
        generation_mixes.len(),
        consumption_mixes.len(),
        scope,
        graph.process_count()
    );

    Ok(PipelineOutput {
        generation_mixes,
        trade_balances,
        surplus_pools,
        consumption_mixes,
        loss_rates,
        graph,
        integrity,
    })
}

/// Returns the total electricity generated in each region.
fn region_generation(generation_mixes: &[RegionalMixEntry]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for entry in generation_mixes {
        *totals.entry(entry.region.clone()).or_default() += entry.electricity;
    }
    totals
}

/// Maps each region at `fine` level to the region at `coarse` level its
/// facilities belong to.
fn importer_map(
    facilities: &[FacilityRecord],
    fine: RegionLevel,
    coarse: RegionLevel,
) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for record in facilities {
        let id = record.facility_id.as_str();
        let fine_code = record.regions.at(fine, id);
        let coarse_code = record.regions.at(coarse, id);
        if let (Some(fine_code), Some(coarse_code)) = (fine_code, coarse_code) {
            map.entry(fine_code.to_string())
                .or_insert_with(|| coarse_code.to_string());
        }
    }
    map
}
