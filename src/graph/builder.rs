// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Assembly of a [`ProcessGraph`] from resolved mix tables.

mod distribution;
mod generation;
mod mixes;

use std::collections::BTreeMap;

use uuid::Uuid;

use super::{Location, ProcessGraph, ProcessNode, ProviderRegistry};
use crate::{
    aggregation::LossRateTable,
    config::ModelConfig,
    consumption::ConsumptionMix,
    process_kind::{ProcessKey, ProcessKind},
    records::RegionalMixEntry,
    Error,
};

/// The tables a process graph is built from.
#[derive(Clone, Copy, Debug)]
pub struct GraphContext<'a> {
    pub generation_mixes: &'a [RegionalMixEntry],
    pub surplus_pools: &'a BTreeMap<String, ConsumptionMix>,
    pub consumption_mixes: &'a BTreeMap<String, ConsumptionMix>,
    pub loss_rates: &'a LossRateTable,
}

/// Builds a [`ProcessGraph`] one process kind at a time.
///
/// Default providers are looked up by [`ProcessKey`] among the processes
/// built so far, so kinds must be added in provider order: generation,
/// generation mixes, surplus pools, consumption mixes, distribution.  Adding
/// a kind after a later one is an `Internal` error.
pub struct ProcessGraphBuilder<'a> {
    config: &'a ModelConfig,
    graph: ProcessGraph,
    registry: ProviderRegistry,
    stage: Option<ProcessKind>,
}

impl<'a> ProcessGraphBuilder<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            config,
            graph: ProcessGraph::new(),
            registry: ProviderRegistry::new(),
            stage: None,
        }
    }

    /// Builds the full graph for `context`.
    pub fn build(config: &ModelConfig, context: GraphContext<'_>) -> Result<ProcessGraph, Error> {
        let mut builder = ProcessGraphBuilder::new(config);
        builder
            .add_generation(context.generation_mixes)?
            .add_generation_mixes(context.generation_mixes)?
            .add_surplus_pools(context.surplus_pools)?
            .add_consumption_mixes(context.consumption_mixes)?
            .add_distribution(context.consumption_mixes, context.loss_rates)?;
        Ok(builder.finish())
    }

    /// Returns the graph with its provider links in place.
    pub fn finish(mut self) -> ProcessGraph {
        self.graph.relink();
        tracing::info!(
            "Built a process graph with {} processes, {} flows and {} links.",
            self.graph.process_count(),
            self.graph.flows().count(),
            self.graph.link_count()
        );
        self.graph
    }

    /// Moves the builder to the stage of `kind`.
    fn enter_stage(&mut self, kind: ProcessKind) -> Result<(), Error> {
        if let Some(current) = self.stage {
            if kind.build_stage() < current.build_stage() {
                return Err(Error::internal(format!(
                    "Can't add {} processes after {} processes.",
                    kind, current
                )));
            }
        }
        self.stage = Some(kind);
        Ok(())
    }

    fn add_process(&mut self, process: ProcessNode, location: Location) {
        self.registry.register(process.key.clone(), process.id);
        self.graph.insert_location(location);
        self.graph.insert_process(process);
    }

    /// Returns the id of the process with the given key, logging a warning
    /// if it hasn't been built.
    fn provider(&self, key: &ProcessKey, consumer: &ProcessKey) -> Option<Uuid> {
        let id = self.registry.get(key);
        if id.is_none() {
            tracing::warn!(
                "No provider process {} for {}, leaving the input without provider.",
                key,
                consumer
            );
        }
        id
    }
}
