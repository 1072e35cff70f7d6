// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Electricity LCI Graph

This is a library for building life cycle inventory (LCI) models of the U.S.
electricity grid, as a graph of unit processes linked by their default
providers.

Facility-level generation and emissions are aggregated into regional
generation mixes, inter-regional trade turns those into consumption mixes,
and the mixes are assembled into a [`ProcessGraph`] that a downstream LCA
engine can traverse without running into cycles or dangling references.

## The pipeline

[`pipeline::run`] runs every stage for a set of
[`PipelineInputs`][pipeline::PipelineInputs] and a
[`ModelConfig`][config::ModelConfig]:

- [`RegionalAggregator`][aggregation::RegionalAggregator] collapses facility
  records into per-(region, fuel category) statistics.
- [`TradeMatrix`][trade::TradeMatrix] builds and normalizes the
  inter-regional trade, optionally through the input-output model in
  [`trade::io_model`].
- [`ConsumptionMixResolver`][consumption::ConsumptionMixResolver] blends
  generation mixes into consumption mixes, by net trading, surplus pools or
  self-generation.
- [`ProcessGraphBuilder`] creates the generation, mix and distribution
  processes, wiring each input to its provider.
- [`finalize`][ProcessGraph::finalize] repairs the graph and
  [`validate`][ProcessGraph::validate] checks that it is ready for export.

Each stage can also be used on its own.

## Identity

Processes, flows and locations are identified by name-based UUIDs derived
from their category, location and name, so repeated runs over the same
inputs produce the same identifiers.

## Data gaps

Incomplete inputs are handled according to the configured
[`SparseDataPolicy`][config::SparseDataPolicy]: either a warning is logged
through `tracing` and a documented fallback is used, or the run fails with an
[`Error`] of kind [`SparseData`][ErrorKind::SparseData].
*/

pub mod aggregation;
pub mod config;
pub mod consumption;
pub mod pipeline;
pub mod records;
pub mod region;
pub mod trade;

mod fuel_category;
pub use fuel_category::FuelCategory;

mod process_kind;
pub use process_kind::{ProcessKey, ProcessKind};

mod graph;
pub use graph::{
    iterators, Exchange, Flow, GraphContext, GraphSnapshot, IntegrityReport, Location,
    ProcessGraph, ProcessGraphBuilder, ProcessLink, ProcessNode, ProviderRegistry, SupplyChain,
    Uncertainty,
};

mod error;
pub use error::{Error, ErrorKind};

#[cfg(test)]
mod test_utils;
