// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A graph representation of the unit processes of the electricity model,
//! and the default-provider links between them.

mod builder;
mod creation;
mod entities;
mod identity;
mod integrity;
mod registry;
mod retrieval;
mod snapshot;
mod validation;

pub mod iterators;
mod traversal;

pub use builder::{GraphContext, ProcessGraphBuilder};
pub use entities::{Exchange, Flow, Location, ProcessNode, Uncertainty};
pub use integrity::IntegrityReport;
pub use registry::ProviderRegistry;
pub use snapshot::GraphSnapshot;
pub use traversal::{ProcessLink, SupplyChain};

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// `ProcessNode`s stored in a `DiGraph` instance can be addressed with
/// `NodeIndex`es.
///
/// `NodeIndexMap` stores the corresponding `NodeIndex` for any process id, so
/// that processes in the `DiGraph` can be retrieved from their ids.
pub(crate) type NodeIndexMap = HashMap<Uuid, NodeIndex>;

/// A typed store of processes, flows and locations.
///
/// Processes are the nodes of a directed graph with an edge from each
/// process to every default provider of its inputs.  The edges are derived
/// from the exchanges and are rebuilt whenever providers change.
#[derive(Clone, Debug, Default)]
pub struct ProcessGraph {
    graph: DiGraph<ProcessNode, ()>,
    node_indices: NodeIndexMap,
    flows: BTreeMap<Uuid, Flow>,
    locations: BTreeMap<Uuid, Location>,
}
