// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for retrieving processes, flows and locations from a
//! [`ProcessGraph`].

use uuid::Uuid;

use super::{Flow, Location, ProcessGraph, ProcessNode};
use crate::iterators::{Neighbors, Processes};
use crate::{process_kind::ProcessKey, Error};

/// Entity retrieval.
impl ProcessGraph {
    /// Returns the process with the given `id`, if it exists.
    pub fn process(&self, id: Uuid) -> Result<&ProcessNode, Error> {
        self.node_indices
            .get(&id)
            .map(|i| &self.graph[*i])
            .ok_or_else(|| Error::process_not_found(format!("Process with id {} not found.", id)))
    }

    /// Returns the process with the given key, if it exists.
    pub fn find_process(&self, key: &ProcessKey) -> Option<&ProcessNode> {
        self.processes().find(|p| &p.key == key)
    }

    /// Returns an iterator over the processes in the graph, in insertion
    /// order.
    pub fn processes(&self) -> Processes {
        Processes {
            iter: self.graph.raw_nodes().iter(),
        }
    }

    /// Returns the number of processes in the graph.
    pub fn process_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of distinct (consumer, provider) links.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the flow with the given `id`, if it exists.
    pub fn flow(&self, id: Uuid) -> Option<&Flow> {
        self.flows.get(&id)
    }

    /// Returns an iterator over the flows in the graph, ordered by id.
    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    /// Returns an iterator over the locations in the graph, ordered by id.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Returns an iterator over the default *providers* of the process with
    /// the given `id`.
    ///
    /// Returns an error if the given `id` does not exist.
    pub fn providers(&self, id: Uuid) -> Result<Neighbors, Error> {
        self.neighbors(id, petgraph::Direction::Outgoing)
    }

    /// Returns an iterator over the processes that use the process with the
    /// given `id` as a default provider.
    ///
    /// Returns an error if the given `id` does not exist.
    pub fn consumers(&self, id: Uuid) -> Result<Neighbors, Error> {
        self.neighbors(id, petgraph::Direction::Incoming)
    }

    fn neighbors(&self, id: Uuid, direction: petgraph::Direction) -> Result<Neighbors, Error> {
        self.node_indices
            .get(&id)
            .map(|&index| Neighbors {
                graph: &self.graph,
                iter: self.graph.neighbors_directed(index, direction),
            })
            .ok_or_else(|| Error::process_not_found(format!("Process with id {} not found.", id)))
    }
}
