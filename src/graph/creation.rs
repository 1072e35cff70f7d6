// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for adding entities to a [`ProcessGraph`].

use super::{Flow, Location, ProcessGraph, ProcessNode};

/// Entity insertion.
impl ProcessGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a process to the graph.
    ///
    /// Processes are identified by content, so a process whose id is already
    /// in the graph is a duplicate: the existing process is kept and `false`
    /// is returned.  Provider links of the new process are only added by
    /// [`relink`][ProcessGraph::relink].
    pub fn insert_process(&mut self, process: ProcessNode) -> bool {
        if let Some(idx) = self.node_indices.get(&process.id) {
            let existing = &self.graph[*idx];
            if existing.key != process.key {
                tracing::warn!(
                    "{} and {} share the id {}, keeping {}.",
                    existing.name,
                    process.name,
                    process.id,
                    existing.name
                );
            } else {
                tracing::debug!(
                    "Process {} ({}) already exists, keeping the existing one.",
                    process.name,
                    process.id
                );
            }
            return false;
        }
        let id = process.id;
        let idx = self.graph.add_node(process);
        self.node_indices.insert(id, idx);
        true
    }

    /// Adds a flow to the graph, unless a flow with the same id exists.
    pub fn insert_flow(&mut self, flow: Flow) -> bool {
        if self.flows.contains_key(&flow.id) {
            return false;
        }
        self.flows.insert(flow.id, flow);
        true
    }

    /// Adds a location to the graph, unless a location with the same id
    /// exists.
    pub fn insert_location(&mut self, location: Location) -> bool {
        if self.locations.contains_key(&location.id) {
            return false;
        }
        self.locations.insert(location.id, location);
        true
    }

    /// Rebuilds the provider links of the graph from the default providers
    /// of all input exchanges.
    ///
    /// Providers that are not in the graph are ignored here; the integrity
    /// pass unsets them.
    pub fn relink(&mut self) {
        self.graph.clear_edges();
        let links: Vec<_> = self
            .graph
            .node_indices()
            .flat_map(|consumer| {
                self.graph[consumer]
                    .providers()
                    .filter_map(|provider| self.node_indices.get(&provider).copied())
                    .map(move |provider| (consumer, provider))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (consumer, provider) in links {
            self.graph.update_edge(consumer, provider, ());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::Exchange, process_kind::ProcessKey, region::RegionLevel, test_utils::process,
    };

    #[test]
    fn test_insert_and_relink() {
        let mut graph = ProcessGraph::new();
        let grid = Flow::electricity_at_grid();

        let generation = process(ProcessKey::generation_mix("X", RegionLevel::BalancingAuthority));
        let mut consumption =
            process(ProcessKey::consumption_mix("X", RegionLevel::BalancingAuthority));
        consumption.push_exchange(Exchange::input(&grid, 1.0, Some(generation.id)));
        consumption.push_exchange(Exchange::input(&grid, 0.0, Some(generation.id)));

        assert!(graph.insert_flow(grid.clone()));
        assert!(!graph.insert_flow(grid.clone()));
        assert!(graph.insert_location(Location::new("X")));
        assert!(!graph.insert_location(Location::new("X")));

        assert!(graph.insert_process(consumption.clone()));
        graph.relink();
        // The provider isn't in the graph yet.
        assert_eq!(graph.link_count(), 0);

        assert!(graph.insert_process(generation.clone()));
        assert!(!graph.insert_process(generation.clone()));
        assert_eq!(graph.process_count(), 2);

        graph.relink();
        assert_eq!(graph.link_count(), 1);
        graph.relink();
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn test_id_collision() {
        let upper = process(ProcessKey::consumption_mix("PJM", RegionLevel::BalancingAuthority));
        let lower = process(ProcessKey::consumption_mix("pjm", RegionLevel::BalancingAuthority));
        assert_eq!(upper.id, lower.id);
        assert_ne!(upper.key, lower.key);

        let mut graph = ProcessGraph::new();
        assert!(graph.insert_process(upper.clone()));
        assert!(!graph.insert_process(lower));
        assert_eq!(graph.process_count(), 1);
        assert_eq!(graph.processes().next().map(|p| &p.key), Some(&upper.key));
    }
}
