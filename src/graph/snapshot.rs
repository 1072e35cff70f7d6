// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A serializable view of a [`ProcessGraph`], for the external writer.

use serde::Serialize;

use super::{Flow, Location, ProcessGraph, ProcessNode};

/// All entities of a graph, borrowed from it.
#[derive(Debug, Serialize)]
pub struct GraphSnapshot<'a> {
    pub processes: Vec<&'a ProcessNode>,
    pub flows: Vec<&'a Flow>,
    pub locations: Vec<&'a Location>,
}

impl ProcessGraph {
    /// Returns a serializable view of the graph.  Processes are in insertion
    /// order; flows and locations are ordered by id.
    pub fn snapshot(&self) -> GraphSnapshot<'_> {
        GraphSnapshot {
            processes: self.processes().collect(),
            flows: self.flows().collect(),
            locations: self.locations().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        graph::{Exchange, Flow, Location},
        process_kind::ProcessKey,
        region::RegionLevel,
        test_utils::process,
        ProcessGraph,
    };

    #[test]
    fn test_snapshot_serializes() {
        let grid = Flow::electricity_at_grid();
        let generation = process(ProcessKey::generation_mix("X", RegionLevel::BalancingAuthority));
        let mut consumption =
            process(ProcessKey::consumption_mix("X", RegionLevel::BalancingAuthority));
        consumption.push_exchange(Exchange::input(&grid, 1.0, Some(generation.id)));

        let mut graph = ProcessGraph::new();
        graph.insert_flow(grid.clone());
        graph.insert_location(Location::new("X"));
        graph.insert_process(generation.clone());
        graph.insert_process(consumption);
        graph.relink();

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.processes.len(), 2);
        assert_eq!(snapshot.flows, vec![&grid]);

        let json = serde_json::to_value(&snapshot).unwrap();
        let processes = json["processes"].as_array().unwrap();
        assert_eq!(
            processes[1]["exchanges"][1]["default_provider"],
            serde_json::json!(generation.id.to_string())
        );
        assert_eq!(
            processes[1]["key"]["kind"],
            serde_json::json!("ConsumptionMix")
        );
        assert_eq!(json["locations"][0]["code"], serde_json::json!("X"));
        assert_eq!(json["flows"][0]["unit"], serde_json::json!("MWh"));
    }
}
