// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for validating the provider links and flows of a
//! [`ProcessGraph`][crate::ProcessGraph].

use std::collections::BTreeSet;

use crate::Error;

use super::ProcessGraphValidator;

impl ProcessGraphValidator<'_> {
    /// Validates that every default provider is a process in the graph.
    pub(super) fn validate_providers(&self) -> Result<(), Error> {
        for process in self.pg.processes() {
            for provider in process.providers() {
                if self.pg.process(provider).is_err() {
                    return Err(Error::invalid_graph(format!(
                        "{} ({}) has a default provider {} that is not in the graph.",
                        process.name, process.id, provider
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validates that there are no cycles reachable from root processes.
    ///
    /// If a cycle is detected, an error is returned that names the link
    /// closing it.
    pub(super) fn validate_acyclicity(&self) -> Result<(), Error> {
        if let Some((consumer, provider)) = self.pg.back_links_from_roots().first() {
            return Err(Error::invalid_graph(format!(
                "Cycle detected: {} -> {}",
                self.pg.graph[*consumer].name, self.pg.graph[*provider].name
            )));
        }
        Ok(())
    }

    /// Validates that every flow in the graph is used by an exchange.
    pub(super) fn validate_no_unreferenced_flows(&self) -> Result<(), Error> {
        let used = self
            .pg
            .processes()
            .flat_map(|p| p.exchanges.iter().map(|e| e.flow))
            .collect::<BTreeSet<_>>();

        let unreferenced = self
            .pg
            .flows()
            .filter(|f| !used.contains(&f.id))
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>();

        if !unreferenced.is_empty() {
            return Err(Error::invalid_graph(format!(
                "Flows {:?} are not used by any exchange.",
                unreferenced
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::{
        graph::{Exchange, Flow},
        process_kind::ProcessKey,
        records::FlowRef,
        region::RegionLevel,
        test_utils::process,
        Error, ProcessGraph,
    };

    const BA: RegionLevel = RegionLevel::BalancingAuthority;

    #[test]
    fn test_providers() {
        let mut graph = ProcessGraph::new();
        let grid = Flow::electricity_at_grid();
        let mut node = process(ProcessKey::consumption_mix("X", BA));
        node.push_exchange(Exchange::input(&grid, 1.0, Some(Uuid::nil())));
        graph.insert_flow(grid);
        graph.insert_process(node.clone());

        assert!(graph.validate().is_err_and(|e| e
            == Error::invalid_graph(format!(
                "{} ({}) has a default provider {} that is not in the graph.",
                node.name,
                node.id,
                Uuid::nil()
            ))));
    }

    #[test]
    fn test_acyclicity() {
        let mut graph = ProcessGraph::new();
        let grid = Flow::electricity_at_grid();
        let mut x = process(ProcessKey::consumption_mix("X", BA));
        let mut y = process(ProcessKey::consumption_mix("Y", BA));
        x.push_exchange(Exchange::input(&grid, 1.0, Some(y.id)));
        y.push_exchange(Exchange::input(&grid, 1.0, Some(x.id)));
        graph.insert_flow(grid);
        graph.insert_process(x);
        graph.insert_process(y);
        graph.relink();

        assert!(graph.validate().is_err_and(|e| e
            == Error::invalid_graph(
                "Cycle detected: Electricity; at grid; consumption mix - Y - BA -> \
                 Electricity; at grid; consumption mix - X - BA"
            )));
    }

    #[test]
    fn test_unreferenced_flows() -> Result<(), Error> {
        let mut graph = ProcessGraph::new();
        graph.insert_flow(Flow::electricity_at_grid());
        graph.insert_process(process(ProcessKey::generation_mix("X", BA)));
        graph.validate()?;

        graph.insert_flow(Flow::elementary(&FlowRef::new("Methane", "air", "kg")));
        assert!(graph.validate().is_err_and(|e| e
            == Error::invalid_graph("Flows [\"Methane\"] are not used by any exchange.")));
        Ok(())
    }
}
