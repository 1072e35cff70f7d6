// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The repair passes that make a built [`ProcessGraph`] importable.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use uuid::Uuid;

use super::{Exchange, ProcessGraph};

const RESOURCE_FLIP_NOTE: &str = "Resource flow recorded as an output; converted to an input.";

/// Counts of the repairs made by [`ProcessGraph::finalize`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub nan_exchanges_removed: usize,
    pub zero_product_exchanges_removed: usize,
    pub resource_outputs_flipped: usize,
    pub dangling_providers_unset: usize,
    pub cyclic_links_cut: usize,
    pub processes_renumbered: usize,
    pub flows_removed: usize,
}

impl IntegrityReport {
    /// Returns true if no repair was needed.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Integrity repairs.
impl ProcessGraph {
    /// Repairs the graph in place and returns what was repaired.
    ///
    /// Data defects are never errors here: each repair is logged and the
    /// graph is left in a state that passes [`validate`][Self::validate].
    /// Running `finalize` on a finalized graph returns a clean report.
    pub fn finalize(&mut self) -> IntegrityReport {
        let mut report = IntegrityReport {
            nan_exchanges_removed: self.remove_non_finite_exchanges(),
            zero_product_exchanges_removed: self.remove_zero_product_exchanges(),
            resource_outputs_flipped: self.flip_resource_outputs(),
            dangling_providers_unset: self.unset_dangling_providers(),
            ..Default::default()
        };

        self.relink();
        report.cyclic_links_cut = self.cut_cyclic_links();
        report.processes_renumbered = self.renumber_exchanges();
        report.flows_removed = self.remove_unreferenced_flows();

        if report.is_clean() {
            tracing::debug!("Process graph needed no repairs.");
        } else {
            tracing::info!("Process graph repaired: {:?}", report);
        }
        report
    }

    /// Removes every exchange, except a quantitative reference, for which
    /// `remove` returns true.
    fn remove_exchanges(&mut self, mut remove: impl FnMut(&str, &Exchange) -> bool) -> usize {
        let mut removed = 0;
        for process in self.graph.node_weights_mut() {
            let before = process.exchanges.len();
            let name = process.name.as_str();
            process
                .exchanges
                .retain(|e| e.is_quantitative_reference || !remove(name, e));
            removed += before - process.exchanges.len();
        }
        removed
    }

    fn remove_non_finite_exchanges(&mut self) -> usize {
        for process in self.graph.node_weights() {
            if let Some(reference) = process.quantitative_reference() {
                if !reference.amount.is_finite() {
                    tracing::error!(
                        "The quantitative reference of {} has amount {}.",
                        process.name,
                        reference.amount
                    );
                }
            }
        }
        self.remove_exchanges(|process, exchange| {
            let remove = !exchange.amount.is_finite();
            if remove {
                tracing::error!(
                    "Removing exchange {} of {} with amount {}.",
                    exchange.internal_id,
                    process,
                    exchange.amount
                );
            }
            remove
        })
    }

    fn remove_zero_product_exchanges(&mut self) -> usize {
        let product_flows = self
            .flows
            .values()
            .filter(|f| !f.is_elementary())
            .map(|f| f.id)
            .collect::<HashSet<_>>();
        self.remove_exchanges(|process, exchange| {
            let remove = exchange.amount == 0.0 && product_flows.contains(&exchange.flow);
            if remove {
                tracing::warn!(
                    "Removing zero amount product exchange {} of {}.",
                    exchange.internal_id,
                    process
                );
            }
            remove
        })
    }

    fn flip_resource_outputs(&mut self) -> usize {
        let resource_flows = self
            .flows
            .values()
            .filter(|f| f.is_elementary() && f.is_resource())
            .map(|f| f.id)
            .collect::<HashSet<_>>();

        let mut flipped = 0;
        for process in self.graph.node_weights_mut() {
            for exchange in process.exchanges.iter_mut().filter(|e| {
                !e.is_input && !e.is_quantitative_reference && resource_flows.contains(&e.flow)
            }) {
                tracing::warn!(
                    "Exchange {} of {} is a resource output, converting it to an input.",
                    exchange.internal_id,
                    process.name
                );
                exchange.is_input = true;
                exchange.description = Some(match exchange.description.take() {
                    Some(desc) => format!("{desc} {RESOURCE_FLIP_NOTE}"),
                    None => RESOURCE_FLIP_NOTE.to_string(),
                });
                flipped += 1;
            }
        }
        flipped
    }

    fn unset_dangling_providers(&mut self) -> usize {
        let known = self.node_indices.keys().copied().collect::<HashSet<_>>();
        let mut unset = 0;
        for process in self.graph.node_weights_mut() {
            for exchange in process.exchanges.iter_mut() {
                let Some(provider) = exchange.default_provider else {
                    continue;
                };
                if !exchange.is_input || !known.contains(&provider) {
                    tracing::warn!(
                        "Unsetting default provider {} of exchange {} of {}.",
                        provider,
                        exchange.internal_id,
                        process.name
                    );
                    exchange.default_provider = None;
                    unset += 1;
                }
            }
        }
        unset
    }

    /// Cuts every provider link that closes a cycle reachable from a root
    /// process, by unsetting the default providers behind it.
    fn cut_cyclic_links(&mut self) -> usize {
        let back_links = self.back_links_from_roots();
        if back_links.is_empty() {
            return 0;
        }

        for (consumer, provider) in &back_links {
            let provider_id = self.graph[*provider].id;
            let provider_name = self.graph[*provider].name.clone();
            let process = &mut self.graph[*consumer];
            tracing::warn!(
                "Cutting the link from {} to {}, it closes a cycle.",
                process.name,
                provider_name
            );
            for exchange in process
                .exchanges
                .iter_mut()
                .filter(|e| e.default_provider == Some(provider_id))
            {
                exchange.default_provider = None;
            }
        }
        self.relink();
        back_links.len()
    }

    /// Renumbers the exchanges of every process consecutively from 1, and
    /// returns the number of processes that changed.
    fn renumber_exchanges(&mut self) -> usize {
        let mut renumbered = 0;
        for process in self.graph.node_weights_mut() {
            let in_sequence = process
                .exchanges
                .iter()
                .zip(1..)
                .all(|(e, id)| e.internal_id == id);
            if in_sequence {
                continue;
            }
            for (exchange, id) in process.exchanges.iter_mut().zip(1..) {
                exchange.internal_id = id;
            }
            renumbered += 1;
        }
        renumbered
    }

    fn remove_unreferenced_flows(&mut self) -> usize {
        let used = self
            .graph
            .node_weights()
            .flat_map(|p| p.exchanges.iter().map(|e| e.flow))
            .collect::<BTreeSet<Uuid>>();
        let before = self.flows.len();
        self.flows.retain(|id, flow| {
            let keep = used.contains(id);
            if !keep {
                tracing::debug!("Removing unreferenced flow {}.", flow.name);
            }
            keep
        });
        before - self.flows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::Flow, process_kind::ProcessKey, records::FlowRef, region::RegionLevel,
        test_utils::process, Error,
    };

    const BA: RegionLevel = RegionLevel::BalancingAuthority;

    #[test]
    fn test_zero_product_exchanges() -> Result<(), Error> {
        let grid = Flow::electricity_at_grid();
        let methane = Flow::elementary(&FlowRef::new("Methane", "emission/air", "kg"));
        let gen_x = process(ProcessKey::generation_mix("X", BA));
        let mut cons_x = process(ProcessKey::consumption_mix("X", BA));
        cons_x.push_exchange(Exchange::input(&grid, 0.0, Some(gen_x.id)));
        cons_x.push_exchange(Exchange::input(&grid, 1.0, Some(gen_x.id)));
        cons_x.push_exchange(Exchange::output(&methane, 0.0));

        let mut graph = ProcessGraph::new();
        graph.insert_flow(grid.clone());
        graph.insert_flow(methane.clone());
        graph.insert_process(gen_x);
        graph.insert_process(cons_x.clone());
        graph.relink();

        let report = graph.finalize();
        assert_eq!(
            report,
            IntegrityReport {
                zero_product_exchanges_removed: 1,
                processes_renumbered: 1,
                ..Default::default()
            }
        );

        let exchanges = &graph.process(cons_x.id)?.exchanges;
        assert_eq!(exchanges.len(), 3);
        assert!(exchanges
            .iter()
            .all(|e| e.is_quantitative_reference || e.amount != 0.0 || e.flow == methane.id));
        assert_eq!(
            exchanges.iter().map(|e| e.internal_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        assert!(graph.finalize().is_clean());
        graph.validate()?;
        Ok(())
    }

    #[test]
    fn test_repairs() -> Result<(), Error> {
        let grid = Flow::electricity_at_grid();
        let water = Flow::elementary(&FlowRef::new("Water, fresh", "resource/water", "m3"));
        let unused = Flow::elementary(&FlowRef::new("Lead", "emission/air", "kg"));

        let mut gen_x = process(ProcessKey::generation_mix("X", BA));
        gen_x.push_exchange(Exchange::output(&water, 2.0));
        gen_x.push_exchange(Exchange::output(&water, f64::NAN));
        let mut cons_x = process(ProcessKey::consumption_mix("X", BA));
        let mut cons_y = process(ProcessKey::consumption_mix("Y", BA));
        cons_x.push_exchange(Exchange::input(&grid, 0.5, Some(gen_x.id)));
        cons_x.push_exchange(Exchange::input(&grid, 0.5, Some(cons_y.id)));
        cons_y.push_exchange(Exchange::input(&grid, 0.5, Some(cons_x.id)));
        cons_y.push_exchange(Exchange::input(&grid, 0.5, Some(Uuid::nil())));

        let mut graph = ProcessGraph::new();
        for flow in [&grid, &water, &unused] {
            graph.insert_flow(flow.clone());
        }
        for p in [&gen_x, &cons_x, &cons_y] {
            graph.insert_process(p.clone());
        }
        graph.relink();

        let report = graph.finalize();
        assert_eq!(
            report,
            IntegrityReport {
                nan_exchanges_removed: 1,
                zero_product_exchanges_removed: 0,
                resource_outputs_flipped: 1,
                dangling_providers_unset: 1,
                cyclic_links_cut: 1,
                processes_renumbered: 0,
                flows_removed: 1,
            }
        );

        let flipped = &graph.process(gen_x.id)?.exchanges[1];
        assert!(flipped.is_input);
        assert_eq!(flipped.description.as_deref(), Some(RESOURCE_FLIP_NOTE));
        assert!(graph.flow(unused.id).is_none());
        assert!(graph.is_acyclic_from_roots());
        assert!(graph
            .processes()
            .flat_map(|p| p.providers())
            .all(|id| graph.process(id).is_ok()));

        graph.validate()?;

        let again = graph.finalize();
        assert!(again.is_clean());
        assert_eq!(graph.process_count(), 3);
        Ok(())
    }
}
