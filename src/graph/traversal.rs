// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains methods that help with graph traversal.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use serde::Serialize;
use uuid::Uuid;

use super::ProcessGraph;
use crate::{process_kind::ProcessKind, Error};

/// A default-provider link: `consumer` takes `flow` from `provider`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ProcessLink {
    pub consumer: Uuid,
    pub provider: Uuid,
    pub flow: Uuid,
}

/// The processes and links reachable from a root process by following
/// default providers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SupplyChain {
    pub root: Uuid,
    /// Processes in breadth-first order, starting with the root.
    pub processes: Vec<Uuid>,
    pub links: Vec<ProcessLink>,
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

/// Traversal methods.
impl ProcessGraph {
    /// Collects the supply chain of the process with the given `root` id.
    ///
    /// Every process is visited once, so a cycle in the provider links ends
    /// the walk instead of repeating it.  Providers that are not in the graph
    /// are not followed.
    pub fn supply_chain(&self, root: Uuid) -> Result<SupplyChain, Error> {
        let root_process = self.process(root)?;

        let mut visited = HashSet::from([root]);
        let mut processes = vec![];
        let mut links = vec![];
        let mut seen_links = HashSet::new();
        let mut worklist = VecDeque::from([root_process]);

        while let Some(process) = worklist.pop_front() {
            processes.push(process.id);
            for exchange in process.exchanges.iter().filter(|e| e.is_input) {
                let Some(provider_id) = exchange.default_provider else {
                    continue;
                };
                let Ok(provider) = self.process(provider_id) else {
                    continue;
                };
                let link = ProcessLink {
                    consumer: process.id,
                    provider: provider_id,
                    flow: exchange.flow,
                };
                if seen_links.insert(link.clone()) {
                    links.push(link);
                }
                if visited.insert(provider_id) {
                    worklist.push_back(provider);
                }
            }
        }

        Ok(SupplyChain {
            root,
            processes,
            links,
        })
    }

    /// Collects the supply chains of all distribution processes.
    pub fn product_systems(&self) -> Vec<SupplyChain> {
        self.processes()
            .filter(|p| p.key.kind == ProcessKind::Distribution)
            .filter_map(|p| self.supply_chain(p.id).ok())
            .collect()
    }

    /// Returns true if no cycle of provider links can be reached from a
    /// consumption mix or distribution process.
    pub fn is_acyclic_from_roots(&self) -> bool {
        self.back_links_from_roots().is_empty()
    }

    /// Finds the provider links that close a cycle, in a depth-first walk
    /// from every consumption mix and distribution process.
    ///
    /// Each returned `(consumer, provider)` pair is a link from a process to
    /// one of the processes on the current walk.  Cutting all of them leaves
    /// the reachable part of the graph acyclic.
    pub(crate) fn back_links_from_roots(&self) -> Vec<(NodeIndex, NodeIndex)> {
        let mut state: HashMap<NodeIndex, Visit> = HashMap::new();
        let mut back_links = vec![];

        let roots = self
            .graph
            .node_indices()
            .filter(|i| self.graph[*i].key.kind.is_root());

        for root in roots {
            if state.contains_key(&root) {
                continue;
            }
            state.insert(root, Visit::InProgress);
            let mut stack = vec![(root, self.graph.neighbors(root).collect::<Vec<_>>(), 0)];

            loop {
                let Some((node, providers, pos)) = stack.last_mut() else {
                    break;
                };
                let node = *node;
                let Some(&next) = providers.get(*pos) else {
                    state.insert(node, Visit::Done);
                    stack.pop();
                    continue;
                };
                *pos += 1;

                match state.get(&next) {
                    Some(Visit::InProgress) => back_links.push((node, next)),
                    Some(Visit::Done) => {}
                    None => {
                        state.insert(next, Visit::InProgress);
                        stack.push((next, self.graph.neighbors(next).collect(), 0));
                    }
                }
            }
        }

        back_links
    }
}
