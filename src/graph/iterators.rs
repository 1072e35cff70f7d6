// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over processes in a `ProcessGraph`.

use petgraph::graph::DiGraph;

use crate::ProcessNode;

/// An iterator over the processes in a `ProcessGraph`.
pub struct Processes<'a> {
    pub(crate) iter: std::slice::Iter<'a, petgraph::graph::Node<ProcessNode>>,
}

impl<'a> Iterator for Processes<'a> {
    type Item = &'a ProcessNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|n| &n.weight)
    }
}

/// An iterator over the providers or consumers of a process in a
/// `ProcessGraph`.
pub struct Neighbors<'a> {
    pub(crate) graph: &'a DiGraph<ProcessNode, ()>,
    pub(crate) iter: petgraph::graph::Neighbors<'a, ()>,
}

impl<'a> Iterator for Neighbors<'a> {
    type Item = &'a ProcessNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|i| &self.graph[i])
    }
}
