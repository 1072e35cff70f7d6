// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for validating a [`ProcessGraph`].

mod validate_graph;
mod validate_processes;

use crate::{Error, ProcessGraph};

pub(crate) struct ProcessGraphValidator<'a> {
    pg: &'a ProcessGraph,
}

/// Validation.
impl ProcessGraph {
    /// Checks that the graph is ready for export:
    ///  - every process has exactly one quantitative reference,
    ///  - all exchanges refer to known flows,
    ///  - all default providers are processes in the graph,
    ///  - no cycle can be reached from a consumption mix or distribution
    ///    process,
    ///  - every flow is used by at least one exchange.
    ///
    /// The first violation found is returned as an `InvalidGraph` error.
    pub fn validate(&self) -> Result<(), Error> {
        let validator = ProcessGraphValidator { pg: self };

        validator.validate_reference_exchanges()?;
        validator.validate_flow_references()?;
        validator.validate_providers()?;
        validator.validate_acyclicity()?;
        validator.validate_no_unreferenced_flows()?;

        Ok(())
    }
}
