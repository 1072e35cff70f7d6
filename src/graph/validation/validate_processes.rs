// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for validating the exchanges of each process in a
//! [`ProcessGraph`][crate::ProcessGraph].

use crate::Error;

use super::ProcessGraphValidator;

impl ProcessGraphValidator<'_> {
    /// Validates that every process has exactly one quantitative reference,
    /// and that it is an output.
    pub(super) fn validate_reference_exchanges(&self) -> Result<(), Error> {
        for process in self.pg.processes() {
            let references = process
                .exchanges
                .iter()
                .filter(|e| e.is_quantitative_reference)
                .collect::<Vec<_>>();
            match references.as_slice() {
                [reference] if !reference.is_input => {}
                [_] => {
                    return Err(Error::invalid_graph(format!(
                        "The quantitative reference of {} ({}) is an input.",
                        process.name, process.id
                    )))
                }
                _ => {
                    return Err(Error::invalid_graph(format!(
                        "{} ({}) has {} quantitative references, expected 1.",
                        process.name,
                        process.id,
                        references.len()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Validates that all exchanges refer to flows that are in the graph.
    pub(super) fn validate_flow_references(&self) -> Result<(), Error> {
        for process in self.pg.processes() {
            if let Some(exchange) = process
                .exchanges
                .iter()
                .find(|e| self.pg.flow(e.flow).is_none())
            {
                return Err(Error::invalid_graph(format!(
                    "Exchange {} of {} refers to unknown flow {}.",
                    exchange.internal_id, process.name, exchange.flow
                )));
            }
        }
        Ok(())
    }
}
