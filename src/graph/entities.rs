// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The entities stored in a [`ProcessGraph`][crate::ProcessGraph].

use serde::Serialize;
use uuid::Uuid;

use super::identity;
use crate::{
    process_kind::{ProcessKey, ELECTRICITY_CATEGORY},
    records::{FlowRef, FlowType},
};

/// Category of technosphere electricity flows.
pub(crate) fn product_category() -> String {
    format!("Technosphere Flows/{ELECTRICITY_CATEGORY}")
}

/// A geographic location that processes refer to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Location {
    pub id: Uuid,
    pub code: String,
}

impl Location {
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            id: identity::location_id(&code),
            code,
        }
    }
}

/// A flow that exchanges refer to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Flow {
    pub id: Uuid,
    pub name: String,
    /// Slash separated category path.
    pub category: String,
    pub unit: String,
    pub flow_type: FlowType,
}

impl Flow {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        unit: impl Into<String>,
        flow_type: FlowType,
    ) -> Self {
        let name = name.into();
        let category = category.into();
        Self {
            id: identity::flow_id(&category, &name),
            name,
            category,
            unit: unit.into(),
            flow_type,
        }
    }

    /// Electricity at grid, at transmission voltage.
    pub fn electricity_at_grid() -> Self {
        Self::new(
            "Electricity, AC, 2300-7650 V",
            product_category(),
            "MWh",
            FlowType::Product,
        )
    }

    /// Electricity delivered to users.
    pub fn electricity_at_user() -> Self {
        Self::new(
            "Electricity, AC, 120 V",
            product_category(),
            "MWh",
            FlowType::Product,
        )
    }

    /// The elementary flow of an emission or resource.
    pub fn elementary(flow: &FlowRef) -> Self {
        Self::new(
            flow.name.as_str(),
            format!("Elementary Flows/{}", flow.compartment),
            flow.unit.as_str(),
            FlowType::Elementary,
        )
    }

    pub fn is_elementary(&self) -> bool {
        self.flow_type == FlowType::Elementary
    }

    /// Returns true if the flow is categorized as a resource taken from the
    /// environment.
    pub fn is_resource(&self) -> bool {
        self.category.to_lowercase().contains("resource")
    }
}

/// Log-normal uncertainty of an exchange amount.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Uncertainty {
    pub geometric_mean: f64,
    pub geometric_sd: f64,
}

/// An input or output of a process.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Exchange {
    /// Position of the exchange in its process, starting at 1.
    pub internal_id: u32,
    pub flow: Uuid,
    pub amount: f64,
    pub is_input: bool,
    pub is_quantitative_reference: bool,
    pub is_avoided_product: bool,
    /// The process that supplies this input by default.
    pub default_provider: Option<Uuid>,
    pub uncertainty: Option<Uncertainty>,
    /// Pedigree scores, formatted as `(1;2;3;4;5)`.
    pub data_quality: Option<String>,
    pub description: Option<String>,
}

impl Exchange {
    fn new(flow: &Flow, amount: f64, is_input: bool) -> Self {
        Self {
            internal_id: 0,
            flow: flow.id,
            amount,
            is_input,
            is_quantitative_reference: false,
            is_avoided_product: false,
            default_provider: None,
            uncertainty: None,
            data_quality: None,
            description: None,
        }
    }

    pub fn input(flow: &Flow, amount: f64, provider: Option<Uuid>) -> Self {
        Self {
            default_provider: provider,
            ..Self::new(flow, amount, true)
        }
    }

    pub fn output(flow: &Flow, amount: f64) -> Self {
        Self::new(flow, amount, false)
    }

    /// The reference output of a process: one unit of `flow`.
    pub fn reference(flow: &Flow) -> Self {
        Self {
            is_quantitative_reference: true,
            ..Self::new(flow, 1.0, false)
        }
    }

    pub fn with_uncertainty(mut self, uncertainty: Option<Uncertainty>) -> Self {
        self.uncertainty = uncertainty;
        self
    }

    pub fn with_data_quality(mut self, scores: &[f64; 5]) -> Self {
        self.data_quality = Some(format!(
            "({})",
            scores
                .iter()
                .map(|s| format!("{}", s.round().clamp(1.0, 5.0) as u8))
                .collect::<Vec<_>>()
                .join(";")
        ));
        self
    }
}

/// A unit process: a node of the process graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessNode {
    pub id: Uuid,
    pub key: ProcessKey,
    pub name: String,
    pub category: String,
    pub location: Uuid,
    pub exchanges: Vec<Exchange>,
}

impl ProcessNode {
    /// Creates a process with `reference` as its quantitative reference and
    /// only exchange.
    pub fn new(key: ProcessKey, location: &Location, reference: Exchange) -> Self {
        let name = key.process_name();
        let category = key.category();
        Self {
            id: identity::process_id(&category, &location.code, &name),
            key,
            name,
            category,
            location: location.id,
            exchanges: vec![Exchange {
                internal_id: 1,
                is_quantitative_reference: true,
                ..reference
            }],
        }
    }

    /// Appends an exchange, numbering it after the last one.
    pub fn push_exchange(&mut self, exchange: Exchange) {
        let internal_id = self.exchanges.len() as u32 + 1;
        self.exchanges.push(Exchange {
            internal_id,
            is_quantitative_reference: false,
            ..exchange
        });
    }

    pub fn quantitative_reference(&self) -> Option<&Exchange> {
        self.exchanges.iter().find(|e| e.is_quantitative_reference)
    }

    /// Returns the default providers of the inputs, in exchange order.
    pub fn providers(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.exchanges
            .iter()
            .filter(|e| e.is_input)
            .filter_map(|e| e.default_provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionLevel;

    #[test]
    fn test_process_node() {
        let location = Location::new("PJM");
        let grid = Flow::electricity_at_grid();
        let key = ProcessKey::consumption_mix("PJM", RegionLevel::BalancingAuthority);
        let mut node = ProcessNode::new(key.clone(), &location, Exchange::reference(&grid));

        assert_eq!(node.id, ProcessNode::new(key, &location, Exchange::reference(&grid)).id);
        assert_eq!(node.location, location.id);

        let provider = Uuid::nil();
        node.push_exchange(Exchange::input(&grid, 0.4, Some(provider)));
        node.push_exchange(Exchange::input(&grid, 0.6, None).with_data_quality(&[
            1.2, 2.5, 3.0, 4.4, 9.0,
        ]));

        assert_eq!(
            node.exchanges.iter().map(|e| e.internal_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(node.quantitative_reference().map(|e| e.amount), Some(1.0));
        assert_eq!(node.providers().collect::<Vec<_>>(), vec![provider]);
        assert_eq!(node.exchanges[2].data_quality.as_deref(), Some("(1;3;3;4;5)"));
    }

    #[test]
    fn test_flows() {
        let flow = Flow::elementary(&FlowRef::new("Water", "resource/ground", "kg"));
        assert!(flow.is_elementary());
        assert!(flow.is_resource());
        assert_eq!(flow.category, "Elementary Flows/resource/ground");

        let grid = Flow::electricity_at_grid();
        assert!(!grid.is_elementary());
        assert!(!grid.is_resource());
        assert_ne!(grid.id, Flow::electricity_at_user().id);
        assert_eq!(grid.id, Flow::electricity_at_grid().id);
    }
}
