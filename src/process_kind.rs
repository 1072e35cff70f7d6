// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `ProcessKind` enum, which represents the kind of a
//! process in the graph, and the `ProcessKey` struct that identifies a process
//! by its structure instead of its name.

use std::fmt::Display;

use serde::Serialize;

use crate::{region::RegionLevel, FuelCategory};

/// The category path shared by all electricity processes.
pub(crate) const ELECTRICITY_CATEGORY: &str =
    "22: Utilities/2211: Electric Power Generation, Transmission and Distribution";

/// Represents the kind of a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProcessKind {
    /// Generation from a single fuel category in a region.
    Generation,
    /// The blend of all generation in a region.
    GenerationMix,
    /// A multi-region trading pool.
    SurplusPool,
    /// The electricity consumed in a region, at grid.
    ConsumptionMix,
    /// The electricity delivered to users in a region, after grid losses.
    Distribution,
}

impl ProcessKind {
    /// Returns true for the kinds whose processes are roots of product
    /// systems.
    pub fn is_root(&self) -> bool {
        matches!(self, ProcessKind::ConsumptionMix | ProcessKind::Distribution)
    }

    /// Returns the position of the kind in the build order.  Providers are
    /// always built before the processes that take inputs from them.
    pub(crate) fn build_stage(&self) -> u8 {
        match self {
            ProcessKind::Generation => 0,
            ProcessKind::GenerationMix => 1,
            ProcessKind::SurplusPool => 2,
            ProcessKind::ConsumptionMix => 3,
            ProcessKind::Distribution => 4,
        }
    }
}

impl Display for ProcessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessKind::Generation => write!(f, "Generation"),
            ProcessKind::GenerationMix => write!(f, "GenerationMix"),
            ProcessKind::SurplusPool => write!(f, "SurplusPool"),
            ProcessKind::ConsumptionMix => write!(f, "ConsumptionMix"),
            ProcessKind::Distribution => write!(f, "Distribution"),
        }
    }
}

/// Identifies a process by kind, region, scope and fuel category.
///
/// Only generation processes have a fuel category.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProcessKey {
    pub kind: ProcessKind,
    pub region: String,
    pub scope: RegionLevel,
    pub fuel: Option<FuelCategory>,
}

impl ProcessKey {
    pub fn new(kind: ProcessKind, region: impl Into<String>, scope: RegionLevel) -> Self {
        Self {
            kind,
            region: region.into(),
            scope,
            fuel: None,
        }
    }

    pub fn generation(region: impl Into<String>, scope: RegionLevel, fuel: FuelCategory) -> Self {
        Self {
            kind: ProcessKind::Generation,
            region: region.into(),
            scope,
            fuel: Some(fuel),
        }
    }

    pub fn generation_mix(region: impl Into<String>, scope: RegionLevel) -> Self {
        Self::new(ProcessKind::GenerationMix, region, scope)
    }

    pub fn surplus_pool(pool: impl Into<String>) -> Self {
        Self::new(ProcessKind::SurplusPool, pool, RegionLevel::Nerc)
    }

    pub fn consumption_mix(region: impl Into<String>, scope: RegionLevel) -> Self {
        Self::new(ProcessKind::ConsumptionMix, region, scope)
    }

    pub fn distribution(region: impl Into<String>, scope: RegionLevel) -> Self {
        Self::new(ProcessKind::Distribution, region, scope)
    }

    /// Returns the display name of the process.
    pub fn process_name(&self) -> String {
        match self.kind {
            ProcessKind::Generation => match self.fuel {
                Some(fuel) => format!("Electricity - {} - {}", fuel, self.region),
                None => format!("Electricity - {}", self.region),
            },
            ProcessKind::GenerationMix => {
                format!("Electricity; at grid; generation mix - {}", self.region)
            }
            ProcessKind::SurplusPool => {
                format!("Electricity; at grid; surplus pool - {}", self.region)
            }
            ProcessKind::ConsumptionMix => format!(
                "Electricity; at grid; consumption mix - {} - {}",
                self.region, self.scope
            ),
            ProcessKind::Distribution => format!(
                "Electricity; at user; consumption mix - {} - {}",
                self.region, self.scope
            ),
        }
    }

    /// Returns the category path of the process.
    pub fn category(&self) -> String {
        match self.fuel {
            Some(fuel) => format!("{ELECTRICITY_CATEGORY}/{fuel}"),
            None => ELECTRICITY_CATEGORY.to_string(),
        }
    }
}

impl Display for ProcessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.process_name())
    }
}
