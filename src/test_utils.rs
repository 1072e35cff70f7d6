// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains the
//! fixtures shared by the tests of all pipeline stages.

use std::collections::BTreeMap;

use crate::{
    graph::{Exchange, Flow, Location, ProcessNode},
    process_kind::ProcessKey,
    records::{DataQuality, EmissionAmount, FacilityRecord, FlowRef, RegionalMixEntry},
    region::RegionCodes,
    FuelCategory,
};

/// Builds a facility record in balancing authority `ba` and FERC region
/// `FERC1`, emitting `co2` kg of carbon dioxide.
pub(crate) fn facility(
    id: &str,
    ba: &str,
    fuel: &str,
    generation: Option<f64>,
    co2: f64,
) -> FacilityRecord {
    FacilityRecord {
        facility_id: id.into(),
        regions: RegionCodes {
            balancing_authority: Some(ba.into()),
            ferc: Some("FERC1".into()),
            ..Default::default()
        },
        fuel_code: fuel.into(),
        primary_fuel_share: 1.0,
        generation,
        emissions: vec![EmissionAmount {
            flow: FlowRef::new("Carbon dioxide", "emission/air", "kg"),
            amount: co2,
        }],
        data_quality: DataQuality::new([2; 5]),
    }
}

/// Builds generation mix entries from `(region, fuel, electricity)` rows,
/// with generation ratios computed per region.
pub(crate) fn mix_entries(rows: &[(&str, FuelCategory, f64)]) -> Vec<RegionalMixEntry> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (region, _, electricity) in rows {
        *totals.entry(*region).or_default() += electricity;
    }
    rows.iter()
        .map(|(region, fuel, electricity)| RegionalMixEntry {
            region: region.to_string(),
            fuel: *fuel,
            electricity: *electricity,
            generation_ratio: electricity / totals[region],
            facility_count: 1,
            emissions: vec![],
        })
        .collect()
}

/// Builds a process with `key` that produces one MWh of electricity at grid.
pub(crate) fn process(key: ProcessKey) -> ProcessNode {
    let location = Location::new(key.region.as_str());
    ProcessNode::new(key, &location, Exchange::reference(&Flow::electricity_at_grid()))
}
