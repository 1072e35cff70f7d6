// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The fixed lookup table of surplus pools used when consumption mixes are
//! derived from eGRID trading data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a region's consumption is split between its surplus pool and its own
/// generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolMembership {
    /// The surplus pool the region imports from.
    pub pool: String,
    /// Electricity taken from the pool.
    pub trade_in: f64,
    /// Electricity taken from the region's own generation.
    pub own_generation: f64,
}

/// Surplus pools and the regions that draw from them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SurplusPoolTable {
    /// Pool name to the electricity each contributing region puts in.
    pools: BTreeMap<String, BTreeMap<String, f64>>,
    members: BTreeMap<String, PoolMembership>,
}

impl SurplusPoolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pool with the amounts contributed by each region.  Zero and
    /// invalid contributions are ignored.
    pub fn add_pool<I, S>(&mut self, pool: impl Into<String>, contributions: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let contributions = contributions
            .into_iter()
            .filter(|(_, amount)| *amount > 0.0 && amount.is_finite())
            .map(|(region, amount)| (region.into(), amount))
            .collect();
        self.pools.insert(pool.into(), contributions);
        self
    }

    /// Records how a region splits its consumption.
    pub fn add_member(&mut self, region: impl Into<String>, membership: PoolMembership) -> &mut Self {
        self.members.insert(region.into(), membership);
        self
    }

    /// Returns an iterator over the pools and their contributions.
    pub fn pools(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, f64>)> {
        self.pools.iter().map(|(pool, c)| (pool.as_str(), c))
    }

    /// Returns how `region` splits its consumption, if it's part of the
    /// table.
    pub fn membership(&self, region: &str) -> Option<&PoolMembership> {
        self.members.get(region)
    }

    /// Returns an iterator over the member regions.
    pub fn members(&self) -> impl Iterator<Item = (&str, &PoolMembership)> {
        self.members.iter().map(|(region, m)| (region.as_str(), m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        let mut table = SurplusPoolTable::new();
        table
            .add_pool("WECC", [("NWPP", 30.0), ("CAMX", 0.0), ("AZNM", f64::NAN)])
            .add_member(
                "CAMX",
                PoolMembership {
                    pool: "WECC".into(),
                    trade_in: 0.25,
                    own_generation: 0.75,
                },
            );

        let pools: Vec<_> = table.pools().collect();
        assert_eq!(pools.len(), 1);
        assert_eq!(
            pools[0].1,
            &BTreeMap::from([("NWPP".to_string(), 30.0)])
        );
        assert_eq!(table.membership("CAMX").map(|m| m.trade_in), Some(0.25));
        assert_eq!(table.membership("NWPP"), None);
        assert_eq!(table.members().count(), 1);
    }
}
