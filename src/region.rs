// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Region levels and the per-facility region codes that map a facility up the
//! region hierarchy.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The code used for the single national region.
pub const NATIONAL_REGION: &str = "US";

/// A level of the region hierarchy that records can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionLevel {
    Facility,
    EGrid,
    BalancingAuthority,
    Nerc,
    Ferc,
    State,
    National,
}

impl Display for RegionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionLevel::Facility => write!(f, "Facility"),
            RegionLevel::EGrid => write!(f, "eGRID"),
            RegionLevel::BalancingAuthority => write!(f, "BA"),
            RegionLevel::Nerc => write!(f, "NERC"),
            RegionLevel::Ferc => write!(f, "FERC"),
            RegionLevel::State => write!(f, "State"),
            RegionLevel::National => write!(f, "US"),
        }
    }
}

/// The region codes of a single facility, one per level of the hierarchy.
///
/// Any code may be missing in the source data; a facility that lacks the code
/// for the level being aggregated can't be placed in a region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionCodes {
    pub egrid: Option<String>,
    pub balancing_authority: Option<String>,
    pub nerc: Option<String>,
    pub ferc: Option<String>,
    pub state: Option<String>,
}

impl RegionCodes {
    /// Returns the region code of the facility at the given level.
    ///
    /// `facility_id` is needed for the `Facility` level, where every facility
    /// is its own region.
    pub fn at<'a>(&'a self, level: RegionLevel, facility_id: &'a str) -> Option<&'a str> {
        let code = match level {
            RegionLevel::Facility => Some(facility_id),
            RegionLevel::EGrid => self.egrid.as_deref(),
            RegionLevel::BalancingAuthority => self.balancing_authority.as_deref(),
            RegionLevel::Nerc => self.nerc.as_deref(),
            RegionLevel::Ferc => self.ferc.as_deref(),
            RegionLevel::State => self.state.as_deref(),
            RegionLevel::National => Some(NATIONAL_REGION),
        };
        code.map(str::trim).filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_at_level() {
        let codes = RegionCodes {
            egrid: Some("RFCW".into()),
            balancing_authority: Some(" PJM ".into()),
            nerc: Some("RFC".into()),
            ferc: None,
            state: Some("".into()),
        };
        assert_eq!(codes.at(RegionLevel::Facility, "3"), Some("3"));
        assert_eq!(codes.at(RegionLevel::EGrid, "3"), Some("RFCW"));
        assert_eq!(codes.at(RegionLevel::BalancingAuthority, "3"), Some("PJM"));
        assert_eq!(codes.at(RegionLevel::Ferc, "3"), None);
        assert_eq!(codes.at(RegionLevel::State, "3"), None);
        assert_eq!(codes.at(RegionLevel::National, "3"), Some("US"));
    }
}
