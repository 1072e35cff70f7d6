// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Data quality indicator scores derived from coverage fractions.

/// Upper bounds of the fraction intervals and the score each interval maps
/// to.  Fractions above the last bound are scored 5.
const FRACTION_BOUNDS: [(f64, u8); 4] = [(0.4, 4), (0.6, 3), (0.8, 2), (1.0, 1)];

fn lookup_fraction_score(fraction: f64) -> u8 {
    if !(fraction >= 0.0) {
        tracing::debug!("Invalid fraction for data quality score: {}", fraction);
        return 5;
    }
    FRACTION_BOUNDS
        .iter()
        .find(|(bound, _)| fraction <= *bound)
        .map(|(_, score)| *score)
        .unwrap_or(5)
}

/// Scores the share of a group's generation that comes from facilities
/// reporting a flow.
pub fn data_collection_score(reporting_fraction: f64) -> u8 {
    lookup_fraction_score(reporting_fraction)
}

/// Scores the share of a group's generation that comes from the group's
/// intended fuel.
pub fn technological_correlation_score(primary_fuel_share: f64) -> u8 {
    lookup_fraction_score(primary_fuel_share)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(data_collection_score(0.0), 4);
        assert_eq!(data_collection_score(0.4), 4);
        assert_eq!(data_collection_score(0.41), 3);
        assert_eq!(data_collection_score(0.79), 2);
        assert_eq!(data_collection_score(0.80), 2);
        assert_eq!(data_collection_score(0.81), 1);
        assert_eq!(data_collection_score(1.0), 1);
        assert_eq!(data_collection_score(1.2), 5);
        assert_eq!(data_collection_score(-0.1), 5);
        assert_eq!(data_collection_score(f64::NAN), 5);

        assert_eq!(technological_correlation_score(0.95), 1);
        assert_eq!(technological_correlation_score(0.5), 3);
    }
}
