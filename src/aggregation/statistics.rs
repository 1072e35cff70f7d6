// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Weighted statistics of facility emission factors.

use crate::{
    config::WeightingBasis,
    records::{DataQuality, EmissionStats, FlowRef},
};

use super::data_quality::data_collection_score;

/// One facility's contribution to a flow in a (region, fuel) group.
#[derive(Clone, Debug)]
pub(super) struct Sample {
    pub(super) generation: f64,
    pub(super) amount: f64,
    pub(super) data_quality: DataQuality,
}

impl Sample {
    fn weight(&self, basis: WeightingBasis) -> f64 {
        match basis {
            WeightingBasis::Generation => self.generation,
            WeightingBasis::FlowAmount => self.amount.abs(),
        }
    }

    fn factor(&self) -> Option<f64> {
        (self.generation > 0.0).then(|| self.amount / self.generation)
    }
}

/// Computes the aggregated statistics of one flow.
///
/// `group_generation` is the total generation of the group, including
/// facilities that don't report this flow; it is used for the data collection
/// score.
pub(super) fn flow_statistics(
    flow: FlowRef,
    samples: &[Sample],
    group_generation: f64,
    basis: WeightingBasis,
    default_geometric_sd: f64,
) -> EmissionStats {
    let total_amount: f64 = samples.iter().map(|s| s.amount).sum();
    let factors: Vec<(f64, f64)> = samples
        .iter()
        .filter_map(|s| s.factor().map(|f| (f, s.weight(basis))))
        .collect();

    let emission_factor = weighted_mean(&factors).unwrap_or(0.0);
    let (min_factor, max_factor) = factors
        .iter()
        .map(|(f, _)| *f)
        .fold(None, |acc: Option<(f64, f64)>, f| match acc {
            None => Some((f, f)),
            Some((lo, hi)) => Some((lo.min(f), hi.max(f))),
        })
        .unwrap_or((0.0, 0.0));

    let (geometric_mean, geometric_sd) = weighted_geometric(&factors, default_geometric_sd);

    let mut data_quality = [0.0; 5];
    for (idx, score) in data_quality.iter_mut().enumerate() {
        let scores: Vec<(f64, f64)> = samples
            .iter()
            .map(|s| (f64::from(s.data_quality.scores()[idx]), s.weight(basis)))
            .collect();
        *score = weighted_mean(&scores).unwrap_or(5.0);
    }
    let reporting_generation: f64 = samples.iter().map(|s| s.generation).sum();
    if group_generation > 0.0 {
        data_quality[4] = f64::from(data_collection_score(
            reporting_generation / group_generation,
        ));
    }

    EmissionStats {
        flow,
        total_amount,
        emission_factor,
        geometric_mean,
        geometric_sd,
        min_factor,
        max_factor,
        facility_count: samples.len(),
        data_quality,
    }
}

/// Weighted arithmetic mean of `(value, weight)` pairs.
///
/// Falls back to the unweighted mean when all weights are zero.
pub(super) fn weighted_mean(values: &[(f64, f64)]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total_weight: f64 = values.iter().map(|(_, w)| w).sum();
    if total_weight > 0.0 {
        Some(values.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight)
    } else {
        Some(values.iter().map(|(v, _)| v).sum::<f64>() / values.len() as f64)
    }
}

/// Weighted geometric mean and geometric standard deviation of the positive
/// values among `(value, weight)` pairs, following a log-normal model.
///
/// A single positive value gets `default_sd` as its geometric standard
/// deviation.
fn weighted_geometric(values: &[(f64, f64)], default_sd: f64) -> (Option<f64>, Option<f64>) {
    let logs: Vec<(f64, f64)> = values
        .iter()
        .filter(|(v, w)| *v > 0.0 && *w > 0.0)
        .map(|(v, w)| (v.ln(), *w))
        .collect();

    match logs.len() {
        0 => (None, None),
        1 => (Some(logs[0].0.exp()), Some(default_sd)),
        _ => {
            let total_weight: f64 = logs.iter().map(|(_, w)| w).sum();
            let mu = logs.iter().map(|(l, w)| l * w).sum::<f64>() / total_weight;
            let variance = logs
                .iter()
                .map(|(l, w)| w * (l - mu).powi(2))
                .sum::<f64>()
                / total_weight;
            let mean = mu.exp();
            let sd = variance.sqrt().exp();
            if mean.is_finite() && sd.is_finite() {
                (Some(mean), Some(sd))
            } else {
                tracing::debug!("Unable to compute geometric statistics for {:?}", values);
                (None, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(generation: f64, amount: f64) -> Sample {
        Sample {
            generation,
            amount,
            data_quality: DataQuality::new([1, 2, 3, 4, 5]),
        }
    }

    fn co2() -> FlowRef {
        FlowRef::new("Carbon dioxide", "emission/air", "kg")
    }

    #[test]
    fn test_weighted_mean() {
        assert_eq!(weighted_mean(&[]), None);
        assert_eq!(weighted_mean(&[(2.0, 1.0), (4.0, 3.0)]), Some(3.5));
        assert_eq!(weighted_mean(&[(2.0, 0.0), (4.0, 0.0)]), Some(3.0));
    }

    #[test]
    fn test_generation_weighted_factor() {
        let samples = vec![sample(100.0, 1000.0), sample(300.0, 6000.0)];
        let stats = flow_statistics(co2(), &samples, 400.0, WeightingBasis::Generation, 1.0);

        assert_eq!(stats.total_amount, 7000.0);
        // Generation weighting makes the factor total amount / total generation.
        assert!((stats.emission_factor - 17.5).abs() < 1e-12);
        assert_eq!(stats.min_factor, 10.0);
        assert_eq!(stats.max_factor, 20.0);
        assert_eq!(stats.facility_count, 2);

        let mu = (0.25 * 10f64.ln()) + (0.75 * 20f64.ln());
        let var = 0.25 * (10f64.ln() - mu).powi(2) + 0.75 * (20f64.ln() - mu).powi(2);
        assert!((stats.geometric_mean.unwrap() - mu.exp()).abs() < 1e-9);
        assert!((stats.geometric_sd.unwrap() - var.sqrt().exp()).abs() < 1e-9);
        assert!(stats.geometric_sd.unwrap() > 1.0);
    }

    #[test]
    fn test_single_sample_uses_default_sd() {
        let samples = vec![sample(50.0, 100.0)];
        let stats = flow_statistics(co2(), &samples, 50.0, WeightingBasis::Generation, 1.3);
        assert_eq!(stats.geometric_mean, Some(2.0));
        assert_eq!(stats.geometric_sd, Some(1.3));
    }

    #[test]
    fn test_non_positive_factors() {
        let samples = vec![sample(50.0, 0.0), sample(0.0, 10.0)];
        let stats = flow_statistics(co2(), &samples, 50.0, WeightingBasis::Generation, 1.0);
        assert_eq!(stats.emission_factor, 0.0);
        assert_eq!(stats.geometric_mean, None);
        assert_eq!(stats.geometric_sd, None);
        assert_eq!(stats.total_amount, 10.0);
    }

    #[test]
    fn test_data_quality() {
        let samples = vec![sample(40.0, 1.0)];
        let stats = flow_statistics(co2(), &samples, 100.0, WeightingBasis::Generation, 1.0);
        assert_eq!(stats.data_quality[..4], [1.0, 2.0, 3.0, 4.0]);
        // 40% of the group's generation reports the flow.
        assert_eq!(stats.data_quality[4], 4.0);

        let stats = flow_statistics(co2(), &samples, 40.0, WeightingBasis::FlowAmount, 1.0);
        assert_eq!(stats.data_quality[4], 1.0);
    }
}
