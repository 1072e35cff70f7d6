// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Resolution of regional consumption mixes from generation mixes and trade.

mod surplus_pool;
pub use surplus_pool::{PoolMembership, SurplusPoolTable};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    config::ModelConfig,
    process_kind::ProcessKey,
    records::{ConsumptionMixEntry, RegionalMixEntry},
    region::RegionLevel,
    trade::TradeShares,
    Error, FuelCategory,
};

/// Shares at or below this value are treated as zero.
const SHARE_TOLERANCE: f64 = 1e-9;

/// Trade shares of a model run without trade data: every region consumes its
/// own generation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTrade;

impl TradeShares for NoTrade {
    fn partner_fractions(&self, _region: &str) -> Vec<(&str, f64)> {
        vec![]
    }
}

/// A process that supplies part of a mix, and the fraction it supplies.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MixSource {
    pub provider: ProcessKey,
    pub fraction: f64,
}

/// The resolved fuel mix of a region, and the processes it is drawn from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsumptionMix {
    pub region: String,
    pub scope: RegionLevel,
    /// Fuel ratios, summing to 1.
    pub entries: Vec<ConsumptionMixEntry>,
    /// Supplying processes, with fractions summing to 1.
    pub sources: Vec<MixSource>,
}

impl ConsumptionMix {
    /// Returns the ratio of `fuel` in the mix.
    pub fn ratio(&self, fuel: FuelCategory) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.fuel == fuel)
            .map(|e| e.ratio)
            .sum()
    }

    fn ratios(&self) -> BTreeMap<FuelCategory, f64> {
        self.entries.iter().map(|e| (e.fuel, e.ratio)).collect()
    }
}

/// The blends of a surplus pool run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SurplusPoolMixes {
    /// The mix of every surplus pool, drawn from member generation mixes.
    pub pools: BTreeMap<String, ConsumptionMix>,
    /// The consumption mix of every region.
    pub consumption: BTreeMap<String, ConsumptionMix>,
}

/// Resolves each region's consumption mix as a single weighted blend of its
/// own generation mix and the generation mixes of the regions it is supplied
/// by.
///
/// There is no fixed-point iteration: the trade data of a year already nets
/// the historical flows, so partners contribute their generation mixes and
/// never their consumption mixes.
pub struct ConsumptionMixResolver<'a> {
    config: &'a ModelConfig,
    generation_mixes: BTreeMap<&'a str, BTreeMap<FuelCategory, f64>>,
    generation_level: RegionLevel,
    scope: RegionLevel,
}

impl<'a> ConsumptionMixResolver<'a> {
    /// Creates a resolver over the regional generation mixes of a model run.
    pub fn new(config: &'a ModelConfig, regional_mixes: &'a [RegionalMixEntry]) -> Self {
        let mut generation_mixes: BTreeMap<&str, BTreeMap<FuelCategory, f64>> = BTreeMap::new();
        for entry in regional_mixes {
            *generation_mixes
                .entry(entry.region.as_str())
                .or_default()
                .entry(entry.fuel)
                .or_default() += entry.generation_ratio;
        }
        Self {
            config,
            generation_mixes,
            generation_level: config.regional_aggregation.generation_level(),
            scope: config.regional_aggregation.consumption_level(),
        }
    }

    /// Resolves the consumption mix of `region`.
    ///
    /// Each partner's generation mix is weighted by its supply fraction, and
    /// the region's own generation mix by the remainder.  A partner without a
    /// generation mix contributes nothing and its fraction moves to the
    /// region's own share.  Returns `None` when neither the region nor any of
    /// its partners have a generation mix.  Every data gap is reported through
    /// the sparse data policy.
    pub fn resolve_region(
        &self,
        region: &str,
        trade: &impl TradeShares,
    ) -> Result<Option<ConsumptionMix>, Error> {
        let mut shares = vec![];
        let mut imported = 0.0;
        for (partner, fraction) in trade.partner_fractions(region) {
            match self.generation_mixes.get(partner) {
                Some(ratios) => {
                    imported += fraction;
                    shares.push((
                        ProcessKey::generation_mix(partner, self.generation_level),
                        fraction,
                        ratios.clone(),
                    ));
                }
                None => self.config.sparse_data_policy.report(format!(
                    "No generation mix for {partner}, a trading partner of {region}; \
                     its share of {fraction:.6} is added to {region}'s own generation."
                ))?,
            }
        }

        let residual = (1.0 - imported).max(0.0);
        match self.generation_mixes.get(region) {
            Some(ratios) if residual > SHARE_TOLERANCE => shares.push((
                ProcessKey::generation_mix(region, self.generation_level),
                residual,
                ratios.clone(),
            )),
            None if residual > SHARE_TOLERANCE && !shares.is_empty() => {
                self.config.sparse_data_policy.report(format!(
                    "No generation mix for {region}; its own share of {residual:.6} \
                     is spread over its trading partners."
                ))?
            }
            _ => {}
        }

        let mix = blend(region, self.scope, shares);
        if mix.is_none() {
            self.config.sparse_data_policy.report(format!(
                "No generation mix for {region} or its trading partners; \
                 skipping its consumption mix."
            ))?;
        }
        Ok(mix)
    }

    /// Resolves the consumption mixes of all `regions`, skipping regions
    /// without any usable generation mix.
    ///
    /// Regions are independent of each other, and each reads only the shared
    /// generation mixes and trade shares.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        regions: &[S],
        trade: &impl TradeShares,
    ) -> Result<BTreeMap<String, ConsumptionMix>, Error> {
        let mut mixes = BTreeMap::new();
        for region in regions {
            let region = region.as_ref();
            if let Some(mix) = self.resolve_region(region, trade)? {
                mixes.insert(region.to_string(), mix);
            }
        }
        tracing::info!(
            "Resolved {} of {} {} consumption mixes.",
            mixes.len(),
            regions.len(),
            self.scope
        );
        Ok(mixes)
    }

    /// Resolves the surplus pool mixes and the consumption mixes of
    /// `regions` from a surplus pool table.
    ///
    /// A pool's mix blends the generation mixes of its contributing regions
    /// by the amounts they contribute.  A region's consumption mix blends its
    /// pool's mix by its trade-in amount with its own generation mix by its
    /// own generation amount.  Regions without a pool membership, or with no
    /// trade-in, consume their own generation.
    pub fn resolve_surplus_pools<S: AsRef<str>>(
        &self,
        table: &SurplusPoolTable,
        regions: &[S],
    ) -> Result<SurplusPoolMixes, Error> {
        let mut resolved = SurplusPoolMixes::default();

        for (pool, contributions) in table.pools() {
            let mut shares = vec![];
            for (region, amount) in contributions {
                match self.generation_mixes.get(region.as_str()) {
                    Some(ratios) => shares.push((
                        ProcessKey::generation_mix(region.as_str(), self.generation_level),
                        *amount,
                        ratios.clone(),
                    )),
                    None => self.config.sparse_data_policy.report(format!(
                        "No generation mix for {region}, a member of surplus pool {pool}."
                    ))?,
                }
            }
            match blend(pool, RegionLevel::Nerc, shares) {
                Some(mix) => {
                    resolved.pools.insert(pool.to_string(), mix);
                }
                None => self.config.sparse_data_policy.report(format!(
                    "Surplus pool {pool} has no contributing generation mix."
                ))?,
            }
        }

        for region in regions {
            let region = region.as_ref();
            let own = self.generation_mixes.get(region);
            let pool = table.membership(region).and_then(|m| {
                resolved
                    .pools
                    .get(&m.pool)
                    .filter(|_| m.trade_in > SHARE_TOLERANCE)
                    .map(|pool| (m, pool))
            });

            let mut shares = vec![];
            if let Some((membership, pool_mix)) = pool {
                shares.push((
                    ProcessKey::surplus_pool(membership.pool.as_str()),
                    membership.trade_in,
                    pool_mix.ratios(),
                ));
                match own {
                    Some(ratios) => shares.push((
                        ProcessKey::generation_mix(region, self.generation_level),
                        membership.own_generation,
                        ratios.clone(),
                    )),
                    None => self.config.sparse_data_policy.report(format!(
                        "No generation mix for {region}; it consumes only from surplus pool {}.",
                        membership.pool
                    ))?,
                }
            } else if let Some(ratios) = own {
                shares.push((
                    ProcessKey::generation_mix(region, self.generation_level),
                    1.0,
                    ratios.clone(),
                ));
            }

            match blend(region, self.scope, shares) {
                Some(mix) => {
                    resolved.consumption.insert(region.to_string(), mix);
                }
                None => self.config.sparse_data_policy.report(format!(
                    "No generation mix or surplus pool for {region}; \
                     skipping its consumption mix."
                ))?,
            }
        }

        tracing::info!(
            "Resolved {} surplus pools and {} consumption mixes.",
            resolved.pools.len(),
            resolved.consumption.len()
        );
        Ok(resolved)
    }
}

/// Blends the fuel ratios of weighted sources into a mix whose ratios and
/// source fractions each sum to 1.
///
/// Returns `None` if no source has a positive weight.
fn blend(
    region: &str,
    scope: RegionLevel,
    shares: Vec<(ProcessKey, f64, BTreeMap<FuelCategory, f64>)>,
) -> Option<ConsumptionMix> {
    let shares: Vec<_> = shares
        .into_iter()
        .filter(|(_, weight, _)| *weight > 0.0 && weight.is_finite())
        .collect();
    let total_weight: f64 = shares.iter().map(|(_, weight, _)| weight).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let mut ratios: BTreeMap<FuelCategory, f64> = BTreeMap::new();
    let mut sources = vec![];
    for (provider, weight, source_ratios) in shares {
        let fraction = weight / total_weight;
        for (fuel, ratio) in source_ratios {
            *ratios.entry(fuel).or_default() += fraction * ratio;
        }
        sources.push(MixSource { provider, fraction });
    }

    let total_ratio: f64 = ratios.values().sum();
    if total_ratio <= 0.0 {
        return None;
    }
    let entries = ratios
        .into_iter()
        .filter(|(_, ratio)| *ratio > 0.0)
        .map(|(fuel, ratio)| ConsumptionMixEntry {
            region: region.to_string(),
            fuel,
            ratio: ratio / total_ratio,
        })
        .collect();

    Some(ConsumptionMix {
        region: region.to_string(),
        scope,
        entries,
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{RegionalAggregation, SparseDataPolicy},
        records::TradeTransaction,
        test_utils::mix_entries,
        trade::TradeMatrix,
        ProcessKind,
    };

    fn assert_sums_to_one(mix: &ConsumptionMix) {
        let ratios: f64 = mix.entries.iter().map(|e| e.ratio).sum();
        let fractions: f64 = mix.sources.iter().map(|s| s.fraction).sum();
        assert!((ratios - 1.0).abs() < 1e-9, "{mix:?}");
        assert!((fractions - 1.0).abs() < 1e-9, "{mix:?}");
    }

    fn scenario_mixes() -> Vec<RegionalMixEntry> {
        mix_entries(&[
            ("X", FuelCategory::Coal, 80.0),
            ("X", FuelCategory::Gas, 20.0),
            ("Y", FuelCategory::Gas, 50.0),
        ])
    }

    #[test]
    fn test_blend_with_partner() -> Result<(), Error> {
        let config = ModelConfig::default();
        let mixes = scenario_mixes();
        let trade = TradeMatrix::build_matrix(
            &[
                TradeTransaction::new("X", "X", 80.0, 2016),
                TradeTransaction::new("X", "Y", 20.0, 2016),
            ],
            &["X", "Y"],
            &config,
        )?
        .normalize();

        let resolver = ConsumptionMixResolver::new(&config, &mixes);
        let Some(mix) = resolver.resolve_region("X", &trade)? else {
            panic!("X should have a consumption mix");
        };

        assert!((mix.ratio(FuelCategory::Coal) - 0.64).abs() < 1e-12);
        assert!((mix.ratio(FuelCategory::Gas) - 0.36).abs() < 1e-12);
        assert_sums_to_one(&mix);
        assert_eq!(
            mix.sources
                .iter()
                .map(|s| (s.provider.region.as_str(), s.provider.kind))
                .collect::<Vec<_>>(),
            vec![("Y", ProcessKind::GenerationMix), ("X", ProcessKind::GenerationMix)]
        );
        assert!((mix.sources[0].fraction - 0.2).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_no_trade() -> Result<(), Error> {
        let config = ModelConfig::default();
        let mixes = scenario_mixes();
        let resolver = ConsumptionMixResolver::new(&config, &mixes);

        let trade = TradeMatrix::new(&["X", "Y"]);
        let all = resolver.resolve_all(&["X", "Y"], &trade)?;
        assert_eq!(all.len(), 2);
        assert_eq!(all["X"].ratio(FuelCategory::Coal), 0.8);
        assert_eq!(all["X"].ratio(FuelCategory::Gas), 0.2);
        assert_eq!(all["Y"].ratio(FuelCategory::Gas), 1.0);
        assert_eq!(all["X"].sources.len(), 1);

        assert_eq!(resolver.resolve_all(&["X", "Y"], &NoTrade)?, all);
        Ok(())
    }

    #[test]
    fn test_missing_partner_mix() -> Result<(), Error> {
        let config = ModelConfig::default();
        let mixes = scenario_mixes();
        let mut trade = TradeMatrix::new(&["X", "Y", "Z"]);
        trade.set_cell("X", "X", 0.5)?;
        trade.set_cell("X", "Y", 0.2)?;
        trade.set_cell("X", "Z", 0.3)?;

        let resolver = ConsumptionMixResolver::new(&config, &mixes);
        let mix = resolver.resolve_region("X", &trade)?.unwrap();
        // Z's share moves to X's own generation: 0.8 own, 0.2 from Y.
        assert!((mix.ratio(FuelCategory::Coal) - 0.64).abs() < 1e-12);
        assert!((mix.ratio(FuelCategory::Gas) - 0.36).abs() < 1e-12);
        assert_sums_to_one(&mix);

        // Z is a partner-less region without generation.
        assert_eq!(resolver.resolve_region("Z", &trade)?, None);

        let strict = ModelConfig {
            sparse_data_policy: SparseDataPolicy::Strict,
            ..Default::default()
        };
        let resolver = ConsumptionMixResolver::new(&strict, &mixes);
        assert!(resolver.resolve_region("X", &trade).is_err_and(|e| e
            == Error::sparse_data(
                "No generation mix for Z, a trading partner of X; \
                 its share of 0.300000 is added to X's own generation."
            )));
        Ok(())
    }

    #[test]
    fn test_rolled_up_supply() -> Result<(), Error> {
        let config = ModelConfig {
            regional_aggregation: RegionalAggregation::Ferc,
            ..Default::default()
        };
        let mixes = scenario_mixes();
        let mut trade = TradeMatrix::new(&["X", "Y"]);
        trade.set_cell("X", "X", 100.0)?;
        trade.set_cell("Y", "Y", 30.0)?;
        trade.set_cell("Y", "X", 20.0)?;
        let supply = trade.rollup(&BTreeMap::from([
            ("X".to_string(), "F1".to_string()),
            ("Y".to_string(), "F1".to_string()),
        ]));

        let resolver = ConsumptionMixResolver::new(&config, &mixes);
        let mix = resolver.resolve_region("F1", &supply)?.unwrap();
        assert_eq!(mix.scope, RegionLevel::Ferc);
        // 120 of 150 from X, 30 from Y.
        assert!((mix.ratio(FuelCategory::Coal) - 0.64).abs() < 1e-12);
        assert!((mix.ratio(FuelCategory::Gas) - 0.36).abs() < 1e-12);
        assert!(mix
            .sources
            .iter()
            .all(|s| s.provider.scope == RegionLevel::BalancingAuthority));
        assert_sums_to_one(&mix);
        Ok(())
    }

    #[test]
    fn test_surplus_pools() -> Result<(), Error> {
        let config = ModelConfig {
            regional_aggregation: RegionalAggregation::EGrid,
            net_trading: false,
            epa_egrid_trading: true,
            ..Default::default()
        };
        let mixes = scenario_mixes();
        let mut table = SurplusPoolTable::new();
        table
            .add_pool("P", [("X", 50.0), ("Y", 50.0)])
            .add_member(
                "X",
                PoolMembership {
                    pool: "P".into(),
                    trade_in: 25.0,
                    own_generation: 75.0,
                },
            )
            .add_member(
                "Y",
                PoolMembership {
                    pool: "P".into(),
                    trade_in: 0.0,
                    own_generation: 50.0,
                },
            );

        let resolver = ConsumptionMixResolver::new(&config, &mixes);
        let resolved = resolver.resolve_surplus_pools(&table, &["X", "Y", "W"])?;

        let pool = &resolved.pools["P"];
        assert_eq!(pool.ratio(FuelCategory::Coal), 0.4);
        assert_eq!(pool.ratio(FuelCategory::Gas), 0.6);
        assert_sums_to_one(pool);

        let x = &resolved.consumption["X"];
        assert!((x.ratio(FuelCategory::Coal) - 0.7).abs() < 1e-12);
        assert!((x.ratio(FuelCategory::Gas) - 0.3).abs() < 1e-12);
        assert_eq!(x.sources[0].provider, ProcessKey::surplus_pool("P"));
        assert_eq!(x.sources[0].fraction, 0.25);
        assert_sums_to_one(x);

        // No trade-in: own generation only.
        let y = &resolved.consumption["Y"];
        assert_eq!(y.sources.len(), 1);
        assert_eq!(y.ratio(FuelCategory::Gas), 1.0);

        assert!(!resolved.consumption.contains_key("W"));
        Ok(())
    }
}
