// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Inter-regional electricity trade: the region × region trade matrix, its
//! normalization to supply fractions, and roll-ups to coarser importer
//! regions.

pub mod io_model;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::{config::ModelConfig, records::TradeTransaction, Error};

/// Row sums at or below `1 + NORMALIZED_TOLERANCE` are treated as already
/// normalized.
const NORMALIZED_TOLERANCE: f64 = 1e-9;

/// Supplies the fractions of a region's consumption that are sourced from
/// each of its trading partners.
///
/// The fractions of one region sum to at most 1; the remainder is the
/// region's own generation.
pub trait TradeShares {
    /// Returns the nonzero supply fractions of `region`'s trading partners,
    /// excluding the region itself.
    fn partner_fractions(&self, region: &str) -> Vec<(&str, f64)>;
}

/// A square matrix of traded electricity between the regions of a single
/// scope.
///
/// Rows are importing regions and columns are exporting regions.  The
/// diagonal holds a region's own generation consumed locally, when the
/// source data has it; it never counts as trade.
#[derive(Clone, Debug, PartialEq)]
pub struct TradeMatrix {
    regions: Vec<String>,
    index: HashMap<String, usize>,
    cells: Vec<Vec<f64>>,
}

/// The trade totals of a single region, excluding the diagonal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TradeBalance {
    pub region: String,
    pub imports: f64,
    pub exports: f64,
    /// `imports - exports`.
    pub net_imports: f64,
}

impl TradeMatrix {
    /// Creates an all-zero matrix over the given regions.
    ///
    /// Duplicate and blank region codes are dropped, and the regions are
    /// sorted.
    pub fn new<S: AsRef<str>>(regions: &[S]) -> Self {
        let regions: Vec<String> = regions
            .iter()
            .map(|r| r.as_ref().trim())
            .filter(|r| !r.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect();
        let index = regions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.clone(), i))
            .collect();
        let cells = vec![vec![0.0; regions.len()]; regions.len()];
        Self {
            regions,
            index,
            cells,
        }
    }

    /// Builds the matrix from raw trade transactions.
    ///
    /// Transactions from years other than the configured trade year, and
    /// transactions with a negative or non-finite amount, are skipped.
    /// Transactions involving a region that is not in `regions` are out of
    /// scope and silently excluded; if that leaves a listed importer without
    /// any trade, it is reported through the sparse data policy, because the
    /// importer's consumption mix collapses to its own generation.  Repeated
    /// (importer, exporter) pairs are summed.
    pub fn build_matrix<S: AsRef<str>>(
        transactions: &[TradeTransaction],
        regions: &[S],
        config: &ModelConfig,
    ) -> Result<Self, Error> {
        let mut matrix = Self::new(regions);
        let mut lost_trade = BTreeSet::new();

        for transaction in transactions {
            if transaction.year != config.trade_year {
                tracing::debug!(
                    "Skipping {} trade from {} to {}: not in trade year {}.",
                    transaction.year,
                    transaction.exporter,
                    transaction.importer,
                    config.trade_year
                );
                continue;
            }
            if !(transaction.amount >= 0.0 && transaction.amount.is_finite()) {
                tracing::warn!(
                    "Skipping trade from {} to {} with invalid amount {}.",
                    transaction.exporter,
                    transaction.importer,
                    transaction.amount
                );
                continue;
            }
            let importer = matrix.index.get(transaction.importer.trim()).copied();
            let exporter = matrix.index.get(transaction.exporter.trim()).copied();
            match (importer, exporter) {
                (Some(i), Some(e)) => matrix.cells[i][e] += transaction.amount,
                (Some(i), None) => {
                    if transaction.amount > 0.0 {
                        lost_trade.insert(i);
                    }
                }
                _ => {}
            }
        }

        for i in lost_trade {
            if matrix.import_total(i) == 0.0 {
                config.sparse_data_policy.report(format!(
                    "All trade of {} is with regions out of scope; its consumption \
                     mix will be its own generation mix.",
                    matrix.regions[i]
                ))?;
            }
        }

        tracing::info!(
            "Built trade matrix of {} regions from {} transactions.",
            matrix.regions.len(),
            transactions.len()
        );
        Ok(matrix)
    }

    /// Returns the matrix with each importer's row scaled to fractions of
    /// its total supply.
    ///
    /// Rows whose sum doesn't exceed 1 are taken to already be fractions and
    /// are left unchanged, so normalizing twice is the same as normalizing
    /// once.
    pub fn normalize(&self) -> Self {
        let mut normalized = self.clone();
        for row in normalized.cells.iter_mut() {
            let total: f64 = row.iter().sum();
            if total > 1.0 + NORMALIZED_TOLERANCE {
                row.iter_mut().for_each(|cell| *cell /= total);
            }
        }
        normalized
    }

    /// Returns the matrix with every importer's row scaled to fractions of
    /// its total supply, whatever the row's magnitude.  Rows without any
    /// supply stay zero.
    pub(crate) fn normalize_rows(&self) -> Self {
        let mut normalized = self.clone();
        for row in normalized.cells.iter_mut() {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                row.iter_mut().for_each(|cell| *cell /= total);
            }
        }
        normalized
    }

    /// Returns the matrix with the diagonal filled in from each region's
    /// generation, for trade tables that only record interchange.
    ///
    /// A region's generation is taken as its total disposition, of which
    /// its imports are a part: the diagonal becomes `generation - imports`,
    /// or 0 for regions that import more than they generate.  Diagonals
    /// already present in the data are kept.
    pub fn with_local_generation(&self, generation: &BTreeMap<String, f64>) -> Self {
        let mut seeded = self.clone();
        for (i, region) in self.regions.iter().enumerate() {
            if self.cells[i][i] > 0.0 {
                continue;
            }
            let own = generation.get(region).copied().unwrap_or_default();
            let imports = self.import_total(i);
            if imports > own {
                tracing::warn!(
                    "{} imports {} MWh but generates {} MWh, treating its consumption \
                     as imports only.",
                    region,
                    imports,
                    own
                );
            }
            seeded.cells[i][i] = (own - imports).max(0.0);
        }
        seeded
    }

    /// Returns the regions of the matrix, sorted.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Returns the value traded from `exporter` to `importer`, or 0 when
    /// either region is not part of the matrix.
    pub fn cell(&self, importer: &str, exporter: &str) -> f64 {
        match (self.index.get(importer), self.index.get(exporter)) {
            (Some(i), Some(e)) => self.cells[*i][*e],
            _ => 0.0,
        }
    }

    /// Sets the value traded from `exporter` to `importer`.
    pub fn set_cell(&mut self, importer: &str, exporter: &str, value: f64) -> Result<(), Error> {
        match (self.index.get(importer), self.index.get(exporter)) {
            (Some(i), Some(e)) => {
                self.cells[*i][*e] = value;
                Ok(())
            }
            _ => Err(Error::internal(format!(
                "Trade cell ({importer}, {exporter}) is not part of the matrix."
            ))),
        }
    }

    /// Returns the import, export and net balance of every region.
    pub fn balances(&self) -> Vec<TradeBalance> {
        (0..self.regions.len())
            .map(|i| {
                let imports = self.import_total(i);
                let exports = self.export_total(i);
                TradeBalance {
                    region: self.regions[i].clone(),
                    imports,
                    exports,
                    net_imports: imports - exports,
                }
            })
            .collect()
    }

    /// Aggregates the rows of importers to the coarser region each maps to
    /// in `importer_map`, e.g. balancing authorities to FERC regions.
    ///
    /// Exporters keep their original regions, so the supplies of the coarse
    /// importers are fractions over the fine regions' generation mixes.  The
    /// diagonal counts as supply from the importer's own region.  Importers
    /// that are not in the map are skipped, and coarse regions without any
    /// supply are left out.
    pub fn rollup(&self, importer_map: &BTreeMap<String, String>) -> SupplyTable {
        let mut amounts: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (i, importer) in self.regions.iter().enumerate() {
            let Some(group) = importer_map.get(importer) else {
                tracing::debug!("{} is not mapped to a roll-up region, skipping.", importer);
                continue;
            };
            let supply = amounts.entry(group.clone()).or_default();
            for (e, exporter) in self.regions.iter().enumerate() {
                if self.cells[i][e] > 0.0 {
                    *supply.entry(exporter.clone()).or_default() += self.cells[i][e];
                }
            }
        }

        let mut supplies = BTreeMap::new();
        for (group, supply) in amounts {
            let total: f64 = supply.values().sum();
            if total <= 0.0 {
                tracing::warn!("Roll-up region {} has no supply.", group);
                continue;
            }
            let fractions = supply
                .into_iter()
                .map(|(exporter, amount)| (exporter, amount / total))
                .collect();
            supplies.insert(group, fractions);
        }
        SupplyTable { supplies }
    }

    fn import_total(&self, i: usize) -> f64 {
        self.cells[i]
            .iter()
            .enumerate()
            .filter(|(e, _)| *e != i)
            .map(|(_, v)| v)
            .sum()
    }

    fn export_total(&self, e: usize) -> f64 {
        self.cells
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != e)
            .map(|(_, row)| row[e])
            .sum()
    }
}

impl TradeShares for TradeMatrix {
    /// Expects a normalized matrix.
    fn partner_fractions(&self, region: &str) -> Vec<(&str, f64)> {
        let Some(i) = self.index.get(region).copied() else {
            return vec![];
        };
        self.cells[i]
            .iter()
            .enumerate()
            .filter(|(e, v)| *e != i && **v > 0.0)
            .map(|(e, v)| (self.regions[e].as_str(), *v))
            .collect()
    }
}

/// Supply fractions of importing regions over exporting regions that may
/// belong to a finer scope, e.g. FERC regions supplied by balancing
/// authorities.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SupplyTable {
    supplies: BTreeMap<String, BTreeMap<String, f64>>,
}

impl SupplyTable {
    /// Returns the importing regions of the table.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.supplies.keys().map(String::as_str)
    }

    /// Returns the supply fractions of `region`, keyed by exporter.
    pub fn supply(&self, region: &str) -> Option<&BTreeMap<String, f64>> {
        self.supplies.get(region)
    }
}

impl TradeShares for SupplyTable {
    fn partner_fractions(&self, region: &str) -> Vec<(&str, f64)> {
        self.supplies
            .get(region)
            .map(|supply| {
                supply
                    .iter()
                    .filter(|(exporter, v)| exporter.as_str() != region && **v > 0.0)
                    .map(|(exporter, v)| (exporter.as_str(), *v))
                    .collect()
            })
            .unwrap_or_default()
    }
}
