// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Consumption-based attribution of generation, following the input-output
//! trade model of Qu et al. (2018).

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use super::TradeMatrix;
use crate::Error;

/// Computes how much of each region's consumption is sourced from each
/// region's generation.
///
/// `trade` holds the raw physical trade amounts (importers as rows, its
/// diagonal is ignored) and `net_generation` the net generation of each
/// region.  With `T` the exporter × importer trade, the inflow vector is
/// `x = g + imports`, the consumption vector is `c = x - exports`, and the
/// consumption matrix is `H = (I - T x̂⁻¹)⁻¹ ĉ`.  Regions with no inflow get
/// an inflow of 1 so `x̂` stays invertible.
///
/// In the returned matrix, row `r` holds the amounts of `r`'s consumption
/// sourced from every region, including itself on the diagonal.  Entries
/// below `threshold` of their importer's total are dropped.
pub fn consumption_matrix(
    net_generation: &BTreeMap<String, f64>,
    trade: &TradeMatrix,
    threshold: f64,
) -> Result<TradeMatrix, Error> {
    let n = trade.regions.len();

    let generation = DVector::from_iterator(
        n,
        trade.regions.iter().map(|region| match net_generation.get(region) {
            Some(g) if g.is_finite() => *g,
            _ => {
                tracing::debug!("No net generation for {}, using 0.", region);
                0.0
            }
        }),
    );

    // Exporters as rows, importers as columns.
    let flows = DMatrix::from_fn(n, n, |e, i| if i == e { 0.0 } else { trade.cells[i][e] });

    let imports = flows.row_sum().transpose();
    let exports = flows.column_sum();
    let inflow = &generation + &imports;
    let consumption = &inflow - &exports;
    let inflow = inflow.map(|x| if x == 0.0 { 1.0 } else { x });

    let technical = DMatrix::from_fn(n, n, |e, i| flows[(e, i)] / inflow[i]);
    let leontief = DMatrix::<f64>::identity(n, n) - technical;
    let inverse = leontief
        .try_inverse()
        .filter(|inverse| inverse.iter().all(|v| v.is_finite()))
        .ok_or_else(|| Error::singular("Trade system (I - T x̂⁻¹) is singular."))?;

    let attributed = inverse * DMatrix::from_diagonal(&consumption);

    let mut result = TradeMatrix::new(&trade.regions);
    for importer in 0..n {
        let total = attributed.column(importer).sum();
        if !(total > 0.0) {
            tracing::warn!(
                "{} has no attributed consumption in the trade model.",
                trade.regions[importer]
            );
            continue;
        }
        for source in 0..n {
            let value = attributed[(source, importer)].abs();
            if value / total >= threshold {
                result.cells[importer][source] = value;
            }
        }
    }

    tracing::info!("Solved input-output trade model for {} regions.", n);
    Ok(result)
}
