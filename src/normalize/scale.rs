//! Column-wise scaling: z-score, min-max and standard score.
//!
//! Every scaler is fitted on the column it transforms and discarded
//! afterwards; nothing is retained between calls.

use crate::data::Table;
use crate::missing::mean_observed;

/// Sample standard deviation (n - 1) of the non-missing values.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    let observed: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    if observed.len() < 2 {
        return f64::NAN;
    }
    let ss: f64 = observed.iter().map(|x| (x - mean).powi(2)).sum();
    (ss / (observed.len() - 1) as f64).sqrt()
}

/// Z-score each numeric column: `(x - mean) / std`. Conventional for lipidomics.
///
/// Mean and sample standard deviation skip missing values, and missing
/// values stay missing. A constant column has zero deviation and becomes NaN.
pub fn norm_zscore(table: &Table) -> Table {
    table.map_numeric(|values| {
        let mean = mean_observed(values);
        let std = sample_std(values, mean);
        values.iter().map(|&x| (x - mean) / std).collect()
    })
}

/// Rescale each numeric column to [0, 1].
///
/// Missing values are filled with 0 before fitting. A constant column maps to 0.
pub fn norm_minmax(table: &Table) -> Table {
    table.map_numeric(|values| {
        let filled = fill_zero(values);
        if filled.is_empty() {
            return filled;
        }
        let min = filled.iter().copied().fold(f64::INFINITY, f64::min);
        let max = filled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = nonzero_or_one(max - min);
        filled.iter().map(|&x| (x - min) / range).collect()
    })
}

/// Center each numeric column to mean 0 and scale to unit population variance.
///
/// Missing values are filled with 0 before fitting. A constant column maps to 0.
pub fn norm_standard(table: &Table) -> Table {
    table.map_numeric(|values| {
        let filled = fill_zero(values);
        if filled.is_empty() {
            return filled;
        }
        let n = filled.len() as f64;
        let mean = filled.iter().sum::<f64>() / n;
        let var = filled.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std = nonzero_or_one(var.sqrt());
        filled.iter().map(|&x| (x - mean) / std).collect()
    })
}

fn fill_zero(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&x| if x.is_nan() { 0.0 } else { x })
        .collect()
}

fn nonzero_or_one(scale: f64) -> f64 {
    if scale == 0.0 || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}
