//! Principal Component Analysis of a complete-case feature table.
//!
//! PCA is fit and applied in one call; nothing about the fit is kept beyond
//! the returned [`PcaResult`].

use crate::data::{Column, Table, GROUP_COLUMN, SAMPLE_ID_COLUMN};
use crate::error::{OmicsError, Result};
use log::{debug, warn};
use nalgebra::DMatrix;
use serde::Serialize;

/// Number of components used when the caller does not choose.
pub const DEFAULT_COMPONENTS: usize = 2;

/// Result of a PCA fit-transform.
#[derive(Debug, Clone, Serialize)]
pub struct PcaResult {
    /// Scores: one row per input row, columns `PC1..PCk`.
    pub scores: Table,
    /// Variance captured by each component (descending).
    pub explained_variance: Vec<f64>,
    /// Fraction of total variance captured by each component.
    pub explained_variance_ratio: Vec<f64>,
    /// Component loadings, `k × features_used.len()`.
    pub loadings: Vec<Vec<f64>>,
    /// Columns that entered the fit, in table order.
    pub features_used: Vec<String>,
    /// Numeric columns excluded because they still held missing values.
    pub dropped_columns: Vec<String>,
}

impl PcaResult {
    /// Number of components.
    pub fn n_components(&self) -> usize {
        self.explained_variance.len()
    }

    /// Loadings of one component keyed by feature name.
    pub fn component_loadings(&self, component: usize) -> Option<Vec<(&str, f64)>> {
        self.loadings.get(component).map(|row| {
            self.features_used
                .iter()
                .map(String::as_str)
                .zip(row.iter().copied())
                .collect()
        })
    }
}

impl std::fmt::Display for PcaResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total: f64 = self.explained_variance_ratio.iter().sum();
        writeln!(
            f,
            "PCA: {} components from {} features, {:.1}% variance explained",
            self.n_components(),
            self.features_used.len(),
            total * 100.0
        )?;
        for (i, ratio) in self.explained_variance_ratio.iter().enumerate() {
            writeln!(f, "  PC{}: {:.1}%", i + 1, ratio * 100.0)?;
        }
        if !self.dropped_columns.is_empty() {
            writeln!(
                f,
                "  Dropped {} incomplete columns: {}",
                self.dropped_columns.len(),
                self.dropped_columns.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Project the numeric columns of `table` onto `n_components` principal components.
///
/// Categorical columns and the reserved `Group` and `SampleID` columns are
/// ignored, even when they hold numbers. Numeric columns with any missing (or
/// non-finite) value are excluded from the fit and listed in
/// [`PcaResult::dropped_columns`]. Columns are centered before the SVD.
///
/// Fails with `InsufficientData` when fewer complete columns or fewer rows
/// than `n_components` remain.
pub fn perform_pca(table: &Table, n_components: usize) -> Result<PcaResult> {
    if n_components == 0 {
        return Err(OmicsError::InvalidParameter(
            "n_components must be at least 1".to_string(),
        ));
    }

    let mut features_used = Vec::new();
    let mut dropped_columns = Vec::new();
    let mut feature_values: Vec<&[f64]> = Vec::new();
    for (name, column) in table.iter() {
        if name == GROUP_COLUMN || name == SAMPLE_ID_COLUMN {
            continue;
        }
        if let Column::Numeric(values) = column {
            if values.iter().all(|x| x.is_finite()) {
                features_used.push(name.to_string());
                feature_values.push(values);
            } else {
                dropped_columns.push(name.to_string());
            }
        }
    }
    if !dropped_columns.is_empty() {
        warn!(
            "PCA excluded {} columns with missing values: {}",
            dropped_columns.len(),
            dropped_columns.join(", ")
        );
    }

    let n_rows = table.n_rows();
    let n_features = features_used.len();
    if n_features < n_components {
        return Err(OmicsError::InsufficientData(format!(
            "{} complete feature columns, {} components requested",
            n_features, n_components
        )));
    }
    if n_rows < n_components {
        return Err(OmicsError::InsufficientData(format!(
            "{} rows, {} components requested",
            n_rows, n_components
        )));
    }

    let mut x = DMatrix::from_fn(n_rows, n_features, |r, c| feature_values[c][r]);
    for mut col in x.column_iter_mut() {
        let mean = col.mean();
        col.add_scalar_mut(-mean);
    }

    let svd = x.clone().svd(false, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| OmicsError::InsufficientData("SVD did not converge".to_string()))?;

    // Order components by descending singular value.
    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

    let dof = n_rows.saturating_sub(1).max(1) as f64;
    let total_variance: f64 = svd.singular_values.iter().map(|s| s * s / dof).sum();

    let mut loadings = Vec::with_capacity(n_components);
    let mut explained_variance = Vec::with_capacity(n_components);
    let mut score_columns = Vec::with_capacity(n_components);
    for &idx in order.iter().take(n_components) {
        let mut axis: Vec<f64> = v_t.row(idx).iter().copied().collect();

        // Deterministic sign: the largest-magnitude loading is positive.
        let pivot = axis
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            axis.iter_mut().for_each(|v| *v = -*v);
        }

        let scores: Vec<f64> = (0..n_rows)
            .map(|r| x.row(r).iter().zip(&axis).map(|(a, b)| a * b).sum())
            .collect();

        let s = svd.singular_values[idx];
        explained_variance.push(s * s / dof);
        score_columns.push(Column::Numeric(scores));
        loadings.push(axis);
    }

    let explained_variance_ratio = if total_variance > 0.0 {
        explained_variance.iter().map(|v| v / total_variance).collect()
    } else {
        vec![0.0; n_components]
    };

    let names = (1..=n_components).map(|i| format!("PC{}", i)).collect();
    let scores = Table::new(names, score_columns)?;

    debug!(
        "PCA on {} x {} matrix, variance ratios {:?}",
        n_rows, n_features, explained_variance_ratio
    );

    Ok(PcaResult {
        scores,
        explained_variance,
        explained_variance_ratio,
        loadings,
        features_used,
        dropped_columns,
    })
}
