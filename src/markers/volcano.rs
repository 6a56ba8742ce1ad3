//! Two-group differential marker detection for volcano plots.
//!
//! Each feature column is tested with Welch's t-test between the two groups
//! named in the `Group` column, and classified as `Up`, `Down` or `NS` from
//! its p-value and fold change.

use crate::data::{
    coerce_numeric, MarkerRecord, MarkerSet, Regulation, Table, GROUP_COLUMN, SAMPLE_ID_COLUMN,
};
use crate::error::{OmicsError, Result};
use crate::test::test_welch;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Additive offset on both group means before taking their ratio.
pub const FOLD_CHANGE_EPSILON: f64 = 1e-6;

/// Thresholds for calling a feature `Up` or `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerParams {
    /// Significance threshold, in (0, 1).
    pub p_threshold: f64,
    /// Fold-change threshold as a ratio, > 1.
    pub fc_threshold: f64,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            p_threshold: 0.05,
            fc_threshold: 2.0,
        }
    }
}

impl MarkerParams {
    /// Create validated parameters.
    pub fn new(p_threshold: f64, fc_threshold: f64) -> Result<Self> {
        let params = Self {
            p_threshold,
            fc_threshold,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let p_in_range = self.p_threshold > 0.0 && self.p_threshold < 1.0;
        if !p_in_range {
            return Err(OmicsError::InvalidParameter(format!(
                "p-value threshold must be in (0, 1), got {}",
                self.p_threshold
            )));
        }
        let fc_in_range = self.fc_threshold > 1.0 && self.fc_threshold.is_finite();
        if !fc_in_range {
            return Err(OmicsError::InvalidParameter(format!(
                "fold-change threshold must be greater than 1, got {}",
                self.fc_threshold
            )));
        }
        Ok(())
    }
}

/// Distinct non-missing labels of the group column, in first-seen order.
pub fn group_levels(table: &Table) -> Result<Vec<String>> {
    let mut levels: Vec<String> = Vec::new();
    for label in table.labels(GROUP_COLUMN)?.into_iter().flatten() {
        if !levels.contains(&label) {
            levels.push(label);
        }
    }
    Ok(levels)
}

/// Row indices of each of exactly two groups.
///
/// Rows without a group label belong to neither group.
pub(crate) fn partition_two_groups(table: &Table) -> Result<([String; 2], [Vec<usize>; 2])> {
    let levels = group_levels(table)?;
    if levels.len() != 2 {
        return Err(OmicsError::GroupCount {
            found: levels.len(),
        });
    }
    let labels = table.labels(GROUP_COLUMN)?;
    let rows_of = |level: &str| -> Vec<usize> {
        labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.as_deref() == Some(level))
            .map(|(i, _)| i)
            .collect()
    };
    let rows = [rows_of(&levels[0]), rows_of(&levels[1])];
    Ok(([levels[0].clone(), levels[1].clone()], rows))
}

/// Names of the feature columns: everything but `Group` and `SampleID`.
pub fn feature_columns(table: &Table) -> Vec<&str> {
    table
        .column_names()
        .iter()
        .map(String::as_str)
        .filter(|n| *n != GROUP_COLUMN && *n != SAMPLE_ID_COLUMN)
        .collect()
}

/// Detect differential markers between the two groups of `table`.
///
/// The first group seen in the data is the numerator of the fold change.
/// Non-numeric feature values are treated as missing and tallied in
/// [`MarkerSet::coercion`]. Degenerate features (constant, or fewer than two
/// values per group) get NaN statistics and are classified `NS`.
///
/// # Errors
///
/// - `InvalidParameter` if the thresholds are out of range
/// - `MissingColumn` if there is no `Group` column
/// - `EmptyInput` if there are no feature columns
/// - `GroupCount` if the group column does not hold exactly two labels
pub fn detect_markers(table: &Table, params: &MarkerParams) -> Result<MarkerSet> {
    params.validate()?;
    table.column(GROUP_COLUMN)?;

    let features = feature_columns(table);
    if features.is_empty() {
        return Err(OmicsError::EmptyInput(
            "no feature columns besides Group/SampleID".to_string(),
        ));
    }

    let ([group_a, group_b], [rows_a, rows_b]) = partition_two_groups(table)?;
    debug!(
        "Comparing '{}' (n={}) vs '{}' (n={}) across {} features",
        group_a,
        rows_a.len(),
        group_b,
        rows_b.len(),
        features.len()
    );

    let (coerced, coercion) = coerce_numeric(&table.select_columns(&features)?, &[]);
    let columns: Vec<(&str, &[f64])> = features
        .iter()
        .map(|&name| coerced.numeric(name).map(|values| (name, values)))
        .collect::<Result<_>>()?;

    let records: Vec<MarkerRecord> = columns
        .par_iter()
        .map(|&(name, values)| {
            let a: Vec<f64> = rows_a.iter().map(|&i| values[i]).collect();
            let b: Vec<f64> = rows_b.iter().map(|&i| values[i]).collect();
            score_feature(name, &a, &b, params)
        })
        .collect();

    let set = MarkerSet {
        group_a,
        group_b,
        p_threshold: params.p_threshold,
        fc_threshold: params.fc_threshold,
        records,
        coercion,
    };
    info!(
        "Marker detection: {} features, {} up, {} down",
        set.len(),
        set.n_up(),
        set.n_down()
    );
    Ok(set)
}

fn score_feature(name: &str, a: &[f64], b: &[f64], params: &MarkerParams) -> MarkerRecord {
    let welch = test_welch(a, b);
    let fold_change = (welch.mean_a + FOLD_CHANGE_EPSILON) / (welch.mean_b + FOLD_CHANGE_EPSILON);
    let log2_fc = fold_change.log2();
    MarkerRecord {
        feature: name.to_string(),
        p_value: welch.p_value,
        fold_change,
        log2_fc,
        neg_log10_p: -welch.p_value.log10(),
        regulation: Regulation::classify(
            welch.p_value,
            log2_fc,
            params.p_threshold,
            params.fc_threshold,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use approx::assert_relative_eq;

    fn groups(labels: &[&str]) -> Column {
        Column::Categorical(labels.iter().map(|s| Some(s.to_string())).collect())
    }

    fn create_test_table() -> Table {
        Table::new(
            vec!["Group".into(), "F1".into(), "F2".into(), "F3".into()],
            vec![
                groups(&["AD", "AD", "AD", "CTRL", "CTRL", "CTRL"]),
                Column::Numeric(vec![9.0, 10.0, 11.0, 0.9, 1.0, 1.1]),
                Column::Numeric(vec![4.0, 5.0, 6.0, 4.0, 5.0, 6.0]),
                Column::Numeric(vec![1.0, 1.1, 0.9, 20.0, 22.0, 18.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_classification() {
        let set = detect_markers(&create_test_table(), &MarkerParams::default()).unwrap();
        assert_eq!(set.group_a, "AD");
        assert_eq!(set.group_b, "CTRL");
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("F1").unwrap().regulation, Regulation::Up);
        assert_eq!(set.get("F2").unwrap().regulation, Regulation::NotSignificant);
        assert_eq!(set.get("F3").unwrap().regulation, Regulation::Down);
        assert!(set.coercion.is_clean());
    }

    #[test]
    fn test_fold_change_formula() {
        let set = detect_markers(&create_test_table(), &MarkerParams::default()).unwrap();
        let f1 = set.get("F1").unwrap();
        let expected = (10.0 + FOLD_CHANGE_EPSILON) / (1.0 + FOLD_CHANGE_EPSILON);
        assert_relative_eq!(f1.fold_change, expected, epsilon = 1e-12);
        assert_relative_eq!(f1.log2_fc, expected.log2(), epsilon = 1e-12);
        assert_relative_eq!(f1.neg_log10_p, -f1.p_value.log10());

        let f2 = set.get("F2").unwrap();
        assert_relative_eq!(f2.fold_change, 1.0);
        assert_relative_eq!(f2.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let table = Table::new(
            vec!["Group".into(), "F".into()],
            vec![
                groups(&["Z", "A", "Z", "A"]),
                Column::Numeric(vec![1.0, 2.0, 1.5, 2.5]),
            ],
        )
        .unwrap();
        let set = detect_markers(&table, &MarkerParams::default()).unwrap();
        assert_eq!(set.group_a, "Z");
        assert_eq!(set.group_b, "A");
    }

    #[test]
    fn test_sample_id_is_not_a_feature() {
        let mut table = create_test_table();
        table
            .push_column(
                "SampleID",
                groups(&["S1", "S2", "S3", "S4", "S5", "S6"]),
            )
            .unwrap();
        let set = detect_markers(&table, &MarkerParams::default()).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.get("SampleID").is_none());
    }

    #[test]
    fn test_coercion_failures_are_reported() {
        let table = Table::new(
            vec!["Group".into(), "F".into()],
            vec![
                groups(&["a", "a", "a", "b", "b", "b"]),
                Column::Categorical(
                    ["1", "2", "oops", "4", "5", "6"]
                        .iter()
                        .map(|s| Some(s.to_string()))
                        .collect(),
                ),
            ],
        )
        .unwrap();
        let set = detect_markers(&table, &MarkerParams::default()).unwrap();
        assert_eq!(set.coercion.failures_in("F"), 1);
        assert!(set.get("F").unwrap().p_value.is_finite());
    }

    #[test]
    fn test_unlabelled_rows_ignored() {
        let table = Table::new(
            vec!["Group".into(), "F".into()],
            vec![
                Column::Categorical(vec![
                    Some("a".into()),
                    None,
                    Some("a".into()),
                    Some("b".into()),
                    Some("b".into()),
                ]),
                Column::Numeric(vec![1.0, 100.0, 2.0, 3.0, 4.0]),
            ],
        )
        .unwrap();
        let set = detect_markers(&table, &MarkerParams::default()).unwrap();
        assert_relative_eq!(
            set.get("F").unwrap().fold_change,
            (1.5 + FOLD_CHANGE_EPSILON) / (3.5 + FOLD_CHANGE_EPSILON),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_degenerate_feature_is_ns() {
        let table = Table::new(
            vec!["Group".into(), "flat".into()],
            vec![
                groups(&["a", "a", "b", "b"]),
                Column::Numeric(vec![3.0, 3.0, 3.0, 3.0]),
            ],
        )
        .unwrap();
        let set = detect_markers(&table, &MarkerParams::default()).unwrap();
        let record = set.get("flat").unwrap();
        assert!(record.p_value.is_nan());
        assert_eq!(record.regulation, Regulation::NotSignificant);
    }

    #[test]
    fn test_errors() {
        let no_group = Table::from_numeric(vec!["F".into()], vec![vec![1.0]]).unwrap();
        assert!(matches!(
            detect_markers(&no_group, &MarkerParams::default()),
            Err(OmicsError::MissingColumn(_))
        ));

        let no_features = Table::new(vec!["Group".into()], vec![groups(&["a", "b"])]).unwrap();
        assert!(matches!(
            detect_markers(&no_features, &MarkerParams::default()),
            Err(OmicsError::EmptyInput(_))
        ));

        let bad_params = MarkerParams {
            p_threshold: 1.5,
            fc_threshold: 2.0,
        };
        assert!(matches!(
            detect_markers(&create_test_table(), &bad_params),
            Err(OmicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_params_validation() {
        assert!(MarkerParams::new(0.05, 2.0).is_ok());
        assert!(MarkerParams::new(0.0, 2.0).is_err());
        assert!(MarkerParams::new(0.05, 1.0).is_err());
        assert!(MarkerParams::new(0.05, f64::NAN).is_err());
    }
}
