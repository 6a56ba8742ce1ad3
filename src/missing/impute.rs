//! Missing-value resolution: column-wise fill or row-wise drop.

use crate::data::Table;
use crate::error::{OmicsError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Strategy for resolving missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Fill each numeric column with its mean.
    Mean,
    /// Fill each numeric column with its median.
    Median,
    /// Remove every row with a missing cell in any column.
    Drop,
    /// Return the table unchanged.
    Keep,
}

impl Default for MissingPolicy {
    fn default() -> Self {
        Self::Mean
    }
}

impl MissingPolicy {
    /// Lenient lookup by name; unrecognized names resolve to [`MissingPolicy::Keep`].
    pub fn from_name(name: &str) -> Self {
        match name.parse() {
            Ok(policy) => policy,
            Err(_) => {
                warn!(
                    "Unrecognized missing-value policy '{}', leaving data unchanged",
                    name
                );
                Self::Keep
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Drop => "drop",
            Self::Keep => "keep",
        }
    }
}

impl std::str::FromStr for MissingPolicy {
    type Err = OmicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "drop" => Ok(Self::Drop),
            "keep" | "none" => Ok(Self::Keep),
            other => Err(OmicsError::InvalidParameter(format!(
                "Unknown missing-value policy '{}' (expected mean, median, drop or keep)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve missing values according to `policy`.
///
/// Fill policies touch numeric columns only. A column with no observed
/// values has an undefined (NaN) fill value and therefore stays missing.
pub fn resolve_missing(table: &Table, policy: MissingPolicy) -> Table {
    let resolved = match policy {
        MissingPolicy::Mean => fill_with(table, mean_observed),
        MissingPolicy::Median => fill_with(table, median_observed),
        MissingPolicy::Drop => drop_incomplete_rows(table),
        MissingPolicy::Keep => table.clone(),
    };
    debug!(
        "Resolved missing values ({}): {} -> {} rows, {} missing cells remain",
        policy,
        table.n_rows(),
        resolved.n_rows(),
        resolved.n_missing()
    );
    resolved
}

fn fill_with<F>(table: &Table, fill_value: F) -> Table
where
    F: Fn(&[f64]) -> f64,
{
    table.map_numeric(|values| {
        let fill = fill_value(values);
        values
            .iter()
            .map(|&x| if x.is_nan() { fill } else { x })
            .collect()
    })
}

/// Keep only rows without any missing cell.
pub fn drop_incomplete_rows(table: &Table) -> Table {
    let keep: Vec<usize> = (0..table.n_rows())
        .filter(|&row| !table.iter().any(|(_, c)| c.is_missing(row)))
        .collect();
    table.select_rows(&keep)
}

/// Mean of the non-missing values; NaN if there are none.
pub fn mean_observed(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|x| !x.is_nan())
        .fold((0.0, 0usize), |(s, n), &x| (s + x, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Median of the non-missing values; NaN if there are none.
pub fn median_observed(values: &[f64]) -> f64 {
    let mut observed: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    if observed.is_empty() {
        return f64::NAN;
    }
    observed.sort_by(|a, b| a.total_cmp(b));
    let mid = observed.len() / 2;
    if observed.len() % 2 == 0 {
        (observed[mid - 1] + observed[mid]) / 2.0
    } else {
        observed[mid]
    }
}

/// Number of rows a drop would remove, without building the table.
pub fn count_incomplete_rows(table: &Table) -> usize {
    (0..table.n_rows())
        .filter(|&row| table.iter().any(|(_, c)| c.is_missing(row)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use approx::assert_relative_eq;

    fn create_test_table() -> Table {
        Table::new(
            vec!["Group".into(), "A".into(), "B".into(), "Empty".into()],
            vec![
                Column::Categorical(vec![
                    Some("AD".into()),
                    Some("CTRL".into()),
                    None,
                    Some("AD".into()),
                ]),
                Column::Numeric(vec![1.0, f64::NAN, 3.0, 8.0]),
                Column::Numeric(vec![2.0, 4.0, 6.0, 8.0]),
                Column::Numeric(vec![f64::NAN; 4]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_mean_fill() {
        let table = create_test_table();
        let filled = resolve_missing(&table, MissingPolicy::Mean);
        assert_relative_eq!(filled.numeric("A").unwrap()[1], 4.0);
        assert_eq!(filled.numeric("B").unwrap(), table.numeric("B").unwrap());
        // Group labels are not imputed.
        assert!(filled.column("Group").unwrap().is_missing(2));
    }

    #[test]
    fn test_median_fill() {
        let filled = resolve_missing(&create_test_table(), MissingPolicy::Median);
        assert_relative_eq!(filled.numeric("A").unwrap()[1], 3.0);
    }

    #[test]
    fn test_all_missing_column_stays_missing() {
        let table = create_test_table();
        for policy in [MissingPolicy::Mean, MissingPolicy::Median] {
            let filled = resolve_missing(&table, policy);
            let empty = filled.column("Empty").unwrap();
            assert_eq!(empty.n_missing(), empty.len());
            // Every other numeric column is complete.
            assert_eq!(filled.column("A").unwrap().n_missing(), 0);
        }
    }

    #[test]
    fn test_drop_considers_every_column() {
        let table = Table::new(
            vec!["Group".into(), "A".into()],
            vec![
                Column::Categorical(vec![Some("AD".into()), None, Some("CTRL".into())]),
                Column::Numeric(vec![1.0, 2.0, f64::NAN]),
            ],
        )
        .unwrap();
        assert_eq!(count_incomplete_rows(&table), 2);
        let dropped = resolve_missing(&table, MissingPolicy::Drop);
        assert_eq!(dropped.n_rows(), 1);
        assert_eq!(dropped.n_missing(), 0);
        assert_eq!(dropped.numeric("A").unwrap(), &[1.0]);
    }

    #[test]
    fn test_keep_is_passthrough() {
        let table = create_test_table();
        let kept = resolve_missing(&table, MissingPolicy::Keep);
        assert_eq!(kept.column_names(), table.column_names());
        assert_eq!(kept.n_missing(), table.n_missing());
        assert_eq!(kept.numeric("B").unwrap(), table.numeric("B").unwrap());
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(MissingPolicy::from_name("median"), MissingPolicy::Median);
        assert_eq!(MissingPolicy::from_name("interpolate"), MissingPolicy::Keep);
        assert!("interpolate".parse::<MissingPolicy>().is_err());
        assert_eq!("DROP".parse::<MissingPolicy>().unwrap(), MissingPolicy::Drop);
    }

    #[test]
    fn test_median_even_count() {
        assert_relative_eq!(median_observed(&[4.0, 1.0, f64::NAN, 3.0, 2.0]), 2.5);
        assert!(median_observed(&[f64::NAN]).is_nan());
        assert!(mean_observed(&[]).is_nan());
    }
}
