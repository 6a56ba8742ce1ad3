//! Explicit numeric coercion of table columns.
//!
//! Cells that fail to parse become missing instead of aborting the computation,
//! but every failure is tallied so the caller can surface it.

use super::table::{Column, Table};
use log::warn;
use serde::{Deserialize, Serialize};

/// Outcome of coercing a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    /// Parsed successfully.
    Value(f64),
    /// The cell was already missing.
    Missing,
    /// The cell held text that is not a number.
    Failed,
}

/// Check if a raw string denotes a missing value.
pub fn is_missing_token(raw: &str) -> bool {
    matches!(
        raw.trim(),
        "" | "NA" | "na" | "N/A" | "NaN" | "nan" | "null" | "NULL"
    )
}

/// Coerce a single raw cell to a number.
pub fn coerce_cell(raw: Option<&str>) -> Coerced {
    match raw {
        None => Coerced::Missing,
        Some(s) if is_missing_token(s) => Coerced::Missing,
        Some(s) => match s.trim().parse::<f64>() {
            Ok(v) => Coerced::Value(v),
            Err(_) => Coerced::Failed,
        },
    }
}

/// Number of cells that failed coercion in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCoercion {
    pub column: String,
    pub n_failed: usize,
}

/// Non-fatal diagnostics from numeric coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionReport {
    /// Columns with at least one failed cell, in table order.
    pub columns: Vec<ColumnCoercion>,
    /// Total number of failed cells.
    pub total_failed: usize,
}

impl CoercionReport {
    /// Check if every cell coerced cleanly.
    pub fn is_clean(&self) -> bool {
        self.total_failed == 0
    }

    /// Failures recorded for a column (0 if none).
    pub fn failures_in(&self, column: &str) -> usize {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.n_failed)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for CoercionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_clean() {
            return writeln!(f, "All values numeric");
        }
        writeln!(f, "{} non-numeric values treated as missing", self.total_failed)?;
        for c in &self.columns {
            writeln!(f, "  {}: {}", c.column, c.n_failed)?;
        }
        Ok(())
    }
}

/// Coerce every column except `exclude` to numeric.
///
/// Numeric columns pass through untouched.
pub fn coerce_numeric(table: &Table, exclude: &[&str]) -> (Table, CoercionReport) {
    let mut report = CoercionReport::default();
    let mut names = Vec::with_capacity(table.n_columns());
    let mut columns = Vec::with_capacity(table.n_columns());

    for (name, column) in table.iter() {
        names.push(name.to_string());
        let coerced = match column {
            Column::Categorical(cells) if !exclude.contains(&name) => {
                let mut n_failed = 0;
                let values = cells
                    .iter()
                    .map(|cell| match coerce_cell(cell.as_deref()) {
                        Coerced::Value(v) => v,
                        Coerced::Missing => f64::NAN,
                        Coerced::Failed => {
                            n_failed += 1;
                            f64::NAN
                        }
                    })
                    .collect();
                if n_failed > 0 {
                    warn!(
                        "Column '{}': {} non-numeric values treated as missing",
                        name, n_failed
                    );
                    report.columns.push(ColumnCoercion {
                        column: name.to_string(),
                        n_failed,
                    });
                    report.total_failed += n_failed;
                }
                Column::Numeric(values)
            }
            other => other.clone(),
        };
        columns.push(coerced);
    }

    (Table::from_parts(names, columns), report)
}
