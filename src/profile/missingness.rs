//! Missingness profiling for omics tables.

use crate::data::Table;
use serde::{Deserialize, Serialize};

/// Missing-value counts for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMissingness {
    pub column: String,
    pub numeric: bool,
    pub n_missing: usize,
}

/// Profile of missing values in a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingnessProfile {
    /// Number of rows.
    pub n_rows: usize,
    /// Number of columns.
    pub n_columns: usize,
    /// Total number of missing cells.
    pub total_missing: usize,
    /// Proportion of missing cells.
    pub missing_fraction: f64,
    /// Per-column counts, in table order.
    pub columns: Vec<ColumnMissingness>,
    /// Number of rows with at least one missing cell.
    pub rows_with_missing: usize,
}

impl MissingnessProfile {
    /// Check if the table has no missing cells.
    pub fn is_complete(&self) -> bool {
        self.total_missing == 0
    }

    /// Names of columns without missing values.
    pub fn complete_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.n_missing == 0)
            .map(|c| c.column.as_str())
            .collect()
    }

    /// Numeric columns with at least one missing value.
    ///
    /// These are the columns PCA would exclude.
    pub fn incomplete_numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.numeric && c.n_missing > 0)
            .map(|c| c.column.as_str())
            .collect()
    }

    /// Numeric columns where every value is missing.
    pub fn empty_numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.numeric && self.n_rows > 0 && c.n_missing == self.n_rows)
            .map(|c| c.column.as_str())
            .collect()
    }
}

impl std::fmt::Display for MissingnessProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Missingness Profile")?;
        writeln!(f, "  Rows x columns:     {} x {}", self.n_rows, self.n_columns)?;
        writeln!(f, "  Missing cells:      {}", self.total_missing)?;
        writeln!(f, "  Missing fraction:   {:.2}%", self.missing_fraction * 100.0)?;
        writeln!(f, "  Rows with missing:  {}", self.rows_with_missing)?;
        for c in self.columns.iter().filter(|c| c.n_missing > 0) {
            writeln!(f, "    {}: {}", c.column, c.n_missing)?;
        }
        Ok(())
    }
}

/// Profile missing values across every column of a table.
pub fn profile_missingness(table: &Table) -> MissingnessProfile {
    let n_rows = table.n_rows();
    let columns: Vec<ColumnMissingness> = table
        .iter()
        .map(|(name, column)| ColumnMissingness {
            column: name.to_string(),
            numeric: column.is_numeric(),
            n_missing: column.n_missing(),
        })
        .collect();
    let total_missing = columns.iter().map(|c| c.n_missing).sum();

    let rows_with_missing = (0..n_rows)
        .filter(|&row| table.iter().any(|(_, c)| c.is_missing(row)))
        .count();

    let total_cells = n_rows * table.n_columns();
    let missing_fraction = if total_cells > 0 {
        total_missing as f64 / total_cells as f64
    } else {
        0.0
    };

    MissingnessProfile {
        n_rows,
        n_columns: table.n_columns(),
        total_missing,
        missing_fraction,
        columns,
        rows_with_missing,
    }
}
