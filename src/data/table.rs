//! In-memory rectangular dataset with named numeric and categorical columns.

use crate::error::{OmicsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Reserved column partitioning rows into two comparison groups.
pub const GROUP_COLUMN: &str = "Group";

/// Reserved column holding sample identifiers.
pub const SAMPLE_ID_COLUMN: &str = "SampleID";

/// A single column of a [`Table`].
///
/// Missing numeric values are stored as NaN; missing categorical values as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Floating point measurements.
    Numeric(Vec<f64>),
    /// String labels.
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    /// Check if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this is a numeric column.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Try to get numeric values.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Categorical(_) => None,
        }
    }

    /// Try to get categorical values.
    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Categorical(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Check if the cell at `row` is missing.
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Numeric(v) => v[row].is_nan(),
            Column::Categorical(v) => v[row].is_none(),
        }
    }

    /// Number of missing cells.
    pub fn n_missing(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// String view of a cell; `None` when missing.
    pub fn label(&self, row: usize) -> Option<String> {
        match self {
            Column::Numeric(v) => {
                let x = v[row];
                if x.is_nan() {
                    None
                } else {
                    Some(x.to_string())
                }
            }
            Column::Categorical(v) => v[row].clone(),
        }
    }

    /// Build a new column from the given row indices.
    pub fn select(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(rows.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// An ordered collection of uniquely named, equally long columns.
///
/// Every transformation in the crate takes a `&Table` and returns a new one.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Create a table, validating unique names and a consistent row count.
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(OmicsError::DimensionMismatch {
                expected: names.len(),
                actual: columns.len(),
            });
        }
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(OmicsError::DuplicateColumn(name.clone()));
            }
        }
        if let Some(first) = columns.first() {
            let n_rows = first.len();
            for col in &columns[1..] {
                if col.len() != n_rows {
                    return Err(OmicsError::DimensionMismatch {
                        expected: n_rows,
                        actual: col.len(),
                    });
                }
            }
        }
        Ok(Self { names, columns })
    }

    /// Assemble a table whose names and lengths are already known to be valid.
    pub(crate) fn from_parts(names: Vec<String>, columns: Vec<Column>) -> Self {
        debug_assert_eq!(names.len(), columns.len());
        Self { names, columns }
    }

    /// Create a table with only numeric columns.
    pub fn from_numeric(names: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(names, values.into_iter().map(Column::Numeric).collect())
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    #[inline]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Check if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_index(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| OmicsError::MissingColumn(name.to_string()))
    }

    /// Get a numeric column by name.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        self.column(name)?.as_numeric().ok_or_else(|| {
            OmicsError::InvalidParameter(format!("Column '{}' is not numeric", name))
        })
    }

    /// Iterate over `(name, column)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// String labels for every row of a column (numeric values are formatted).
    pub fn labels(&self, name: &str) -> Result<Vec<Option<String>>> {
        let col = self.column(name)?;
        Ok((0..col.len()).map(|i| col.label(i)).collect())
    }

    /// Names of numeric columns in order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, c)| c.is_numeric())
            .map(|(n, _)| n)
            .collect()
    }

    /// Total number of missing cells.
    pub fn n_missing(&self) -> usize {
        self.columns.iter().map(Column::n_missing).sum()
    }

    /// Append a column.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(OmicsError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(OmicsError::DimensionMismatch {
                expected: self.n_rows(),
                actual: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Subset to the given rows (by index, in the given order).
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(rows)).collect(),
        }
    }

    /// Subset to the named columns, in the given order.
    pub fn select_columns(&self, names: &[&str]) -> Result<Table> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.column(name)?.clone());
        }
        Table::new(names.iter().map(|s| s.to_string()).collect(), columns)
    }

    /// Remove the named columns; absent names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Table {
        let (names, columns) = self
            .iter()
            .filter(|(n, _)| !names.contains(n))
            .map(|(n, c)| (n.to_string(), c.clone()))
            .unzip();
        Table { names, columns }
    }

    /// Apply a column-wise transform to every numeric column.
    ///
    /// Categorical columns are carried over unchanged.
    pub fn map_numeric<F>(&self, f: F) -> Table
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        Table {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| match c {
                    Column::Numeric(v) => Column::Numeric(f(v)),
                    other => other.clone(),
                })
                .collect(),
        }
    }

    /// Decompose into names and columns.
    pub fn into_parts(self) -> (Vec<String>, Vec<Column>) {
        (self.names, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> Table {
        Table::new(
            vec!["Group".into(), "F1".into(), "F2".into()],
            vec![
                Column::Categorical(vec![Some("AD".into()), Some("CTRL".into()), None]),
                Column::Numeric(vec![1.0, 2.0, f64::NAN]),
                Column::Numeric(vec![4.0, 5.0, 6.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dimensions() {
        let table = create_test_table();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_columns(), 3);
        assert_eq!(table.numeric_column_names(), vec!["F1", "F2"]);
        assert_eq!(table.n_missing(), 2);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = Table::from_numeric(
            vec!["A".into(), "A".into()],
            vec![vec![1.0], vec![2.0]],
        );
        assert!(matches!(result, Err(OmicsError::DuplicateColumn(name)) if name == "A"));
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let result = Table::from_numeric(
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 2.0], vec![2.0]],
        );
        assert!(matches!(result, Err(OmicsError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_missing_column() {
        let table = create_test_table();
        assert!(matches!(table.column("F9"), Err(OmicsError::MissingColumn(_))));
        assert!(table.numeric("Group").is_err());
    }

    #[test]
    fn test_labels_format_numbers() {
        let table = Table::from_numeric(vec!["g".into()], vec![vec![1.0, 2.5, f64::NAN]]).unwrap();
        let labels = table.labels("g").unwrap();
        assert_eq!(labels, vec![Some("1".to_string()), Some("2.5".to_string()), None]);
    }

    #[test]
    fn test_select_and_drop() {
        let table = create_test_table();
        let rows = table.select_rows(&[2, 0]);
        assert_eq!(rows.numeric("F2").unwrap(), &[6.0, 4.0]);

        let dropped = table.drop_columns(&["Group", "absent"]);
        assert_eq!(dropped.column_names(), &["F1", "F2"]);

        let picked = table.select_columns(&["F2", "Group"]).unwrap();
        assert_eq!(picked.column_names(), &["F2", "Group"]);
    }

    #[test]
    fn test_map_numeric_keeps_categorical() {
        let table = create_test_table();
        let doubled = table.map_numeric(|v| v.iter().map(|x| x * 2.0).collect());
        assert_eq!(doubled.numeric("F2").unwrap(), &[8.0, 10.0, 12.0]);
        assert_eq!(doubled.column("Group").unwrap(), table.column("Group").unwrap());
    }

    #[test]
    fn test_push_column() {
        let mut table = create_test_table();
        table.push_column("F3", Column::Numeric(vec![0.0; 3])).unwrap();
        assert_eq!(table.n_columns(), 4);
        assert!(table.push_column("F3", Column::Numeric(vec![0.0; 3])).is_err());
        assert!(table.push_column("F4", Column::Numeric(vec![0.0; 2])).is_err());
    }
}
