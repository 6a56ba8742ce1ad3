//! Column-wise merging of omics layers.

use crate::data::Table;
use crate::error::{OmicsError, Result};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Concatenate tables side by side.
///
/// Rows are matched by position only: the caller is responsible for every
/// table listing the same samples in the same order. Row counts must agree
/// and column names must be unique across all tables.
pub fn merge_positional(tables: &[Table]) -> Result<Table> {
    let first = tables
        .first()
        .ok_or_else(|| OmicsError::EmptyInput("no tables to merge".to_string()))?;
    let n_rows = first.n_rows();

    let mut merged = Table::default();
    for (i, table) in tables.iter().enumerate() {
        if table.n_rows() != n_rows {
            return Err(OmicsError::RowAlignment(format!(
                "table {} has {} rows, table 1 has {}",
                i + 1,
                table.n_rows(),
                n_rows
            )));
        }
        for (name, column) in table.iter() {
            merged.push_column(name, column.clone())?;
        }
    }

    debug!(
        "Merged {} tables positionally: {} rows x {} columns",
        tables.len(),
        merged.n_rows(),
        merged.n_columns()
    );
    Ok(merged)
}

/// Concatenate tables side by side, aligning rows on a shared key column.
///
/// Every table must hold `key` with present, unique values forming the same
/// set in every table. Rows follow the first table's order and the key
/// column appears once, in its position in the first table.
pub fn merge_on_key(tables: &[Table], key: &str) -> Result<Table> {
    let first = tables
        .first()
        .ok_or_else(|| OmicsError::EmptyInput("no tables to merge".to_string()))?;
    let reference = key_values(first, key, 1)?;
    let reference_set: HashSet<&str> = reference.iter().map(String::as_str).collect();

    let mut merged = first.clone();
    for (i, table) in tables.iter().enumerate().skip(1) {
        let keys = key_values(table, key, i + 1)?;
        let positions: HashMap<&str, usize> = keys
            .iter()
            .enumerate()
            .map(|(row, k)| (k.as_str(), row))
            .collect();

        if positions.len() != reference_set.len()
            || !positions.keys().all(|k| reference_set.contains(k))
        {
            return Err(OmicsError::RowAlignment(format!(
                "table {} does not share the sample set of table 1 on '{}'",
                i + 1,
                key
            )));
        }

        let order: Vec<usize> = reference.iter().map(|k| positions[k.as_str()]).collect();
        let aligned = table.select_rows(&order).drop_columns(&[key]);
        for (name, column) in aligned.iter() {
            merged.push_column(name, column.clone())?;
        }
    }

    debug!(
        "Merged {} tables on '{}': {} rows x {} columns",
        tables.len(),
        key,
        merged.n_rows(),
        merged.n_columns()
    );
    Ok(merged)
}

/// Key values of one table; missing or repeated values are alignment errors.
fn key_values(table: &Table, key: &str, position: usize) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut values = Vec::with_capacity(table.n_rows());
    for (row, label) in table.labels(key)?.into_iter().enumerate() {
        let value = label.ok_or_else(|| {
            OmicsError::RowAlignment(format!(
                "table {} has no '{}' value in row {}",
                position,
                key,
                row + 1
            ))
        })?;
        if !seen.insert(value.clone()) {
            return Err(OmicsError::RowAlignment(format!(
                "table {} repeats '{}' value '{}'",
                position, key, value
            )));
        }
        values.push(value);
    }
    Ok(values)
}
