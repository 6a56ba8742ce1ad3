//! In-memory CSV export.
//!
//! Results are returned as byte buffers; callers decide where (and whether)
//! to write them.

use crate::data::{format_float, Column, Table};
use crate::error::{OmicsError, Result};

/// Serialize a table to CSV with a header row.
///
/// Missing values (NaN or `None`) become empty cells.
pub fn table_to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;

    for row in 0..table.n_rows() {
        let record: Vec<String> = table
            .iter()
            .map(|(_, column)| match column {
                Column::Numeric(values) => format_float(values[row]),
                Column::Categorical(labels) => labels[row].clone().unwrap_or_default(),
            })
            .collect();
        writer.write_record(&record)?;
    }

    writer.into_inner().map_err(|e| OmicsError::Io(e.into_error()))
}
