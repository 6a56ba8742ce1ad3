//! File ingestion: CSV and XLSX payloads into a [`Table`].

use crate::data::{coerce_cell, is_missing_token, Coerced, Column, Table};
use crate::error::{OmicsError, Result};
use calamine::{open_workbook_from_rs, DataType, Reader, Xlsx, XlsxError};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Detect the format from a file name's extension.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(Self::Csv)
        } else if lower.ends_with(".xlsx") {
            Ok(Self::Xlsx)
        } else {
            Err(OmicsError::UnsupportedFormat(filename.to_string()))
        }
    }
}

/// Read a table from a `.csv` or `.xlsx` file on disk.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // Reject before touching the file system.
    FileFormat::from_filename(&filename)?;
    let bytes = std::fs::read(path)?;
    parse_table(&bytes, &filename)
}

/// Parse an uploaded payload, dispatching on the file name's extension.
///
/// Unknown extensions fail with `UnsupportedFormat`; any decoding problem
/// fails with `Parse` naming the file and the underlying cause.
pub fn parse_table(bytes: &[u8], filename: &str) -> Result<Table> {
    let format = FileFormat::from_filename(filename)?;
    let parsed = match format {
        FileFormat::Csv => parse_csv(bytes),
        FileFormat::Xlsx => parse_xlsx(bytes),
    };
    let (header, rows) = parsed.map_err(|reason| OmicsError::Parse {
        file: filename.to_string(),
        reason,
    })?;
    let table = build_table(header, rows).map_err(|e| OmicsError::Parse {
        file: filename.to_string(),
        reason: e.to_string(),
    })?;
    debug!(
        "Parsed '{}': {} rows x {} columns",
        filename,
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

type RawRows = (Vec<String>, Vec<Vec<Option<String>>>);

fn parse_csv(bytes: &[u8]) -> std::result::Result<RawRows, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if header.is_empty() || header.iter().all(String::is_empty) {
        return Err("no header row".to_string());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if is_missing_token(field) {
                        None
                    } else {
                        Some(field.trim().to_string())
                    }
                })
                .collect(),
        );
    }
    Ok((header, rows))
}

fn parse_xlsx(bytes: &[u8]) -> std::result::Result<RawRows, String> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e: XlsxError| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| e.to_string())?;

    let mut row_iter = range.rows();
    let header: Vec<String> = row_iter
        .next()
        .ok_or_else(|| "empty worksheet".to_string())?
        .iter()
        .map(|cell| cell_to_string(cell).unwrap_or_default())
        .collect();

    let rows = row_iter
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    Ok((header, rows))
}

fn cell_to_string(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty => None,
        DataType::String(s) if is_missing_token(s) => None,
        DataType::String(s) => Some(s.trim().to_string()),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Type each column: numeric when every present cell parses, else categorical.
fn build_table(header: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Table> {
    let n_cols = header.len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(OmicsError::InvalidParameter(format!(
                "row {} has {} fields, header has {}",
                i + 1,
                row.len(),
                n_cols
            )));
        }
    }

    let mut columns = Vec::with_capacity(n_cols);
    for col_idx in 0..n_cols {
        let cells: Vec<Option<String>> = rows.iter().map(|r| r[col_idx].clone()).collect();
        let parsed: Vec<Coerced> = cells.iter().map(|c| coerce_cell(c.as_deref())).collect();
        let column = if parsed.iter().any(|c| *c == Coerced::Failed) {
            Column::Categorical(cells)
        } else {
            Column::Numeric(
                parsed
                    .into_iter()
                    .map(|c| match c {
                        Coerced::Value(v) => v,
                        _ => f64::NAN,
                    })
                    .collect(),
            )
        };
        columns.push(column);
    }

    Table::new(deduplicate_names(header), columns)
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, ...
///
/// A suffix already taken by another header is skipped.
fn deduplicate_names(header: Vec<String>) -> Vec<String> {
    let named: Vec<String> = header
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name
            }
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(named.len());
    for name in &named {
        if taken.insert(name.clone()) {
            unique.push(name.clone());
            continue;
        }
        let suffix = next_suffix.entry(name.clone()).or_insert(1);
        let mut candidate = format!("{}.{}", name, suffix);
        while named.contains(&candidate) || taken.contains(&candidate) {
            *suffix += 1;
            candidate = format!("{}.{}", name, suffix);
        }
        *suffix += 1;
        taken.insert(candidate.clone());
        unique.push(candidate);
    }
    unique
}
