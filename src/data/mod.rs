//! Data structures for omics tables and analysis results.

mod coerce;
mod result;
mod table;

pub use coerce::{coerce_cell, coerce_numeric, is_missing_token, CoercionReport, ColumnCoercion, Coerced};
pub use result::{MarkerRecord, MarkerRows, MarkerSet, MarkerSummary, Regulation, VolcanoPoint};
pub(crate) use result::format_float;
pub use table::{Column, Table, GROUP_COLUMN, SAMPLE_ID_COLUMN};
