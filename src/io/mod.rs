//! Reading uploaded tables and exporting results.

mod export;
mod ingest;

pub use export::table_to_csv;
pub use ingest::{parse_table, read_table, FileFormat};
