//! Data profiling primitives for omics tables.

mod missingness;

pub use missingness::{profile_missingness, ColumnMissingness, MissingnessProfile};
