//! Missing-value resolution prior to downstream analysis.

mod impute;

pub use impute::{
    count_incomplete_rows, drop_incomplete_rows, mean_observed, median_observed,
    resolve_missing, MissingPolicy,
};
