//! Normalization transforms for omics intensities.
//!
//! - **log2 / log10**: elementwise `log(x + 1)`
//! - **z-score**: `(x - mean) / std` with the sample standard deviation
//! - **min-max**: fitted rescaling to [0, 1]
//! - **standard**: fitted centering and unit-variance scaling

pub mod logarithmic;
pub mod scale;
mod method;

pub use logarithmic::{norm_log10, norm_log2};
pub use method::{normalize, NormalizationMethod, OmicsLayer};
pub use scale::{norm_minmax, norm_standard, norm_zscore};
