//! Dimensionality reduction.

mod pca;

pub use pca::{perform_pca, PcaResult, DEFAULT_COMPONENTS};
