//! Logarithmic transforms with a +1 offset.
//!
//! The offset lets zero intensities map to zero. Values below -1 have no
//! logarithm and come out as NaN; they are not clamped. The transform is
//! one-way: no inverse is provided.

use crate::data::Table;

/// log2(x + 1) on every numeric column. Conventional for transcriptomics.
pub fn norm_log2(table: &Table) -> Table {
    table.map_numeric(|values| values.iter().map(|&x| (x + 1.0).log2()).collect())
}

/// log10(x + 1) on every numeric column. Conventional for metabolomics.
pub fn norm_log10(table: &Table) -> Table {
    table.map_numeric(|values| values.iter().map(|&x| (x + 1.0).log10()).collect())
}
