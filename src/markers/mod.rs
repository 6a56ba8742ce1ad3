//! Differential marker detection between two sample groups.

mod volcano;

pub use volcano::{
    detect_markers, feature_columns, group_levels, MarkerParams, FOLD_CHANGE_EPSILON,
};
pub(crate) use volcano::partition_two_groups;
