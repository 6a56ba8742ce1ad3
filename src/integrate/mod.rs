//! Integration of multiple omics layers into one wide table.

mod merge;

pub use merge::{merge_on_key, merge_positional};
