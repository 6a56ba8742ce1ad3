//! Statistical core for multi-omics marker discovery.
//!
//! The crate turns uploaded omics tables (transcriptomics, metabolomics,
//! lipidomics) into normalized matrices, principal components and
//! volcano-plot marker tables. Every operation is a pure function from
//! input tables and parameters to a new result.
//!
//! # Overview
//!
//! - **data**: `Table`, numeric coercion and marker result types
//! - **io**: CSV/XLSX ingestion and in-memory CSV export
//! - **profile**: missingness profiling
//! - **missing**: mean/median imputation and row dropping
//! - **normalize**: log2, log10, z-score, min-max and standard scaling
//! - **reduce**: PCA
//! - **test**: Welch's t-test
//! - **markers**: Up/Down/NS classification for volcano plots
//! - **integrate**: merging omics layers
//! - **enrich**: KEGG pathway reporting over an external enrichment service
//! - **pipeline**: pipeline composition and execution
//!
//! # Example
//!
//! ```no_run
//! use degeneromics::prelude::*;
//!
//! let table = read_table("cohort.csv").unwrap();
//!
//! let output = Pipeline::new()
//!     .resolve_missing(MissingPolicy::Mean)
//!     .normalize(NormalizationMethod::Log2)
//!     .pca(2)
//!     .markers(0.05, 2.0)
//!     .run(&table)
//!     .unwrap();
//!
//! let markers = output.markers.unwrap();
//! println!("{}", markers.summary());
//! ```

pub mod data;
pub mod enrich;
pub mod error;
pub mod integrate;
pub mod io;
pub mod markers;
pub mod missing;
pub mod normalize;
pub mod pipeline;
pub mod profile;
pub mod reduce;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        coerce_numeric, CoercionReport, Column, MarkerRecord, MarkerRows, MarkerSet,
        MarkerSummary, Regulation, Table, VolcanoPoint, GROUP_COLUMN, SAMPLE_ID_COLUMN,
    };
    pub use crate::enrich::{
        disease_flags, run_enrichment, select_query_features, summarize_enrichment,
        EnrichmentService, EnrichmentTerm, Organism, PathwayHit,
    };
    pub use crate::error::{OmicsError, Result};
    pub use crate::integrate::{merge_on_key, merge_positional};
    pub use crate::io::{parse_table, read_table, table_to_csv};
    pub use crate::markers::{detect_markers, MarkerParams};
    pub use crate::missing::{resolve_missing, MissingPolicy};
    pub use crate::normalize::{normalize, NormalizationMethod, OmicsLayer};
    pub use crate::pipeline::{
        integrate_layers, integrate_layers_on_key, run_preprocessing, AnalysisOutput, Pipeline,
        PipelineConfig, PipelineStep,
    };
    pub use crate::profile::{profile_missingness, MissingnessProfile};
    pub use crate::reduce::{perform_pca, PcaResult};
    pub use crate::test::{test_welch, WelchResult};
}
