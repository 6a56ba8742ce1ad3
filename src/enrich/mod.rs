//! Pathway enrichment reporting on top of an external enrichment service.

mod pathway;

pub use pathway::{
    disease_flags, pathways_to_csv, run_enrichment, select_query_features, summarize_enrichment,
    DiseaseFlags, EnrichmentService, EnrichmentTerm, Organism, PathwayHit, DEFAULT_MIN_ABS_DIFF,
    DEFAULT_TOP_PATHWAYS, KEGG_SOURCE,
};
