//! Pipeline composition and execution for omics analysis.

mod runner;

pub use runner::{
    integrate_layers, integrate_layers_on_key, run_preprocessing, AnalysisOutput, Pipeline,
    PipelineConfig, PipelineStep,
};
