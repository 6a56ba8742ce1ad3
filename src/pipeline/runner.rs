//! Pipeline runner for composing and executing analysis steps.

use crate::data::{MarkerRows, MarkerSet, Table};
use crate::io::table_to_csv;
use crate::error::{OmicsError, Result};
use crate::integrate::{merge_on_key, merge_positional};
use crate::markers::{detect_markers, MarkerParams};
use crate::missing::{resolve_missing, MissingPolicy};
use crate::normalize::{normalize, NormalizationMethod, OmicsLayer};
use crate::reduce::{perform_pca, PcaResult};
use log::{error, info};
use serde::{Deserialize, Serialize};

/// A step in the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineStep {
    /// Fill or drop missing values.
    ResolveMissing { policy: MissingPolicy },
    /// Normalize every numeric column.
    Normalize { method: NormalizationMethod },
    /// PCA on the current table.
    Pca { n_components: usize },
    /// Differential markers between the two groups of the current table.
    Markers { p_threshold: f64, fc_threshold: f64 },
}

/// Pipeline configuration for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the pipeline.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Steps to execute.
    pub steps: Vec<PipelineStep>,
}

impl PipelineConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(OmicsError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(OmicsError::from)
    }
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// The table after all transforming steps.
    pub table: Table,
    /// Result of the last PCA step, if any.
    pub pca: Option<PcaResult>,
    /// Result of the last marker step, if any.
    pub markers: Option<MarkerSet>,
}

impl AnalysisOutput {
    /// CSV exports keyed by file suffix.
    ///
    /// `markers.csv` holds only the Up/Down table rows; every tested feature
    /// goes to `volcano.csv`.
    pub fn csv_exports(&self) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut exports = vec![("table.csv", table_to_csv(&self.table)?)];
        if let Some(pca) = &self.pca {
            exports.push(("pca.csv", table_to_csv(&pca.scores)?));
        }
        if let Some(markers) = &self.markers {
            exports.push(("markers.csv", markers.to_csv(MarkerRows::Table)?));
            exports.push(("volcano.csv", markers.to_csv(MarkerRows::All)?));
        }
        Ok(exports)
    }
}

/// Builder for constructing and running analysis pipelines.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
    name: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            name: "unnamed".to_string(),
        }
    }

    /// Create from a config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            steps: config.steps.clone(),
            name: config.name.clone(),
        }
    }

    /// Set the pipeline name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Resolve missing values.
    pub fn resolve_missing(mut self, policy: MissingPolicy) -> Self {
        self.steps.push(PipelineStep::ResolveMissing { policy });
        self
    }

    /// Normalize numeric columns.
    pub fn normalize(mut self, method: NormalizationMethod) -> Self {
        self.steps.push(PipelineStep::Normalize { method });
        self
    }

    /// Run PCA.
    pub fn pca(mut self, n_components: usize) -> Self {
        self.steps.push(PipelineStep::Pca { n_components });
        self
    }

    /// Detect markers.
    pub fn markers(mut self, p_threshold: f64, fc_threshold: f64) -> Self {
        self.steps.push(PipelineStep::Markers {
            p_threshold,
            fc_threshold,
        });
        self
    }

    /// Get the steps.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Convert to config for serialization.
    pub fn to_config(&self, description: Option<&str>) -> PipelineConfig {
        PipelineConfig {
            name: self.name.clone(),
            description: description.map(String::from),
            steps: self.steps.clone(),
        }
    }

    /// Run the pipeline on a table.
    ///
    /// Errors from a step keep their kind so callers can react to it; the
    /// failing step is logged.
    pub fn run(&self, table: &Table) -> Result<AnalysisOutput> {
        if self.steps.is_empty() {
            return Err(OmicsError::Pipeline(format!(
                "Pipeline '{}' has no steps",
                self.name
            )));
        }

        let mut state = AnalysisOutput {
            table: table.clone(),
            pca: None,
            markers: None,
        };
        for (i, step) in self.steps.iter().enumerate() {
            state = apply(state, step).map_err(|e| {
                error!("Step {} ({:?}) of '{}' failed: {}", i + 1, step, self.name, e);
                e
            })?;
        }

        info!("Pipeline '{}' completed {} steps", self.name, self.steps.len());
        Ok(state)
    }
}

fn apply(mut state: AnalysisOutput, step: &PipelineStep) -> Result<AnalysisOutput> {
    match step {
        PipelineStep::ResolveMissing { policy } => {
            state.table = resolve_missing(&state.table, *policy);
        }
        PipelineStep::Normalize { method } => {
            state.table = normalize(&state.table, *method);
        }
        PipelineStep::Pca { n_components } => {
            state.pca = Some(perform_pca(&state.table, *n_components)?);
        }
        PipelineStep::Markers {
            p_threshold,
            fc_threshold,
        } => {
            let params = MarkerParams::new(*p_threshold, *fc_threshold)?;
            state.markers = Some(detect_markers(&state.table, &params)?);
        }
    }
    Ok(state)
}

/// Resolve missing values, then normalize.
pub fn run_preprocessing(
    table: &Table,
    policy: MissingPolicy,
    method: NormalizationMethod,
) -> Table {
    normalize(&resolve_missing(table, policy), method)
}

/// Normalize each layer with its conventional method, merge by position and run PCA.
pub fn integrate_layers(layers: &[(OmicsLayer, Table)], n_components: usize) -> Result<PcaResult> {
    let normalized = normalize_layers(layers);
    perform_pca(&merge_positional(&normalized)?, n_components)
}

/// Like [`integrate_layers`], aligning rows on a shared sample key instead of position.
pub fn integrate_layers_on_key(
    layers: &[(OmicsLayer, Table)],
    key: &str,
    n_components: usize,
) -> Result<PcaResult> {
    let normalized = normalize_layers(layers);
    perform_pca(&merge_on_key(&normalized, key)?, n_components)
}

fn normalize_layers(layers: &[(OmicsLayer, Table)]) -> Vec<Table> {
    layers
        .iter()
        .map(|(layer, table)| {
            info!(
                "Normalizing {} layer ({} x {}) with {}",
                layer,
                table.n_rows(),
                table.n_columns(),
                layer.default_method()
            );
            normalize(table, layer.default_method())
        })
        .collect()
}
