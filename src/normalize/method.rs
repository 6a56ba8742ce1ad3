//! Normalization method selection and omics-layer conventions.

use super::logarithmic::{norm_log10, norm_log2};
use super::scale::{norm_minmax, norm_standard, norm_zscore};
use crate::data::Table;
use crate::error::{OmicsError, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Available normalization transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMethod {
    Log2,
    Log10,
    #[serde(rename = "zscore")]
    ZScore,
    MinMax,
    #[serde(rename = "standard")]
    StandardScore,
}

impl NormalizationMethod {
    pub const ALL: [NormalizationMethod; 5] = [
        Self::Log2,
        Self::Log10,
        Self::ZScore,
        Self::MinMax,
        Self::StandardScore,
    ];

    /// Short name, as accepted by [`str::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Log2 => "log2",
            Self::Log10 => "log10",
            Self::ZScore => "zscore",
            Self::MinMax => "minmax",
            Self::StandardScore => "standard",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Log2 => "Log2 transform (x + 1)",
            Self::Log10 => "Log10 transform (x + 1)",
            Self::ZScore => "Z-score (sample standard deviation)",
            Self::MinMax => "Min-max scaling to [0, 1]",
            Self::StandardScore => "Standard score (population standard deviation)",
        }
    }
}

impl std::str::FromStr for NormalizationMethod {
    type Err = OmicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(|c: char| c == '-' || c == '_', "").as_str() {
            "log2" => Ok(Self::Log2),
            "log10" => Ok(Self::Log10),
            "zscore" => Ok(Self::ZScore),
            "minmax" => Ok(Self::MinMax),
            "standard" | "standardscore" => Ok(Self::StandardScore),
            _ => Err(OmicsError::InvalidParameter(format!(
                "Unknown normalization method '{}' (expected log2, log10, zscore, minmax or standard)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One modality of molecular measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OmicsLayer {
    Transcriptomics,
    Metabolomics,
    Lipidomics,
}

impl OmicsLayer {
    /// Conventional normalization for this layer.
    ///
    /// This is a convention only; any method can be applied to any table.
    pub fn default_method(&self) -> NormalizationMethod {
        match self {
            Self::Transcriptomics => NormalizationMethod::Log2,
            Self::Metabolomics => NormalizationMethod::Log10,
            Self::Lipidomics => NormalizationMethod::ZScore,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Transcriptomics => "transcriptomics",
            Self::Metabolomics => "metabolomics",
            Self::Lipidomics => "lipidomics",
        }
    }
}

impl std::fmt::Display for OmicsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply a normalization method to every numeric column.
///
/// The output has the input's shape; categorical columns pass through.
pub fn normalize(table: &Table, method: NormalizationMethod) -> Table {
    debug!(
        "Normalizing {} numeric columns with {}",
        table.numeric_column_names().len(),
        method
    );
    match method {
        NormalizationMethod::Log2 => norm_log2(table),
        NormalizationMethod::Log10 => norm_log10(table),
        NormalizationMethod::ZScore => norm_zscore(table),
        NormalizationMethod::MinMax => norm_minmax(table),
        NormalizationMethod::StandardScore => norm_standard(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for method in NormalizationMethod::ALL {
            assert_eq!(method.name().parse::<NormalizationMethod>().unwrap(), method);
        }
        assert_eq!(
            "Z-Score".parse::<NormalizationMethod>().unwrap(),
            NormalizationMethod::ZScore
        );
        assert!("quantile".parse::<NormalizationMethod>().is_err());
    }

    #[test]
    fn test_layer_conventions() {
        assert_eq!(OmicsLayer::Transcriptomics.default_method(), NormalizationMethod::Log2);
        assert_eq!(OmicsLayer::Metabolomics.default_method(), NormalizationMethod::Log10);
        assert_eq!(OmicsLayer::Lipidomics.default_method(), NormalizationMethod::ZScore);
    }

    #[test]
    fn test_serde_names() {
        let yaml = serde_yaml::to_string(&NormalizationMethod::StandardScore).unwrap();
        assert_eq!(yaml.trim(), "standard");
        let method: NormalizationMethod = serde_yaml::from_str("minmax").unwrap();
        assert_eq!(method, NormalizationMethod::MinMax);
    }

    #[test]
    fn test_rerun_on_own_output() {
        let table = Table::from_numeric(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 5.0, 9.0], vec![0.0, 2.0, 2.0]],
        )
        .unwrap();
        for method in NormalizationMethod::ALL {
            let once = normalize(&table, method);
            let twice = normalize(&once, method);
            assert_eq!(twice.n_rows(), table.n_rows());
            assert_eq!(twice.column_names(), table.column_names());
        }
    }
}
