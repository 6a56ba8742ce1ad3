//! Pathway enrichment of differential features.
//!
//! The enrichment query itself goes to an external service behind
//! [`EnrichmentService`]; this module selects the query features and shapes
//! the returned terms into a KEGG report.

use crate::data::{coerce_numeric, format_float, Table, GROUP_COLUMN, SAMPLE_ID_COLUMN};
use crate::error::{OmicsError, Result};
use crate::markers::partition_two_groups;
use crate::missing::{drop_incomplete_rows, mean_observed};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Annotation source kept in the pathway report.
pub const KEGG_SOURCE: &str = "KEGG";

/// Number of pathways kept in the report.
pub const DEFAULT_TOP_PATHWAYS: usize = 15;

/// Minimum absolute mean difference for a feature to enter the query.
pub const DEFAULT_MIN_ABS_DIFF: f64 = 1.0;

/// Organisms supported by the enrichment service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organism {
    #[serde(rename = "hsapiens")]
    HomoSapiens,
    #[serde(rename = "mmusculus")]
    MusMusculus,
    #[serde(rename = "drerio")]
    DanioRerio,
}

impl Organism {
    /// Identifier understood by the enrichment service.
    pub fn id(&self) -> &'static str {
        match self {
            Self::HomoSapiens => "hsapiens",
            Self::MusMusculus => "mmusculus",
            Self::DanioRerio => "drerio",
        }
    }

    /// KEGG organism code.
    pub fn kegg_code(&self) -> &'static str {
        match self {
            Self::HomoSapiens => "hsa",
            Self::MusMusculus => "mmu",
            Self::DanioRerio => "dre",
        }
    }
}

impl std::str::FromStr for Organism {
    type Err = OmicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hsapiens" | "hsa" | "human" => Ok(Self::HomoSapiens),
            "mmusculus" | "mmu" | "mouse" => Ok(Self::MusMusculus),
            "drerio" | "dre" | "zebrafish" => Ok(Self::DanioRerio),
            other => Err(OmicsError::InvalidParameter(format!(
                "Unknown organism '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Organism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// One enrichment term as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentTerm {
    /// Term name, e.g. "Parkinson disease".
    pub name: String,
    /// Annotation source, e.g. "KEGG" or "GO:BP".
    pub source: String,
    /// Source-specific identifier, e.g. "KEGG:05012".
    #[serde(default)]
    pub term_id: Option<String>,
    pub p_value: f64,
    /// Number of genes annotated to the term.
    pub term_size: usize,
    /// Number of query genes annotated to the term.
    pub intersection_size: usize,
}

/// External pathway enrichment provider (e.g. g:Profiler).
pub trait EnrichmentService {
    /// Run an enrichment query for `query` feature identifiers.
    fn profile(&self, organism: Organism, query: &[String]) -> Result<Vec<EnrichmentTerm>>;
}

/// A ranked pathway in the enrichment report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayHit {
    pub name: String,
    pub term_id: Option<String>,
    pub p_value: f64,
    pub term_size: usize,
    pub intersection_size: usize,
    /// Percentage of the pathway covered by the query.
    pub completion: f64,
}

impl PathwayHit {
    /// Link to the KEGG pathway page, when the term carries a KEGG identifier.
    pub fn kegg_url(&self, organism: Organism) -> Option<String> {
        let id = self.term_id.as_deref()?;
        let number = id.rsplit(':').next()?;
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(format!(
            "https://www.kegg.jp/pathway/{}{}",
            organism.kegg_code(),
            number
        ))
    }
}

/// Neurodegenerative pathways present among the hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseFlags {
    pub parkinson: bool,
    pub alzheimer: bool,
}

impl DiseaseFlags {
    pub fn any(&self) -> bool {
        self.parkinson || self.alzheimer
    }
}

/// Features whose group means differ by more than `min_abs_diff`.
///
/// Feature columns are coerced to numbers, rows with any missing cell are
/// dropped, and the difference is `mean(second group) - mean(first group)`.
pub fn select_query_features(table: &Table, min_abs_diff: f64) -> Result<Vec<String>> {
    table.column(GROUP_COLUMN)?;
    let (coerced, _) = coerce_numeric(table, &[GROUP_COLUMN, SAMPLE_ID_COLUMN]);
    let complete = drop_incomplete_rows(&coerced);
    let (_, [rows_a, rows_b]) = partition_two_groups(&complete)?;

    let mut selected = Vec::new();
    for (name, column) in complete.iter() {
        if name == GROUP_COLUMN || name == SAMPLE_ID_COLUMN {
            continue;
        }
        let Some(values) = column.as_numeric() else {
            continue;
        };
        let mean_of = |rows: &[usize]| mean_observed(&rows.iter().map(|&i| values[i]).collect::<Vec<_>>());
        let diff = mean_of(&rows_b) - mean_of(&rows_a);
        if diff.abs() > min_abs_diff {
            selected.push(name.to_string());
        }
    }
    debug!(
        "Selected {} query features from {} complete rows",
        selected.len(),
        complete.n_rows()
    );
    Ok(selected)
}

/// Keep terms from `source`, add completion, rank by p-value and truncate to `top`.
pub fn summarize_enrichment(terms: &[EnrichmentTerm], source: &str, top: usize) -> Vec<PathwayHit> {
    let mut hits: Vec<PathwayHit> = terms
        .iter()
        .filter(|t| t.source == source)
        .map(|t| PathwayHit {
            name: t.name.clone(),
            term_id: t.term_id.clone(),
            p_value: t.p_value,
            term_size: t.term_size,
            intersection_size: t.intersection_size,
            completion: if t.term_size > 0 {
                t.intersection_size as f64 / t.term_size as f64 * 100.0
            } else {
                f64::NAN
            },
        })
        .collect();
    hits.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
    hits.truncate(top);
    hits
}

/// Flag Parkinson's and Alzheimer's pathways by name.
pub fn disease_flags(hits: &[PathwayHit]) -> DiseaseFlags {
    hits.iter().fold(DiseaseFlags::default(), |mut flags, hit| {
        let name = hit.name.to_lowercase();
        flags.parkinson |= name.contains("parkinson");
        flags.alzheimer |= name.contains("alzheimer");
        flags
    })
}

/// Select query features, query the service and build the KEGG report.
///
/// An empty service response yields an empty report.
pub fn run_enrichment<S: EnrichmentService + ?Sized>(
    service: &S,
    organism: Organism,
    table: &Table,
) -> Result<Vec<PathwayHit>> {
    let query = select_query_features(table, DEFAULT_MIN_ABS_DIFF)?;
    let terms = service.profile(organism, &query)?;
    if terms.is_empty() {
        warn!("No enriched pathways for {} query features", query.len());
        return Ok(Vec::new());
    }
    let hits = summarize_enrichment(&terms, KEGG_SOURCE, DEFAULT_TOP_PATHWAYS);
    info!(
        "Pathway enrichment ({}): {} terms, {} KEGG pathways reported",
        organism,
        terms.len(),
        hits.len()
    );
    Ok(hits)
}

/// Serialize a pathway report to an in-memory CSV buffer.
pub fn pathways_to_csv(hits: &[PathwayHit]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "p_value", "term_size", "intersection_size", "completion"])?;
    for hit in hits {
        writer.write_record([
            hit.name.clone(),
            format_float(hit.p_value),
            hit.term_size.to_string(),
            hit.intersection_size.to_string(),
            format_float(hit.completion),
        ])?;
    }
    writer.into_inner().map_err(|e| OmicsError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    struct RecordingService {
        terms: Vec<EnrichmentTerm>,
        queries: RefCell<Vec<Vec<String>>>,
    }

    impl EnrichmentService for RecordingService {
        fn profile(&self, _organism: Organism, query: &[String]) -> Result<Vec<EnrichmentTerm>> {
            self.queries.borrow_mut().push(query.to_vec());
            Ok(self.terms.clone())
        }
    }

    fn term(name: &str, source: &str, p_value: f64, term_size: usize, hits: usize) -> EnrichmentTerm {
        EnrichmentTerm {
            name: name.to_string(),
            source: source.to_string(),
            term_id: Some(format!("{}:{:05}", source, term_size)),
            p_value,
            term_size,
            intersection_size: hits,
        }
    }

    fn create_test_table() -> Table {
        Table::new(
            vec!["SampleID".into(), "Group".into(), "SNCA".into(), "APP".into(), "GAPDH".into()],
            vec![
                Column::Categorical(["S1", "S2", "S3", "S4", "S5"].iter().map(|s| Some(s.to_string())).collect()),
                Column::Categorical(["PD", "PD", "CTRL", "CTRL", "CTRL"].iter().map(|s| Some(s.to_string())).collect()),
                Column::Numeric(vec![1.0, 1.0, 5.0, 5.0, f64::NAN]),
                Column::Numeric(vec![3.0, 3.0, 2.5, 2.5, 100.0]),
                Column::Numeric(vec![2.0, 2.0, 1.5, 1.5, 2.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_select_query_features() {
        // S5 is dropped for its missing SNCA value before the means are taken.
        let selected = select_query_features(&create_test_table(), 1.0).unwrap();
        assert_eq!(selected, vec!["SNCA"]);
    }

    #[test]
    fn test_select_requires_two_groups() {
        let table = create_test_table().select_rows(&[0, 1]);
        assert!(matches!(
            select_query_features(&table, 1.0),
            Err(OmicsError::GroupCount { found: 1 })
        ));
    }

    #[test]
    fn test_summarize_enrichment() {
        let mut terms: Vec<EnrichmentTerm> = (0..20)
            .map(|i| term(&format!("pathway {}", i), KEGG_SOURCE, 0.05 - i as f64 * 0.001, 100, 10 + i))
            .collect();
        terms.push(term("GO term", "GO:BP", 1e-10, 10, 5));

        let hits = summarize_enrichment(&terms, KEGG_SOURCE, 15);
        assert_eq!(hits.len(), 15);
        assert!(hits.iter().all(|h| h.name != "GO term"));
        assert!(hits.windows(2).all(|w| w[0].p_value <= w[1].p_value));
        assert_eq!(hits[0].name, "pathway 19");
        assert_relative_eq!(hits[0].completion, 29.0, epsilon = 1e-9);
    }

    #[test]
    fn test_disease_flags() {
        let terms = vec![
            term("Parkinson disease", KEGG_SOURCE, 0.01, 200, 12),
            term("Oxidative phosphorylation", KEGG_SOURCE, 0.02, 100, 8),
        ];
        let flags = disease_flags(&summarize_enrichment(&terms, KEGG_SOURCE, 15));
        assert!(flags.parkinson);
        assert!(!flags.alzheimer);
        assert!(flags.any());
    }

    #[test]
    fn test_run_enrichment() {
        let service = RecordingService {
            terms: vec![
                term("Alzheimer disease", KEGG_SOURCE, 0.001, 300, 30),
                term("synapse", "GO:CC", 0.0001, 50, 5),
            ],
            queries: RefCell::new(Vec::new()),
        };
        let hits = run_enrichment(&service, Organism::HomoSapiens, &create_test_table()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(service.queries.borrow()[0], vec!["SNCA".to_string()]);
        assert!(disease_flags(&hits).alzheimer);
    }

    #[test]
    fn test_empty_response() {
        let service = RecordingService {
            terms: Vec::new(),
            queries: RefCell::new(Vec::new()),
        };
        let hits = run_enrichment(&service, Organism::MusMusculus, &create_test_table()).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_kegg_url_and_csv() {
        let hit = summarize_enrichment(&[term("Parkinson disease", KEGG_SOURCE, 0.01, 5012, 12)], KEGG_SOURCE, 1)
            .remove(0);
        assert_eq!(
            hit.kegg_url(Organism::HomoSapiens).unwrap(),
            "https://www.kegg.jp/pathway/hsa05012"
        );

        let csv = String::from_utf8(pathways_to_csv(&[hit]).unwrap()).unwrap();
        assert!(csv.starts_with("name,p_value,term_size,intersection_size,completion\n"));
        assert!(csv.contains("Parkinson disease,0.01,5012,12,"));
    }

    #[test]
    fn test_organism_ids() {
        assert_eq!("mouse".parse::<Organism>().unwrap(), Organism::MusMusculus);
        assert_eq!(Organism::DanioRerio.to_string(), "drerio");
        assert!("yeast".parse::<Organism>().is_err());
    }
}
