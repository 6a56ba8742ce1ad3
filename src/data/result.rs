//! Result types for differential marker detection.

use super::coerce::CoercionReport;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Regulation call for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regulation {
    /// Significantly higher in the first group.
    Up,
    /// Significantly lower in the first group.
    Down,
    /// Not significant.
    #[serde(rename = "NS")]
    NotSignificant,
}

impl Regulation {
    /// Classify from a p-value and log2 fold change.
    ///
    /// NaN in either input never passes a threshold and yields `NotSignificant`.
    pub fn classify(p_value: f64, log2_fc: f64, p_threshold: f64, fc_threshold: f64) -> Self {
        let log2_threshold = fc_threshold.log2();
        if p_value < p_threshold && log2_fc > log2_threshold {
            Self::Up
        } else if p_value < p_threshold && log2_fc < -log2_threshold {
            Self::Down
        } else {
            Self::NotSignificant
        }
    }

    /// Label used in tables and plots.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::NotSignificant => "NS",
        }
    }

    /// Check if this is an `Up` or `Down` call.
    pub fn is_significant(&self) -> bool {
        !matches!(self, Self::NotSignificant)
    }
}

impl std::fmt::Display for Regulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker statistics for a single feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerRecord {
    /// Feature (column) name.
    pub feature: String,
    /// Two-sided Welch's t-test p-value.
    pub p_value: f64,
    /// (mean A + ε) / (mean B + ε).
    pub fold_change: f64,
    /// log2 of the fold change.
    pub log2_fc: f64,
    /// -log10 of the p-value.
    pub neg_log10_p: f64,
    /// Regulation call.
    pub regulation: Regulation,
}

/// One point of a volcano plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolcanoPoint {
    pub feature: String,
    pub x: f64,
    pub y: f64,
    pub regulation: Regulation,
}

/// Which records to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerRows {
    /// Only `Up`/`Down` records, as displayed in the marker table.
    Table,
    /// Every record, as drawn in the volcano plot.
    All,
}

/// Full marker detection output.
///
/// `records` holds one entry per feature and feeds the volcano plot; the
/// marker table shown to users is the `Up`/`Down` subset from [`table_rows`].
///
/// [`table_rows`]: MarkerSet::table_rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSet {
    /// Label of the first group (numerator of the fold change).
    pub group_a: String,
    /// Label of the second group (denominator).
    pub group_b: String,
    pub p_threshold: f64,
    pub fc_threshold: f64,
    /// One record per feature, in feature column order.
    pub records: Vec<MarkerRecord>,
    /// Values that could not be read as numbers.
    pub coercion: CoercionReport,
}

impl MarkerSet {
    /// Number of features tested.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records shown in the marker table (non-NS).
    pub fn table_rows(&self) -> Vec<&MarkerRecord> {
        self.records
            .iter()
            .filter(|r| r.regulation.is_significant())
            .collect()
    }

    /// Every record as a volcano plot point.
    pub fn volcano_points(&self) -> Vec<VolcanoPoint> {
        self.records
            .iter()
            .map(|r| VolcanoPoint {
                feature: r.feature.clone(),
                x: r.log2_fc,
                y: r.neg_log10_p,
                regulation: r.regulation,
            })
            .collect()
    }

    /// Get the record for a feature.
    pub fn get(&self, feature: &str) -> Option<&MarkerRecord> {
        self.records.iter().find(|r| r.feature == feature)
    }

    /// Number of `Up` calls.
    pub fn n_up(&self) -> usize {
        self.count(Regulation::Up)
    }

    /// Number of `Down` calls.
    pub fn n_down(&self) -> usize {
        self.count(Regulation::Down)
    }

    fn count(&self, regulation: Regulation) -> usize {
        self.records
            .iter()
            .filter(|r| r.regulation == regulation)
            .count()
    }

    /// Records sorted by p-value (ascending, NaN last).
    pub fn sorted_by_pvalue(&self) -> Vec<&MarkerRecord> {
        let mut sorted: Vec<_> = self.records.iter().collect();
        sorted.sort_by(|a, b| match (a.p_value.is_nan(), b.p_value.is_nan()) {
            (false, false) => a.p_value.total_cmp(&b.p_value),
            (nan_a, nan_b) => nan_a.cmp(&nan_b),
        });
        sorted
    }

    /// Summary counts.
    pub fn summary(&self) -> MarkerSummary {
        MarkerSummary {
            total: self.len(),
            up: self.n_up(),
            down: self.n_down(),
            not_significant: self.count(Regulation::NotSignificant),
            untestable: self.records.iter().filter(|r| r.p_value.is_nan()).count(),
        }
    }

    /// Serialize records to an in-memory CSV buffer.
    pub fn to_csv(&self, rows: MarkerRows) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "Feature",
            "p-value",
            "Fold Change",
            "log2(FC)",
            "-log10(p)",
            "Regulation",
        ])?;

        let records: Vec<&MarkerRecord> = match rows {
            MarkerRows::Table => self.table_rows(),
            MarkerRows::All => self.records.iter().collect(),
        };
        for r in records {
            writer.write_record([
                r.feature.clone(),
                format_float(r.p_value),
                format_float(r.fold_change),
                format_float(r.log2_fc),
                format_float(r.neg_log10_p),
                r.regulation.name().to_string(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| crate::error::OmicsError::Io(e.into_error()))
    }
}

/// Format a value for CSV output; NaN becomes an empty cell.
pub(crate) fn format_float(x: f64) -> String {
    if x.is_nan() {
        String::new()
    } else {
        x.to_string()
    }
}

/// Summary counts for a marker set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    pub not_significant: usize,
    /// Features whose test was degenerate (NaN p-value).
    pub untestable: usize,
}

impl std::fmt::Display for MarkerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Features tested: {}", self.total)?;
        writeln!(f, "  Up:            {}", self.up)?;
        writeln!(f, "  Down:          {}", self.down)?;
        writeln!(f, "  NS:            {}", self.not_significant)?;
        writeln!(f, "  Untestable:    {}", self.untestable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(feature: &str, p_value: f64, log2_fc: f64) -> MarkerRecord {
        MarkerRecord {
            feature: feature.to_string(),
            p_value,
            fold_change: log2_fc.exp2(),
            log2_fc,
            neg_log10_p: -p_value.log10(),
            regulation: Regulation::classify(p_value, log2_fc, 0.05, 2.0),
        }
    }

    fn create_test_set() -> MarkerSet {
        MarkerSet {
            group_a: "AD".into(),
            group_b: "CTRL".into(),
            p_threshold: 0.05,
            fc_threshold: 2.0,
            records: vec![
                record("up", 0.001, 2.0),
                record("down", 0.01, -1.5),
                record("weak", 0.001, 0.5),
                record("noisy", 0.4, 3.0),
                record("flat", f64::NAN, f64::NAN),
            ],
            coercion: CoercionReport::default(),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(Regulation::classify(0.01, 1.5, 0.05, 2.0), Regulation::Up);
        assert_eq!(Regulation::classify(0.01, -1.5, 0.05, 2.0), Regulation::Down);
        // Exactly at the fold-change threshold is not enough.
        assert_eq!(Regulation::classify(0.01, 1.0, 0.05, 2.0), Regulation::NotSignificant);
        assert_eq!(Regulation::classify(0.05, 3.0, 0.05, 2.0), Regulation::NotSignificant);
        assert_eq!(
            Regulation::classify(f64::NAN, 3.0, 0.05, 2.0),
            Regulation::NotSignificant
        );
    }

    #[test]
    fn test_table_rows_vs_plot_points() {
        let set = create_test_set();
        let rows: Vec<&str> = set.table_rows().iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(rows, vec!["up", "down"]);
        assert_eq!(set.volcano_points().len(), 5);
    }

    #[test]
    fn test_summary() {
        let summary = create_test_set().summary();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.up, 1);
        assert_eq!(summary.down, 1);
        assert_eq!(summary.not_significant, 3);
        assert_eq!(summary.untestable, 1);
    }

    #[test]
    fn test_sorted_by_pvalue_nan_last() {
        let set = create_test_set();
        let sorted = set.sorted_by_pvalue();
        assert_eq!(sorted.last().unwrap().feature, "flat");
        assert_eq!(sorted[0].p_value, 0.001);
    }

    #[test]
    fn test_to_csv() {
        let set = create_test_set();
        let table = String::from_utf8(set.to_csv(MarkerRows::Table).unwrap()).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Feature,p-value,Fold Change,log2(FC),-log10(p),Regulation");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("up,"));
        assert!(lines[1].ends_with(",Up"));

        let all = String::from_utf8(set.to_csv(MarkerRows::All).unwrap()).unwrap();
        assert_eq!(all.lines().count(), 6);
        assert!(all.lines().last().unwrap().starts_with("flat,,,,,NS"));
    }
}
