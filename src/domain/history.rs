//! Append-only assessment history.
//!
//! The ledger keeps reports in insertion order, which is also
//! chronological order for a single session. The only mutations are
//! `append` and a whole-ledger `clear`; individual entries are never
//! edited or removed, so positional references stay valid for the life
//! of the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::PatientReport;

/// Comparison and timeline query failures. Caller-usage errors, never
/// fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("comparison requires at least {required} entries, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("history index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Normalized radar axes for one compared report, on the dashboard's
/// fixed denominators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonAxes {
    pub age: f64,
    pub bmi: f64,
    pub systolic_bp: f64,
    pub total_cholesterol: f64,
    pub risk: f64,
}

impl ComparisonAxes {
    fn derive(report: &PatientReport) -> Self {
        let record = report.record();
        Self {
            age: f64::from(record.age) / 80.0,
            bmi: record.bmi / 40.0,
            systolic_bp: f64::from(record.mean_sbp) / 180.0,
            total_cholesterol: record.total_cholesterol / 8.0,
            risk: report.assessment().positive_class_probability(),
        }
    }
}

/// Side-by-side view over two or more ledger entries. Holds unmodified
/// copies of the compared reports plus their normalized axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    reports: Vec<PatientReport>,
    axes: Vec<ComparisonAxes>,
}

impl ComparisonView {
    /// Build a comparison from a report slice and an index subset.
    ///
    /// # Errors
    /// `IndexOutOfRange` for an unknown position, `InsufficientData`
    /// when fewer than two entries are selected.
    pub fn select(
        reports: &[PatientReport],
        indices: &[usize],
    ) -> Result<Self, HistoryError> {
        let mut selected = Vec::with_capacity(indices.len());
        for &index in indices {
            let report = reports.get(index).ok_or(HistoryError::IndexOutOfRange {
                index,
                len: reports.len(),
            })?;
            selected.push(report.clone());
        }

        if selected.len() < 2 {
            return Err(HistoryError::InsufficientData {
                required: 2,
                actual: selected.len(),
            });
        }

        let axes = selected.iter().map(ComparisonAxes::derive).collect();
        Ok(Self {
            reports: selected,
            axes,
        })
    }

    #[must_use]
    pub fn reports(&self) -> &[PatientReport] {
        &self.reports
    }

    #[must_use]
    pub fn axes(&self) -> &[ComparisonAxes] {
        &self.axes
    }
}

/// One entry of the history JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExportEntry {
    pub timestamp: String,
    pub risk_score: f64,
    pub risk_level: String,
    pub inputs: std::collections::BTreeMap<String, Value>,
}

impl HistoryExportEntry {
    fn from_report(report: &PatientReport) -> Self {
        Self {
            timestamp: report.generated_at().to_rfc3339(),
            risk_score: report.assessment().positive_class_probability(),
            risk_level: report.assessment().risk_tier().label().to_string(),
            inputs: report.record().to_raw(),
        }
    }
}

/// Serialize a report sequence into the history export format.
///
/// # Errors
/// Returns a serialization error if JSON encoding fails.
pub fn export_history_json(reports: &[PatientReport]) -> Result<String, serde_json::Error> {
    let entries: Vec<HistoryExportEntry> =
        reports.iter().map(HistoryExportEntry::from_report).collect();
    serde_json::to_string_pretty(&entries)
}

/// In-memory append-only report ledger for one session.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: Vec<PatientReport>,
}

impl HistoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a report. The ledger stores its own copy; this is the
    /// only way the ledger grows.
    pub fn append(&mut self, report: PatientReport) {
        self.entries.push(report);
    }

    /// All entries in insertion (chronological) order.
    #[must_use]
    pub fn all(&self) -> &[PatientReport] {
        &self.entries
    }

    /// The most recent `n` entries, chronological order preserved.
    #[must_use]
    pub fn last(&self, n: usize) -> &[PatientReport] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. The only other mutation besides `append`.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// (timestamp, risk) pairs for the timeline chart.
    #[must_use]
    pub fn timeline(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.entries
            .iter()
            .map(|r| {
                (
                    r.generated_at(),
                    r.assessment().positive_class_probability(),
                )
            })
            .collect()
    }

    /// Compare a subset of entries by position.
    ///
    /// # Errors
    /// See [`ComparisonView::select`].
    pub fn compare(&self, indices: &[usize]) -> Result<ComparisonView, HistoryError> {
        ComparisonView::select(&self.entries, indices)
    }

    /// Export the ledger in the history JSON format.
    ///
    /// # Errors
    /// Returns a serialization error if JSON encoding fails.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        export_history_json(&self.entries)
    }
}
