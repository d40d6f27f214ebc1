//! History service: timeline, comparison, and export queries over a
//! history store.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::adapters::StorageError;
use crate::domain::{export_history_json, ComparisonView, PatientReport};
use crate::ports::HistoryStore;
use crate::CardioPredictError;

/// Read-side service over the assessment ledger.
pub struct HistoryService<H>
where
    H: HistoryStore,
{
    store: Arc<H>,
}

impl<H> HistoryService<H>
where
    H: HistoryStore,
    H::Error: Into<StorageError>,
{
    /// Create a new history service.
    pub fn new(store: Arc<H>) -> Self {
        Self { store }
    }

    /// All stored reports in chronological order.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub fn all(&self) -> Result<Vec<PatientReport>, CardioPredictError> {
        self.store
            .load_all()
            .map_err(|e| CardioPredictError::Storage(e.into()))
    }

    /// The most recent `n` reports, chronological order preserved.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub fn recent(&self, n: usize) -> Result<Vec<PatientReport>, CardioPredictError> {
        self.store
            .last(n)
            .map_err(|e| CardioPredictError::Storage(e.into()))
    }

    /// (timestamp, risk probability) pairs for the timeline chart.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub fn timeline(&self) -> Result<Vec<(DateTime<Utc>, f64)>, CardioPredictError> {
        Ok(self
            .all()?
            .iter()
            .map(|r| {
                (
                    r.generated_at(),
                    r.assessment().positive_class_probability(),
                )
            })
            .collect())
    }

    /// Compare stored reports by ledger position.
    ///
    /// # Errors
    /// `History` errors for bad indices or fewer than two selections;
    /// `Storage` errors if loading fails.
    pub fn compare(&self, indices: &[usize]) -> Result<ComparisonView, CardioPredictError> {
        let reports = self.all()?;
        ComparisonView::select(&reports, indices).map_err(CardioPredictError::History)
    }

    /// Export the full ledger in the history JSON format.
    ///
    /// # Errors
    /// `Storage` errors if loading fails, `Serialization` if encoding
    /// fails.
    pub fn export_json(&self) -> Result<String, CardioPredictError> {
        let reports = self.all()?;
        Ok(export_history_json(&reports)?)
    }

    /// Number of stored reports.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub fn count(&self) -> Result<usize, CardioPredictError> {
        self.store
            .count()
            .map_err(|e| CardioPredictError::Storage(e.into()))
    }

    /// Whole-ledger clear; the only mutation this service exposes.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub fn clear(&self) -> Result<(), CardioPredictError> {
        tracing::warn!("Clearing assessment history");
        self.store
            .clear_all()
            .map_err(|e| CardioPredictError::Storage(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::linear::{demo_model, LinearScorer};
    use crate::adapters::memory::MemoryHistory;
    use crate::application::{AssessmentConfig, AssessmentService};
    use crate::domain::test_support::sample_raw;
    use crate::domain::HistoryError;

    fn populated_service(n: usize) -> HistoryService<MemoryHistory> {
        let history = Arc::new(MemoryHistory::new());
        let assessor = AssessmentService::new(
            Arc::new(LinearScorer::new(demo_model()).expect("Should build")),
            Arc::clone(&history),
            AssessmentConfig::default(),
        );
        for _ in 0..n {
            assessor.assess(&sample_raw()).expect("Should assess");
        }
        HistoryService::new(history)
    }

    #[test]
    fn test_timeline_matches_count() {
        let service = populated_service(3);
        assert_eq!(service.count().expect("Should count"), 3);
        assert_eq!(service.timeline().expect("Should load").len(), 3);
    }

    #[test]
    fn test_compare_guard() {
        let service = populated_service(1);
        let err = service.compare(&[0]).expect_err("Should fail");
        assert!(matches!(
            err,
            CardioPredictError::History(HistoryError::InsufficientData { .. })
        ));

        let service = populated_service(2);
        let view = service.compare(&[0, 1]).expect("Should compare");
        assert_eq!(view.reports().len(), 2);
    }

    #[test]
    fn test_export_json_parses() {
        let service = populated_service(2);
        let json = service.export_json().expect("Should export");
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&json).expect("Should parse");
        assert_eq!(entries.len(), 2);
        assert!(entries[0]["risk_level"].is_string());
    }

    #[test]
    fn test_clear() {
        let service = populated_service(2);
        service.clear().expect("Should clear");
        assert_eq!(service.count().expect("Should count"), 0);
    }
}
