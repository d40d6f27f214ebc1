//! In-memory history store.
//!
//! Wraps a [`HistoryLedger`] in a mutex so concurrent callers get the
//! single-writer append discipline for free. Suits a single session
//! with no persistence requirement, and doubles as the test store.

use std::sync::Mutex;

use crate::domain::{HistoryLedger, PatientReport};
use crate::ports::HistoryStore;

use super::StorageError;

/// Session-local history store backed by a [`HistoryLedger`].
#[derive(Debug, Default)]
pub struct MemoryHistory {
    ledger: Mutex<HistoryLedger>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the underlying ledger (copies the entries).
    ///
    /// # Errors
    /// Returns error if the ledger lock is poisoned.
    pub fn snapshot(&self) -> Result<HistoryLedger, StorageError> {
        Ok(self.ledger.lock()?.clone())
    }
}

impl HistoryStore for MemoryHistory {
    type Error = StorageError;

    fn append(&self, report: &PatientReport) -> Result<(), Self::Error> {
        self.ledger.lock()?.append(report.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<PatientReport>, Self::Error> {
        Ok(self.ledger.lock()?.all().to_vec())
    }

    fn last(&self, n: usize) -> Result<Vec<PatientReport>, Self::Error> {
        Ok(self.ledger.lock()?.last(n).to_vec())
    }

    fn count(&self) -> Result<usize, Self::Error> {
        Ok(self.ledger.lock()?.len())
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        self.ledger.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use crate::domain::test_support::sample_record;
    use crate::domain::{FeatureAttribution, RiskAssessment};

    fn report(probability: f64) -> PatientReport {
        let record = sample_record();
        let assessment = RiskAssessment::from_positive_probability(
            probability,
            probability >= 0.5,
            "logistic-v1".into(),
        );
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let attribution = FeatureAttribution::explain_with_rng(&record, &assessment, &mut rng);
        let at = chrono::Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 0).unwrap();
        PatientReport::assemble_at(record, assessment, attribution, at)
    }

    #[test]
    fn test_append_and_load_roundtrip() {
        let store = MemoryHistory::new();
        assert_eq!(store.count().expect("Should count"), 0);

        let original = report(0.4);
        store.append(&original).expect("Should append");
        store.append(&report(0.9)).expect("Should append");

        let all = store.load_all().expect("Should load");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], original);

        let last = store.last(1).expect("Should load");
        assert_eq!(last.len(), 1);
        assert!((last[0].assessment().positive_class_probability() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clear_all() {
        let store = MemoryHistory::new();
        store.append(&report(0.5)).expect("Should append");
        store.clear_all().expect("Should clear");
        assert_eq!(store.count().expect("Should count"), 0);
    }
}
