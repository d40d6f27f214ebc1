//! History port: trait for persisting the assessment ledger.
//!
//! Abstracts the backing store (in-memory or SQLite) from the
//! application logic. Stores are append-only: entries are never edited
//! or individually removed, only the whole ledger can be cleared.

use crate::domain::PatientReport;

/// Trait for append-only report storage.
///
/// Implementations serialize concurrent appends internally; each
/// append is atomic — either the whole report lands or none of it.
pub trait HistoryStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append a report to the ledger.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn append(&self, report: &PatientReport) -> Result<(), Self::Error>;

    /// Load every report in insertion (chronological) order.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn load_all(&self) -> Result<Vec<PatientReport>, Self::Error>;

    /// Load the most recent `n` reports, chronological order preserved.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn last(&self, n: usize) -> Result<Vec<PatientReport>, Self::Error>;

    /// Total number of stored reports.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn count(&self) -> Result<usize, Self::Error>;

    /// Drop every stored report (whole-ledger clear).
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    fn clear_all(&self) -> Result<(), Self::Error>;
}
