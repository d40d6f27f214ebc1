//! # CardioPredict
//!
//! Risk-scoring and report-generation core for a clinical angina-risk
//! dashboard.
//!
//! This crate provides:
//! - Schema validation of raw patient input into immutable records
//! - Classifier scoring with label-to-positive-class normalization and
//!   fixed risk tiers
//! - Approximate, clearly tagged per-feature impact explanations
//! - Deterministic report assembly with content-derived identity and a
//!   fixed-section plain-text export
//! - An append-only assessment history with timeline, comparison, and
//!   JSON export
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: core business types (records, assessments, reports)
//! - `ports`: trait definitions for external operations
//! - `adapters`: concrete implementations (linear scorer, SQLite,
//!   in-memory history)
//! - `application`: use cases orchestrating domain and ports
//!
//! The UI shell, i18n, theming, and the trained classifier itself are
//! external collaborators; the classifier is consumed through the
//! [`ports::ScoringService`] boundary and never inspected.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use application::{AssessmentConfig, AssessmentService, HistoryService};
pub use domain::{
    HistoryLedger, PatientRecord, PatientReport, ProvisionalRisk, RiskAssessment, RiskTier,
};

/// Result type for CardioPredict operations.
pub type Result<T> = std::result::Result<T, CardioPredictError>;

/// Main error type for CardioPredict.
///
/// The three user-facing failure classes stay distinct: bad input
/// (correct it), scoring unavailable (retry or report unavailability),
/// and comparison misuse (need at least two entries). The core returns
/// them to the immediate caller; it never logs them away, never
/// prompts, and never retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum CardioPredictError {
    #[error("invalid patient record: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("risk scoring failed: {0}")]
    Scoring(#[from] ports::ScoringError),

    #[error("history query failed: {0}")]
    History(#[from] domain::HistoryError),

    #[error("storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
