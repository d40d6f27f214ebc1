//! Domain layer: core business types and logic.
//!
//! Pure Rust types with no I/O. Validation, tier derivation, report
//! assembly, and the history ledger all live here; anything that talks
//! to the outside world goes through `ports` and `adapters`.

mod assessment;
mod attribution;
mod history;
pub mod interventions;
mod patient;
mod report;
mod validate;

pub use assessment::{PreviewSource, ProvisionalRisk, RiskAssessment, RiskTier};
pub use attribution::{FeatureAttribution, FeatureImpact, ImpactBasis};
pub use history::{
    export_history_json, ComparisonAxes, ComparisonView, HistoryError, HistoryExportEntry,
    HistoryLedger,
};
pub use patient::{
    ActivityLevel, DiabetesStatus, EthnicGroup, FeatureMap, PatientRecord, Sex, SmokingStatus,
};
pub use report::{
    estimated_gfr, follow_up_schedule, hba1c_percent, BmiCategory, BpStage, ClinicalFindings,
    FollowUp, HdlStatus, HeartRateStatus, LdlStatus, LipidStatus, PatientReport, ReportId,
};
pub use validate::{RawRecord, ValidationError};
