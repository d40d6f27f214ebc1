//! Assessment service: orchestrates the scoring pipeline.
//!
//! The finalized path runs validate → score → explain → assemble →
//! append as one sequential chain. The only call that may block is the
//! external classifier, which is dispatched on a worker thread and
//! bounded by the configured timeout. Scoring failures propagate to the
//! caller — a finalized report is never backed by a default
//! probability. The provisional path exists separately for live-preview
//! estimates and is the only place the neutral fallback appears.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::adapters::StorageError;
use crate::domain::{
    FeatureAttribution, PatientRecord, PatientReport, ProvisionalRisk, RawRecord, RiskAssessment,
    ValidationError,
};
use crate::ports::{HistoryStore, ScoringError, ScoringService};
use crate::CardioPredictError;

/// Explicit service configuration. Passed in by the host; the core
/// reads no ambient state.
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    /// Upper bound on one classifier call.
    pub scoring_timeout: Duration,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            scoring_timeout: Duration::from_secs(10),
        }
    }
}

/// Score a validated record against a classifier, synchronously and
/// with no timeout bound. Normalizes the service's label-relative score
/// to a positive-class probability and derives the tier.
///
/// # Errors
/// Returns [`ScoringError`] from the service or from normalization; no
/// fallback value is ever substituted.
pub fn score<S: ScoringService + ?Sized>(
    record: &PatientRecord,
    service: &S,
) -> Result<RiskAssessment, ScoringError> {
    let prediction = service.predict(&record.to_feature_map())?;
    let probability = prediction.positive_class_probability()?;
    Ok(RiskAssessment::from_positive_probability(
        probability,
        prediction.predicted_label == 1,
        service.model_version(),
    ))
}

/// Service for producing finalized reports and provisional previews.
pub struct AssessmentService<S, H>
where
    S: ScoringService,
    H: HistoryStore,
{
    scoring: Arc<S>,
    history: Arc<H>,
    config: AssessmentConfig,
}

impl<S, H> AssessmentService<S, H>
where
    S: ScoringService + 'static,
    H: HistoryStore,
    H::Error: Into<StorageError>,
{
    /// Create a new assessment service.
    pub fn new(scoring: Arc<S>, history: Arc<H>, config: AssessmentConfig) -> Self {
        Self {
            scoring,
            history,
            config,
        }
    }

    /// Run the full finalized pipeline on a raw input mapping.
    ///
    /// Steps: validate, score (bounded), explain, assemble, append to
    /// history. The appended copy and the returned report are
    /// identical.
    ///
    /// # Errors
    /// Propagates validation, scoring, and storage failures; nothing is
    /// appended unless every step succeeded.
    pub fn assess(&self, raw: &RawRecord) -> Result<PatientReport, CardioPredictError> {
        tracing::debug!("Step 1: Validating input record...");
        let record = PatientRecord::validate(raw)?;

        tracing::debug!("Step 2: Scoring against classifier...");
        let assessment = self.score_bounded(&record)?;

        tracing::debug!("Step 3: Estimating feature attribution...");
        let attribution = FeatureAttribution::explain(&record, &assessment);

        tracing::debug!("Step 4: Assembling report...");
        let report = PatientReport::assemble(record, assessment, attribution);

        tracing::debug!("Step 5: Appending report {} to history...", report.id().short());
        self.history
            .append(&report)
            .map_err(|e| CardioPredictError::Storage(e.into()))?;

        tracing::info!(
            "Assessment complete: risk={} probability={:.1}%",
            report.assessment().risk_tier(),
            report.assessment().positive_class_probability() * 100.0
        );

        Ok(report)
    }

    /// Non-committal live preview of the risk for partially edited
    /// input. A scorer failure degrades to the tagged neutral fallback
    /// instead of erroring; the result is never stored and never
    /// convertible into a finalized assessment.
    ///
    /// # Errors
    /// Only validation failures surface; the caller fixes the input.
    pub fn preview(&self, raw: &RawRecord) -> Result<ProvisionalRisk, ValidationError> {
        let record = PatientRecord::validate(raw)?;

        match self.score_bounded(&record) {
            Ok(assessment) => Ok(ProvisionalRisk::from_model(
                assessment.positive_class_probability(),
            )),
            Err(e) => {
                tracing::debug!("Preview falling back to neutral estimate: {e}");
                Ok(ProvisionalRisk::neutral_fallback())
            }
        }
    }

    /// Recent finalized reports, chronological order preserved.
    ///
    /// # Errors
    /// Returns error if the history store fails.
    pub fn recent_reports(&self, limit: usize) -> Result<Vec<PatientReport>, CardioPredictError> {
        self.history
            .last(limit)
            .map_err(|e| CardioPredictError::Storage(e.into()))
    }

    /// Invoke the classifier on a worker thread, bounded by the
    /// configured timeout. The scorer itself never retries.
    fn score_bounded(&self, record: &PatientRecord) -> Result<RiskAssessment, ScoringError> {
        let (tx, rx) = mpsc::channel();
        let service = Arc::clone(&self.scoring);
        let features = record.to_feature_map();

        thread::spawn(move || {
            let result = service
                .predict(&features)
                .and_then(|prediction| {
                    prediction
                        .positive_class_probability()
                        .map(|p| (p, prediction.predicted_label == 1))
                })
                .map(|(p, label)| (p, label, service.model_version()));
            // Receiver may have timed out and gone away; nothing to do.
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.config.scoring_timeout) {
            Ok(Ok((probability, label, version))) => Ok(
                RiskAssessment::from_positive_probability(probability, label, version),
            ),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ScoringError::Timeout(self.config.scoring_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::linear::{demo_model, LinearScorer};
    use crate::adapters::memory::MemoryHistory;
    use crate::domain::test_support::sample_raw;
    use crate::domain::PreviewSource;
    use crate::ports::ModelPrediction;

    /// Scorer that always fails, for exercising the failure policy.
    struct DownScorer;

    impl ScoringService for DownScorer {
        fn predict(
            &self,
            _features: &crate::domain::FeatureMap,
        ) -> Result<ModelPrediction, ScoringError> {
            Err(ScoringError::Unavailable("connection refused".into()))
        }

        fn model_version(&self) -> String {
            "down".into()
        }
    }

    /// Scorer that sleeps past any reasonable test timeout.
    struct SlowScorer;

    impl ScoringService for SlowScorer {
        fn predict(
            &self,
            _features: &crate::domain::FeatureMap,
        ) -> Result<ModelPrediction, ScoringError> {
            thread::sleep(Duration::from_secs(5));
            Ok(ModelPrediction {
                predicted_label: 1,
                score: 0.9,
            })
        }

        fn model_version(&self) -> String {
            "slow".into()
        }
    }

    fn service_with_demo_model() -> AssessmentService<LinearScorer, MemoryHistory> {
        let scorer = Arc::new(LinearScorer::new(demo_model()).expect("Should build"));
        let history = Arc::new(MemoryHistory::new());
        AssessmentService::new(scorer, history, AssessmentConfig::default())
    }

    #[test]
    fn test_assess_appends_to_history() {
        let scorer = Arc::new(LinearScorer::new(demo_model()).expect("Should build"));
        let history = Arc::new(MemoryHistory::new());
        let service = AssessmentService::new(
            Arc::clone(&scorer),
            Arc::clone(&history),
            AssessmentConfig::default(),
        );

        let report = service.assess(&sample_raw()).expect("Should assess");
        assert_eq!(report.assessment().model_version(), "demo-logistic-v1");
        assert!(!report.attribution().is_empty());

        let stored = history.load_all().expect("Should load");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], report);
    }

    #[test]
    fn test_assess_propagates_validation_error() {
        let service = service_with_demo_model();
        let mut raw = sample_raw();
        raw.remove("age");

        let err = service.assess(&raw).expect_err("Should fail");
        assert!(matches!(err, CardioPredictError::Validation(_)));
    }

    #[test]
    fn test_finalized_assessment_never_defaults_on_failure() {
        let history = Arc::new(MemoryHistory::new());
        let service = AssessmentService::new(
            Arc::new(DownScorer),
            Arc::clone(&history),
            AssessmentConfig::default(),
        );

        let err = service.assess(&sample_raw()).expect_err("Should fail");
        assert!(matches!(
            err,
            CardioPredictError::Scoring(ScoringError::Unavailable(_))
        ));
        // Nothing must have been committed to the ledger.
        assert_eq!(history.count().expect("Should count"), 0);
    }

    #[test]
    fn test_preview_degrades_to_tagged_fallback() {
        let service = AssessmentService::new(
            Arc::new(DownScorer),
            Arc::new(MemoryHistory::new()),
            AssessmentConfig::default(),
        );

        let preview = service.preview(&sample_raw()).expect("Should preview");
        assert_eq!(preview.source, PreviewSource::NeutralFallback);
        assert!((preview.probability - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_preview_uses_model_when_available() {
        let service = service_with_demo_model();
        let preview = service.preview(&sample_raw()).expect("Should preview");
        assert_eq!(preview.source, PreviewSource::Model);
    }

    #[test]
    fn test_scoring_timeout_surfaces() {
        let service = AssessmentService::new(
            Arc::new(SlowScorer),
            Arc::new(MemoryHistory::new()),
            AssessmentConfig {
                scoring_timeout: Duration::from_millis(50),
            },
        );

        let err = service.assess(&sample_raw()).expect_err("Should time out");
        assert!(matches!(
            err,
            CardioPredictError::Scoring(ScoringError::Timeout(_))
        ));
    }

    #[test]
    fn test_free_score_function_normalizes() {
        let scorer = LinearScorer::new(demo_model()).expect("Should build");
        let record = crate::domain::test_support::sample_record();
        let assessment = score(&record, &scorer).expect("Should score");

        let p = assessment.positive_class_probability();
        assert!((0.0..=1.0).contains(&p));
        // Label and probability must agree in direction.
        assert_eq!(assessment.predicted_label(), p >= 0.5);
    }

    #[test]
    fn test_recent_reports() {
        let service = service_with_demo_model();
        service.assess(&sample_raw()).expect("Should assess");
        service.assess(&sample_raw()).expect("Should assess");

        let recent = service.recent_reports(1).expect("Should load");
        assert_eq!(recent.len(), 1);
    }
}
