//! Scoring port: trait for the opaque pre-trained classifier.
//!
//! The core never inspects model internals; it hands over a feature
//! mapping and receives a predicted label with the probability of that
//! label. Normalizing to a positive-class probability happens on this
//! side of the boundary — see [`ModelPrediction::positive_class_probability`].

use std::time::Duration;

use crate::domain::FeatureMap;

/// Why scoring failed. Never silently defaulted for a finalized
/// report; retry policy, if any, belongs to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("scoring service unavailable: {0}")]
    Unavailable(String),

    #[error("scoring service rejected the input features: {0}")]
    InvalidFeatures(String),

    #[error("scoring service returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("scoring service timed out after {0:?}")]
    Timeout(Duration),
}

/// Raw classifier output.
///
/// `score` is the probability of the *predicted* label, not always of
/// the positive class — the convention of the underlying model runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrediction {
    /// Predicted class: 0 or 1.
    pub predicted_label: u8,
    /// Probability of the predicted class, in [0, 1].
    pub score: f64,
}

impl ModelPrediction {
    /// Normalize to the probability of the positive class.
    ///
    /// The service scores whichever label it predicted, so a label-0
    /// prediction must be inverted: label 1 → p = score, label 0 →
    /// p = 1 − score. Skipping the inversion silently flips the
    /// high/low risk framing.
    ///
    /// # Errors
    /// `MalformedResponse` for a label outside {0, 1} or a score that
    /// is not a finite probability.
    pub fn positive_class_probability(&self) -> Result<f64, ScoringError> {
        if !self.score.is_finite() || !(0.0..=1.0).contains(&self.score) {
            return Err(ScoringError::MalformedResponse(format!(
                "score {} is not a probability",
                self.score
            )));
        }

        match self.predicted_label {
            1 => Ok(self.score),
            0 => Ok(1.0 - self.score),
            other => Err(ScoringError::MalformedResponse(format!(
                "predicted label {other} is not binary"
            ))),
        }
    }
}

/// Trait for the external binary classifier.
///
/// Implementations are versioned and treated as black boxes. `predict`
/// performs no retries and no fallbacks; failures surface as
/// [`ScoringError`].
pub trait ScoringService: Send + Sync {
    /// Score one feature mapping.
    ///
    /// # Errors
    /// Returns [`ScoringError`] if the service is unavailable or the
    /// input cannot be scored.
    fn predict(&self, features: &FeatureMap) -> Result<ModelPrediction, ScoringError>;

    /// Version identifier of the underlying model.
    fn model_version(&self) -> String;
}
