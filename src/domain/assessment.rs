//! Risk assessment types.
//!
//! A [`RiskAssessment`] is the finalized output of the risk scorer: a
//! positive-class probability, the predicted label, and the tier
//! derived from the fixed thresholds. A [`ProvisionalRisk`] is the
//! separate, clearly tagged type for live-preview estimates — the two
//! are deliberately not interchangeable, so a finalized report can
//! never mask a scoring failure behind a neutral default.

use serde::{Deserialize, Serialize};

/// Discrete risk bucket derived from the scored probability.
///
/// Ordering is clinical severity: `Low < Moderate < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    /// Probability below 0.30.
    Low,
    /// Probability in [0.30, 0.70).
    Moderate,
    /// Probability of 0.70 or above.
    High,
}

impl RiskTier {
    /// Map a positive-class probability onto its tier.
    #[must_use]
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.7 {
            Self::High
        } else if p >= 0.3 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Uppercase label used in reports and exports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
        }
    }

    /// One-line guidance shown next to the tier.
    #[must_use]
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Low => "Continue regular health monitoring",
            Self::Moderate => "Consider further evaluation and monitoring",
            Self::High => "Immediate medical consultation recommended",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Finalized output of the risk scorer.
///
/// Fields are private so that the tier can never drift from the
/// probability; construction happens only inside the scoring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    positive_class_probability: f64,
    predicted_label: bool,
    risk_tier: RiskTier,
    model_version: String,
}

impl RiskAssessment {
    /// Build an assessment from an already-normalized positive-class
    /// probability. The tier is derived here and nowhere else.
    pub(crate) fn from_positive_probability(
        probability: f64,
        predicted_label: bool,
        model_version: String,
    ) -> Self {
        Self {
            positive_class_probability: probability,
            predicted_label,
            risk_tier: RiskTier::from_probability(probability),
            model_version,
        }
    }

    /// Probability that the positive (angina) class applies.
    #[must_use]
    pub fn positive_class_probability(&self) -> f64 {
        self.positive_class_probability
    }

    /// Whether the classifier predicted the positive class.
    #[must_use]
    pub fn predicted_label(&self) -> bool {
        self.predicted_label
    }

    #[must_use]
    pub fn risk_tier(&self) -> RiskTier {
        self.risk_tier
    }

    /// Version string reported by the scoring service.
    #[must_use]
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Model confidence in its predicted label: `max(p, 1 - p)`.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.positive_class_probability
            .max(1.0 - self.positive_class_probability)
    }
}

/// Where a provisional estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewSource {
    /// The scoring service answered.
    Model,
    /// The scoring service failed; the estimate is a neutral 0.5
    /// placeholder and must never be committed to a report.
    NeutralFallback,
}

/// Non-committal live-preview estimate.
///
/// Distinct from [`RiskAssessment`] on purpose: a preview may degrade
/// to a neutral fallback when the scorer is unavailable, a finalized
/// assessment may not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProvisionalRisk {
    pub probability: f64,
    pub risk_tier: RiskTier,
    pub source: PreviewSource,
}

impl ProvisionalRisk {
    /// Preview backed by a real model response.
    #[must_use]
    pub fn from_model(probability: f64) -> Self {
        Self {
            probability,
            risk_tier: RiskTier::from_probability(probability),
            source: PreviewSource::Model,
        }
    }

    /// Neutral placeholder used when the scorer cannot be reached
    /// during live recalculation.
    #[must_use]
    pub fn neutral_fallback() -> Self {
        Self {
            probability: 0.5,
            risk_tier: RiskTier::from_probability(0.5),
            source: PreviewSource::NeutralFallback,
        }
    }
}
