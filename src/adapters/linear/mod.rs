//! Linear adapter: logistic-regression implementation of `ScoringService`.
//!
//! A demo and test stand-in for the production classifier boundary.
//! Model parameters come from an exported JSON file (standardization
//! constants plus coefficients); the adapter reproduces the runtime's
//! convention of reporting the probability of the *predicted* label,
//! so the scorer's normalization path is exercised end to end.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::FeatureMap;
use crate::ports::{ModelPrediction, ScoringError, ScoringService};

/// Model parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLinearModel {
    pub version: String,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
}

impl ExportedLinearModel {
    /// Structural sanity checks before the model is trusted.
    fn check(&self) -> Result<(), ScoringError> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(ScoringError::MalformedResponse(
                "model declares no features".into(),
            ));
        }
        if self.coefficients.len() != n
            || self.scaler_mean.len() != n
            || self.scaler_scale.len() != n
        {
            return Err(ScoringError::MalformedResponse(
                "model parameter lengths do not match feature_names".into(),
            ));
        }
        if !self.intercept.is_finite()
            || self.coefficients.iter().any(|c| !c.is_finite())
            || self.scaler_mean.iter().any(|m| !m.is_finite())
            || self
                .scaler_scale
                .iter()
                .any(|s| !s.is_finite() || *s == 0.0)
        {
            return Err(ScoringError::MalformedResponse(
                "model contains non-finite or zero-scale parameters".into(),
            ));
        }
        Ok(())
    }
}

/// Logistic-regression scorer over the patient feature map.
pub struct LinearScorer {
    model: ExportedLinearModel,
}

impl LinearScorer {
    /// Build a scorer from in-memory model parameters.
    ///
    /// # Errors
    /// Returns error if the parameters fail the sanity checks.
    pub fn new(model: ExportedLinearModel) -> Result<Self, ScoringError> {
        model.check()?;
        tracing::info!(
            "Loaded linear model {} ({} features)",
            model.version,
            model.feature_names.len()
        );
        Ok(Self { model })
    }

    /// Load a scorer from an exported model JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or fails the
    /// sanity checks.
    pub fn from_file(path: &Path) -> Result<Self, ScoringError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::Unavailable(format!("cannot read model file: {e}")))?;
        let model: ExportedLinearModel = serde_json::from_str(&content)
            .map_err(|e| ScoringError::MalformedResponse(format!("invalid model JSON: {e}")))?;
        Self::new(model)
    }

    fn decision_value(&self, features: &FeatureMap) -> Result<f64, ScoringError> {
        let mut z = self.model.intercept;
        for (i, name) in self.model.feature_names.iter().enumerate() {
            let x = features.get(name).ok_or_else(|| {
                ScoringError::InvalidFeatures(format!("required feature `{name}` missing"))
            })?;
            let standardized = (x - self.model.scaler_mean[i]) / self.model.scaler_scale[i];
            z += self.model.coefficients[i] * standardized;
        }
        Ok(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ScoringService for LinearScorer {
    fn predict(&self, features: &FeatureMap) -> Result<ModelPrediction, ScoringError> {
        let z = self.decision_value(features)?;
        let positive = sigmoid(z);

        // Runtime convention: the reported score belongs to whichever
        // label won, not to the positive class.
        let (predicted_label, score) = if positive >= 0.5 {
            (1, positive)
        } else {
            (0, 1.0 - positive)
        };

        Ok(ModelPrediction {
            predicted_label,
            score,
        })
    }

    fn model_version(&self) -> String {
        self.model.version.clone()
    }
}

/// A small, hand-weighted model over a subset of the record's features.
/// Useful for demos and integration tests; not a trained artifact.
#[must_use]
pub fn demo_model() -> ExportedLinearModel {
    ExportedLinearModel {
        version: "demo-logistic-v1".into(),
        feature_names: vec![
            "age".into(),
            "bmi".into(),
            "mean_sbp".into(),
            "total_cholesterol".into(),
            "chest_pain".into(),
            "smoking_status".into(),
        ],
        coefficients: vec![0.9, 0.5, 0.8, 0.6, 1.2, -0.4],
        intercept: -0.5,
        scaler_mean: vec![50.0, 25.0, 120.0, 5.0, 0.0, 4.0],
        scaler_scale: vec![30.0, 10.0, 40.0, 3.0, 1.0, 4.0],
    }
}
