//! Approximate per-feature impact estimation.
//!
//! This is an explanatory approximation, not a model gradient or
//! Shapley decomposition. Clinically primary features get a
//! deterministic deviation-from-population-normal score; every other
//! surfaced feature gets a stochastic placeholder and is tagged
//! [`ImpactBasis::Illustrative`] so downstream consumers cannot mistake
//! it for validated model output. Attributions never feed back into the
//! scored probability.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::assessment::RiskAssessment;
use super::patient::PatientRecord;

/// The dashboard's attribution surface: the leading input features in
/// declared form order, plus total cholesterol so every primary
/// baseline is represented.
const ATTRIBUTION_FEATURES: [&str; 11] = [
    "age",
    "sex",
    "ethnic",
    "bmi",
    "smoking_status",
    "physical_activity",
    "chest_pain",
    "mean_sbp",
    "mean_dbp",
    "mean_heart_rate",
    "total_cholesterol",
];

/// Fixed population-normal center and scale per primary feature.
const PRIMARY_BASELINES: [(&str, f64, f64); 4] = [
    ("age", 50.0, 30.0),
    ("bmi", 25.0, 10.0),
    ("mean_sbp", 120.0, 40.0),
    ("total_cholesterol", 5.0, 3.0),
];

/// How a feature's impact figure was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactBasis {
    /// Deterministic deviation from a fixed population baseline.
    PopulationDeviation,
    /// Stochastic placeholder scaled by the scored probability;
    /// demo-grade output only.
    Illustrative,
}

/// Signed contribution estimate for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    pub feature_name: String,
    pub signed_impact: f64,
    pub basis: ImpactBasis,
}

/// Ordered explanation for one assessment, sorted by descending
/// absolute impact (stable on ties, so equal impacts keep form order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    entries: Vec<FeatureImpact>,
}

impl FeatureAttribution {
    /// Explain an assessment using OS entropy for the placeholder
    /// impacts.
    #[must_use]
    pub fn explain(record: &PatientRecord, assessment: &RiskAssessment) -> Self {
        let mut rng = ChaCha20Rng::from_entropy();
        Self::explain_with_rng(record, assessment, &mut rng)
    }

    /// Explain an assessment with an injected random source, for
    /// deterministic tests and reproducible demos.
    #[must_use]
    pub fn explain_with_rng<R: Rng>(
        record: &PatientRecord,
        assessment: &RiskAssessment,
        rng: &mut R,
    ) -> Self {
        let p = assessment.positive_class_probability();

        let mut entries: Vec<FeatureImpact> = ATTRIBUTION_FEATURES
            .iter()
            .map(|&name| match primary_impact(record, name, p) {
                Some(signed_impact) => FeatureImpact {
                    feature_name: name.to_string(),
                    signed_impact,
                    basis: ImpactBasis::PopulationDeviation,
                },
                None => {
                    let noise: f64 = rng.sample(StandardNormal);
                    FeatureImpact {
                        feature_name: name.to_string(),
                        signed_impact: noise * 0.1 * p,
                        basis: ImpactBasis::Illustrative,
                    }
                }
            })
            .collect();

        // Stable sort: ties keep the declared feature order.
        entries.sort_by(|a, b| {
            b.signed_impact
                .abs()
                .partial_cmp(&a.signed_impact.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[FeatureImpact] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Deterministic impact for a primary feature, `None` otherwise.
fn primary_impact(record: &PatientRecord, name: &str, p: f64) -> Option<f64> {
    let observed = match name {
        "age" => f64::from(record.age),
        "bmi" => record.bmi,
        "mean_sbp" => f64::from(record.mean_sbp),
        "total_cholesterol" => record.total_cholesterol,
        _ => return None,
    };

    let (_, center, scale) = PRIMARY_BASELINES
        .iter()
        .find(|(feature, _, _)| *feature == name)?;

    Some((observed - center) / scale * p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::sample_record;
    use crate::domain::RiskAssessment;

    fn assessment(p: f64) -> RiskAssessment {
        RiskAssessment::from_positive_probability(p, p >= 0.5, "test-model".into())
    }

    #[test]
    fn test_primary_feature_formula() {
        let mut record = sample_record();
        record.age = 80;
        record.bmi = 35.0;
        record.mean_sbp = 160;
        record.total_cholesterol = 8.0;

        let assessment = assessment(0.6);
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        let attribution = FeatureAttribution::explain_with_rng(&record, &assessment, &mut rng);

        let impact_of = |name: &str| {
            attribution
                .entries()
                .iter()
                .find(|e| e.feature_name == name)
                .expect("Should be present")
        };

        let age = impact_of("age");
        assert_eq!(age.basis, ImpactBasis::PopulationDeviation);
        assert!((age.signed_impact - (80.0 - 50.0) / 30.0 * 0.6).abs() < 1e-12);

        let sbp = impact_of("mean_sbp");
        assert!((sbp.signed_impact - (160.0 - 120.0) / 40.0 * 0.6).abs() < 1e-12);

        let bmi = impact_of("bmi");
        assert!((bmi.signed_impact - (35.0 - 25.0) / 10.0 * 0.6).abs() < 1e-12);

        let cholesterol = impact_of("total_cholesterol");
        assert_eq!(cholesterol.basis, ImpactBasis::PopulationDeviation);
        assert!((cholesterol.signed_impact - (8.0 - 5.0) / 3.0 * 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_negative_deviation_yields_negative_impact() {
        let mut record = sample_record();
        record.age = 20;
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let attribution =
            FeatureAttribution::explain_with_rng(&record, &assessment(0.4), &mut rng);
        let age = attribution
            .entries()
            .iter()
            .find(|e| e.feature_name == "age")
            .expect("Should be present");
        assert!(age.signed_impact < 0.0);
    }

    #[test]
    fn test_ordered_by_descending_absolute_impact() {
        let record = sample_record();
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let attribution =
            FeatureAttribution::explain_with_rng(&record, &assessment(0.55), &mut rng);

        assert_eq!(attribution.len(), 11);
        for pair in attribution.entries().windows(2) {
            assert!(pair[0].signed_impact.abs() >= pair[1].signed_impact.abs());
        }
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let record = sample_record();
        let a = FeatureAttribution::explain_with_rng(
            &record,
            &assessment(0.55),
            &mut ChaCha20Rng::from_seed([9u8; 32]),
        );
        let b = FeatureAttribution::explain_with_rng(
            &record,
            &assessment(0.55),
            &mut ChaCha20Rng::from_seed([9u8; 32]),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_probability_zeroes_all_impacts() {
        let record = sample_record();
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        let attribution =
            FeatureAttribution::explain_with_rng(&record, &assessment(0.0), &mut rng);
        for entry in attribution.entries() {
            assert!((entry.signed_impact - 0.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_non_primary_features_are_tagged_illustrative() {
        let record = sample_record();
        let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
        let attribution =
            FeatureAttribution::explain_with_rng(&record, &assessment(0.5), &mut rng);

        let deterministic = ["age", "bmi", "mean_sbp"];
        for entry in attribution.entries() {
            if deterministic.contains(&entry.feature_name.as_str()) {
                assert_eq!(entry.basis, ImpactBasis::PopulationDeviation);
            } else {
                assert_eq!(entry.basis, ImpactBasis::Illustrative);
            }
        }
    }
}
