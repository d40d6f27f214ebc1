//! Illustrative intervention-impact tables.
//!
//! Everything in this module is demo-grade lookup data for patient
//! counseling displays: fixed medication effect constants and
//! heuristic lifestyle estimates. None of it is clinically validated
//! model output, and none of it alters the scored probability.

use super::assessment::RiskTier;
use super::patient::{ActivityLevel, PatientRecord};

/// Fixed per-medication risk-reduction constants (percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedicationImpact {
    pub medication: &'static str,
    pub risk_reduction_pct: u8,
}

/// Simulated medication effects shown in the counseling view.
pub const MEDICATION_IMPACTS: [MedicationImpact; 5] = [
    MedicationImpact {
        medication: "Statins",
        risk_reduction_pct: 15,
    },
    MedicationImpact {
        medication: "ACE Inhibitors",
        risk_reduction_pct: 10,
    },
    MedicationImpact {
        medication: "Beta Blockers",
        risk_reduction_pct: 8,
    },
    MedicationImpact {
        medication: "Metformin",
        risk_reduction_pct: 12,
    },
    MedicationImpact {
        medication: "Aspirin",
        risk_reduction_pct: 5,
    },
];

/// Heuristic lifestyle-change estimates (percent risk reduction) for a
/// given record. Zero entries mean the change does not apply.
#[must_use]
pub fn lifestyle_impacts(record: &PatientRecord) -> Vec<(&'static str, u8)> {
    vec![
        (
            "Quit Smoking",
            if record.smoking_status.is_smoker() { 20 } else { 0 },
        ),
        (
            "Exercise 150min/week",
            if matches!(record.physical_activity, ActivityLevel::Low) {
                15
            } else {
                5
            },
        ),
        ("Mediterranean Diet", 10),
        ("Weight Loss (10%)", if record.bmi > 25.0 { 12 } else { 0 }),
        ("Stress Management", 8),
        ("Sleep Optimization", 5),
    ]
}

/// Rule-of-thumb insight lines derived from the record and tier for
/// the report's insights section.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskInsights {
    pub top_contributors: [String; 3],
    pub achievable_risk_reduction_pct: u8,
    pub timeline_months: u8,
    pub key_intervention: &'static str,
}

impl RiskInsights {
    /// Derive the insight lines. Deterministic in the record and tier.
    #[must_use]
    pub fn derive(record: &PatientRecord, tier: RiskTier) -> Self {
        let first = if record.age > 60 {
            "Age"
        } else if record.total_cholesterol > 6.0 {
            "Cholesterol"
        } else {
            "Blood Pressure"
        };

        let second = if record.smoking_status.is_smoker() {
            "Smoking"
        } else if matches!(record.physical_activity, ActivityLevel::Low) {
            "Physical Inactivity"
        } else {
            "BMI"
        };

        let third = if record.diabetes_status.is_diabetic() {
            "Diabetes"
        } else if record.fam_chd {
            "Family History"
        } else {
            "Lifestyle"
        };

        let key_intervention = if record.smoking_status.is_smoker() {
            "Smoking cessation"
        } else if matches!(record.physical_activity, ActivityLevel::Low) {
            "Exercise program"
        } else {
            "Dietary modification"
        };

        Self {
            top_contributors: [first.to_string(), second.to_string(), third.to_string()],
            achievable_risk_reduction_pct: if record.smoking_status.is_smoker() {
                20
            } else {
                15
            },
            timeline_months: if tier == RiskTier::High { 3 } else { 6 },
            key_intervention,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::SmokingStatus;
    use crate::domain::test_support::sample_record;

    #[test]
    fn test_lifestyle_impacts_for_non_smoker() {
        let record = sample_record();
        let impacts = lifestyle_impacts(&record);
        assert_eq!(impacts[0], ("Quit Smoking", 0));
        assert_eq!(impacts[1], ("Exercise 150min/week", 5));
        assert_eq!(impacts[3], ("Weight Loss (10%)", 0));
    }

    #[test]
    fn test_lifestyle_impacts_for_high_risk_profile() {
        let mut record = sample_record();
        record.smoking_status = SmokingStatus::HeavySmoker;
        record.physical_activity = ActivityLevel::Low;
        record.bmi = 32.0;

        let impacts = lifestyle_impacts(&record);
        assert_eq!(impacts[0], ("Quit Smoking", 20));
        assert_eq!(impacts[1], ("Exercise 150min/week", 15));
        assert_eq!(impacts[3], ("Weight Loss (10%)", 12));
    }

    #[test]
    fn test_insights_prioritize_smoking() {
        let mut record = sample_record();
        record.smoking_status = SmokingStatus::LightSmoker;

        let insights = RiskInsights::derive(&record, RiskTier::High);
        assert_eq!(insights.top_contributors[1], "Smoking");
        assert_eq!(insights.achievable_risk_reduction_pct, 20);
        assert_eq!(insights.timeline_months, 3);
        assert_eq!(insights.key_intervention, "Smoking cessation");
    }

    #[test]
    fn test_insights_for_baseline_profile() {
        let record = sample_record();
        let insights = RiskInsights::derive(&record, RiskTier::Low);
        // age 51, cholesterol 4.47: blood pressure leads by elimination.
        assert_eq!(insights.top_contributors[0], "Blood Pressure");
        assert_eq!(insights.top_contributors[1], "BMI");
        // fam_chd is set in the sample profile.
        assert_eq!(insights.top_contributors[2], "Family History");
        assert_eq!(insights.timeline_months, 6);
        assert_eq!(insights.key_intervention, "Dietary modification");
    }

    #[test]
    fn test_medication_table_is_fixed() {
        assert_eq!(MEDICATION_IMPACTS.len(), 5);
        assert_eq!(MEDICATION_IMPACTS[0].medication, "Statins");
        assert_eq!(MEDICATION_IMPACTS[0].risk_reduction_pct, 15);
    }
}
