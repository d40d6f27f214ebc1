//! Patient record types for angina risk prediction.
//!
//! A [`PatientRecord`] is the full clinical input surface of the
//! dashboard: demographics, lifestyle, vitals, medical history, and the
//! laboratory panels. Records are immutable once constructed; a
//! correction is a new record, never an in-place edit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Feature mapping handed to the scoring service.
///
/// Booleans encode as 0/1 and enum members by their declared ordinal
/// (see each enum's `encoded`). `BTreeMap` keeps the iteration order
/// stable across runs.
pub type FeatureMap = BTreeMap<String, f64>;

/// Biological sex, as used by the classifier and the eGFR estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const OPTIONS: &'static [&'static str] = &["Female", "Male"];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }

    pub(crate) fn from_label(s: &str) -> Option<Self> {
        match s {
            "Female" => Some(Self::Female),
            "Male" => Some(Self::Male),
            _ => None,
        }
    }

    pub(crate) fn encoded(&self) -> f64 {
        *self as u8 as f64
    }
}

/// Self-reported ethnic group (census categories of the source cohort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EthnicGroup {
    WhiteEuropean,
    BlackAfrican,
    BlackCaribbean,
    Chinese,
    Mixed,
    OtherEthnicGroup,
    SouthAsian,
}

impl EthnicGroup {
    pub const OPTIONS: &'static [&'static str] = &[
        "White European",
        "Black African",
        "Black Caribbean",
        "Chinese",
        "Mixed",
        "Other ethnic group",
        "South Asian",
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::WhiteEuropean => "White European",
            Self::BlackAfrican => "Black African",
            Self::BlackCaribbean => "Black Caribbean",
            Self::Chinese => "Chinese",
            Self::Mixed => "Mixed",
            Self::OtherEthnicGroup => "Other ethnic group",
            Self::SouthAsian => "South Asian",
        }
    }

    pub(crate) fn from_label(s: &str) -> Option<Self> {
        match s {
            "White European" => Some(Self::WhiteEuropean),
            "Black African" => Some(Self::BlackAfrican),
            "Black Caribbean" => Some(Self::BlackCaribbean),
            "Chinese" => Some(Self::Chinese),
            "Mixed" => Some(Self::Mixed),
            "Other ethnic group" => Some(Self::OtherEthnicGroup),
            "South Asian" => Some(Self::SouthAsian),
            _ => None,
        }
    }

    pub(crate) fn encoded(&self) -> f64 {
        *self as u8 as f64
    }
}

/// Smoking status categories of the source cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmokingStatus {
    ExSmoker,
    HeavySmoker,
    LightSmoker,
    ModerateSmoker,
    NonSmoker,
}

impl SmokingStatus {
    pub const OPTIONS: &'static [&'static str] = &[
        "ex-smoker",
        "heavy smoker",
        "light smoker",
        "moderate smoker",
        "non-smoker",
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ExSmoker => "ex-smoker",
            Self::HeavySmoker => "heavy smoker",
            Self::LightSmoker => "light smoker",
            Self::ModerateSmoker => "moderate smoker",
            Self::NonSmoker => "non-smoker",
        }
    }

    pub(crate) fn from_label(s: &str) -> Option<Self> {
        match s {
            "ex-smoker" => Some(Self::ExSmoker),
            "heavy smoker" => Some(Self::HeavySmoker),
            "light smoker" => Some(Self::LightSmoker),
            "moderate smoker" => Some(Self::ModerateSmoker),
            "non-smoker" => Some(Self::NonSmoker),
            _ => None,
        }
    }

    /// Any category other than `NonSmoker` counts as a smoker for the
    /// modifiable-risk heuristics.
    #[must_use]
    pub fn is_smoker(&self) -> bool {
        !matches!(self, Self::NonSmoker)
    }

    pub(crate) fn encoded(&self) -> f64 {
        *self as u8 as f64
    }
}

/// Self-reported physical activity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    High,
    Low,
    Moderate,
}

impl ActivityLevel {
    pub const OPTIONS: &'static [&'static str] = &["high", "low", "moderate"];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
            Self::Moderate => "moderate",
        }
    }

    pub(crate) fn from_label(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "low" => Some(Self::Low),
            "moderate" => Some(Self::Moderate),
            _ => None,
        }
    }

    pub(crate) fn encoded(&self) -> f64 {
        *self as u8 as f64
    }
}

/// Diabetes diagnosis status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiabetesStatus {
    NoDiabetes,
    Type1Diabetes,
    Type2Diabetes,
}

impl DiabetesStatus {
    pub const OPTIONS: &'static [&'static str] =
        &["No Diabetes", "Type 1 Diabetes", "Type 2 Diabetes"];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoDiabetes => "No Diabetes",
            Self::Type1Diabetes => "Type 1 Diabetes",
            Self::Type2Diabetes => "Type 2 Diabetes",
        }
    }

    pub(crate) fn from_label(s: &str) -> Option<Self> {
        match s {
            "No Diabetes" => Some(Self::NoDiabetes),
            "Type 1 Diabetes" => Some(Self::Type1Diabetes),
            "Type 2 Diabetes" => Some(Self::Type2Diabetes),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_diabetic(&self) -> bool {
        !matches!(self, Self::NoDiabetes)
    }

    pub(crate) fn encoded(&self) -> f64 {
        *self as u8 as f64
    }
}

/// Validated clinical input record.
///
/// Construct via [`PatientRecord::validate`]; every field is then
/// guaranteed to lie within its declared domain. Fields are exposed for
/// read access — corrections create a new record through re-validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    // Demographics / lifestyle
    pub age: u32,
    pub sex: Sex,
    pub ethnic: EthnicGroup,
    pub bmi: f64,
    pub smoking_status: SmokingStatus,
    pub physical_activity: ActivityLevel,

    // Vitals / medical history
    pub chest_pain: bool,
    pub mean_sbp: u32,
    pub mean_dbp: u32,
    pub mean_heart_rate: u32,
    pub fam_chd: bool,
    pub diabetes_status: DiabetesStatus,
    pub treated_hypertension: bool,
    pub chol_lowering: bool,
    pub corticosteroid_use: bool,
    pub has_t1d: bool,
    pub has_t2d: bool,

    // Lipid panel (mmol/L)
    pub total_cholesterol: f64,
    pub hdl: f64,
    pub ldl: f64,
    pub triglyceride: f64,
    pub cholesterol_hdl_ratio: f64,

    // Glucose panel
    pub glucose: f64,
    pub random_glucose: f64,
    pub hba1c: u32,

    // Kidney panel
    pub creatinine: u32,
    pub blood_urea_nitrogen: f64,
    pub sodium: u32,
    pub potassium: f64,

    // Blood count
    pub hemoglobin: f64,
    pub hematocrit: f64,
    pub white_blood_cell_count: f64,
    pub red_blood_cell_count: f64,
    pub platelet_count: f64,
    pub mean_corpuscular_volume: f64,
    pub mean_corpuscular_hemoglobin: f64,
    pub mean_corpuscular_hemoglobin_concentration: f64,

    // Additional tests
    pub creatine_phosphokinase: u32,
    pub ast: f64,
    pub uric_acid: f64,
}

impl PatientRecord {
    /// Flatten the record into the feature mapping consumed by the
    /// scoring service. Key set and encoding are part of the model
    /// contract.
    #[must_use]
    pub fn to_feature_map(&self) -> FeatureMap {
        let mut map = FeatureMap::new();

        map.insert("age".into(), f64::from(self.age));
        map.insert("sex".into(), self.sex.encoded());
        map.insert("ethnic".into(), self.ethnic.encoded());
        map.insert("bmi".into(), self.bmi);
        map.insert("smoking_status".into(), self.smoking_status.encoded());
        map.insert("physical_activity".into(), self.physical_activity.encoded());

        map.insert("chest_pain".into(), f64::from(u8::from(self.chest_pain)));
        map.insert("mean_sbp".into(), f64::from(self.mean_sbp));
        map.insert("mean_dbp".into(), f64::from(self.mean_dbp));
        map.insert("mean_heart_rate".into(), f64::from(self.mean_heart_rate));
        map.insert("fam_chd".into(), f64::from(u8::from(self.fam_chd)));
        map.insert("diabetes_status".into(), self.diabetes_status.encoded());
        map.insert(
            "treated_hypertension".into(),
            f64::from(u8::from(self.treated_hypertension)),
        );
        map.insert(
            "chol_lowering".into(),
            f64::from(u8::from(self.chol_lowering)),
        );
        map.insert(
            "corticosteroid_use".into(),
            f64::from(u8::from(self.corticosteroid_use)),
        );
        map.insert("has_t1d".into(), f64::from(u8::from(self.has_t1d)));
        map.insert("has_t2d".into(), f64::from(u8::from(self.has_t2d)));

        map.insert("total_cholesterol".into(), self.total_cholesterol);
        map.insert("hdl".into(), self.hdl);
        map.insert("ldl".into(), self.ldl);
        map.insert("triglyceride".into(), self.triglyceride);
        map.insert("cholesterol_hdl_ratio".into(), self.cholesterol_hdl_ratio);

        map.insert("glucose".into(), self.glucose);
        map.insert("random_glucose".into(), self.random_glucose);
        map.insert("hba1c".into(), f64::from(self.hba1c));

        map.insert("creatinine".into(), f64::from(self.creatinine));
        map.insert("blood_urea_nitrogen".into(), self.blood_urea_nitrogen);
        map.insert("sodium".into(), f64::from(self.sodium));
        map.insert("potassium".into(), self.potassium);

        map.insert("hemoglobin".into(), self.hemoglobin);
        map.insert("hematocrit".into(), self.hematocrit);
        map.insert("white_blood_cell_count".into(), self.white_blood_cell_count);
        map.insert("red_blood_cell_count".into(), self.red_blood_cell_count);
        map.insert("platelet_count".into(), self.platelet_count);
        map.insert(
            "mean_corpuscular_volume".into(),
            self.mean_corpuscular_volume,
        );
        map.insert(
            "mean_corpuscular_hemoglobin".into(),
            self.mean_corpuscular_hemoglobin,
        );
        map.insert(
            "mean_corpuscular_hemoglobin_concentration".into(),
            self.mean_corpuscular_hemoglobin_concentration,
        );

        map.insert(
            "creatine_phosphokinase".into(),
            f64::from(self.creatine_phosphokinase),
        );
        map.insert("ast".into(), self.ast);
        map.insert("uric_acid".into(), self.uric_acid);

        map
    }

    /// Count of the modifiable risk factors the dashboard tracks:
    /// smoking, low physical activity, and BMI above 30.
    #[must_use]
    pub fn modifiable_risk_factors(&self) -> u8 {
        u8::from(self.smoking_status.is_smoker())
            + u8::from(matches!(self.physical_activity, ActivityLevel::Low))
            + u8::from(self.bmi > 30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::sample_record;

    #[test]
    fn test_feature_map_covers_all_fields() {
        let record = sample_record();
        let map = record.to_feature_map();
        assert_eq!(map.len(), 40);
        assert!((map["age"] - 51.0).abs() < f64::EPSILON);
        assert!((map["sex"] - 0.0).abs() < f64::EPSILON);
        assert!((map["total_cholesterol"] - 4.47).abs() < f64::EPSILON);
    }

    #[test]
    fn test_enum_encodings_follow_declared_order() {
        assert!((SmokingStatus::ExSmoker.encoded() - 0.0).abs() < f64::EPSILON);
        assert!((SmokingStatus::NonSmoker.encoded() - 4.0).abs() < f64::EPSILON);
        assert!((ActivityLevel::Moderate.encoded() - 2.0).abs() < f64::EPSILON);
        assert!((DiabetesStatus::Type2Diabetes.encoded() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_modifiable_risk_factors() {
        let mut record = sample_record();
        assert_eq!(record.modifiable_risk_factors(), 0);

        record.smoking_status = SmokingStatus::HeavySmoker;
        record.physical_activity = ActivityLevel::Low;
        record.bmi = 31.5;
        assert_eq!(record.modifiable_risk_factors(), 3);
    }

    #[test]
    fn test_labels_roundtrip() {
        for label in EthnicGroup::OPTIONS {
            let parsed = EthnicGroup::from_label(label).expect("Should parse");
            assert_eq!(parsed.label(), *label);
        }
        for label in SmokingStatus::OPTIONS {
            let parsed = SmokingStatus::from_label(label).expect("Should parse");
            assert_eq!(parsed.label(), *label);
        }
    }
}
