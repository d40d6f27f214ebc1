//! Record validation: schema, coercion, and range checks for raw
//! dashboard input.
//!
//! `validate` is a pure function from an untyped field mapping to a
//! [`PatientRecord`]. Same input always yields the same record or the
//! same error; nothing is scored until validation has passed.

use std::collections::BTreeMap;

use serde_json::Value;

use super::patient::{
    ActivityLevel, DiabetesStatus, EthnicGroup, PatientRecord, Sex, SmokingStatus,
};

/// Untyped input mapping as produced by the form layer or a test
/// harness. `BTreeMap` for deterministic iteration.
pub type RawRecord = BTreeMap<String, Value>;

/// Why a raw record was rejected. Always recoverable by correcting the
/// named field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}`: expected {expected}, got `{value}`")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("field `{field}`: value {value} outside allowed range {range}")]
    OutOfRange {
        field: &'static str,
        value: String,
        range: &'static str,
    },

    #[error("field `{field}`: `{value}` is not one of {options:?}")]
    InvalidOption {
        field: &'static str,
        value: String,
        options: &'static [&'static str],
    },
}

fn get<'a>(raw: &'a RawRecord, field: &'static str) -> Result<&'a Value, ValidationError> {
    raw.get(field)
        .ok_or(ValidationError::MissingField { field })
}

/// Integer field within a closed range. A float with zero fractional
/// part coerces; anything else is a type error.
fn int_in(
    raw: &RawRecord,
    field: &'static str,
    min: i64,
    max: i64,
    range: &'static str,
) -> Result<u32, ValidationError> {
    let value = get(raw, field)?;
    let n = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.is_finite() {
                    f as i64
                } else {
                    return Err(ValidationError::WrongType {
                        field,
                        expected: "integer",
                        value: value.to_string(),
                    });
                }
            } else {
                return Err(ValidationError::WrongType {
                    field,
                    expected: "integer",
                    value: value.to_string(),
                });
            }
        }
        other => {
            return Err(ValidationError::WrongType {
                field,
                expected: "integer",
                value: other.to_string(),
            })
        }
    };

    if n < min || n > max {
        return Err(ValidationError::OutOfRange {
            field,
            value: n.to_string(),
            range,
        });
    }

    Ok(n as u32)
}

/// Float field within a range; `exclusive_min` marks a half-open lower
/// bound such as BMI's (10, 60].
fn float_in(
    raw: &RawRecord,
    field: &'static str,
    min: f64,
    max: f64,
    exclusive_min: bool,
    range: &'static str,
) -> Result<f64, ValidationError> {
    let value = get(raw, field)?;
    let f = value
        .as_f64()
        .filter(|f| f.is_finite())
        .ok_or_else(|| ValidationError::WrongType {
            field,
            expected: "number",
            value: value.to_string(),
        })?;

    let below = if exclusive_min { f <= min } else { f < min };
    if below || f > max {
        return Err(ValidationError::OutOfRange {
            field,
            value: f.to_string(),
            range,
        });
    }

    Ok(f)
}

/// Boolean field; numeric 0/1 coerces for compatibility with encoded
/// form payloads.
fn boolean(raw: &RawRecord, field: &'static str) -> Result<bool, ValidationError> {
    let value = get(raw, field)?;
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => Ok(false),
            Some(f) if f == 1.0 => Ok(true),
            _ => Err(ValidationError::WrongType {
                field,
                expected: "boolean",
                value: value.to_string(),
            }),
        },
        other => Err(ValidationError::WrongType {
            field,
            expected: "boolean",
            value: other.to_string(),
        }),
    }
}

/// Enum field matched against its declared option labels.
fn labeled<T>(
    raw: &RawRecord,
    field: &'static str,
    options: &'static [&'static str],
    parse: fn(&str) -> Option<T>,
) -> Result<T, ValidationError> {
    let value = get(raw, field)?;
    let s = value.as_str().ok_or_else(|| ValidationError::WrongType {
        field,
        expected: "string",
        value: value.to_string(),
    })?;

    parse(s).ok_or_else(|| ValidationError::InvalidOption {
        field,
        value: s.to_string(),
        options,
    })
}

impl PatientRecord {
    /// Validate a raw input mapping into a typed record.
    ///
    /// Every required field must be present, coerce to its semantic
    /// type, and fall within its declared domain. Pure and
    /// deterministic; no side effects.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] encountered in declared
    /// field order.
    pub fn validate(raw: &RawRecord) -> Result<Self, ValidationError> {
        Ok(Self {
            age: int_in(raw, "age", 18, 120, "[18, 120]")?,
            sex: labeled(raw, "sex", Sex::OPTIONS, Sex::from_label)?,
            ethnic: labeled(raw, "ethnic", EthnicGroup::OPTIONS, EthnicGroup::from_label)?,
            bmi: float_in(raw, "bmi", 10.0, 60.0, true, "(10, 60]")?,
            smoking_status: labeled(
                raw,
                "smoking_status",
                SmokingStatus::OPTIONS,
                SmokingStatus::from_label,
            )?,
            physical_activity: labeled(
                raw,
                "physical_activity",
                ActivityLevel::OPTIONS,
                ActivityLevel::from_label,
            )?,

            chest_pain: boolean(raw, "chest_pain")?,
            mean_sbp: int_in(raw, "mean_sbp", 70, 250, "[70, 250]")?,
            mean_dbp: int_in(raw, "mean_dbp", 40, 150, "[40, 150]")?,
            mean_heart_rate: int_in(raw, "mean_heart_rate", 30, 200, "[30, 200]")?,
            fam_chd: boolean(raw, "fam_chd")?,
            diabetes_status: labeled(
                raw,
                "diabetes_status",
                DiabetesStatus::OPTIONS,
                DiabetesStatus::from_label,
            )?,
            treated_hypertension: boolean(raw, "treated_hypertension")?,
            chol_lowering: boolean(raw, "chol_lowering")?,
            corticosteroid_use: boolean(raw, "corticosteroid_use")?,
            has_t1d: boolean(raw, "has_t1d")?,
            has_t2d: boolean(raw, "has_t2d")?,

            total_cholesterol: float_in(raw, "total_cholesterol", 2.0, 12.0, false, "[2, 12]")?,
            hdl: float_in(raw, "hdl", 0.5, 3.0, false, "[0.5, 3]")?,
            ldl: float_in(raw, "ldl", 0.5, 8.0, false, "[0.5, 8]")?,
            triglyceride: float_in(raw, "triglyceride", 0.1, 5.0, false, "[0.1, 5]")?,
            cholesterol_hdl_ratio: float_in(
                raw,
                "cholesterol_hdl_ratio",
                1.0,
                10.0,
                false,
                "[1, 10]",
            )?,

            glucose: float_in(raw, "glucose", 2.0, 20.0, false, "[2, 20]")?,
            random_glucose: float_in(raw, "random_glucose", 2.0, 20.0, false, "[2, 20]")?,
            hba1c: int_in(raw, "hba1c", 20, 150, "[20, 150]")?,

            creatinine: int_in(raw, "creatinine", 30, 300, "[30, 300]")?,
            blood_urea_nitrogen: float_in(raw, "blood_urea_nitrogen", 1.0, 20.0, false, "[1, 20]")?,
            sodium: int_in(raw, "sodium", 120, 160, "[120, 160]")?,
            potassium: float_in(raw, "potassium", 2.5, 7.0, false, "[2.5, 7]")?,

            hemoglobin: float_in(raw, "hemoglobin", 5.0, 20.0, false, "[5, 20]")?,
            hematocrit: float_in(raw, "hematocrit", 15.0, 60.0, false, "[15, 60]")?,
            white_blood_cell_count: float_in(
                raw,
                "white_blood_cell_count",
                2.0,
                20.0,
                false,
                "[2, 20]",
            )?,
            red_blood_cell_count: float_in(
                raw,
                "red_blood_cell_count",
                2.0,
                7.0,
                false,
                "[2, 7]",
            )?,
            platelet_count: float_in(raw, "platelet_count", 50.0, 600.0, false, "[50, 600]")?,
            mean_corpuscular_volume: float_in(
                raw,
                "mean_corpuscular_volume",
                60.0,
                120.0,
                false,
                "[60, 120]",
            )?,
            mean_corpuscular_hemoglobin: float_in(
                raw,
                "mean_corpuscular_hemoglobin",
                20.0,
                40.0,
                false,
                "[20, 40]",
            )?,
            mean_corpuscular_hemoglobin_concentration: float_in(
                raw,
                "mean_corpuscular_hemoglobin_concentration",
                25.0,
                40.0,
                false,
                "[25, 40]",
            )?,

            creatine_phosphokinase: int_in(
                raw,
                "creatine_phosphokinase",
                10,
                5000,
                "[10, 5000]",
            )?,
            ast: float_in(raw, "ast", 5.0, 200.0, false, "[5, 200]")?,
            uric_acid: float_in(raw, "uric_acid", 100.0, 600.0, false, "[100, 600]")?,
        })
    }

    /// Reconstruct the raw mapping form of this record. Validation of
    /// the result reproduces the record exactly (round-trip identity),
    /// and history exports use it as the `inputs` payload.
    #[must_use]
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new();

        raw.insert("age".into(), Value::from(self.age));
        raw.insert("sex".into(), Value::from(self.sex.label()));
        raw.insert("ethnic".into(), Value::from(self.ethnic.label()));
        raw.insert("bmi".into(), Value::from(self.bmi));
        raw.insert(
            "smoking_status".into(),
            Value::from(self.smoking_status.label()),
        );
        raw.insert(
            "physical_activity".into(),
            Value::from(self.physical_activity.label()),
        );

        raw.insert("chest_pain".into(), Value::from(self.chest_pain));
        raw.insert("mean_sbp".into(), Value::from(self.mean_sbp));
        raw.insert("mean_dbp".into(), Value::from(self.mean_dbp));
        raw.insert("mean_heart_rate".into(), Value::from(self.mean_heart_rate));
        raw.insert("fam_chd".into(), Value::from(self.fam_chd));
        raw.insert(
            "diabetes_status".into(),
            Value::from(self.diabetes_status.label()),
        );
        raw.insert(
            "treated_hypertension".into(),
            Value::from(self.treated_hypertension),
        );
        raw.insert("chol_lowering".into(), Value::from(self.chol_lowering));
        raw.insert(
            "corticosteroid_use".into(),
            Value::from(self.corticosteroid_use),
        );
        raw.insert("has_t1d".into(), Value::from(self.has_t1d));
        raw.insert("has_t2d".into(), Value::from(self.has_t2d));

        raw.insert(
            "total_cholesterol".into(),
            Value::from(self.total_cholesterol),
        );
        raw.insert("hdl".into(), Value::from(self.hdl));
        raw.insert("ldl".into(), Value::from(self.ldl));
        raw.insert("triglyceride".into(), Value::from(self.triglyceride));
        raw.insert(
            "cholesterol_hdl_ratio".into(),
            Value::from(self.cholesterol_hdl_ratio),
        );

        raw.insert("glucose".into(), Value::from(self.glucose));
        raw.insert("random_glucose".into(), Value::from(self.random_glucose));
        raw.insert("hba1c".into(), Value::from(self.hba1c));

        raw.insert("creatinine".into(), Value::from(self.creatinine));
        raw.insert(
            "blood_urea_nitrogen".into(),
            Value::from(self.blood_urea_nitrogen),
        );
        raw.insert("sodium".into(), Value::from(self.sodium));
        raw.insert("potassium".into(), Value::from(self.potassium));

        raw.insert("hemoglobin".into(), Value::from(self.hemoglobin));
        raw.insert("hematocrit".into(), Value::from(self.hematocrit));
        raw.insert(
            "white_blood_cell_count".into(),
            Value::from(self.white_blood_cell_count),
        );
        raw.insert(
            "red_blood_cell_count".into(),
            Value::from(self.red_blood_cell_count),
        );
        raw.insert("platelet_count".into(), Value::from(self.platelet_count));
        raw.insert(
            "mean_corpuscular_volume".into(),
            Value::from(self.mean_corpuscular_volume),
        );
        raw.insert(
            "mean_corpuscular_hemoglobin".into(),
            Value::from(self.mean_corpuscular_hemoglobin),
        );
        raw.insert(
            "mean_corpuscular_hemoglobin_concentration".into(),
            Value::from(self.mean_corpuscular_hemoglobin_concentration),
        );

        raw.insert(
            "creatine_phosphokinase".into(),
            Value::from(self.creatine_phosphokinase),
        );
        raw.insert("ast".into(), Value::from(self.ast));
        raw.insert("uric_acid".into(), Value::from(self.uric_acid));

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{sample_raw, sample_record};

    #[test]
    fn test_valid_record_parses() {
        let record = PatientRecord::validate(&sample_raw()).expect("Should validate");
        assert_eq!(record.age, 51);
        assert_eq!(record.sex, Sex::Female);
        assert!((record.bmi - 20.2115).abs() < f64::EPSILON);
        assert_eq!(record.creatinine, 52);
    }

    #[test]
    fn test_missing_field() {
        let mut raw = sample_raw();
        raw.remove("age");
        let err = PatientRecord::validate(&raw).expect_err("Should fail");
        assert_eq!(err, ValidationError::MissingField { field: "age" });
    }

    #[test]
    fn test_out_of_range_integer() {
        let mut raw = sample_raw();
        raw.insert("age".into(), Value::from(17));
        let err = PatientRecord::validate(&raw).expect_err("Should fail");
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "age", .. }
        ));
    }

    #[test]
    fn test_bmi_lower_bound_exclusive() {
        let mut raw = sample_raw();
        raw.insert("bmi".into(), Value::from(10.0));
        let err = PatientRecord::validate(&raw).expect_err("Should fail");
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "bmi", .. }
        ));

        raw.insert("bmi".into(), Value::from(10.1));
        assert!(PatientRecord::validate(&raw).is_ok());
    }

    #[test]
    fn test_invalid_enum_option() {
        let mut raw = sample_raw();
        raw.insert("smoking_status".into(), Value::from("vaper"));
        let err = PatientRecord::validate(&raw).expect_err("Should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidOption {
                field: "smoking_status",
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_type() {
        let mut raw = sample_raw();
        raw.insert("age".into(), Value::from("fifty"));
        let err = PatientRecord::validate(&raw).expect_err("Should fail");
        assert!(matches!(
            err,
            ValidationError::WrongType { field: "age", .. }
        ));
    }

    #[test]
    fn test_boolean_coercion_from_zero_one() {
        let mut raw = sample_raw();
        raw.insert("chest_pain".into(), Value::from(1));
        raw.insert("fam_chd".into(), Value::from(0));
        let record = PatientRecord::validate(&raw).expect("Should validate");
        assert!(record.chest_pain);
        assert!(!record.fam_chd);
    }

    #[test]
    fn test_integer_accepts_whole_float() {
        let mut raw = sample_raw();
        raw.insert("mean_sbp".into(), Value::from(116.0));
        let record = PatientRecord::validate(&raw).expect("Should validate");
        assert_eq!(record.mean_sbp, 116);
    }

    #[test]
    fn test_validation_roundtrip_is_idempotent() {
        let first = PatientRecord::validate(&sample_raw()).expect("Should validate");
        let second = PatientRecord::validate(&first.to_raw()).expect("Should revalidate");
        assert_eq!(first, second);
    }

    #[test]
    fn test_deterministic_errors() {
        let mut raw = sample_raw();
        raw.insert("potassium".into(), Value::from(9.9));
        let a = PatientRecord::validate(&raw).expect_err("Should fail");
        let b = PatientRecord::validate(&raw).expect_err("Should fail");
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_record_matches_sample_raw() {
        let record = PatientRecord::validate(&sample_raw()).expect("Should validate");
        assert_eq!(record, sample_record());
    }
}
