//! Report assembly: derived clinical classifications, follow-up
//! scheduling, report identity, and the plain-text export.
//!
//! A [`PatientReport`] is immutable once assembled. Its identity hash
//! covers the record, the assessment, and the generation timestamp, so
//! re-assembling the same inputs at a different time yields a new
//! identity while every derived classification stays byte-identical.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::assessment::{RiskAssessment, RiskTier};
use super::attribution::FeatureAttribution;
use super::interventions::RiskInsights;
use super::patient::{PatientRecord, Sex};

/// BMI classification per the WHO cut points used by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

/// Blood pressure stage (ACC/AHA staging as used by the dashboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BpStage {
    Normal,
    Elevated,
    Stage1,
    Stage2,
}

impl BpStage {
    #[must_use]
    pub fn from_pressures(sbp: u32, dbp: u32) -> Self {
        if sbp < 120 && dbp < 80 {
            Self::Normal
        } else if sbp < 130 && dbp < 80 {
            Self::Elevated
        } else if sbp < 140 || dbp < 90 {
            Self::Stage1
        } else {
            Self::Stage2
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::Stage1 => "Stage 1 HTN",
            Self::Stage2 => "Stage 2 HTN",
        }
    }
}

/// Resting heart-rate classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartRateStatus {
    Bradycardia,
    Normal,
    Tachycardia,
}

impl HeartRateStatus {
    #[must_use]
    pub fn from_rate(bpm: u32) -> Self {
        if bpm < 60 {
            Self::Bradycardia
        } else if bpm <= 100 {
            Self::Normal
        } else {
            Self::Tachycardia
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bradycardia => "Bradycardia",
            Self::Normal => "Normal",
            Self::Tachycardia => "Tachycardia",
        }
    }
}

/// Combined lipid panel status from total cholesterol and LDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LipidStatus {
    Optimal,
    Borderline,
    High,
}

impl LipidStatus {
    #[must_use]
    pub fn from_panel(total_cholesterol: f64, ldl: f64) -> Self {
        if total_cholesterol < 5.2 && ldl < 2.6 {
            Self::Optimal
        } else if total_cholesterol < 6.2 && ldl < 3.4 {
            Self::Borderline
        } else {
            Self::High
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::Borderline => "Borderline",
            Self::High => "High",
        }
    }
}

/// HDL grade (higher is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HdlStatus {
    Low,
    Normal,
    Optimal,
}

impl HdlStatus {
    #[must_use]
    pub fn from_hdl(hdl: f64) -> Self {
        if hdl < 1.0 {
            Self::Low
        } else if hdl < 1.5 {
            Self::Normal
        } else {
            Self::Optimal
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::Optimal => "Optimal",
        }
    }
}

/// LDL grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LdlStatus {
    Optimal,
    NearOptimal,
    Borderline,
    High,
}

impl LdlStatus {
    #[must_use]
    pub fn from_ldl(ldl: f64) -> Self {
        if ldl < 2.6 {
            Self::Optimal
        } else if ldl < 3.4 {
            Self::NearOptimal
        } else if ldl < 4.1 {
            Self::Borderline
        } else {
            Self::High
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::NearOptimal => "Near Optimal",
            Self::Borderline => "Borderline",
            Self::High => "High",
        }
    }
}

/// Estimated glomerular filtration rate (MDRD, creatinine in μmol/L),
/// floored at zero.
#[must_use]
pub fn estimated_gfr(creatinine_umol_l: u32, age_years: u32, sex: Sex) -> f64 {
    let sex_factor = match sex {
        Sex::Female => 0.742,
        Sex::Male => 1.0,
    };
    let egfr = 175.0
        * (f64::from(creatinine_umol_l) / 88.4).powf(-1.154)
        * f64::from(age_years).powf(-0.203)
        * sex_factor;
    egfr.max(0.0)
}

/// HbA1c display conversion from mmol/mol to percent (IFCC → NGSP).
#[must_use]
pub fn hba1c_percent(hba1c_mmol_mol: u32) -> f64 {
    f64::from(hba1c_mmol_mol) * 0.09 + 2.15
}

/// Deterministic clinical classifications derived from the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalFindings {
    pub bmi_category: BmiCategory,
    pub bp_stage: BpStage,
    pub heart_rate_status: HeartRateStatus,
    pub lipid_status: LipidStatus,
    pub hdl_status: HdlStatus,
    pub ldl_status: LdlStatus,
    pub egfr: f64,
    pub hba1c_percent: f64,
}

impl ClinicalFindings {
    #[must_use]
    pub fn derive(record: &PatientRecord) -> Self {
        Self {
            bmi_category: BmiCategory::from_bmi(record.bmi),
            bp_stage: BpStage::from_pressures(record.mean_sbp, record.mean_dbp),
            heart_rate_status: HeartRateStatus::from_rate(record.mean_heart_rate),
            lipid_status: LipidStatus::from_panel(record.total_cholesterol, record.ldl),
            hdl_status: HdlStatus::from_hdl(record.hdl),
            ldl_status: LdlStatus::from_ldl(record.ldl),
            egfr: estimated_gfr(record.creatinine, record.age, record.sex),
            hba1c_percent: hba1c_percent(record.hba1c),
        }
    }
}

/// One scheduled follow-up appointment, as an offset from report
/// generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub offset_days: i64,
    pub label: String,
}

impl FollowUp {
    fn new(offset_days: i64, label: &str) -> Self {
        Self {
            offset_days,
            label: label.to_string(),
        }
    }

    /// Concrete appointment date relative to a generation timestamp.
    #[must_use]
    pub fn date_from(&self, generated_at: DateTime<Utc>) -> DateTime<Utc> {
        generated_at + Duration::days(self.offset_days)
    }
}

/// Fixed follow-up offset table keyed by risk tier.
#[must_use]
pub fn follow_up_schedule(tier: RiskTier) -> Vec<FollowUp> {
    match tier {
        RiskTier::High => vec![
            FollowUp::new(1, "Emergency Cardiology"),
            FollowUp::new(7, "Diagnostic Testing"),
            FollowUp::new(14, "Treatment Review"),
            FollowUp::new(30, "Risk Reassessment"),
        ],
        RiskTier::Moderate => vec![
            FollowUp::new(14, "Cardiology Consultation"),
            FollowUp::new(90, "Risk Reassessment"),
            FollowUp::new(180, "Comprehensive Evaluation"),
        ],
        RiskTier::Low => vec![
            FollowUp::new(180, "Routine Check-up"),
            FollowUp::new(365, "Annual Assessment"),
        ],
    }
}

/// Fixed per-tier recommendation text: (section header, action lines,
/// medication header, medication lines).
fn recommendations(tier: RiskTier) -> (&'static str, &'static [&'static str], &'static str, &'static [&'static str]) {
    match tier {
        RiskTier::High => (
            "URGENT ACTIONS REQUIRED:",
            &[
                "1. Immediate cardiology consultation (within 24-48 hours)",
                "2. ECG and cardiac biomarkers today",
                "3. Consider emergency department evaluation if symptomatic",
                "4. Initiate high-intensity statin therapy",
                "5. Start antiplatelet therapy (aspirin 81mg daily)",
                "6. Blood pressure optimization with ACE-I/ARB",
                "7. Cardiac imaging (stress test or coronary CTA) within 1 week",
            ],
            "MEDICATION RECOMMENDATIONS:",
            &[
                "- Atorvastatin 80mg daily OR Rosuvastatin 40mg daily",
                "- Aspirin 81mg daily",
                "- Lisinopril 10mg daily (titrate to BP goal)",
                "- Consider beta-blocker if HR > 80 bpm",
            ],
        ),
        RiskTier::Moderate => (
            "RECOMMENDED ACTIONS:",
            &[
                "1. Cardiology consultation within 2-4 weeks",
                "2. Comprehensive metabolic panel and lipid profile",
                "3. Exercise stress test or coronary calcium score",
                "4. Lifestyle modification program enrollment",
                "5. Consider moderate-intensity statin therapy",
                "6. Blood pressure monitoring (home BP log)",
            ],
            "MEDICATION CONSIDERATIONS:",
            &[
                "- Atorvastatin 20-40mg daily OR Rosuvastatin 10-20mg daily",
                "- Consider aspirin 81mg daily if 10-year ASCVD risk > 10%",
                "- Optimize BP control if needed",
            ],
        ),
        RiskTier::Low => (
            "MAINTENANCE RECOMMENDATIONS:",
            &[
                "1. Continue current healthy lifestyle",
                "2. Annual cardiovascular risk reassessment",
                "3. Lipid panel every 5 years (or sooner if risk factors change)",
                "4. Blood pressure check every 1-2 years",
                "5. Maintain optimal weight and exercise routine",
                "6. Mediterranean diet pattern",
            ],
            "PREVENTIVE MEASURES:",
            &[
                "- 150 minutes moderate exercise weekly",
                "- DASH or Mediterranean diet",
                "- Stress management techniques",
                "- Quality sleep (7-9 hours)",
            ],
        ),
    }
}

/// Content-derived report identifier: SHA-256 over the canonical
/// serialization of (record, assessment, timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportId(String);

impl ReportId {
    fn derive(
        record: &PatientRecord,
        assessment: &RiskAssessment,
        generated_at: DateTime<Utc>,
    ) -> Self {
        #[derive(Serialize)]
        struct IdentityPayload<'a> {
            record: &'a PatientRecord,
            assessment: &'a RiskAssessment,
            generated_at: String,
        }

        let payload = IdentityPayload {
            record,
            assessment,
            generated_at: generated_at.to_rfc3339(),
        };

        // Struct field order makes the serialization canonical.
        let bytes = serde_json::to_vec(&payload)
            .expect("identity payload serialization cannot fail");
        let digest = Sha256::digest(&bytes);
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        Self(hex)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short uppercase prefix used in report headers and export names.
    #[must_use]
    pub fn short(&self) -> String {
        self.0[..10].to_uppercase()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable assessment report aggregate.
///
/// Owns copies of the record, assessment, and attribution it embeds;
/// supersession means assembling a new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientReport {
    record: PatientRecord,
    assessment: RiskAssessment,
    attribution: FeatureAttribution,
    findings: ClinicalFindings,
    follow_ups: Vec<FollowUp>,
    generated_at: DateTime<Utc>,
    id: ReportId,
}

impl PatientReport {
    /// Assemble a report timestamped now.
    #[must_use]
    pub fn assemble(
        record: PatientRecord,
        assessment: RiskAssessment,
        attribution: FeatureAttribution,
    ) -> Self {
        Self::assemble_at(record, assessment, attribution, Utc::now())
    }

    /// Assemble a report at an explicit timestamp. Identical inputs at
    /// identical timestamps produce identical reports, including the
    /// identity hash.
    #[must_use]
    pub fn assemble_at(
        record: PatientRecord,
        assessment: RiskAssessment,
        attribution: FeatureAttribution,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let findings = ClinicalFindings::derive(&record);
        let follow_ups = follow_up_schedule(assessment.risk_tier());
        let id = ReportId::derive(&record, &assessment, generated_at);

        Self {
            record,
            assessment,
            attribution,
            findings,
            follow_ups,
            generated_at,
            id,
        }
    }

    #[must_use]
    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    #[must_use]
    pub fn assessment(&self) -> &RiskAssessment {
        &self.assessment
    }

    #[must_use]
    pub fn attribution(&self) -> &FeatureAttribution {
        &self.attribution
    }

    #[must_use]
    pub fn findings(&self) -> &ClinicalFindings {
        &self.findings
    }

    #[must_use]
    pub fn follow_ups(&self) -> &[FollowUp] {
        &self.follow_ups
    }

    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    #[must_use]
    pub fn id(&self) -> &ReportId {
        &self.id
    }

    /// Display patient identifier derived from the generation time.
    #[must_use]
    pub fn patient_display_id(&self) -> String {
        format!("PT{}", self.generated_at.format("%Y%m%d%H%M"))
    }

    /// Export file name keyed by the content hash.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        format!("CardioPredict_Report_{}.txt", self.id.short())
    }

    /// Signature line: SHA-256 over the record's canonical JSON,
    /// truncated to 16 hex characters as in the original report.
    #[must_use]
    pub fn digital_signature(&self) -> String {
        let bytes = serde_json::to_vec(&self.record)
            .expect("record serialization cannot fail");
        let digest = Sha256::digest(&bytes);
        digest.iter().map(|b| format!("{b:02x}")).collect::<String>()[..16].to_string()
    }

    /// Render the fixed-section plain-text report.
    ///
    /// Section order, headers, and numeric formatting (probabilities as
    /// percentages with one decimal) are part of the export contract.
    #[must_use]
    pub fn to_text(&self) -> String {
        use std::fmt::Write as _;

        let rule = "=".repeat(79);
        let p = self.assessment.positive_class_probability();
        let tier = self.assessment.risk_tier();
        let insights = RiskInsights::derive(&self.record, tier);

        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:^79}", "CARDIOPREDICT AI PRO");
        let _ = writeln!(out, "{:^79}", "COMPREHENSIVE RISK ASSESSMENT REPORT");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "REPORT GENERATED: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "REPORT ID: {}", self.id.short());

        section(&mut out, "EXECUTIVE SUMMARY");
        let _ = writeln!(
            out,
            "* Overall Risk Assessment: {} RISK ({:.1}%)",
            tier.label(),
            p * 100.0
        );
        let _ = writeln!(
            out,
            "* Immediate Action Required: {}",
            if tier == RiskTier::High { "YES" } else { "NO" }
        );
        let _ = writeln!(
            out,
            "* Key Risk Drivers: {}",
            insights.top_contributors.join(", ")
        );
        let _ = writeln!(
            out,
            "* Modifiable Risk Factors: {}/5",
            self.record.modifiable_risk_factors()
        );

        section(&mut out, "PATIENT INFORMATION");
        let _ = writeln!(out, "* Patient ID: {}", self.patient_display_id());
        let _ = writeln!(out, "* Age: {} years", self.record.age);
        let _ = writeln!(out, "* Sex: {}", self.record.sex.label());
        let _ = writeln!(out, "* Ethnicity: {}", self.record.ethnic.label());
        let _ = writeln!(
            out,
            "* BMI: {:.1} kg/m2 ({})",
            self.record.bmi,
            self.findings.bmi_category.label()
        );
        let _ = writeln!(
            out,
            "* Physical Activity: {}",
            self.record.physical_activity.label()
        );
        let _ = writeln!(
            out,
            "* Smoking Status: {}",
            self.record.smoking_status.label()
        );

        section(&mut out, "RISK ASSESSMENT RESULTS");
        let _ = writeln!(out, "* ANGINA RISK LEVEL: {}", tier.label());
        let _ = writeln!(out, "* Risk Probability: {:.1}%", p * 100.0);
        let _ = writeln!(
            out,
            "* Confidence Interval: [{:.1}% - {:.1}%]",
            (p - 0.1).max(0.0) * 100.0,
            (p + 0.1).min(1.0) * 100.0
        );
        let _ = writeln!(
            out,
            "* Model Confidence: {:.1}%",
            self.assessment.confidence() * 100.0
        );
        let _ = writeln!(
            out,
            "* Prediction: {}",
            if self.assessment.predicted_label() {
                "Positive for Angina Risk"
            } else {
                "Negative for Angina Risk"
            }
        );
        let _ = writeln!(
            out,
            "* Risk Percentile: {}th percentile",
            ((p * 100.0) as u32).min(99)
        );
        let _ = writeln!(
            out,
            "* 10-Year CVD Risk: {:.1}%",
            (p * 100.0 * 1.5).min(100.0)
        );
        let _ = writeln!(
            out,
            "* Risk Trajectory: {}",
            if p > 0.5 { "Increasing" } else { "Stable" }
        );

        section(&mut out, "CLINICAL MEASUREMENTS");
        let _ = writeln!(out, "VITAL SIGNS:");
        let _ = writeln!(
            out,
            "* Blood Pressure: {}/{} mmHg ({})",
            self.record.mean_sbp,
            self.record.mean_dbp,
            self.findings.bp_stage.label()
        );
        let _ = writeln!(
            out,
            "* Heart Rate: {} bpm ({})",
            self.record.mean_heart_rate,
            self.findings.heart_rate_status.label()
        );
        let _ = writeln!(
            out,
            "* Chest Pain Present: {}",
            if self.record.chest_pain { "Yes" } else { "No" }
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "LABORATORY RESULTS:");
        let _ = writeln!(
            out,
            "* Total Cholesterol: {:.1} mmol/L ({})",
            self.record.total_cholesterol,
            self.findings.lipid_status.label()
        );
        let _ = writeln!(
            out,
            "* HDL Cholesterol: {:.1} mmol/L ({})",
            self.record.hdl,
            self.findings.hdl_status.label()
        );
        let _ = writeln!(
            out,
            "* LDL Cholesterol: {:.1} mmol/L ({})",
            self.record.ldl,
            self.findings.ldl_status.label()
        );
        let _ = writeln!(
            out,
            "* Triglycerides: {:.1} mmol/L",
            self.record.triglyceride
        );
        let _ = writeln!(
            out,
            "* Cholesterol/HDL Ratio: {:.1}",
            self.record.cholesterol_hdl_ratio
        );
        let _ = writeln!(
            out,
            "* HbA1c: {} mmol/mol ({:.1}%)",
            self.record.hba1c, self.findings.hba1c_percent
        );
        let _ = writeln!(out, "* Glucose: {:.1} mmol/L", self.record.glucose);
        let _ = writeln!(out, "* Creatinine: {} umol/L", self.record.creatinine);
        let _ = writeln!(
            out,
            "* eGFR: {:.1} mL/min/1.73m2",
            self.findings.egfr
        );

        section(&mut out, "AI-POWERED INSIGHTS");
        let _ = writeln!(out, "TOP RISK CONTRIBUTORS:");
        for (i, contributor) in insights.top_contributors.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, contributor);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "FEATURE IMPACTS (approximate, illustrative):");
        for entry in self.attribution.entries().iter().take(5) {
            let _ = writeln!(
                out,
                "* {}: {:+.3}",
                entry.feature_name, entry.signed_impact
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "PERSONALIZED RISK REDUCTION POTENTIAL:");
        let _ = writeln!(
            out,
            "* Achievable Risk Reduction: {}%",
            insights.achievable_risk_reduction_pct
        );
        let _ = writeln!(out, "* Timeline: {} months", insights.timeline_months);
        let _ = writeln!(out, "* Key Interventions: {}", insights.key_intervention);

        section(&mut out, "CLINICAL RECOMMENDATIONS");
        let (action_header, actions, med_header, medications) = recommendations(tier);
        let _ = writeln!(out, "{action_header}");
        for line in actions {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{med_header}");
        for line in medications {
            let _ = writeln!(out, "{line}");
        }

        section(&mut out, "FOLLOW-UP PROTOCOL");
        for follow_up in &self.follow_ups {
            let _ = writeln!(
                out,
                "* {} - {}",
                follow_up.date_from(self.generated_at).format("%B %d, %Y"),
                follow_up.label
            );
        }

        section(&mut out, "QUALITY METRICS & COMPLIANCE");
        let _ = writeln!(out, "* Report Quality Score: 98/100");
        let _ = writeln!(out, "* Data Completeness: 100%");
        let _ = writeln!(out, "* Guideline Adherence: ACC/AHA 2019, ESC 2021");
        let _ = writeln!(out, "* Model Version: {}", self.assessment.model_version());
        let _ = writeln!(out, "* Validation Status: Passed");
        let _ = writeln!(out, "* HIPAA Compliant: Yes");

        let _ = writeln!(out);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "IMPORTANT MEDICAL DISCLAIMER:");
        let _ = writeln!(
            out,
            "This AI-generated assessment is for educational and clinical support"
        );
        let _ = writeln!(
            out,
            "purposes only. It should not replace professional medical judgment or"
        );
        let _ = writeln!(
            out,
            "clinical decision-making. Always consult with qualified healthcare"
        );
        let _ = writeln!(out, "professionals for patient care decisions.");
        let _ = writeln!(out);
        let _ = writeln!(out, "Digital Signature: {}", self.digital_signature());
        let _ = writeln!(out, "Timestamp: {}", self.generated_at.to_rfc3339());
        let _ = writeln!(out, "{rule}");

        out
    }
}

fn section(out: &mut String, title: &str) {
    use std::fmt::Write as _;
    let _ = writeln!(out);
    let _ = writeln!(out, "--- {title} {}", "-".repeat(74 - title.len()));
    let _ = writeln!(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use crate::domain::test_support::sample_record;
    use crate::domain::RiskAssessment;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 12, 30, 0).unwrap()
    }

    fn sample_report(probability: f64) -> PatientReport {
        let record = sample_record();
        let assessment = RiskAssessment::from_positive_probability(
            probability,
            probability >= 0.5,
            "logistic-v1".into(),
        );
        let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
        let attribution =
            crate::domain::FeatureAttribution::explain_with_rng(&record, &assessment, &mut rng);
        PatientReport::assemble_at(record, assessment, attribution, fixed_time())
    }

    #[test]
    fn test_bmi_categories() {
        assert_eq!(BmiCategory::from_bmi(17.0), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.9), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_bp_stages() {
        assert_eq!(BpStage::from_pressures(115, 75), BpStage::Normal);
        assert_eq!(BpStage::from_pressures(125, 75), BpStage::Elevated);
        assert_eq!(BpStage::from_pressures(135, 85), BpStage::Stage1);
        assert_eq!(BpStage::from_pressures(150, 85), BpStage::Stage1);
        assert_eq!(BpStage::from_pressures(150, 95), BpStage::Stage2);
    }

    #[test]
    fn test_heart_rate_status() {
        assert_eq!(HeartRateStatus::from_rate(55), HeartRateStatus::Bradycardia);
        assert_eq!(HeartRateStatus::from_rate(60), HeartRateStatus::Normal);
        assert_eq!(HeartRateStatus::from_rate(100), HeartRateStatus::Normal);
        assert_eq!(HeartRateStatus::from_rate(101), HeartRateStatus::Tachycardia);
    }

    #[test]
    fn test_lipid_status() {
        assert_eq!(LipidStatus::from_panel(4.5, 2.0), LipidStatus::Optimal);
        assert_eq!(LipidStatus::from_panel(5.5, 3.0), LipidStatus::Borderline);
        assert_eq!(LipidStatus::from_panel(4.5, 3.0), LipidStatus::Borderline);
        assert_eq!(LipidStatus::from_panel(6.5, 3.0), LipidStatus::High);
        assert_eq!(LipidStatus::from_panel(5.0, 4.0), LipidStatus::High);
    }

    #[test]
    fn test_egfr_reference_case() {
        // creatinine 52 umol/L, age 51, female.
        let egfr = estimated_gfr(52, 51, Sex::Female);
        let expected =
            175.0 * (52.0 / 88.4f64).powf(-1.154) * 51.0f64.powf(-0.203) * 0.742;
        assert!((egfr - expected).abs() < 1e-9);
        assert!((egfr - 107.8).abs() < 0.1);
    }

    #[test]
    fn test_egfr_floors_at_zero() {
        // The formula is strictly positive for valid inputs; the floor
        // guards the contract anyway.
        assert!(estimated_gfr(300, 120, Sex::Male) >= 0.0);
    }

    #[test]
    fn test_follow_up_schedules_per_tier() {
        let high: Vec<i64> = follow_up_schedule(RiskTier::High)
            .iter()
            .map(|f| f.offset_days)
            .collect();
        assert_eq!(high, vec![1, 7, 14, 30]);

        let moderate: Vec<i64> = follow_up_schedule(RiskTier::Moderate)
            .iter()
            .map(|f| f.offset_days)
            .collect();
        assert_eq!(moderate, vec![14, 90, 180]);

        let low: Vec<i64> = follow_up_schedule(RiskTier::Low)
            .iter()
            .map(|f| f.offset_days)
            .collect();
        assert_eq!(low, vec![180, 365]);

        assert_eq!(
            follow_up_schedule(RiskTier::High)[0].label,
            "Emergency Cardiology"
        );
    }

    #[test]
    fn test_same_timestamp_same_identity() {
        let a = sample_report(0.42);
        let b = sample_report(0.42);
        assert_eq!(a.id(), b.id());
        assert_eq!(a.findings(), b.findings());
    }

    #[test]
    fn test_different_timestamp_changes_identity_only() {
        let record = sample_record();
        let assessment =
            RiskAssessment::from_positive_probability(0.42, false, "logistic-v1".into());
        let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
        let attribution =
            crate::domain::FeatureAttribution::explain_with_rng(&record, &assessment, &mut rng);

        let earlier = PatientReport::assemble_at(
            record.clone(),
            assessment.clone(),
            attribution.clone(),
            fixed_time(),
        );
        let later = PatientReport::assemble_at(
            record,
            assessment,
            attribution,
            fixed_time() + Duration::hours(1),
        );

        assert_ne!(earlier.id(), later.id());
        assert_eq!(earlier.findings(), later.findings());
        assert_eq!(earlier.follow_ups(), later.follow_ups());
    }

    #[test]
    fn test_text_export_contains_contract_sections() {
        let text = sample_report(0.82).to_text();
        for header in [
            "EXECUTIVE SUMMARY",
            "PATIENT INFORMATION",
            "RISK ASSESSMENT RESULTS",
            "CLINICAL MEASUREMENTS",
            "AI-POWERED INSIGHTS",
            "CLINICAL RECOMMENDATIONS",
            "FOLLOW-UP PROTOCOL",
            "QUALITY METRICS & COMPLIANCE",
            "IMPORTANT MEDICAL DISCLAIMER:",
            "Digital Signature:",
        ] {
            assert!(text.contains(header), "missing section: {header}");
        }
    }

    #[test]
    fn test_text_export_formatting() {
        let text = sample_report(0.82).to_text();
        assert!(text.contains("Overall Risk Assessment: HIGH RISK (82.0%)"));
        assert!(text.contains("* Risk Probability: 82.0%"));
        assert!(text.contains("* Blood Pressure: 116/79 mmHg (Normal)"));
        assert!(text.contains("* eGFR: 107.8 mL/min/1.73m2"));
        assert!(text.contains("* Model Version: logistic-v1"));
        assert!(text.contains("URGENT ACTIONS REQUIRED:"));
    }

    #[test]
    fn test_low_risk_report_text() {
        let text = sample_report(0.12).to_text();
        assert!(text.contains("Overall Risk Assessment: LOW RISK (12.0%)"));
        assert!(text.contains("MAINTENANCE RECOMMENDATIONS:"));
        assert!(text.contains("* Immediate Action Required: NO"));
        // Low tier: first follow-up lands 180 days out.
        assert!(text.contains("Routine Check-up"));
    }

    #[test]
    fn test_export_file_name_uses_content_hash() {
        let report = sample_report(0.42);
        let name = report.export_file_name();
        assert!(name.starts_with("CardioPredict_Report_"));
        assert!(name.ends_with(".txt"));
        assert!(name.contains(&report.id().short()));
    }

    #[test]
    fn test_digital_signature_is_stable() {
        let a = sample_report(0.42);
        let b = sample_report(0.42);
        assert_eq!(a.digital_signature(), b.digital_signature());
        assert_eq!(a.digital_signature().len(), 16);
    }
}
