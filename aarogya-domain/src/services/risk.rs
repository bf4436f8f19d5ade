//! Rule-based health-risk scoring
//!
//! Maps a point-in-time vital-signs snapshot to a numeric risk score, a
//! categorical risk level and a short list of recommendations in Hindi.
//! Scoring is a fixed sequence of threshold comparisons; there is no model
//! to load and no state between calls.

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use aarogya_data::models::health_record::HealthRecordRow;

const DEFAULT_AGE: i32 = 35;
const DEFAULT_SEX: &str = "male";
const DEFAULT_SYSTOLIC: i32 = 120;
const DEFAULT_DIASTOLIC: i32 = 80;
const DEFAULT_HEART_RATE: i32 = 72;
const DEFAULT_TEMPERATURE: f64 = 98.6;
const DEFAULT_WEIGHT_KG: f64 = 60.0;
const DEFAULT_HEIGHT_CM: f64 = 165.0;

const BP_RECOMMENDATIONS: [&str; 3] = [
    "रक्तचाप अधिक है - तुरंत आराम करें",
    "नमक और तनाव कम करें",
    "डॉक्टर से तुरंत सलाह लें",
];

const HEART_RATE_RECOMMENDATIONS: [&str; 2] = [
    "हृदय गति तेज़ है - शांत रहें",
    "गहरी सांस लें और आराम करें",
];

const TEMPERATURE_RECOMMENDATIONS: [&str; 3] = [
    "बुखार है - तरल पदार्थ लें",
    "पैरासिटामोल ले सकते हैं",
    "यदि बुखार बना रहे तो डॉक्टर से मिलें",
];

const BMI_RECOMMENDATIONS: [&str; 2] = [
    "वजन नियंत्रण की आवश्यकता",
    "संतुलित आहार और व्यायाम करें",
];

const FALLBACK_RECOMMENDATION: &str = "कृपया डॉक्टर से सलाह लें";

const MAX_RECOMMENDATIONS: usize = 5;

/// A point-in-time set of physiological measurements for one patient.
/// Missing fields are replaced with population defaults before scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalSnapshot {
    /// Age in years
    pub age: Option<i32>,
    /// Self-reported sex
    pub sex: Option<String>,
    /// Systolic blood pressure in mmHg
    pub systolic: Option<i32>,
    /// Diastolic blood pressure in mmHg
    pub diastolic: Option<i32>,
    /// Heart rate in beats per minute
    pub heart_rate: Option<i32>,
    /// Body temperature in degrees Fahrenheit
    pub temperature: Option<f64>,
    /// Body weight in kilograms
    pub weight: Option<f64>,
    /// Body height in centimetres
    pub height: Option<f64>,
}

impl VitalSnapshot {
    /// Build a snapshot from a stored health record.
    ///
    /// The persistence schema carries no age or sex columns, so those two
    /// features always take their defaults during scoring.
    pub fn from_record(record: &HealthRecordRow) -> Self {
        Self {
            age: None,
            sex: None,
            systolic: record.systolic,
            diastolic: record.diastolic,
            heart_rate: record.heart_rate,
            temperature: record.temperature,
            weight: record.weight,
            height: record.height,
        }
    }
}

/// Resolved feature vector with every default applied
struct Features {
    age: i32,
    systolic: i32,
    diastolic: i32,
    heart_rate: i32,
    temperature: f64,
    bmi: f64,
}

/// One of four ordered severity categories derived from the risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a score in [0.0, 1.0] to a level. Total over the whole range;
    /// boundaries are inclusive lower bounds evaluated highest-first.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::Critical
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// The lowercase string stored and served for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// The level-specific recommendation string
    fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "🚨 तत्काल चिकित्सा सहायता लें",
            RiskLevel::High => "⚠️ 24 घंटे में डॉक्टर से मिलें",
            RiskLevel::Medium => "📅 जल्द ही स्वास्थ्य जांच कराएं",
            RiskLevel::Low => "✅ स्वास्थ्य सामान्य है, नियमित जांच कराते रहें",
        }
    }

    /// Critical and high results put their advice at the front of the list
    fn takes_priority(&self) -> bool {
        matches!(self, RiskLevel::Critical | RiskLevel::High)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of scoring one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskAssessment {
    /// Accumulated risk score, clamped to [0.0, 1.0]
    pub risk_score: f64,
    /// Severity category derived from the score
    pub risk_level: RiskLevel,
    /// At most five recommendation strings, highest priority first
    pub recommendations: Vec<String>,
    /// Populated only when scoring fell back to the safe default
    pub error: Option<String>,
}

/// Score a snapshot. Total function: never panics and never returns an
/// error to the caller. If feature extraction fails the engine degrades
/// to a safe medium-risk fallback with the failure description attached.
pub fn assess(snapshot: &VitalSnapshot) -> RiskAssessment {
    match extract_features(snapshot) {
        Ok(features) => score_features(&features),
        Err(detail) => {
            warn!("Risk scoring fell back to safe default: {}", detail);
            fallback_assessment(detail)
        }
    }
}

/// Apply defaults and derive BMI. Rejects non-finite measurements, which
/// would otherwise poison every comparison downstream.
fn extract_features(snapshot: &VitalSnapshot) -> Result<Features, String> {
    let temperature = snapshot.temperature.unwrap_or(DEFAULT_TEMPERATURE);
    let weight = snapshot.weight.unwrap_or(DEFAULT_WEIGHT_KG);
    let mut height = snapshot.height.unwrap_or(DEFAULT_HEIGHT_CM);

    if !temperature.is_finite() || !weight.is_finite() || !height.is_finite() {
        return Err("Non-finite measurement in vital snapshot".to_string());
    }

    // A zero or negative height must not divide the BMI computation
    if height <= 0.0 {
        height = DEFAULT_HEIGHT_CM;
    }

    let height_m = height / 100.0;
    let bmi = weight / (height_m * height_m);

    if !bmi.is_finite() {
        return Err("BMI computation produced a non-finite value".to_string());
    }

    Ok(Features {
        age: snapshot.age.unwrap_or(DEFAULT_AGE),
        systolic: snapshot.systolic.unwrap_or(DEFAULT_SYSTOLIC),
        diastolic: snapshot.diastolic.unwrap_or(DEFAULT_DIASTOLIC),
        heart_rate: snapshot.heart_rate.unwrap_or(DEFAULT_HEART_RATE),
        temperature,
        bmi,
    })
}

/// Additive risk-factor model. Categories are independent of one another;
/// within a category only the highest matching tier applies.
fn score_features(features: &Features) -> RiskAssessment {
    let mut score: f64 = 0.0;

    if features.systolic > 140 || features.diastolic > 90 {
        score += 0.3;
    } else if features.systolic > 130 || features.diastolic > 85 {
        score += 0.2;
    }

    if features.heart_rate > 100 || features.heart_rate < 60 {
        score += 0.2;
    }

    if features.temperature > 100.4 || features.temperature < 95.0 {
        score += 0.25;
    }

    if features.bmi > 30.0 {
        score += 0.15;
    } else if features.bmi > 25.0 {
        score += 0.10;
    }

    if features.age > 60 {
        score += 0.10;
    }

    let score = score.min(1.0);
    let level = RiskLevel::from_score(score);

    RiskAssessment {
        risk_score: score,
        risk_level: level,
        recommendations: build_recommendations(features, level),
        error: None,
    }
}

/// Category advice blocks in fixed order, then the level-specific string:
/// critical and high go to the front, medium and low to the back. The
/// final list is capped at five entries.
fn build_recommendations(features: &Features, level: RiskLevel) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();

    if features.systolic > 140 {
        recommendations.extend(BP_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }

    if features.heart_rate > 100 {
        recommendations.extend(HEART_RATE_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }

    if features.temperature > 100.4 {
        recommendations.extend(TEMPERATURE_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }

    if features.bmi > 25.0 {
        recommendations.extend(BMI_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }

    if level.takes_priority() {
        recommendations.insert(0, level.recommendation().to_string());
    } else {
        recommendations.push(level.recommendation().to_string());
    }

    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

/// Safe default returned when scoring cannot complete normally
fn fallback_assessment(detail: String) -> RiskAssessment {
    RiskAssessment {
        risk_score: 0.5,
        risk_level: RiskLevel::Medium,
        recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
        error: Some(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(
        systolic: i32,
        diastolic: i32,
        heart_rate: i32,
        temperature: f64,
        weight: f64,
        height: f64,
    ) -> VitalSnapshot {
        VitalSnapshot {
            age: Some(35),
            sex: Some("male".to_string()),
            systolic: Some(systolic),
            diastolic: Some(diastolic),
            heart_rate: Some(heart_rate),
            temperature: Some(temperature),
            weight: Some(weight),
            height: Some(height),
        }
    }

    #[test]
    fn test_empty_snapshot_uses_defaults_and_is_low_risk() {
        let result = assess(&VitalSnapshot::default());

        assert_eq!(result.risk_score, 0.0);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(
            result.recommendations,
            vec!["✅ स्वास्थ्य सामान्य है, नियमित जांच कराते रहें".to_string()]
        );
        assert!(result.error.is_none());
    }

    #[test]
    fn test_elevated_blood_pressure_alone_stays_low() {
        // 150/95 trips only the blood-pressure factor: score 0.3 is still
        // below the 0.4 medium boundary
        let result = assess(&snapshot(150, 95, 72, 98.6, 60.0, 165.0));

        assert!((result.risk_score - 0.3).abs() < f64::EPSILON);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_multiple_factors_reach_critical() {
        // BP 0.3 + heart rate 0.2 + temperature 0.25 + BMI>30 0.15 = 0.90
        let result = assess(&snapshot(145, 95, 110, 101.0, 90.0, 165.0));

        assert!((result.risk_score - 0.90).abs() < 1e-9);
        assert_eq!(result.risk_level, RiskLevel::Critical);

        // Critical advice leads, then the BP block, then the first heart-rate
        // string; the five-item cap drops everything after that
        assert_eq!(result.recommendations.len(), 5);
        assert_eq!(result.recommendations[0], "🚨 तत्काल चिकित्सा सहायता लें");
        assert_eq!(result.recommendations[1], BP_RECOMMENDATIONS[0]);
        assert_eq!(result.recommendations[2], BP_RECOMMENDATIONS[1]);
        assert_eq!(result.recommendations[3], BP_RECOMMENDATIONS[2]);
        assert_eq!(result.recommendations[4], HEART_RATE_RECOMMENDATIONS[0]);
    }

    #[test]
    fn test_score_clamped_to_one() {
        // Every factor at its maximum tier, plus age over 60
        let mut snap = snapshot(160, 100, 110, 102.0, 95.0, 165.0);
        snap.age = Some(70);
        let result = assess(&snap);

        assert!(result.risk_score <= 1.0);
        assert!((result.risk_score - 1.0).abs() < 1e-9);
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_low_heart_rate_scores_bradycardia() {
        let result = assess(&snapshot(120, 80, 50, 98.6, 60.0, 165.0));

        assert!((result.risk_score - 0.2).abs() < f64::EPSILON);
        // No heart-rate advice below 100 bpm; the condition is a high-rate check
        assert!(!result
            .recommendations
            .iter()
            .any(|r| r == HEART_RATE_RECOMMENDATIONS[0]));
    }

    #[test]
    fn test_level_mapping_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.39), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.59), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.79), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.8), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Critical);
    }

    #[test]
    fn test_recommendations_never_exceed_five() {
        let result = assess(&snapshot(160, 100, 110, 102.0, 95.0, 165.0));
        assert!(result.recommendations.len() <= 5);
    }

    #[test]
    fn test_assess_is_idempotent() {
        let snap = snapshot(145, 95, 110, 101.0, 90.0, 165.0);
        let first = assess(&snap);
        let second = assess(&snap);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_height_does_not_divide_by_zero() {
        let result = assess(&snapshot(120, 80, 72, 98.6, 60.0, 0.0));

        // Height defaults to 165 cm, giving a normal BMI
        assert_eq!(result.risk_score, 0.0);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_non_finite_input_degrades_to_fallback() {
        let result = assess(&snapshot(120, 80, 72, f64::NAN, 60.0, 165.0));

        assert_eq!(result.risk_score, 0.5);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.recommendations, vec![FALLBACK_RECOMMENDATION.to_string()]);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_overweight_bmi_tier() {
        // weight 75 at 165 cm gives BMI ~27.5: the 0.10 tier and the
        // weight-management advice
        let result = assess(&snapshot(120, 80, 72, 98.6, 75.0, 165.0));

        assert!((result.risk_score - 0.10).abs() < f64::EPSILON);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r == BMI_RECOMMENDATIONS[0]));
    }

    #[test]
    fn test_snapshot_from_record_defaults_age_and_sex() {
        let row = HealthRecordRow {
            id: "rec-1".to_string(),
            patient_id: "patient-1".to_string(),
            recorded_by: None,
            systolic: Some(150),
            diastolic: Some(95),
            heart_rate: Some(80),
            temperature: Some(98.6),
            weight: Some(60.0),
            height: Some(165.0),
            oxygen_saturation: None,
            symptoms: None,
            diagnosis: None,
            medications: None,
            notes: None,
            risk_score: None,
            risk_level: None,
            recommendations: None,
            recorded_at: "2026-08-01T10:00:00+00:00".to_string(),
        };

        let snap = VitalSnapshot::from_record(&row);
        assert!(snap.age.is_none());
        assert!(snap.sex.is_none());
        assert_eq!(snap.systolic, Some(150));
    }
}
