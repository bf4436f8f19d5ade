use serde::{Deserialize, Serialize};

/// Storage model for a vital-signs health record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecordRow {
    /// Unique identifier for the record
    pub id: String,

    /// Patient the record belongs to
    pub patient_id: String,

    /// User who entered the record (self or an ASHA worker)
    pub recorded_by: Option<String>,

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

    /// Blood oxygen saturation percentage
    pub oxygen_saturation: Option<f64>,

    /// Free-text symptoms
    pub symptoms: Option<String>,

    /// Free-text diagnosis
    pub diagnosis: Option<String>,

    /// Free-text medication notes
    pub medications: Option<String>,

    /// Additional notes
    pub notes: Option<String>,

    /// Risk score produced by the scoring engine, 0.0 to 1.0
    pub risk_score: Option<f64>,

    /// Risk level produced by the scoring engine
    pub risk_level: Option<String>,

    /// Recommendations produced by the scoring engine, JSON array of strings
    pub recommendations: Option<String>,

    /// When the vitals were recorded (RFC 3339)
    pub recorded_at: String,
}

/// Input data for creating a new health record.
/// Risk fields are filled in after the scoring engine has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHealthRecordRow {
    pub patient_id: String,
    pub recorded_by: Option<String>,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub heart_rate: Option<i32>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub oxygen_saturation: Option<f64>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: String,
}
