// Domain entities and value objects
pub mod conversions;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered user as exposed to the rest of the application.
/// Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Phone number used as the login identity
    pub phone_number: String,
    /// Optional email address
    pub email: Option<String>,
    /// Full display name
    pub full_name: String,
    /// Date of birth (ISO 8601 date)
    pub date_of_birth: Option<String>,
    /// Self-reported gender
    pub gender: Option<String>,
    /// Role: "patient", "asha" or "admin"
    pub role: String,
    /// Village the user lives in
    pub village: Option<String>,
    /// District the user lives in
    pub district: Option<String>,
    /// State the user lives in
    pub state: Option<String>,
    /// Postal code
    pub pincode: Option<String>,
    /// Preferred language code for messages
    pub preferred_language: String,
    /// Phone number to notify on emergencies
    pub emergency_contact: Option<String>,
    /// Whether the account is active
    pub is_active: bool,
    /// Whether the phone number was OTP-verified
    pub is_verified: bool,
    /// When the account was created (RFC 3339)
    pub created_at: String,
    /// Last successful login (RFC 3339)
    pub last_login: Option<String>,
}

/// A vital-signs health record with its risk assessment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRecord {
    /// Unique identifier
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
    /// Recommendations produced by the scoring engine
    pub recommendations: Vec<String>,
    /// When the vitals were recorded (RFC 3339)
    pub recorded_at: String,
}

/// A booked appointment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    /// Unique identifier
    pub id: String,
    /// Patient the appointment is for
    pub patient_id: String,
    /// Assigned ASHA worker, if any
    pub asha_worker_id: Option<String>,
    /// Scheduled date and time (RFC 3339)
    pub appointment_date: String,
    /// Kind of appointment, e.g. "checkup" or "vaccination"
    pub appointment_type: String,
    /// Status: scheduled, completed or cancelled
    pub status: String,
    /// Where the appointment takes place
    pub location: Option<String>,
    /// Additional notes
    pub notes: Option<String>,
    /// Whether a reminder was already sent
    pub reminder_sent: bool,
    /// When the appointment was booked (RFC 3339)
    pub created_at: String,
}

/// An emergency alert raised by a patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmergencyAlert {
    /// Unique identifier
    pub id: String,
    /// Patient who raised the alert
    pub patient_id: String,
    /// Kind of emergency, e.g. "medical" or "accident"
    pub alert_type: String,
    /// Severity: low, medium, high or critical
    pub severity: String,
    /// Free-text description
    pub description: Option<String>,
    /// Latitude of the reported location
    pub location_lat: Option<f64>,
    /// Longitude of the reported location
    pub location_lng: Option<f64>,
    /// Street address of the reported location
    pub address: Option<String>,
    /// Status: active, responding or resolved
    pub status: String,
    /// Responder assigned to the alert, if any
    pub responder_id: Option<String>,
    /// When the alert was raised (RFC 3339)
    pub created_at: String,
    /// When the alert was resolved (RFC 3339)
    pub resolved_at: Option<String>,
}
