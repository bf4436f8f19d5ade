use serde::{Deserialize, Serialize};

/// Storage model for an emergency alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyAlertRow {
    /// Unique identifier for the alert
    pub id: String,

    /// Patient who raised the alert
    pub patient_id: String,

    /// Alert type: medical, accident, disaster
    pub alert_type: String,

    /// Severity: low, medium, high, critical
    pub severity: String,

    /// Free-text description of the emergency
    pub description: Option<String>,

    /// GPS latitude
    pub location_lat: Option<f64>,

    /// GPS longitude
    pub location_lng: Option<f64>,

    /// Human-readable address
    pub address: Option<String>,

    /// Status: active, responded, resolved
    pub status: String,

    /// Responder who took the alert, if any
    pub responder_id: Option<String>,

    /// When a responder acknowledged the alert (RFC 3339)
    pub response_time: Option<String>,

    /// When the alert was raised (RFC 3339)
    pub created_at: String,

    /// When the alert was resolved (RFC 3339)
    pub resolved_at: Option<String>,
}

/// Input data for raising a new emergency alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmergencyAlertRow {
    pub patient_id: String,
    pub alert_type: String,
    pub severity: String,
    pub description: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub address: Option<String>,
}
