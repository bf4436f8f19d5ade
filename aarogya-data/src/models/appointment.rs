use serde::{Deserialize, Serialize};

/// Storage model for a booked appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRow {
    /// Unique identifier for the appointment
    pub id: String,

    /// Patient the appointment is for
    pub patient_id: String,

    /// Assigned ASHA worker, if any
    pub asha_worker_id: Option<String>,

    /// Scheduled date and time (RFC 3339)
    pub appointment_date: String,

    /// Appointment type: checkup, vaccination, emergency
    pub appointment_type: String,

    /// Status: scheduled, completed, cancelled
    pub status: String,

    /// Where the appointment takes place
    pub location: Option<String>,

    /// Additional notes
    pub notes: Option<String>,

    /// Whether a reminder message has been sent
    pub reminder_sent: bool,

    /// When the appointment was booked (RFC 3339)
    pub created_at: String,
}

/// Input data for booking a new appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRow {
    pub patient_id: String,
    pub asha_worker_id: Option<String>,
    pub appointment_date: String,
    pub appointment_type: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}
