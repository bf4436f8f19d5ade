use serde::{Deserialize, Serialize};

/// Storage model for a registered user (patient, ASHA worker or admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier for the user
    pub id: String,

    /// Phone number used as the login identity
    pub phone_number: String,

    /// Optional email address
    pub email: Option<String>,

    /// PBKDF2 password hash in PHC string format
    pub password_hash: String,

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

    /// Preferred language code for messages (default "hi")
    pub preferred_language: String,

    /// Phone number to notify on emergencies
    pub emergency_contact: Option<String>,

    /// Whether the account is active
    pub is_active: bool,

    /// Whether the phone number was OTP-verified
    pub is_verified: bool,

    /// When the account was created (RFC 3339)
    pub created_at: String,

    /// When the account was last updated (RFC 3339)
    pub updated_at: String,

    /// Last successful login (RFC 3339)
    pub last_login: Option<String>,
}

/// Input data for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRecord {
    pub phone_number: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub role: String,
    pub village: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub preferred_language: String,
    pub emergency_contact: Option<String>,
}
