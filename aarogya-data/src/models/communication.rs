use serde::{Deserialize, Serialize};

/// Storage model for an outbound message log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationLogRow {
    /// Unique identifier for the log entry
    pub id: String,

    /// User on whose behalf the message was sent
    pub user_id: String,

    /// Delivery channel: "sms" or "whatsapp"
    pub channel: String,

    /// Recipient phone number
    pub recipient: String,

    /// Message body
    pub message: String,

    /// Delivery status: pending, sent, delivered, failed
    pub status: String,

    /// When the send was attempted (RFC 3339)
    pub sent_at: String,

    /// When the provider confirmed delivery (RFC 3339)
    pub delivered_at: Option<String>,

    /// Message ID assigned by the SMS/WhatsApp provider
    pub external_id: Option<String>,
}

/// Input data for recording an outbound message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommunicationLogRow {
    pub user_id: String,
    pub channel: String,
    pub recipient: String,
    pub message: String,
    pub status: String,
    pub external_id: Option<String>,
}
