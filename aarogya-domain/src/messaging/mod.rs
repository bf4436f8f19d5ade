//! Outbound SMS and WhatsApp messaging
//!
//! Both clients are constructed from an explicit [`MessagingConfig`]. When
//! provider credentials are absent the clients run in simulation mode:
//! sends are logged and reported as successful without any network call,
//! so development and test environments need no provider account.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

pub mod sms;
pub mod whatsapp;

pub use sms::SmsClient;
pub use whatsapp::WhatsAppClient;

/// Messaging errors
#[derive(Debug, Error)]
pub enum MessagingError {
    /// HTTP transport error talking to the provider
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider rejected the send
    #[error("Provider rejected message: {0}")]
    Rejected(String),

    /// Recipient phone number could not be normalized
    #[error("Invalid recipient phone number: {0}")]
    InvalidRecipient(String),
}

/// Credentials and endpoints for outbound messaging providers.
/// Built once at startup and passed to the clients that need it.
#[derive(Debug, Clone, Default)]
pub struct MessagingConfig {
    /// SMS provider account SID
    pub sms_account_sid: Option<String>,
    /// SMS provider auth token
    pub sms_auth_token: Option<String>,
    /// Sender phone number for SMS
    pub sms_from_number: Option<String>,
    /// WhatsApp Business API access token
    pub whatsapp_token: Option<String>,
    /// WhatsApp Business phone number id
    pub whatsapp_phone_id: Option<String>,
}

impl MessagingConfig {
    /// Load configuration from environment variables.
    /// Missing variables leave the corresponding channel in simulation mode.
    pub fn from_env() -> Self {
        Self {
            sms_account_sid: env::var("SMS_ACCOUNT_SID").ok(),
            sms_auth_token: env::var("SMS_AUTH_TOKEN").ok(),
            sms_from_number: env::var("SMS_FROM_NUMBER").ok(),
            whatsapp_token: env::var("WHATSAPP_TOKEN").ok(),
            whatsapp_phone_id: env::var("WHATSAPP_PHONE_ID").ok(),
        }
    }

    /// Whether SMS credentials are fully configured
    pub fn sms_configured(&self) -> bool {
        self.sms_account_sid.is_some()
            && self.sms_auth_token.is_some()
            && self.sms_from_number.is_some()
    }

    /// Whether WhatsApp credentials are fully configured
    pub fn whatsapp_configured(&self) -> bool {
        self.whatsapp_token.is_some() && self.whatsapp_phone_id.is_some()
    }
}

/// Result of one delivery attempt to one recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    /// The normalized recipient number
    pub recipient: String,
    /// Delivery channel: "sms" or "whatsapp"
    pub channel: String,
    /// Whether the provider accepted the message
    pub success: bool,
    /// Message id assigned by the provider, absent in simulation mode
    pub external_id: Option<String>,
    /// Failure detail when the send did not succeed
    pub detail: Option<String>,
}

/// Normalize an Indian phone number to E.164.
/// Bare 10-digit numbers get the +91 country code prefixed.
pub fn normalize_number(number: &str) -> Result<String, MessagingError> {
    let trimmed = number.trim();

    if trimmed.starts_with('+') {
        return Ok(trimmed.to_string());
    }

    if trimmed.len() == 10 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Ok(format!("+91{}", trimmed));
    }

    Err(MessagingError::InvalidRecipient(number.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_ten_digit_number() {
        assert_eq!(normalize_number("9876543210").unwrap(), "+919876543210");
    }

    #[test]
    fn test_normalize_keeps_e164() {
        assert_eq!(normalize_number("+919876543210").unwrap(), "+919876543210");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_number("12345").is_err());
        assert!(normalize_number("not-a-number").is_err());
    }

    #[test]
    fn test_unconfigured_channels() {
        let config = MessagingConfig::default();
        assert!(!config.sms_configured());
        assert!(!config.whatsapp_configured());
    }
}
