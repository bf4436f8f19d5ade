use serde::Deserialize;
use tracing::{info, warn};

use super::{normalize_number, DeliveryOutcome, MessagingConfig, MessagingError};

/// Client for sending SMS through a Twilio-compatible REST API.
/// Runs in simulation mode when credentials are not configured.
#[derive(Clone)]
pub struct SmsClient {
    config: MessagingConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    sid: Option<String>,
    message: Option<String>,
}

impl SmsClient {
    /// Create a new client from explicit configuration
    pub fn new(config: MessagingConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Send one SMS. Never returns a transport error to the caller for a
    /// provider-side rejection; that is reported in the outcome instead.
    pub async fn send(&self, to: &str, body: &str) -> Result<DeliveryOutcome, MessagingError> {
        let recipient = normalize_number(to)?;

        if !self.config.sms_configured() {
            info!("SMS provider not configured, simulating send to {}", recipient);
            return Ok(DeliveryOutcome {
                recipient,
                channel: "sms".to_string(),
                success: true,
                external_id: None,
                detail: Some("simulated".to_string()),
            });
        }

        let account_sid = self.config.sms_account_sid.as_deref().unwrap_or_default();
        let auth_token = self.config.sms_auth_token.as_deref().unwrap_or_default();
        let from = self.config.sms_from_number.as_deref().unwrap_or_default();

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("To", recipient.as_str()), ("From", from), ("Body", body)])
            .send()
            .await?;

        if response.status().is_success() {
            let parsed: ProviderResponse = response.json().await?;
            info!("SMS accepted for {}", recipient);
            Ok(DeliveryOutcome {
                recipient,
                channel: "sms".to_string(),
                success: true,
                external_id: parsed.sid,
                detail: None,
            })
        } else {
            let status = response.status();
            let parsed: ProviderResponse = response.json().await.unwrap_or(ProviderResponse {
                sid: None,
                message: None,
            });
            let detail = parsed
                .message
                .unwrap_or_else(|| format!("provider returned {}", status));
            warn!("SMS send to {} failed: {}", recipient, detail);

            Ok(DeliveryOutcome {
                recipient,
                channel: "sms".to_string(),
                success: false,
                external_id: None,
                detail: Some(detail),
            })
        }
    }

    /// Send a one-time verification code
    pub async fn send_otp(&self, to: &str, code: &str) -> Result<DeliveryOutcome, MessagingError> {
        let body = format!(
            "आरोग्य सहायक OTP: {} (5 मिनट के लिए वैध). इसे किसी से साझा न करें.",
            code
        );
        self.send(to, &body).await
    }

    /// Welcome message sent after registration
    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<DeliveryOutcome, MessagingError> {
        let body = format!(
            "नमस्ते {}! आरोग्य सहायक में आपका स्वागत है. आपका खाता बन गया है.",
            name
        );
        self.send(to, &body).await
    }

    /// Alert the emergency contact when a record scores high or critical
    pub async fn send_health_alert(
        &self,
        to: &str,
        patient_name: &str,
        risk_level: &str,
    ) -> Result<DeliveryOutcome, MessagingError> {
        let body = format!(
            "स्वास्थ्य चेतावनी: {} की जांच में जोखिम स्तर '{}' पाया गया. कृपया संपर्क करें.",
            patient_name, risk_level
        );
        self.send(to, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_simulates_send() {
        let client = SmsClient::new(MessagingConfig::default());
        let outcome = client.send("9876543210", "hello").await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.channel, "sms");
        assert_eq!(outcome.recipient, "+919876543210");
        assert_eq!(outcome.detail.as_deref(), Some("simulated"));
        assert!(outcome.external_id.is_none());
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_an_error() {
        let client = SmsClient::new(MessagingConfig::default());
        assert!(client.send("12345", "hello").await.is_err());
    }

    #[tokio::test]
    async fn test_otp_message_contains_code() {
        let client = SmsClient::new(MessagingConfig::default());
        let outcome = client.send_otp("9876543210", "482913").await.unwrap();
        assert!(outcome.success);
    }
}
