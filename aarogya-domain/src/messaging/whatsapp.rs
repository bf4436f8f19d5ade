use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{normalize_number, DeliveryOutcome, MessagingConfig, MessagingError};

/// Spacing between consecutive sends in a bulk broadcast, to stay inside
/// the provider's rate limits
const BULK_SEND_SPACING: Duration = Duration::from_millis(100);

/// Client for the WhatsApp Business Cloud API.
/// Runs in simulation mode when credentials are not configured.
#[derive(Clone)]
pub struct WhatsAppClient {
    config: MessagingConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GraphMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    messages: Option<Vec<GraphMessage>>,
}

impl WhatsAppClient {
    /// Create a new client from explicit configuration
    pub fn new(config: MessagingConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Send one WhatsApp text message. Provider-side rejections are
    /// reported in the outcome, not as an error.
    pub async fn send(&self, to: &str, body: &str) -> Result<DeliveryOutcome, MessagingError> {
        let recipient = normalize_number(to)?;

        if !self.config.whatsapp_configured() {
            info!("WhatsApp provider not configured, simulating send to {}", recipient);
            return Ok(DeliveryOutcome {
                recipient,
                channel: "whatsapp".to_string(),
                success: true,
                external_id: None,
                detail: Some("simulated".to_string()),
            });
        }

        let token = self.config.whatsapp_token.as_deref().unwrap_or_default();
        let phone_id = self.config.whatsapp_phone_id.as_deref().unwrap_or_default();

        let url = format!("https://graph.facebook.com/v18.0/{}/messages", phone_id);
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": recipient,
            "type": "text",
            "text": { "body": body }
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            let parsed: GraphResponse = response.json().await?;
            let external_id = parsed
                .messages
                .and_then(|mut m| if m.is_empty() { None } else { Some(m.remove(0).id) });

            info!("WhatsApp message accepted for {}", recipient);
            Ok(DeliveryOutcome {
                recipient,
                channel: "whatsapp".to_string(),
                success: true,
                external_id,
                detail: None,
            })
        } else {
            let detail = format!("provider returned {}", response.status());
            warn!("WhatsApp send to {} failed: {}", recipient, detail);

            Ok(DeliveryOutcome {
                recipient,
                channel: "whatsapp".to_string(),
                success: false,
                external_id: None,
                detail: Some(detail),
            })
        }
    }

    /// Send the same message to many recipients, spacing sends to respect
    /// provider rate limits. Per-recipient failures do not abort the run.
    pub async fn send_bulk(&self, recipients: &[String], body: &str) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::with_capacity(recipients.len());

        for (index, recipient) in recipients.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(BULK_SEND_SPACING).await;
            }

            match self.send(recipient, body).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => outcomes.push(DeliveryOutcome {
                    recipient: recipient.clone(),
                    channel: "whatsapp".to_string(),
                    success: false,
                    external_id: None,
                    detail: Some(e.to_string()),
                }),
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_simulates_send() {
        let client = WhatsAppClient::new(MessagingConfig::default());
        let outcome = client.send("9876543210", "hello").await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.channel, "whatsapp");
        assert_eq!(outcome.detail.as_deref(), Some("simulated"));
    }

    #[tokio::test]
    async fn test_bulk_send_reports_every_recipient() {
        let client = WhatsAppClient::new(MessagingConfig::default());
        let recipients = vec![
            "9876543210".to_string(),
            "bad-number".to_string(),
            "9123456789".to_string(),
        ];

        let outcomes = client.send_bulk(&recipients, "broadcast").await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[2].success);
    }
}
