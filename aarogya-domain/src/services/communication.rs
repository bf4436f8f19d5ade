use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;

use aarogya_data::models::communication::CreateCommunicationLogRow;
use aarogya_data::repository::{
    CommunicationLogRepositoryTrait, RepositoryError, UserRepositoryTrait,
};

use crate::auth::UserInfo;
use crate::messaging::{DeliveryOutcome, SmsClient, WhatsAppClient};

/// Communication service errors
#[derive(Debug, Error)]
pub enum CommunicationServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requester lacks the role required for outbound messaging
    #[error("Access denied")]
    AccessDenied,

    /// No recipients matched the broadcast target
    #[error("No recipients found: {0}")]
    NoRecipients(String),

    /// Messaging failure
    #[error("Messaging error: {0}")]
    Messaging(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for CommunicationServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(msg) => CommunicationServiceError::Validation(msg),
            _ => CommunicationServiceError::Repository(err.to_string()),
        }
    }
}

/// Delivery channel for outbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Whatsapp,
}

impl Channel {
    fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
        }
    }
}

/// Input for a village-wide broadcast
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    /// Village whose patients receive the message
    pub village: String,
    /// Message body
    pub message: String,
    /// Delivery channel
    pub channel: Channel,
}

/// Outbound messaging to individual recipients and village-wide
/// broadcasts. Restricted to ASHA workers and admins; every attempt is
/// logged per recipient.
pub struct CommunicationService<U: UserRepositoryTrait, L: CommunicationLogRepositoryTrait> {
    users: U,
    logs: L,
    sms: SmsClient,
    whatsapp: WhatsAppClient,
}

impl<U, L> CommunicationService<U, L>
where
    U: UserRepositoryTrait + Send + Sync,
    L: CommunicationLogRepositoryTrait + Send + Sync,
{
    /// Create a new communication service
    pub fn new(users: U, logs: L, sms: SmsClient, whatsapp: WhatsAppClient) -> Self {
        Self {
            users,
            logs,
            sms,
            whatsapp,
        }
    }

    fn authorize(&self, requester: &UserInfo) -> Result<(), CommunicationServiceError> {
        if requester.can_view_any_patient() {
            Ok(())
        } else {
            Err(CommunicationServiceError::AccessDenied)
        }
    }

    async fn log_outcome(&self, sender_id: &str, outcome: &DeliveryOutcome, message: &str) {
        let status = if outcome.success { "sent" } else { "failed" };

        let result = self
            .logs
            .record(CreateCommunicationLogRow {
                user_id: sender_id.to_string(),
                channel: outcome.channel.clone(),
                recipient: outcome.recipient.clone(),
                message: message.to_string(),
                status: status.to_string(),
                external_id: outcome.external_id.clone(),
            })
            .await;

        if let Err(e) = result {
            warn!("Failed to log {} delivery: {}", outcome.channel, e);
        }
    }

    /// Send one message to one recipient over the given channel
    pub async fn send(
        &self,
        requester: &UserInfo,
        recipient: &str,
        message: &str,
        channel: Channel,
    ) -> Result<DeliveryOutcome, CommunicationServiceError> {
        self.authorize(requester)?;

        if message.trim().is_empty() {
            return Err(CommunicationServiceError::Validation(
                "Message must not be empty".to_string(),
            ));
        }

        let outcome = match channel {
            Channel::Sms => self.sms.send(recipient, message).await,
            Channel::Whatsapp => self.whatsapp.send(recipient, message).await,
        }
        .map_err(|e| CommunicationServiceError::Messaging(e.to_string()))?;

        self.log_outcome(&requester.user_id, &outcome, message).await;

        Ok(outcome)
    }

    /// Broadcast a message to every patient in a village. Per-recipient
    /// failures are reported in the outcome list, not as an error.
    pub async fn broadcast(
        &self,
        requester: &UserInfo,
        request: BroadcastRequest,
    ) -> Result<Vec<DeliveryOutcome>, CommunicationServiceError> {
        self.authorize(requester)?;

        if request.message.trim().is_empty() {
            return Err(CommunicationServiceError::Validation(
                "Message must not be empty".to_string(),
            ));
        }

        let patients = self.users.list_village_patients(&request.village).await?;
        if patients.is_empty() {
            return Err(CommunicationServiceError::NoRecipients(request.village));
        }

        let recipients: Vec<String> = patients.into_iter().map(|p| p.phone_number).collect();

        info!(
            "Broadcasting over {} to {} patients in {}",
            request.channel.as_str(),
            recipients.len(),
            request.village
        );

        let outcomes = match request.channel {
            Channel::Whatsapp => self.whatsapp.send_bulk(&recipients, &request.message).await,
            Channel::Sms => {
                let mut outcomes = Vec::with_capacity(recipients.len());
                for recipient in &recipients {
                    match self.sms.send(recipient, &request.message).await {
                        Ok(outcome) => outcomes.push(outcome),
                        Err(e) => outcomes.push(DeliveryOutcome {
                            recipient: recipient.clone(),
                            channel: "sms".to_string(),
                            success: false,
                            external_id: None,
                            detail: Some(e.to_string()),
                        }),
                    }
                }
                outcomes
            }
        };

        for outcome in &outcomes {
            self.log_outcome(&requester.user_id, outcome, &request.message).await;
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessagingConfig;
    use aarogya_data::models::user::UserRecord;
    use aarogya_data::repository::mocks::{MockCommunicationLogRepository, MockUserRepository};

    fn villager(id: &str, phone: &str, village: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            phone_number: phone.to_string(),
            email: None,
            password_hash: "x".to_string(),
            full_name: "Test Patient".to_string(),
            date_of_birth: None,
            gender: None,
            role: "patient".to_string(),
            village: Some(village.to_string()),
            district: None,
            state: None,
            pincode: None,
            preferred_language: "hi".to_string(),
            emergency_contact: None,
            is_active: true,
            is_verified: true,
            created_at: "2026-08-01T10:00:00+00:00".to_string(),
            updated_at: "2026-08-01T10:00:00+00:00".to_string(),
            last_login: None,
        }
    }

    fn service_with_users(
        users: MockUserRepository,
    ) -> CommunicationService<MockUserRepository, MockCommunicationLogRepository> {
        CommunicationService::new(
            users,
            MockCommunicationLogRepository::new(),
            SmsClient::new(MessagingConfig::default()),
            WhatsAppClient::new(MessagingConfig::default()),
        )
    }

    fn asha(user_id: &str) -> UserInfo {
        UserInfo {
            user_id: user_id.to_string(),
            role: "asha".to_string(),
        }
    }

    fn patient(user_id: &str) -> UserInfo {
        UserInfo {
            user_id: user_id.to_string(),
            role: "patient".to_string(),
        }
    }

    #[tokio::test]
    async fn test_patients_cannot_send_messages() {
        let service = service_with_users(MockUserRepository::new());

        let result = service
            .send(&patient("p1"), "9876543210", "hello", Channel::Sms)
            .await;
        assert!(matches!(result, Err(CommunicationServiceError::AccessDenied)));
    }

    #[tokio::test]
    async fn test_asha_sends_sms() {
        let service = service_with_users(MockUserRepository::new());

        let outcome = service
            .send(&asha("w1"), "9876543210", "checkup tomorrow", Channel::Sms)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.channel, "sms");
    }

    #[tokio::test]
    async fn test_broadcast_reaches_village_patients() {
        let users = MockUserRepository::with_users(vec![
            villager("p1", "9876543210", "Rampur"),
            villager("p2", "9123456789", "Rampur"),
            villager("p3", "9988776655", "Sitapur"),
        ]);
        let service = service_with_users(users);

        let outcomes = service
            .broadcast(
                &asha("w1"),
                BroadcastRequest {
                    village: "Rampur".to_string(),
                    message: "Vaccination camp on Sunday".to_string(),
                    channel: Channel::Whatsapp,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.success));
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_village_is_an_error() {
        let service = service_with_users(MockUserRepository::new());

        let result = service
            .broadcast(
                &asha("w1"),
                BroadcastRequest {
                    village: "Nowhere".to_string(),
                    message: "hello".to_string(),
                    channel: Channel::Sms,
                },
            )
            .await;

        assert!(matches!(result, Err(CommunicationServiceError::NoRecipients(_))));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let service = service_with_users(MockUserRepository::new());

        let result = service
            .send(&asha("w1"), "9876543210", "   ", Channel::Sms)
            .await;
        assert!(matches!(result, Err(CommunicationServiceError::Validation(_))));
    }
}
