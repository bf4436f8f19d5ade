use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;

use aarogya_data::models::emergency::CreateEmergencyAlertRow;
use aarogya_data::repository::{
    EmergencyAlertRepositoryTrait, RepositoryError, UserRepositoryTrait,
};

use crate::auth::UserInfo;
use crate::entities::conversions::convert_to_domain_alert;
use crate::entities::EmergencyAlert;
use crate::messaging::{SmsClient, WhatsAppClient};

/// ASHA workers and admins see this many recent alerts at most
pub const ALERT_LIST_CAP: usize = 50;

const SEVERITIES: [&str; 4] = ["low", "medium", "high", "critical"];

/// Emergency service errors
#[derive(Debug, Error)]
pub enum EmergencyServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Alerting user not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for EmergencyServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => EmergencyServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => EmergencyServiceError::Validation(msg),
            _ => EmergencyServiceError::Repository(err.to_string()),
        }
    }
}

/// Input for raising an emergency alert
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RaiseAlertRequest {
    /// Kind of emergency; defaults to "medical"
    pub alert_type: Option<String>,
    /// Severity; defaults to "high"
    pub severity: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Latitude of the reported location
    pub location_lat: Option<f64>,
    /// Longitude of the reported location
    pub location_lng: Option<f64>,
    /// Street address of the reported location
    pub address: Option<String>,
}

/// Emergency alerting: persists the alert and notifies the patient's
/// emergency contact over SMS and WhatsApp
pub struct EmergencyService<R: EmergencyAlertRepositoryTrait, U: UserRepositoryTrait> {
    alerts: R,
    users: U,
    sms: SmsClient,
    whatsapp: WhatsAppClient,
}

impl<R, U> EmergencyService<R, U>
where
    R: EmergencyAlertRepositoryTrait + Send + Sync,
    U: UserRepositoryTrait + Send + Sync,
{
    /// Create a new emergency service
    pub fn new(alerts: R, users: U, sms: SmsClient, whatsapp: WhatsAppClient) -> Self {
        Self {
            alerts,
            users,
            sms,
            whatsapp,
        }
    }

    /// Raise an alert for the requesting patient. Contact notification is
    /// best effort: a failed send never fails the alert itself.
    pub async fn raise_alert(
        &self,
        requester: &UserInfo,
        request: RaiseAlertRequest,
    ) -> Result<EmergencyAlert, EmergencyServiceError> {
        let severity = request.severity.unwrap_or_else(|| "high".to_string());
        if !SEVERITIES.contains(&severity.as_str()) {
            return Err(EmergencyServiceError::Validation(format!(
                "Severity must be one of {:?}",
                SEVERITIES
            )));
        }

        let row = self
            .alerts
            .create(CreateEmergencyAlertRow {
                patient_id: requester.user_id.clone(),
                alert_type: request.alert_type.unwrap_or_else(|| "medical".to_string()),
                severity,
                description: request.description,
                location_lat: request.location_lat,
                location_lng: request.location_lng,
                address: request.address,
            })
            .await?;

        info!(
            "Emergency alert {} ({} / {}) raised by {}",
            row.id, row.alert_type, row.severity, row.patient_id
        );

        self.notify_emergency_contact(&row.patient_id, &row.severity).await;

        Ok(convert_to_domain_alert(row))
    }

    async fn notify_emergency_contact(&self, patient_id: &str, severity: &str) {
        let patient = match self.users.find_by_id(patient_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("Alerting patient {} has no user record", patient_id);
                return;
            }
            Err(e) => {
                warn!("Could not load patient {} for notification: {}", patient_id, e);
                return;
            }
        };

        let Some(contact) = patient.emergency_contact else {
            info!("Patient {} has no emergency contact configured", patient_id);
            return;
        };

        let message = format!(
            "आपातकालीन सूचना: {} को मदद चाहिए (गंभीरता: {}). कृपया तुरंत संपर्क करें.",
            patient.full_name, severity
        );

        if let Err(e) = self.sms.send(&contact, &message).await {
            warn!("Emergency SMS to {} failed: {}", contact, e);
        }
        if let Err(e) = self.whatsapp.send(&contact, &message).await {
            warn!("Emergency WhatsApp to {} failed: {}", contact, e);
        }
    }

    /// List alerts: patients see their own, ASHA workers and admins see
    /// the most recent alerts across all patients
    pub async fn list_alerts(&self, requester: &UserInfo) -> Result<Vec<EmergencyAlert>, EmergencyServiceError> {
        let rows = if requester.can_view_any_patient() {
            self.alerts.list_recent(ALERT_LIST_CAP).await?
        } else {
            self.alerts.list_for_patient(&requester.user_id).await?
        };

        Ok(rows.into_iter().map(convert_to_domain_alert).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessagingConfig;
    use aarogya_data::repository::mocks::{MockEmergencyAlertRepository, MockUserRepository};

    fn service() -> EmergencyService<MockEmergencyAlertRepository, MockUserRepository> {
        EmergencyService::new(
            MockEmergencyAlertRepository::new(),
            MockUserRepository::new(),
            SmsClient::new(MessagingConfig::default()),
            WhatsAppClient::new(MessagingConfig::default()),
        )
    }

    fn patient(user_id: &str) -> UserInfo {
        UserInfo {
            user_id: user_id.to_string(),
            role: "patient".to_string(),
        }
    }

    fn asha(user_id: &str) -> UserInfo {
        UserInfo {
            user_id: user_id.to_string(),
            role: "asha".to_string(),
        }
    }

    #[tokio::test]
    async fn test_raise_alert_applies_defaults() {
        let service = service();

        let alert = service
            .raise_alert(
                &patient("p1"),
                RaiseAlertRequest {
                    alert_type: None,
                    severity: None,
                    description: None,
                    location_lat: None,
                    location_lng: None,
                    address: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(alert.alert_type, "medical");
        assert_eq!(alert.severity, "high");
        assert_eq!(alert.status, "active");
    }

    #[tokio::test]
    async fn test_raise_alert_rejects_unknown_severity() {
        let service = service();

        let result = service
            .raise_alert(
                &patient("p1"),
                RaiseAlertRequest {
                    alert_type: None,
                    severity: Some("catastrophic".to_string()),
                    description: None,
                    location_lat: None,
                    location_lng: None,
                    address: None,
                },
            )
            .await;

        assert!(matches!(result, Err(EmergencyServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_patients_see_only_their_own_alerts() {
        let service = service();

        service
            .raise_alert(&patient("p1"), RaiseAlertRequest {
                alert_type: None,
                severity: None,
                description: None,
                location_lat: None,
                location_lng: None,
                address: None,
            })
            .await
            .unwrap();
        service
            .raise_alert(&patient("p2"), RaiseAlertRequest {
                alert_type: None,
                severity: None,
                description: None,
                location_lat: None,
                location_lng: None,
                address: None,
            })
            .await
            .unwrap();

        let own = service.list_alerts(&patient("p1")).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].patient_id, "p1");

        let all = service.list_alerts(&asha("w1")).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
