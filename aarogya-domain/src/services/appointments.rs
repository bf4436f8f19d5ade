use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use utoipa::ToSchema;

use aarogya_data::models::appointment::CreateAppointmentRow;
use aarogya_data::repository::{AppointmentRepositoryTrait, RepositoryError};

use crate::auth::UserInfo;
use crate::entities::conversions::convert_to_domain_appointment;
use crate::entities::Appointment;

/// How many upcoming appointments a listing returns at most
pub const APPOINTMENT_LIST_CAP: usize = 20;

/// Appointment service errors
#[derive(Debug, Error)]
pub enum AppointmentServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for AppointmentServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(msg) => AppointmentServiceError::Validation(msg),
            _ => AppointmentServiceError::Repository(err.to_string()),
        }
    }
}

/// Input for booking an appointment
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookAppointmentRequest {
    /// Scheduled date and time (RFC 3339)
    pub appointment_date: String,
    /// Kind of appointment, e.g. "checkup" or "vaccination"
    pub appointment_type: String,
    /// Assigned ASHA worker, if any
    pub asha_worker_id: Option<String>,
    /// Where the appointment takes place
    pub location: Option<String>,
    /// Additional notes
    pub notes: Option<String>,
}

/// Appointment booking and listing
pub struct AppointmentService<R: AppointmentRepositoryTrait> {
    repository: R,
}

impl<R: AppointmentRepositoryTrait> AppointmentService<R> {
    /// Create a new appointment service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Book an appointment for the requesting patient
    pub async fn book(
        &self,
        requester: &UserInfo,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentServiceError> {
        let when = DateTime::parse_from_rfc3339(&request.appointment_date).map_err(|_| {
            AppointmentServiceError::Validation(
                "appointment_date must be an RFC 3339 date-time".to_string(),
            )
        })?;

        if when < Utc::now() {
            return Err(AppointmentServiceError::Validation(
                "appointment_date must be in the future".to_string(),
            ));
        }

        if request.appointment_type.trim().is_empty() {
            return Err(AppointmentServiceError::Validation(
                "appointment_type must not be empty".to_string(),
            ));
        }

        let row = self
            .repository
            .create(CreateAppointmentRow {
                patient_id: requester.user_id.clone(),
                asha_worker_id: request.asha_worker_id,
                appointment_date: request.appointment_date,
                appointment_type: request.appointment_type,
                location: request.location,
                notes: request.notes,
            })
            .await?;

        info!("Patient {} booked appointment {}", requester.user_id, row.id);
        Ok(convert_to_domain_appointment(row))
    }

    /// List the requester's appointments, soonest first
    pub async fn list(&self, requester: &UserInfo) -> Result<Vec<Appointment>, AppointmentServiceError> {
        let rows = self
            .repository
            .list_for_patient(&requester.user_id, APPOINTMENT_LIST_CAP)
            .await?;

        Ok(rows.into_iter().map(convert_to_domain_appointment).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarogya_data::repository::mocks::MockAppointmentRepository;

    fn patient(user_id: &str) -> UserInfo {
        UserInfo {
            user_id: user_id.to_string(),
            role: "patient".to_string(),
        }
    }

    fn booking(date: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            appointment_date: date.to_string(),
            appointment_type: "checkup".to_string(),
            asha_worker_id: None,
            location: Some("PHC Rampur".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_book_and_list() {
        let service = AppointmentService::new(MockAppointmentRepository::new());
        let future = (Utc::now() + chrono::Duration::days(3)).to_rfc3339();

        let appointment = service.book(&patient("p1"), booking(&future)).await.unwrap();
        assert_eq!(appointment.status, "scheduled");
        assert_eq!(appointment.patient_id, "p1");

        let listed = service.list(&patient("p1")).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_book_rejects_past_date() {
        let service = AppointmentService::new(MockAppointmentRepository::new());
        let past = (Utc::now() - chrono::Duration::days(1)).to_rfc3339();

        let result = service.book(&patient("p1"), booking(&past)).await;
        assert!(matches!(result, Err(AppointmentServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_book_rejects_malformed_date() {
        let service = AppointmentService::new(MockAppointmentRepository::new());

        let result = service.book(&patient("p1"), booking("tomorrow")).await;
        assert!(matches!(result, Err(AppointmentServiceError::Validation(_))));
    }
}
