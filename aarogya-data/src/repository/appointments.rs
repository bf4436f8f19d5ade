use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Row;
use tracing::debug;
use uuid::Uuid;

use crate::database::get_db_pool;
use crate::models::appointment::{AppointmentRow, CreateAppointmentRow};
use super::errors::RepositoryError;

/// Repository trait for appointments
#[async_trait]
pub trait AppointmentRepositoryTrait: Send + Sync {
    /// Book a new appointment
    async fn create(&self, request: CreateAppointmentRow) -> Result<AppointmentRow, RepositoryError>;

    /// List appointments for one patient, soonest first, capped at `limit`
    async fn list_for_patient(
        &self,
        patient_id: &str,
        limit: usize,
    ) -> Result<Vec<AppointmentRow>, RepositoryError>;
}

const APPOINTMENT_COLUMNS: &str = "id, patient_id, asha_worker_id, appointment_date, \
     appointment_type, status, location, notes, reminder_sent, created_at";

fn map_appointment_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        asha_worker_id: row.get(2)?,
        appointment_date: row.get(3)?,
        appointment_type: row.get(4)?,
        status: row.get(5)?,
        location: row.get(6)?,
        notes: row.get(7)?,
        reminder_sent: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
    })
}

/// SQLite-backed repository for appointments
#[derive(Debug, Clone, Default)]
pub struct AppointmentRepository;

impl AppointmentRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AppointmentRepositoryTrait for AppointmentRepository {
    async fn create(&self, request: CreateAppointmentRow) -> Result<AppointmentRow, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let appointment = AppointmentRow {
            id: Uuid::new_v4().to_string(),
            patient_id: request.patient_id,
            asha_worker_id: request.asha_worker_id,
            appointment_date: request.appointment_date,
            appointment_type: request.appointment_type,
            status: "scheduled".to_string(),
            location: request.location,
            notes: request.notes,
            reminder_sent: false,
            created_at: Utc::now().to_rfc3339(),
        };

        debug!("Booking appointment {} for patient {}", appointment.id, appointment.patient_id);

        conn.execute(
            "INSERT INTO appointments (id, patient_id, asha_worker_id, appointment_date, \
             appointment_type, status, location, notes, reminder_sent, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                appointment.id,
                appointment.patient_id,
                appointment.asha_worker_id,
                appointment.appointment_date,
                appointment.appointment_type,
                appointment.status,
                appointment.location,
                appointment.notes,
                appointment.reminder_sent as i64,
                appointment.created_at,
            ],
        )?;

        Ok(appointment)
    }

    async fn list_for_patient(
        &self,
        patient_id: &str,
        limit: usize,
    ) -> Result<Vec<AppointmentRow>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM appointments WHERE patient_id = ?1 \
             ORDER BY appointment_date ASC LIMIT ?2",
            APPOINTMENT_COLUMNS
        ))?;

        let rows = stmt.query_map(rusqlite::params![patient_id, limit as i64], map_appointment_row)?;

        let mut result = Vec::new();
        for appointment in rows {
            result.push(appointment?);
        }

        Ok(result)
    }
}

/// Mock appointment repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory implementation of AppointmentRepositoryTrait for testing
    #[derive(Default)]
    pub struct MockAppointmentRepository {
        appointments: Mutex<Vec<AppointmentRow>>,
    }

    impl MockAppointmentRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl AppointmentRepositoryTrait for MockAppointmentRepository {
        async fn create(&self, request: CreateAppointmentRow) -> Result<AppointmentRow, RepositoryError> {
            let appointment = AppointmentRow {
                id: Uuid::new_v4().to_string(),
                patient_id: request.patient_id,
                asha_worker_id: request.asha_worker_id,
                appointment_date: request.appointment_date,
                appointment_type: request.appointment_type,
                status: "scheduled".to_string(),
                location: request.location,
                notes: request.notes,
                reminder_sent: false,
                created_at: Utc::now().to_rfc3339(),
            };

            self.appointments.lock()?.push(appointment.clone());
            Ok(appointment)
        }

        async fn list_for_patient(
            &self,
            patient_id: &str,
            limit: usize,
        ) -> Result<Vec<AppointmentRow>, RepositoryError> {
            let appointments = self.appointments.lock()?;
            let mut matching: Vec<AppointmentRow> = appointments
                .iter()
                .filter(|a| a.patient_id == patient_id)
                .cloned()
                .collect();
            matching.sort_by(|a, b| a.appointment_date.cmp(&b.appointment_date));
            matching.truncate(limit);
            Ok(matching)
        }
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_book_and_list() {
        let repo = MockAppointmentRepository::new();

        let appointment = repo
            .create(CreateAppointmentRow {
                patient_id: "patient-1".to_string(),
                asha_worker_id: None,
                appointment_date: "2026-09-01T10:00:00+00:00".to_string(),
                appointment_type: "checkup".to_string(),
                location: Some("PHC Rampur".to_string()),
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(appointment.status, "scheduled");
        assert!(!appointment.reminder_sent);

        let listed = repo.list_for_patient("patient-1", 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].appointment_type, "checkup");
    }
}
