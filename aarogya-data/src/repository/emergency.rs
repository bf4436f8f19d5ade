use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Row;
use tracing::debug;
use uuid::Uuid;

use crate::database::get_db_pool;
use crate::models::emergency::{CreateEmergencyAlertRow, EmergencyAlertRow};
use super::errors::RepositoryError;

/// Repository trait for emergency alerts
#[async_trait]
pub trait EmergencyAlertRepositoryTrait: Send + Sync {
    /// Raise a new emergency alert
    async fn create(&self, request: CreateEmergencyAlertRow) -> Result<EmergencyAlertRow, RepositoryError>;

    /// List alerts raised by one patient, newest first
    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<EmergencyAlertRow>, RepositoryError>;

    /// List the most recent alerts across all patients, capped at `limit`
    async fn list_recent(&self, limit: usize) -> Result<Vec<EmergencyAlertRow>, RepositoryError>;
}

const ALERT_COLUMNS: &str = "id, patient_id, alert_type, severity, description, location_lat, \
     location_lng, address, status, responder_id, response_time, created_at, resolved_at";

fn map_alert_row(row: &Row<'_>) -> rusqlite::Result<EmergencyAlertRow> {
    Ok(EmergencyAlertRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        alert_type: row.get(2)?,
        severity: row.get(3)?,
        description: row.get(4)?,
        location_lat: row.get(5)?,
        location_lng: row.get(6)?,
        address: row.get(7)?,
        status: row.get(8)?,
        responder_id: row.get(9)?,
        response_time: row.get(10)?,
        created_at: row.get(11)?,
        resolved_at: row.get(12)?,
    })
}

/// SQLite-backed repository for emergency alerts
#[derive(Debug, Clone, Default)]
pub struct EmergencyAlertRepository;

impl EmergencyAlertRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmergencyAlertRepositoryTrait for EmergencyAlertRepository {
    async fn create(&self, request: CreateEmergencyAlertRow) -> Result<EmergencyAlertRow, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let alert = EmergencyAlertRow {
            id: Uuid::new_v4().to_string(),
            patient_id: request.patient_id,
            alert_type: request.alert_type,
            severity: request.severity,
            description: request.description,
            location_lat: request.location_lat,
            location_lng: request.location_lng,
            address: request.address,
            status: "active".to_string(),
            responder_id: None,
            response_time: None,
            created_at: Utc::now().to_rfc3339(),
            resolved_at: None,
        };

        debug!("Raising emergency alert {} for patient {}", alert.id, alert.patient_id);

        conn.execute(
            "INSERT INTO emergency_alerts (id, patient_id, alert_type, severity, description, \
             location_lat, location_lng, address, status, responder_id, response_time, \
             created_at, resolved_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                alert.id,
                alert.patient_id,
                alert.alert_type,
                alert.severity,
                alert.description,
                alert.location_lat,
                alert.location_lng,
                alert.address,
                alert.status,
                alert.responder_id,
                alert.response_time,
                alert.created_at,
                alert.resolved_at,
            ],
        )?;

        Ok(alert)
    }

    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<EmergencyAlertRow>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM emergency_alerts WHERE patient_id = ?1 ORDER BY created_at DESC",
            ALERT_COLUMNS
        ))?;

        let rows = stmt.query_map([patient_id], map_alert_row)?;

        let mut result = Vec::new();
        for alert in rows {
            result.push(alert?);
        }

        Ok(result)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<EmergencyAlertRow>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM emergency_alerts ORDER BY created_at DESC LIMIT ?1",
            ALERT_COLUMNS
        ))?;

        let rows = stmt.query_map([limit as i64], map_alert_row)?;

        let mut result = Vec::new();
        for alert in rows {
            result.push(alert?);
        }

        Ok(result)
    }
}

/// Mock emergency alert repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory implementation of EmergencyAlertRepositoryTrait for testing
    #[derive(Default)]
    pub struct MockEmergencyAlertRepository {
        alerts: Mutex<Vec<EmergencyAlertRow>>,
    }

    impl MockEmergencyAlertRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl EmergencyAlertRepositoryTrait for MockEmergencyAlertRepository {
        async fn create(&self, request: CreateEmergencyAlertRow) -> Result<EmergencyAlertRow, RepositoryError> {
            let alert = EmergencyAlertRow {
                id: Uuid::new_v4().to_string(),
                patient_id: request.patient_id,
                alert_type: request.alert_type,
                severity: request.severity,
                description: request.description,
                location_lat: request.location_lat,
                location_lng: request.location_lng,
                address: request.address,
                status: "active".to_string(),
                responder_id: None,
                response_time: None,
                created_at: Utc::now().to_rfc3339(),
                resolved_at: None,
            };

            self.alerts.lock()?.push(alert.clone());
            Ok(alert)
        }

        async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<EmergencyAlertRow>, RepositoryError> {
            let alerts = self.alerts.lock()?;
            let mut matching: Vec<EmergencyAlertRow> = alerts
                .iter()
                .filter(|a| a.patient_id == patient_id)
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(matching)
        }

        async fn list_recent(&self, limit: usize) -> Result<Vec<EmergencyAlertRow>, RepositoryError> {
            let alerts = self.alerts.lock()?;
            let mut all: Vec<EmergencyAlertRow> = alerts.iter().cloned().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            all.truncate(limit);
            Ok(all)
        }
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_raise_and_list() {
        let repo = MockEmergencyAlertRepository::new();

        let alert = repo
            .create(CreateEmergencyAlertRow {
                patient_id: "patient-1".to_string(),
                alert_type: "medical".to_string(),
                severity: "high".to_string(),
                description: Some("Chest pain".to_string()),
                location_lat: Some(19.07),
                location_lng: Some(72.87),
                address: None,
            })
            .await
            .unwrap();

        assert_eq!(alert.status, "active");

        let own = repo.list_for_patient("patient-1").await.unwrap();
        assert_eq!(own.len(), 1);

        let recent = repo.list_recent(50).await.unwrap();
        assert_eq!(recent.len(), 1);
    }
}
