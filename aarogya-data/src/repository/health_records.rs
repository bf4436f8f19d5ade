use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Row;
use tracing::debug;
use uuid::Uuid;

use crate::database::get_db_pool;
use crate::models::health_record::{CreateHealthRecordRow, HealthRecordRow};
use super::errors::RepositoryError;

/// Repository trait for health records
#[async_trait]
pub trait HealthRecordRepositoryTrait: Send + Sync {
    /// Create a new health record from a request
    async fn create(&self, request: CreateHealthRecordRow) -> Result<HealthRecordRow, RepositoryError>;

    /// Write the risk assessment produced by the scoring engine back onto a record
    async fn attach_assessment(
        &self,
        record_id: &str,
        risk_score: f64,
        risk_level: &str,
        recommendations_json: &str,
    ) -> Result<(), RepositoryError>;

    /// List records for one patient, newest first, capped at `limit`
    async fn list_for_patient(
        &self,
        patient_id: &str,
        limit: usize,
    ) -> Result<Vec<HealthRecordRow>, RepositoryError>;

    /// Get the most recent record for one patient
    async fn latest_for_patient(&self, patient_id: &str) -> Result<Option<HealthRecordRow>, RepositoryError>;

    /// Count records for one patient
    async fn count_for_patient(&self, patient_id: &str) -> Result<usize, RepositoryError>;

    /// Count all records
    async fn count_all(&self) -> Result<usize, RepositoryError>;

    /// Count records with a given risk level
    async fn count_by_risk_level(&self, risk_level: &str) -> Result<usize, RepositoryError>;
}

const RECORD_COLUMNS: &str = "id, patient_id, recorded_by, systolic, diastolic, heart_rate, \
     temperature, weight, height, oxygen_saturation, symptoms, diagnosis, medications, notes, \
     risk_score, risk_level, recommendations, recorded_at";

fn map_record_row(row: &Row<'_>) -> rusqlite::Result<HealthRecordRow> {
    Ok(HealthRecordRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        recorded_by: row.get(2)?,
        systolic: row.get(3)?,
        diastolic: row.get(4)?,
        heart_rate: row.get(5)?,
        temperature: row.get(6)?,
        weight: row.get(7)?,
        height: row.get(8)?,
        oxygen_saturation: row.get(9)?,
        symptoms: row.get(10)?,
        diagnosis: row.get(11)?,
        medications: row.get(12)?,
        notes: row.get(13)?,
        risk_score: row.get(14)?,
        risk_level: row.get(15)?,
        recommendations: row.get(16)?,
        recorded_at: row.get(17)?,
    })
}

/// SQLite-backed repository for health records
#[derive(Debug, Clone, Default)]
pub struct HealthRecordRepository;

impl HealthRecordRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthRecordRepositoryTrait for HealthRecordRepository {
    async fn create(&self, request: CreateHealthRecordRow) -> Result<HealthRecordRow, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let record = HealthRecordRow {
            id: Uuid::new_v4().to_string(),
            patient_id: request.patient_id,
            recorded_by: request.recorded_by,
            systolic: request.systolic,
            diastolic: request.diastolic,
            heart_rate: request.heart_rate,
            temperature: request.temperature,
            weight: request.weight,
            height: request.height,
            oxygen_saturation: request.oxygen_saturation,
            symptoms: request.symptoms,
            diagnosis: request.diagnosis,
            medications: request.medications,
            notes: request.notes,
            risk_score: None,
            risk_level: None,
            recommendations: None,
            recorded_at: if request.recorded_at.is_empty() {
                Utc::now().to_rfc3339()
            } else {
                request.recorded_at
            },
        };

        debug!("Storing health record {} for patient {}", record.id, record.patient_id);

        conn.execute(
            "INSERT INTO health_records (id, patient_id, recorded_by, systolic, diastolic, \
             heart_rate, temperature, weight, height, oxygen_saturation, symptoms, diagnosis, \
             medications, notes, risk_score, risk_level, recommendations, recorded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            rusqlite::params![
                record.id,
                record.patient_id,
                record.recorded_by,
                record.systolic,
                record.diastolic,
                record.heart_rate,
                record.temperature,
                record.weight,
                record.height,
                record.oxygen_saturation,
                record.symptoms,
                record.diagnosis,
                record.medications,
                record.notes,
                record.risk_score,
                record.risk_level,
                record.recommendations,
                record.recorded_at,
            ],
        )?;

        Ok(record)
    }

    async fn attach_assessment(
        &self,
        record_id: &str,
        risk_score: f64,
        risk_level: &str,
        recommendations_json: &str,
    ) -> Result<(), RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let updated = conn.execute(
            "UPDATE health_records SET risk_score = ?1, risk_level = ?2, recommendations = ?3 \
             WHERE id = ?4",
            rusqlite::params![risk_score, risk_level, recommendations_json, record_id],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Health record {} not found",
                record_id
            )));
        }

        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: &str,
        limit: usize,
    ) -> Result<Vec<HealthRecordRow>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM health_records WHERE patient_id = ?1 \
             ORDER BY recorded_at DESC LIMIT ?2",
            RECORD_COLUMNS
        ))?;

        let rows = stmt.query_map(rusqlite::params![patient_id, limit as i64], map_record_row)?;

        let mut result = Vec::new();
        for record in rows {
            result.push(record?);
        }

        Ok(result)
    }

    async fn latest_for_patient(&self, patient_id: &str) -> Result<Option<HealthRecordRow>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM health_records WHERE patient_id = ?1 \
             ORDER BY recorded_at DESC LIMIT 1",
            RECORD_COLUMNS
        ))?;

        match stmt.query_row([patient_id], map_record_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    async fn count_for_patient(&self, patient_id: &str) -> Result<usize, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM health_records WHERE patient_id = ?1",
            [patient_id],
            |row| row.get(0),
        )?;

        Ok(total as usize)
    }

    async fn count_all(&self) -> Result<usize, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM health_records", [], |row| row.get(0))?;

        Ok(total as usize)
    }

    async fn count_by_risk_level(&self, risk_level: &str) -> Result<usize, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM health_records WHERE risk_level = ?1",
            [risk_level],
            |row| row.get(0),
        )?;

        Ok(total as usize)
    }
}

/// Mock health record repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory implementation of HealthRecordRepositoryTrait for testing
    #[derive(Default)]
    pub struct MockHealthRecordRepository {
        records: Mutex<Vec<HealthRecordRow>>,
    }

    impl MockHealthRecordRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined records
        pub fn with_records(records: Vec<HealthRecordRow>) -> Self {
            Self {
                records: Mutex::new(records),
            }
        }
    }

    #[async_trait]
    impl HealthRecordRepositoryTrait for MockHealthRecordRepository {
        async fn create(&self, request: CreateHealthRecordRow) -> Result<HealthRecordRow, RepositoryError> {
            let record = HealthRecordRow {
                id: Uuid::new_v4().to_string(),
                patient_id: request.patient_id,
                recorded_by: request.recorded_by,
                systolic: request.systolic,
                diastolic: request.diastolic,
                heart_rate: request.heart_rate,
                temperature: request.temperature,
                weight: request.weight,
                height: request.height,
                oxygen_saturation: request.oxygen_saturation,
                symptoms: request.symptoms,
                diagnosis: request.diagnosis,
                medications: request.medications,
                notes: request.notes,
                risk_score: None,
                risk_level: None,
                recommendations: None,
                recorded_at: if request.recorded_at.is_empty() {
                    Utc::now().to_rfc3339()
                } else {
                    request.recorded_at
                },
            };

            self.records.lock()?.push(record.clone());
            Ok(record)
        }

        async fn attach_assessment(
            &self,
            record_id: &str,
            risk_score: f64,
            risk_level: &str,
            recommendations_json: &str,
        ) -> Result<(), RepositoryError> {
            let mut records = self.records.lock()?;
            match records.iter_mut().find(|r| r.id == record_id) {
                Some(record) => {
                    record.risk_score = Some(risk_score);
                    record.risk_level = Some(risk_level.to_string());
                    record.recommendations = Some(recommendations_json.to_string());
                    Ok(())
                }
                None => Err(RepositoryError::NotFound(format!(
                    "Health record {} not found",
                    record_id
                ))),
            }
        }

        async fn list_for_patient(
            &self,
            patient_id: &str,
            limit: usize,
        ) -> Result<Vec<HealthRecordRow>, RepositoryError> {
            let records = self.records.lock()?;
            let mut matching: Vec<HealthRecordRow> = records
                .iter()
                .filter(|r| r.patient_id == patient_id)
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
            matching.truncate(limit);
            Ok(matching)
        }

        async fn latest_for_patient(&self, patient_id: &str) -> Result<Option<HealthRecordRow>, RepositoryError> {
            Ok(self.list_for_patient(patient_id, 1).await?.into_iter().next())
        }

        async fn count_for_patient(&self, patient_id: &str) -> Result<usize, RepositoryError> {
            let records = self.records.lock()?;
            Ok(records.iter().filter(|r| r.patient_id == patient_id).count())
        }

        async fn count_all(&self) -> Result<usize, RepositoryError> {
            Ok(self.records.lock()?.len())
        }

        async fn count_by_risk_level(&self, risk_level: &str) -> Result<usize, RepositoryError> {
            let records = self.records.lock()?;
            Ok(records
                .iter()
                .filter(|r| r.risk_level.as_deref() == Some(risk_level))
                .count())
        }
    }

    fn sample_request(patient_id: &str) -> CreateHealthRecordRow {
        CreateHealthRecordRow {
            patient_id: patient_id.to_string(),
            recorded_by: None,
            systolic: Some(120),
            diastolic: Some(80),
            heart_rate: Some(72),
            temperature: Some(98.6),
            weight: Some(60.0),
            height: Some(165.0),
            oxygen_saturation: None,
            symptoms: None,
            diagnosis: None,
            medications: None,
            notes: None,
            recorded_at: Utc::now().to_rfc3339(),
        }
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_create_and_attach_assessment() {
        let repo = MockHealthRecordRepository::new();
        let record = repo.create(sample_request("patient-1")).await.unwrap();
        assert!(record.risk_score.is_none());

        repo.attach_assessment(&record.id, 0.3, "low", "[]").await.unwrap();

        let latest = repo.latest_for_patient("patient-1").await.unwrap().unwrap();
        assert_eq!(latest.risk_score, Some(0.3));
        assert_eq!(latest.risk_level.as_deref(), Some("low"));
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_attach_assessment_missing_record() {
        let repo = MockHealthRecordRepository::new();
        let err = repo
            .attach_assessment("no-such-id", 0.5, "medium", "[]")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_list_is_capped_and_newest_first() {
        let repo = MockHealthRecordRepository::new();
        for _ in 0..5 {
            repo.create(sample_request("patient-1")).await.unwrap();
        }
        repo.create(sample_request("patient-2")).await.unwrap();

        let listed = repo.list_for_patient("patient-1", 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].recorded_at >= w[1].recorded_at));

        assert_eq!(repo.count_for_patient("patient-1").await.unwrap(), 5);
        assert_eq!(repo.count_all().await.unwrap(), 6);
    }
}
