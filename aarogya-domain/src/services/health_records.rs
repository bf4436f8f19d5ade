use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use utoipa::ToSchema;

use aarogya_data::models::health_record::CreateHealthRecordRow;
use aarogya_data::repository::{HealthRecordRepositoryTrait, RepositoryError, UserRepositoryTrait};

use crate::auth::UserInfo;
use crate::entities::conversions::convert_to_domain_health_record;
use crate::entities::HealthRecord;
use crate::services::risk::{assess, RiskAssessment, VitalSnapshot};

/// Patients see at most this many of their own records per request
pub const RECORD_LIST_CAP: usize = 20;

/// Health record service errors
#[derive(Debug, Error)]
pub enum HealthRecordServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requester may not view the requested patient's records
    #[error("Access denied")]
    AccessDenied,

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for HealthRecordServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => HealthRecordServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => HealthRecordServiceError::Validation(msg),
            _ => HealthRecordServiceError::Repository(err.to_string()),
        }
    }
}

/// Input for recording a set of vital signs
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateHealthRecordRequest {
    /// Patient the record is for; defaults to the requester
    pub patient_id: Option<String>,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub heart_rate: Option<i32>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub oxygen_saturation: Option<f64>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
}

/// Dashboard figures for a patient
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PatientDashboard {
    /// Total records for this patient
    pub total_records: usize,
    /// Risk score of the most recent record, if assessed
    pub latest_risk_score: Option<f64>,
    /// Risk level of the most recent record, if assessed
    pub latest_risk_level: Option<String>,
    /// When vitals were last recorded (RFC 3339)
    pub last_recorded_at: Option<String>,
}

/// Dashboard figures for ASHA workers and admins
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkerDashboard {
    /// Registered patients
    pub total_patients: usize,
    /// Records across all patients
    pub total_records: usize,
    /// Records currently assessed as high risk
    pub high_risk_records: usize,
    /// Records currently assessed as critical
    pub critical_risk_records: usize,
}

/// Vital-sign record keeping with automatic risk assessment
pub struct HealthRecordService<R: HealthRecordRepositoryTrait> {
    repository: R,
}

impl<R: HealthRecordRepositoryTrait + Send + Sync> HealthRecordService<R> {
    /// Create a new health record service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Persist a new record, score it, and write the assessment back onto
    /// the record before returning it. Scoring never fails; if the
    /// assessment cannot be stored the record is still returned with the
    /// in-memory assessment applied.
    pub async fn create_record(
        &self,
        requester: &UserInfo,
        request: CreateHealthRecordRequest,
    ) -> Result<(HealthRecord, RiskAssessment), HealthRecordServiceError> {
        let patient_id = match request.patient_id {
            Some(ref id) if id != &requester.user_id => {
                // Only ASHA workers and admins may record for other patients
                if !requester.can_view_any_patient() {
                    return Err(HealthRecordServiceError::AccessDenied);
                }
                id.clone()
            }
            _ => requester.user_id.clone(),
        };

        let mut row = self
            .repository
            .create(CreateHealthRecordRow {
                patient_id,
                recorded_by: Some(requester.user_id.clone()),
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
                recorded_at: Utc::now().to_rfc3339(),
            })
            .await?;

        let snapshot = VitalSnapshot::from_record(&row);
        let assessment = assess(&snapshot);

        let recommendations_json = serde_json::to_string(&assessment.recommendations)
            .map_err(|e| HealthRecordServiceError::Repository(e.to_string()))?;

        if let Err(e) = self
            .repository
            .attach_assessment(
                &row.id,
                assessment.risk_score,
                assessment.risk_level.as_str(),
                &recommendations_json,
            )
            .await
        {
            error!("Failed to store assessment for record {}: {}", row.id, e);
        }

        row.risk_score = Some(assessment.risk_score);
        row.risk_level = Some(assessment.risk_level.as_str().to_string());
        row.recommendations = Some(recommendations_json);

        info!(
            "Record {} assessed as {} ({:.2})",
            row.id,
            assessment.risk_level,
            assessment.risk_score
        );

        Ok((convert_to_domain_health_record(row), assessment))
    }

    /// List records for a patient. Patients may only view their own;
    /// ASHA workers and admins may view any patient's.
    pub async fn list_records(
        &self,
        requester: &UserInfo,
        patient_id: Option<&str>,
    ) -> Result<Vec<HealthRecord>, HealthRecordServiceError> {
        let patient_id = match patient_id {
            Some(id) if id != requester.user_id => {
                if !requester.can_view_any_patient() {
                    return Err(HealthRecordServiceError::AccessDenied);
                }
                id.to_string()
            }
            _ => requester.user_id.clone(),
        };

        let rows = self
            .repository
            .list_for_patient(&patient_id, RECORD_LIST_CAP)
            .await?;

        Ok(rows.into_iter().map(convert_to_domain_health_record).collect())
    }

    /// Dashboard figures for a patient's own records
    pub async fn patient_dashboard(&self, patient_id: &str) -> Result<PatientDashboard, HealthRecordServiceError> {
        let total_records = self.repository.count_for_patient(patient_id).await?;
        let latest = self.repository.latest_for_patient(patient_id).await?;

        Ok(PatientDashboard {
            total_records,
            latest_risk_score: latest.as_ref().and_then(|r| r.risk_score),
            latest_risk_level: latest.as_ref().and_then(|r| r.risk_level.clone()),
            last_recorded_at: latest.map(|r| r.recorded_at),
        })
    }

    /// Dashboard figures for ASHA workers and admins
    pub async fn worker_dashboard<U: UserRepositoryTrait>(
        &self,
        users: &U,
    ) -> Result<WorkerDashboard, HealthRecordServiceError> {
        let total_patients = users.count(Some("patient")).await?;
        let total_records = self.repository.count_all().await?;
        let high_risk_records = self.repository.count_by_risk_level("high").await?;
        let critical_risk_records = self.repository.count_by_risk_level("critical").await?;

        Ok(WorkerDashboard {
            total_patients,
            total_records,
            high_risk_records,
            critical_risk_records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarogya_data::repository::mocks::{MockHealthRecordRepository, MockUserRepository};

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

    fn vitals_request(systolic: i32, diastolic: i32) -> CreateHealthRecordRequest {
        CreateHealthRecordRequest {
            patient_id: None,
            systolic: Some(systolic),
            diastolic: Some(diastolic),
            heart_rate: Some(72),
            temperature: Some(98.6),
            weight: Some(60.0),
            height: Some(165.0),
            oxygen_saturation: None,
            symptoms: None,
            diagnosis: None,
            medications: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_record_runs_assessment() {
        let service = HealthRecordService::new(MockHealthRecordRepository::new());

        let (record, assessment) = service
            .create_record(&patient("p1"), vitals_request(120, 80))
            .await
            .unwrap();

        assert_eq!(record.patient_id, "p1");
        assert_eq!(record.risk_score, Some(0.0));
        assert_eq!(record.risk_level.as_deref(), Some("low"));
        assert_eq!(assessment.risk_level.as_str(), "low");
        assert_eq!(record.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn test_elevated_vitals_are_persisted_with_score() {
        let service = HealthRecordService::new(MockHealthRecordRepository::new());

        let (record, _) = service
            .create_record(&patient("p1"), vitals_request(150, 95))
            .await
            .unwrap();

        assert_eq!(record.risk_score, Some(0.3));
        assert_eq!(record.risk_level.as_deref(), Some("low"));
    }

    #[tokio::test]
    async fn test_patient_cannot_record_for_others() {
        let service = HealthRecordService::new(MockHealthRecordRepository::new());

        let mut request = vitals_request(120, 80);
        request.patient_id = Some("someone-else".to_string());

        let result = service.create_record(&patient("p1"), request).await;
        assert!(matches!(result, Err(HealthRecordServiceError::AccessDenied)));
    }

    #[tokio::test]
    async fn test_asha_can_record_for_any_patient() {
        let service = HealthRecordService::new(MockHealthRecordRepository::new());

        let mut request = vitals_request(120, 80);
        request.patient_id = Some("p7".to_string());

        let (record, _) = service.create_record(&asha("w1"), request).await.unwrap();
        assert_eq!(record.patient_id, "p7");
        assert_eq!(record.recorded_by.as_deref(), Some("w1"));
    }

    #[tokio::test]
    async fn test_patient_cannot_list_other_patients_records() {
        let service = HealthRecordService::new(MockHealthRecordRepository::new());

        let result = service.list_records(&patient("p1"), Some("p2")).await;
        assert!(matches!(result, Err(HealthRecordServiceError::AccessDenied)));
    }

    #[tokio::test]
    async fn test_asha_can_list_any_patients_records() {
        let service = HealthRecordService::new(MockHealthRecordRepository::new());

        service
            .create_record(&patient("p2"), vitals_request(120, 80))
            .await
            .unwrap();

        let records = service.list_records(&asha("w1"), Some("p2")).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_patient_dashboard() {
        let service = HealthRecordService::new(MockHealthRecordRepository::new());

        service
            .create_record(&patient("p1"), vitals_request(150, 95))
            .await
            .unwrap();

        let dashboard = service.patient_dashboard("p1").await.unwrap();
        assert_eq!(dashboard.total_records, 1);
        assert_eq!(dashboard.latest_risk_score, Some(0.3));
        assert_eq!(dashboard.latest_risk_level.as_deref(), Some("low"));
        assert!(dashboard.last_recorded_at.is_some());
    }

    #[tokio::test]
    async fn test_worker_dashboard_counts() {
        let service = HealthRecordService::new(MockHealthRecordRepository::new());
        let users = MockUserRepository::new();

        service
            .create_record(&patient("p1"), vitals_request(120, 80))
            .await
            .unwrap();

        let dashboard = service.worker_dashboard(&users).await.unwrap();
        assert_eq!(dashboard.total_records, 1);
        assert_eq!(dashboard.high_risk_records, 0);
    }
}
