use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use aarogya_data::repository::UserRepositoryTrait;
use aarogya_domain::auth::UserInfo;
use aarogya_domain::entities::HealthRecord;
use aarogya_domain::services::health_records::{
    CreateHealthRecordRequest, HealthRecordServiceError, PatientDashboard, WorkerDashboard,
};
use aarogya_domain::services::RiskLevel;

use crate::api::routes::AppState;

use super::ErrorResponse;

/// Query parameters for listing health records
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RecordListParams {
    /// Patient to list records for; defaults to the requester.
    /// Only ASHA workers and admins may name another patient.
    pub patient_id: Option<String>,
}

fn map_record_error(err: HealthRecordServiceError) -> ErrorResponse {
    match err {
        HealthRecordServiceError::Validation(msg) => ErrorResponse::validation_error(&msg),
        HealthRecordServiceError::AccessDenied => ErrorResponse::forbidden(),
        HealthRecordServiceError::NotFound(_) => ErrorResponse::not_found("health record"),
        HealthRecordServiceError::Repository(_) => ErrorResponse::internal_error(),
    }
}

/// Record a set of vital signs. The record is scored immediately and
/// returned with its risk assessment attached.
#[utoipa::path(
    post,
    path = "/api/records",
    request_body = CreateHealthRecordRequest,
    responses(
        (status = 201, description = "Record created and assessed", body = HealthRecord),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Cannot record for another patient", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "records"
)]
#[instrument(skip(state, request))]
pub async fn create_record(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<CreateHealthRecordRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let (record, assessment) = state
        .records
        .create_record(&user, request)
        .await
        .map_err(map_record_error)?;

    info!(
        "Record {} created with risk level {}",
        record.id, assessment.risk_level
    );

    // High and critical assessments notify the patient's emergency contact;
    // the record is already stored, so delivery is best effort
    if matches!(assessment.risk_level, RiskLevel::High | RiskLevel::Critical) {
        notify_emergency_contact(&state, &record.patient_id, assessment.risk_level).await;
    }

    Ok((StatusCode::CREATED, Json(record)))
}

async fn notify_emergency_contact(state: &AppState, patient_id: &str, level: RiskLevel) {
    let patient = match state.user_repository.find_by_id(patient_id).await {
        Ok(Some(patient)) => patient,
        Ok(None) => return,
        Err(e) => {
            warn!("Could not load patient {} for risk alert: {}", patient_id, e);
            return;
        }
    };

    let Some(contact) = patient.emergency_contact else {
        return;
    };

    if let Err(e) = state
        .sms
        .send_health_alert(&contact, &patient.full_name, level.as_str())
        .await
    {
        warn!("Risk alert SMS to {} failed: {}", contact, e);
    }
}

/// List health records for a patient, newest first
#[utoipa::path(
    get,
    path = "/api/records",
    params(RecordListParams),
    responses(
        (status = 200, description = "Records for the patient", body = [HealthRecord]),
        (status = 403, description = "Cannot view another patient's records", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "records"
)]
#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(params): Query<RecordListParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let records = state
        .records
        .list_records(&user, params.patient_id.as_deref())
        .await
        .map_err(map_record_error)?;

    Ok(Json(records))
}

/// Dashboard statistics, shaped by the requester's role: patients see
/// their own record summary, ASHA workers and admins see platform-wide
/// figures.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard figures for the requester's role"),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "records"
)]
#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    if user.can_view_any_patient() {
        let stats: WorkerDashboard = state
            .records
            .worker_dashboard(&state.user_repository)
            .await
            .map_err(map_record_error)?;
        Ok(Json(serde_json::json!({ "role": user.role, "stats": stats })))
    } else {
        let stats: PatientDashboard = state
            .records
            .patient_dashboard(&user.user_id)
            .await
            .map_err(map_record_error)?;
        Ok(Json(serde_json::json!({ "role": user.role, "stats": stats })))
    }
}
