use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::instrument;

use aarogya_domain::auth::UserInfo;
use aarogya_domain::entities::EmergencyAlert;
use aarogya_domain::services::emergency::{EmergencyServiceError, RaiseAlertRequest};

use crate::api::routes::AppState;

use super::ErrorResponse;

fn map_emergency_error(err: EmergencyServiceError) -> ErrorResponse {
    match err {
        EmergencyServiceError::Validation(msg) => ErrorResponse::validation_error(&msg),
        EmergencyServiceError::NotFound(_) => ErrorResponse::not_found("user"),
        EmergencyServiceError::Repository(_) => ErrorResponse::internal_error(),
    }
}

/// Raise an emergency alert. The patient's emergency contact is notified
/// over SMS and WhatsApp when one is configured.
#[utoipa::path(
    post,
    path = "/api/emergency",
    request_body = RaiseAlertRequest,
    responses(
        (status = 201, description = "Alert raised", body = EmergencyAlert),
        (status = 400, description = "Validation error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "emergency"
)]
#[instrument(skip(state, request))]
pub async fn raise_alert(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<RaiseAlertRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let alert = state
        .emergency
        .raise_alert(&user, request)
        .await
        .map_err(map_emergency_error)?;

    Ok((StatusCode::CREATED, Json(alert)))
}

/// List emergency alerts: patients see their own, ASHA workers and
/// admins see the most recent alerts across all patients
#[utoipa::path(
    get,
    path = "/api/emergency",
    responses(
        (status = 200, description = "Alerts visible to the requester", body = [EmergencyAlert]),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "emergency"
)]
#[instrument(skip(state))]
pub async fn list_alerts(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let alerts = state
        .emergency
        .list_alerts(&user)
        .await
        .map_err(map_emergency_error)?;

    Ok(Json(alerts))
}
