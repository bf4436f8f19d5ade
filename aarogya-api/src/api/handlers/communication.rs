use axum::{
    extract::{Json, State},
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;

use aarogya_domain::auth::UserInfo;
use aarogya_domain::services::communication::{
    BroadcastRequest, Channel, CommunicationServiceError,
};

use crate::api::routes::AppState;

use super::ErrorResponse;

/// Request body for sending one message to one recipient
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Recipient phone number
    pub recipient: String,
    /// Message body
    pub message: String,
}

fn map_communication_error(err: CommunicationServiceError) -> ErrorResponse {
    match err {
        CommunicationServiceError::Validation(msg) => ErrorResponse::validation_error(&msg),
        CommunicationServiceError::AccessDenied => ErrorResponse::forbidden(),
        CommunicationServiceError::NoRecipients(village) => {
            ErrorResponse::validation_error(&format!("No patients found in village {}", village))
        }
        _ => ErrorResponse::internal_error(),
    }
}

/// Send one SMS to one recipient
#[utoipa::path(
    post,
    path = "/api/communication/sms",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Delivery outcome for the recipient"),
        (status = 403, description = "Requires ASHA or admin role", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "communication"
)]
#[instrument(skip(state, request))]
pub async fn send_sms(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let outcome = state
        .communication
        .send(&user, &request.recipient, &request.message, Channel::Sms)
        .await
        .map_err(map_communication_error)?;

    Ok(Json(outcome))
}

/// Send one WhatsApp message to one recipient
#[utoipa::path(
    post,
    path = "/api/communication/whatsapp",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Delivery outcome for the recipient"),
        (status = 403, description = "Requires ASHA or admin role", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "communication"
)]
#[instrument(skip(state, request))]
pub async fn send_whatsapp(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let outcome = state
        .communication
        .send(&user, &request.recipient, &request.message, Channel::Whatsapp)
        .await
        .map_err(map_communication_error)?;

    Ok(Json(outcome))
}

/// Broadcast a message to every patient in a village. Returns one
/// delivery outcome per recipient.
#[utoipa::path(
    post,
    path = "/api/communication/broadcast",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Per-recipient delivery outcomes"),
        (status = 400, description = "No recipients or empty message", body = ErrorResponse),
        (status = 403, description = "Requires ASHA or admin role", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "communication"
)]
#[instrument(skip(state, request))]
pub async fn broadcast(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let outcomes = state
        .communication
        .broadcast(&user, request)
        .await
        .map_err(map_communication_error)?;

    Ok(Json(outcomes))
}
