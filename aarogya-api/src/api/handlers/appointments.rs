use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use tracing::instrument;

use aarogya_domain::auth::UserInfo;
use aarogya_domain::entities::Appointment;
use aarogya_domain::services::appointments::{AppointmentServiceError, BookAppointmentRequest};

use crate::api::routes::AppState;

use super::ErrorResponse;

fn map_appointment_error(err: AppointmentServiceError) -> ErrorResponse {
    match err {
        AppointmentServiceError::Validation(msg) => ErrorResponse::validation_error(&msg),
        AppointmentServiceError::Repository(_) => ErrorResponse::internal_error(),
    }
}

/// Book an appointment for the authenticated patient
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Validation error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(state, request))]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let appointment = state
        .appointments
        .book(&user, request)
        .await
        .map_err(map_appointment_error)?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// List the authenticated user's appointments, soonest first
#[utoipa::path(
    get,
    path = "/api/appointments",
    responses(
        (status = 200, description = "Upcoming appointments", body = [Appointment]),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(state))]
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let appointments = state
        .appointments
        .list(&user)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(appointments))
}
