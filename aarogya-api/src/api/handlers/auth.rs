use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use aarogya_domain::auth::UserInfo;
use aarogya_domain::entities::User;
use aarogya_domain::services::users::{AuthResponse, RegisterRequest, UserServiceError};

use crate::api::routes::AppState;

use super::ErrorResponse;

/// Login request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Ten-digit Indian mobile number
    pub phone_number: String,
    /// Password
    pub password: String,
}

/// Request body for completing phone verification
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    /// The six-digit code received over SMS
    pub code: String,
}

/// Simple acknowledgement response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn map_user_error(err: UserServiceError) -> ErrorResponse {
    match err {
        UserServiceError::Validation(msg) => ErrorResponse::validation_error(&msg),
        UserServiceError::Conflict(msg) => ErrorResponse::conflict(&msg),
        UserServiceError::InvalidCredentials => {
            ErrorResponse::unauthorized("Invalid phone number or password")
        }
        UserServiceError::AccountDeactivated => {
            ErrorResponse::unauthorized("Account is deactivated")
        }
        UserServiceError::NotFound(_) => ErrorResponse::not_found("user"),
        UserServiceError::InvalidOtp => {
            ErrorResponse::validation_error("Invalid or expired verification code")
        }
        _ => ErrorResponse::internal_error(),
    }
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Phone number already registered", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let response = state.users.register(request).await.map_err(map_user_error)?;

    // Welcome message is best effort; registration already succeeded
    if let Err(e) = state
        .sms
        .send_welcome(&response.user.phone_number, &response.user.full_name)
        .await
    {
        warn!("Welcome SMS to new user {} failed: {}", response.user.id, e);
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with phone number and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let response = state
        .users
        .login(&request.phone_number, &request.password)
        .await
        .map_err(map_user_error)?;

    Ok(Json(response))
}

/// Fetch the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile found", body = User),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let profile = state
        .users
        .profile(&user.user_id)
        .await
        .map_err(map_user_error)?;

    Ok(Json(profile))
}

/// Start phone verification: issue a code and deliver it over SMS
#[utoipa::path(
    post,
    path = "/api/auth/verify-phone",
    responses(
        (status = 200, description = "Verification code sent", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn verify_phone(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let (phone_number, code) = state
        .users
        .request_phone_verification(&user.user_id)
        .await
        .map_err(map_user_error)?;

    if let Err(e) = state.sms.send_otp(&phone_number, &code).await {
        warn!("OTP SMS to user {} failed: {}", user.user_id, e);
        return Err(ErrorResponse::internal_error());
    }

    info!("Verification code sent to user {}", user.user_id);
    Ok(Json(MessageResponse {
        message: "Verification code sent".to_string(),
    }))
}

/// Complete phone verification with the received code
#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Phone number verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired code", body = ErrorResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .users
        .verify_otp(&user.user_id, &request.code)
        .await
        .map_err(map_user_error)?;

    Ok(Json(MessageResponse {
        message: "Phone number verified".to_string(),
    }))
}
