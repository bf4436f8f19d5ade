use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use aarogya_data::repository::UserRepositoryTrait;
use aarogya_domain::entities::conversions::convert_to_domain_user;
use aarogya_domain::entities::User;

use crate::api::routes::AppState;

use super::ErrorResponse;

/// Admin listings return at most this many users
pub const USER_LIST_CAP: usize = 100;

/// Platform-wide statistics for administrators
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    /// All registered users
    pub total_users: usize,
    /// Registered patients
    pub total_patients: usize,
    /// Registered ASHA workers
    pub total_asha_workers: usize,
    /// Health records across all patients
    pub total_records: usize,
    /// Records currently assessed as high risk
    pub high_risk_records: usize,
    /// Records currently assessed as critical
    pub critical_risk_records: usize,
}

/// Query parameters for the admin user listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserListParams {
    /// Restrict the listing to one role
    pub role: Option<String>,
    /// Maximum number of users to return (capped at 100)
    pub limit: Option<usize>,
}

/// Platform-wide statistics
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Platform statistics", body = AdminStats),
        (status = 403, description = "Requires admin role", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ErrorResponse> {
    let users = &state.user_repository;

    let total_users = users.count(None).await.map_err(|_| ErrorResponse::internal_error())?;
    let total_patients = users
        .count(Some("patient"))
        .await
        .map_err(|_| ErrorResponse::internal_error())?;
    let total_asha_workers = users
        .count(Some("asha"))
        .await
        .map_err(|_| ErrorResponse::internal_error())?;

    let records = state
        .records
        .worker_dashboard(users)
        .await
        .map_err(|_| ErrorResponse::internal_error())?;

    Ok(Json(AdminStats {
        total_users,
        total_patients,
        total_asha_workers,
        total_records: records.total_records,
        high_risk_records: records.high_risk_records,
        critical_risk_records: records.critical_risk_records,
    }))
}

/// List registered users, optionally filtered by role
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserListParams),
    responses(
        (status = 200, description = "Registered users", body = [User]),
        (status = 403, description = "Requires admin role", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let limit = params.limit.unwrap_or(USER_LIST_CAP).min(USER_LIST_CAP);

    let records = state
        .user_repository
        .list(params.role.as_deref(), limit)
        .await
        .map_err(|_| ErrorResponse::internal_error())?;

    let users: Vec<User> = records.into_iter().map(convert_to_domain_user).collect();
    Ok(Json(users))
}
