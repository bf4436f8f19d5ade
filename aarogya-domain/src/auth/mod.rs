//! Authentication module for the Aarogya Sahayak API
//!
//! Provides JWT-based authentication middleware and role-based access
//! control for protected endpoints.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use utoipa::ToSchema;

// JWT generation and validation
pub mod token;

// Password hashing
pub mod password;

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role carried by the token: "patient", "asha" or "admin"
    pub role: String,
    /// Token type: "access" or "refresh"
    pub token_type: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// User information extracted from authenticated requests
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    /// User ID
    pub user_id: String,
    /// Role of the authenticated user
    pub role: String,
}

impl UserInfo {
    /// Whether the user may view records owned by another patient
    pub fn can_view_any_patient(&self) -> bool {
        self.role == "asha" || self.role == "admin"
    }
}

fn unauthorized() -> Response {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .body(Body::empty())
        .unwrap_or_default()
}

/// Authentication middleware for protected routes
///
/// Extracts the Bearer token from the Authorization header, validates it
/// as an access token, and places [`UserInfo`] and [`Claims`] into the
/// request extensions for downstream handlers.
pub async fn auth_middleware<S>(_state: State<S>, mut req: Request<Body>, next: Next) -> Response {
    let request_path = req.uri().path().to_string();

    let auth_header = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(auth_str) => auth_str,
            Err(_) => {
                warn!("Invalid Authorization header format for {}", request_path);
                return unauthorized();
            }
        },
        None => {
            debug!("Missing Authorization header for {}", request_path);
            return unauthorized();
        }
    };

    if !auth_header.starts_with("Bearer ") {
        warn!("Authorization header does not contain Bearer token");
        return unauthorized();
    }

    let token = &auth_header[7..];

    match token::validate_access_token(token) {
        Ok(claims) => {
            debug!("Token validated for user {} on {}", claims.sub, request_path);

            let user_info = UserInfo {
                user_id: claims.sub.clone(),
                role: claims.role.clone(),
            };

            req.extensions_mut().insert(user_info);
            req.extensions_mut().insert(claims);

            next.run(req).await
        }
        Err(token::SecurityError::TokenExpired) => {
            warn!("Expired token on {}", request_path);
            unauthorized()
        }
        Err(e) => {
            warn!("Token validation failed on {}: {}", request_path, e);
            unauthorized()
        }
    }
}

/// Middleware for role-based access control
///
/// Checks whether the authenticated user has any of the required roles and
/// denies access with 403 Forbidden otherwise. Must run after
/// [`auth_middleware`], which populates the request extensions.
pub async fn require_roles<S, I>(
    _state: State<S>,
    req: Request<Body>,
    next: Next,
    required_roles: I,
) -> Response
where
    I: IntoIterator<Item = String>,
{
    let required_roles: Vec<String> = required_roles.into_iter().collect();
    let request_path = req.uri().path().to_string();

    match req.extensions().get::<UserInfo>() {
        Some(user) => {
            if required_roles.iter().any(|role| &user.role == role) {
                debug!("User {} authorized for {}", user.user_id, request_path);
                next.run(req).await
            } else {
                warn!(
                    "User {} with role {} lacks required roles {:?} for {}",
                    user.user_id, user.role, required_roles, request_path
                );

                (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "error": "forbidden",
                        "message": "You don't have the required permissions to access this resource",
                        "required_roles": required_roles
                    })),
                )
                    .into_response()
            }
        }
        None => {
            // auth_middleware should always run before this middleware
            warn!("No user info in request extensions for {}", request_path);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Authentication context missing"
                })),
            )
                .into_response()
        }
    }
}

/// Middleware factory that requires one of the given roles for access
///
/// # Example
/// ```ignore
/// let admin_routes = Router::new()
///     .route("/stats", get(stats_handler))
///     .layer(middleware::from_fn_with_state(
///         state.clone(),
///         require_any_role(&["admin"]),
///     ));
/// ```
pub fn require_any_role<S: Clone + Send + Sync + 'static>(
    roles: &[&str],
) -> impl Fn(State<S>, Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + 'static {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    move |state, req, next| {
        let roles = roles.clone();
        Box::pin(async move { require_roles(state, req, next, roles).await })
    }
}

/// Configure CORS and security headers for the application
pub fn configure_auth(app: axum::Router) -> axum::Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            header::HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            axum::http::HeaderName::from_static("referrer-policy"),
            header::HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(cors).layer(security_headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_visibility_rules() {
        let patient = UserInfo {
            user_id: "u1".to_string(),
            role: "patient".to_string(),
        };
        let asha = UserInfo {
            user_id: "u2".to_string(),
            role: "asha".to_string(),
        };
        let admin = UserInfo {
            user_id: "u3".to_string(),
            role: "admin".to_string(),
        };

        assert!(!patient.can_view_any_patient());
        assert!(asha.can_view_any_patient());
        assert!(admin.can_view_any_patient());
    }
}
