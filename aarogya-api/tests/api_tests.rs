use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use aarogya_data::database::initialize_in_memory_pool;

fn setup() -> Router {
    std::env::set_var("JWT_SECRET", "integration_test_secret");
    initialize_in_memory_pool().expect("in-memory pool");
    aarogya_api::create_application()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn json_request(uri: &str, method: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, phone: &str, role: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/auth/register",
            "POST",
            None,
            json!({
                "phone_number": phone,
                "password": "password123",
                "full_name": "Test User",
                "role": role,
                "village": "Rampur"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_health_check_reports_ok() {
    let app = setup();

    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = setup();

    let registered = register(&app, "9876540001", "patient").await;
    assert_eq!(registered["token_type"], "Bearer");
    assert!(registered["access_token"].as_str().is_some());
    assert!(registered["user"]["password_hash"].is_null());

    let login = app
        .clone()
        .oneshot(json_request(
            "/api/auth/login",
            "POST",
            None,
            json!({ "phone_number": "9876540001", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let login = body_json(login).await;

    let token = login["access_token"].as_str().unwrap();
    let profile = app
        .oneshot(get_request("/api/auth/profile", Some(token)))
        .await
        .unwrap();
    assert_eq!(profile.status(), StatusCode::OK);

    let profile = body_json(profile).await;
    assert_eq!(profile["phone_number"], "9876540001");
    assert_eq!(profile["role"], "patient");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = setup();

    register(&app, "9876540002", "patient").await;

    let second = app
        .oneshot(json_request(
            "/api/auth/register",
            "POST",
            None,
            json!({
                "phone_number": "9876540002",
                "password": "password123",
                "full_name": "Test User"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_record_creation_attaches_assessment() {
    let app = setup();

    let registered = register(&app, "9876540003", "patient").await;
    let token = registered["access_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/records",
            "POST",
            Some(token),
            json!({
                "systolic": 150,
                "diastolic": 95,
                "heart_rate": 72,
                "temperature": 98.6,
                "weight": 60.0,
                "height": 165.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let record = body_json(response).await;

    assert_eq!(record["risk_score"], 0.3);
    assert_eq!(record["risk_level"], "low");
    assert!(record["recommendations"].as_array().unwrap().len() <= 5);

    let listing = app
        .oneshot(get_request("/api/records", Some(token)))
        .await
        .unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
    let listing = body_json(listing).await;
    assert!(!listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup();

    let response = app.oneshot(get_request("/api/records", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_patients_cannot_reach_admin_routes() {
    let app = setup();

    let registered = register(&app, "9876540004", "patient").await;
    let token = registered["access_token"].as_str().unwrap();

    let response = app
        .oneshot(get_request("/api/admin/stats", Some(token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_asha_can_broadcast_to_village() {
    let app = setup();

    register(&app, "9876540005", "patient").await;
    let asha = register(&app, "9876540006", "asha").await;
    let token = asha["access_token"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "/api/communication/broadcast",
            "POST",
            Some(token),
            json!({
                "village": "Rampur",
                "message": "Vaccination camp on Sunday",
                "channel": "sms"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let outcomes = body_json(response).await;
    assert!(!outcomes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_emergency_alert_round_trip() {
    let app = setup();

    let registered = register(&app, "9876540007", "patient").await;
    let token = registered["access_token"].as_str().unwrap();

    let created = app
        .clone()
        .oneshot(json_request(
            "/api/emergency",
            "POST",
            Some(token),
            json!({ "description": "Severe chest pain" }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let created = body_json(created).await;
    assert_eq!(created["alert_type"], "medical");
    assert_eq!(created["severity"], "high");
    assert_eq!(created["status"], "active");

    let listing = app
        .oneshot(get_request("/api/emergency", Some(token)))
        .await
        .unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
    let listing = body_json(listing).await;
    assert_eq!(listing.as_array().unwrap().len(), 1);
}
