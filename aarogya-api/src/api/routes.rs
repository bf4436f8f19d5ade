use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tracing::debug;

use aarogya_data::repository::{
    AppointmentRepository, CommunicationLogRepository, EmergencyAlertRepository,
    HealthRecordRepository, UserRepository,
};
use aarogya_domain::auth::{auth_middleware, configure_auth, require_any_role};
use aarogya_domain::messaging::{MessagingConfig, SmsClient, WhatsAppClient};
use aarogya_domain::services::appointments::AppointmentService;
use aarogya_domain::services::communication::CommunicationService;
use aarogya_domain::services::emergency::EmergencyService;
use aarogya_domain::services::health_records::HealthRecordService;
use aarogya_domain::services::users::UserService;

use crate::api::handlers::{admin, appointments, auth, communication, emergency, health, health_records};
use crate::openapi::configure_swagger_routes;

/// Shared application state: one service instance per domain area
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService<UserRepository>>,
    pub records: Arc<HealthRecordService<HealthRecordRepository>>,
    pub appointments: Arc<AppointmentService<AppointmentRepository>>,
    pub emergency: Arc<EmergencyService<EmergencyAlertRepository, UserRepository>>,
    pub communication: Arc<CommunicationService<UserRepository, CommunicationLogRepository>>,
    pub user_repository: UserRepository,
    pub sms: SmsClient,
}

impl AppState {
    /// Wire up services against the SQLite repositories and the
    /// environment-derived messaging configuration
    pub fn from_env() -> Self {
        let messaging = MessagingConfig::from_env();
        let sms = SmsClient::new(messaging.clone());
        let whatsapp = WhatsAppClient::new(messaging);

        Self {
            users: Arc::new(UserService::new(UserRepository::new())),
            records: Arc::new(HealthRecordService::new(HealthRecordRepository::new())),
            appointments: Arc::new(AppointmentService::new(AppointmentRepository::new())),
            emergency: Arc::new(EmergencyService::new(
                EmergencyAlertRepository::new(),
                UserRepository::new(),
                sms.clone(),
                whatsapp.clone(),
            )),
            communication: Arc::new(CommunicationService::new(
                UserRepository::new(),
                CommunicationLogRepository::new(),
                sms.clone(),
                whatsapp,
            )),
            user_repository: UserRepository::new(),
            sms,
        }
    }
}

/// Create the application router
pub fn create_app() -> Router {
    debug!("Creating application router");

    let state = AppState::from_env();

    // Routes that require a valid access token
    let protected_routes = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/auth/verify-phone", post(auth::verify_phone))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route(
            "/records",
            get(health_records::list_records).post(health_records::create_record),
        )
        .route("/dashboard", get(health_records::dashboard))
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::book_appointment),
        )
        .route(
            "/emergency",
            get(emergency::list_alerts).post(emergency::raise_alert),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AppState>,
        ));

    debug!("Protected routes configured");

    // Outbound messaging is restricted to ASHA workers and admins
    let communication_routes = Router::new()
        .route("/communication/sms", post(communication::send_sms))
        .route("/communication/whatsapp", post(communication::send_whatsapp))
        .route("/communication/broadcast", post(communication::broadcast))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_any_role::<AppState>(&["asha", "admin"]),
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AppState>,
        ));

    // Admin routes require the admin role
    let admin_routes = Router::new()
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_any_role::<AppState>(&["admin"]),
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AppState>,
        ));

    debug!("Admin routes configured");

    // Routes open without authentication
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(communication_routes)
        .merge(admin_routes);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .with_state(state);

    debug!("API routes nested");

    // Swagger UI
    let app = app.merge(configure_swagger_routes());

    // CORS and security headers
    let app = configure_auth(app);
    debug!("Security configuration applied");

    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}
