use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::profile,
        crate::api::handlers::auth::verify_phone,
        crate::api::handlers::auth::verify_otp,

        // Health record endpoints
        crate::api::handlers::health_records::create_record,
        crate::api::handlers::health_records::list_records,
        crate::api::handlers::health_records::dashboard,

        // Appointment endpoints
        crate::api::handlers::appointments::book_appointment,
        crate::api::handlers::appointments::list_appointments,

        // Emergency endpoints
        crate::api::handlers::emergency::raise_alert,
        crate::api::handlers::emergency::list_alerts,

        // Communication endpoints
        crate::api::handlers::communication::send_sms,
        crate::api::handlers::communication::send_whatsapp,
        crate::api::handlers::communication::broadcast,

        // Admin endpoints
        crate::api::handlers::admin::stats,
        crate::api::handlers::admin::list_users,
    ),
    components(
        schemas(
            // Entities
            aarogya_domain::entities::User,
            aarogya_domain::entities::HealthRecord,
            aarogya_domain::entities::Appointment,
            aarogya_domain::entities::EmergencyAlert,

            // Scoring engine
            aarogya_domain::services::risk::RiskLevel,
            aarogya_domain::services::risk::RiskAssessment,

            // Auth schemas
            aarogya_domain::auth::Claims,
            aarogya_domain::auth::UserInfo,
            aarogya_domain::services::users::RegisterRequest,
            aarogya_domain::services::users::AuthResponse,
            crate::api::handlers::auth::LoginRequest,
            crate::api::handlers::auth::VerifyOtpRequest,
            crate::api::handlers::auth::MessageResponse,

            // Request/response bodies
            aarogya_domain::services::health_records::CreateHealthRecordRequest,
            aarogya_domain::services::health_records::PatientDashboard,
            aarogya_domain::services::health_records::WorkerDashboard,
            aarogya_domain::services::appointments::BookAppointmentRequest,
            aarogya_domain::services::emergency::RaiseAlertRequest,
            aarogya_domain::services::communication::Channel,
            aarogya_domain::services::communication::BroadcastRequest,
            crate::api::handlers::communication::SendMessageRequest,
            crate::api::handlers::admin::AdminStats,
            crate::api::handlers::admin::UserListParams,
            crate::api::handlers::health_records::RecordListParams,

            // Common
            crate::api::handlers::ErrorResponse,
            crate::api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Registration, login and phone verification"),
        (name = "records", description = "Vital-sign records and risk assessment"),
        (name = "appointments", description = "Appointment booking"),
        (name = "emergency", description = "Emergency alerting"),
        (name = "communication", description = "Outbound SMS and WhatsApp messaging"),
        (name = "admin", description = "Administrative statistics and user management"),
    ),
    info(
        title = "Aarogya Sahayak API",
        version = "0.1.0",
        description = "Community-health platform API: vital-sign tracking with rule-based risk assessment, appointments, emergency alerting and outreach messaging",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
