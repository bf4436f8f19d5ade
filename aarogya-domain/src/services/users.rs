use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

use aarogya_data::models::user::CreateUserRecord;
use aarogya_data::repository::otp_cache;
use aarogya_data::repository::{RepositoryError, UserRepositoryTrait};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{generate_token, TokenType};
use crate::entities::conversions::convert_to_domain_user;
use crate::entities::User;

/// Indian mobile numbers: ten digits starting with 6-9
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid regex"));

/// User service errors
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Phone number already registered
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Wrong phone number or password
    #[error("Invalid phone number or password")]
    InvalidCredentials,

    /// Account has been deactivated
    #[error("Account is deactivated")]
    AccountDeactivated,

    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Verification code wrong, expired or already used
    #[error("Invalid or expired verification code")]
    InvalidOtp,

    /// Token generation failure
    #[error("Token error: {0}")]
    Token(String),

    /// Password hashing failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for UserServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => UserServiceError::Conflict(msg),
            RepositoryError::NotFound(msg) => UserServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => UserServiceError::Validation(msg),
            _ => UserServiceError::Repository(err.to_string()),
        }
    }
}

/// Input for registering a new account
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Ten-digit Indian mobile number
    #[validate(regex(
        path = "PHONE_PATTERN",
        message = "Phone number must be a ten-digit Indian mobile number"
    ))]
    pub phone_number: String,
    /// Plain-text password, hashed before storage
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Full display name
    #[validate(length(min = 1, message = "Full name must not be empty"))]
    pub full_name: String,
    /// Requested role: "patient" or "asha"
    pub role: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub village: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub preferred_language: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Tokens and profile returned after registration or login
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    /// JWT access token, valid for 24 hours
    pub access_token: String,
    /// JWT refresh token, valid for 30 days
    pub refresh_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// The authenticated user
    pub user: User,
}

/// Account management: registration, login, profile and phone verification
pub struct UserService<R: UserRepositoryTrait> {
    repository: R,
}

impl<R: UserRepositoryTrait> UserService<R> {
    /// Create a new user service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn validate_registration(&self, request: &RegisterRequest) -> Result<(), UserServiceError> {
        request
            .validate()
            .map_err(|e| UserServiceError::Validation(e.to_string()))?;

        if request.full_name.trim().is_empty() {
            return Err(UserServiceError::Validation(
                "Full name must not be empty".to_string(),
            ));
        }

        if let Some(role) = request.role.as_deref() {
            // Admin accounts are provisioned out of band, never self-registered
            if role != "patient" && role != "asha" {
                return Err(UserServiceError::Validation(
                    "Role must be \"patient\" or \"asha\"".to_string(),
                ));
            }
        }

        if let Some(contact) = request.emergency_contact.as_deref() {
            if !PHONE_PATTERN.is_match(contact) {
                return Err(UserServiceError::Validation(
                    "Emergency contact must be a ten-digit Indian mobile number".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn issue_tokens(&self, user: User) -> Result<AuthResponse, UserServiceError> {
        let access_token = generate_token(&user.id, &user.role, TokenType::Access)
            .map_err(|e| UserServiceError::Token(e.to_string()))?;
        let refresh_token = generate_token(&user.id, &user.role, TokenType::Refresh)
            .map_err(|e| UserServiceError::Token(e.to_string()))?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            user,
        })
    }

    /// Register a new account and issue tokens
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, UserServiceError> {
        self.validate_registration(&request)?;

        let password_hash = hash_password(&request.password)
            .map_err(|e| UserServiceError::Internal(e.to_string()))?;

        let record = self
            .repository
            .create(CreateUserRecord {
                phone_number: request.phone_number,
                email: request.email,
                password_hash,
                full_name: request.full_name,
                date_of_birth: request.date_of_birth,
                gender: request.gender,
                role: request.role.unwrap_or_else(|| "patient".to_string()),
                village: request.village,
                district: request.district,
                state: request.state,
                pincode: request.pincode,
                preferred_language: request.preferred_language.unwrap_or_else(|| "hi".to_string()),
                emergency_contact: request.emergency_contact,
            })
            .await?;

        info!("Registered new {} account {}", record.role, record.id);
        self.issue_tokens(convert_to_domain_user(record))
    }

    /// Authenticate with phone number and password
    pub async fn login(&self, phone_number: &str, password: &str) -> Result<AuthResponse, UserServiceError> {
        let record = self
            .repository
            .find_by_phone(phone_number)
            .await?
            .ok_or(UserServiceError::InvalidCredentials)?;

        let matches = verify_password(password, &record.password_hash)
            .map_err(|e| UserServiceError::Internal(e.to_string()))?;

        if !matches {
            warn!("Failed login attempt for user {}", record.id);
            return Err(UserServiceError::InvalidCredentials);
        }

        if !record.is_active {
            return Err(UserServiceError::AccountDeactivated);
        }

        self.repository.update_last_login(&record.id).await?;
        info!("User {} logged in", record.id);

        self.issue_tokens(convert_to_domain_user(record))
    }

    /// Fetch the profile for an authenticated user
    pub async fn profile(&self, user_id: &str) -> Result<User, UserServiceError> {
        let record = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(user_id.to_string()))?;

        Ok(convert_to_domain_user(record))
    }

    /// Start phone verification: generate a six-digit code and store it
    /// in the OTP cache. Returns the code so the caller can deliver it.
    pub async fn request_phone_verification(&self, user_id: &str) -> Result<(String, String), UserServiceError> {
        let record = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(user_id.to_string()))?;

        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        otp_cache::cache().store(&record.phone_number, &code);

        info!("Issued verification code for user {}", record.id);
        Ok((record.phone_number, code))
    }

    /// Complete phone verification: consume the code and mark the account
    /// verified. Each code works at most once.
    pub async fn verify_otp(&self, user_id: &str, code: &str) -> Result<(), UserServiceError> {
        let record = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(user_id.to_string()))?;

        if !otp_cache::cache().consume(&record.phone_number, code) {
            return Err(UserServiceError::InvalidOtp);
        }

        self.repository.mark_verified(&record.phone_number).await?;
        info!("User {} verified their phone number", record.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarogya_data::repository::mocks::MockUserRepository;

    fn setup_test_env() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
    }

    fn register_request(phone: &str) -> RegisterRequest {
        RegisterRequest {
            phone_number: phone.to_string(),
            password: "password123".to_string(),
            full_name: "Sita Devi".to_string(),
            role: Some("patient".to_string()),
            email: None,
            date_of_birth: None,
            gender: None,
            village: Some("Rampur".to_string()),
            district: None,
            state: None,
            pincode: None,
            preferred_language: None,
            emergency_contact: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        setup_test_env();
        let service = UserService::new(MockUserRepository::new());

        let registered = service.register(register_request("9876501234")).await.unwrap();
        assert_eq!(registered.token_type, "Bearer");
        assert_eq!(registered.user.role, "patient");
        assert!(!registered.access_token.is_empty());

        let logged_in = service.login("9876501234", "password123").await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_phone() {
        setup_test_env();
        let service = UserService::new(MockUserRepository::new());

        let result = service.register(register_request("1234567890")).await;
        assert!(matches!(result, Err(UserServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_admin_role() {
        setup_test_env();
        let service = UserService::new(MockUserRepository::new());

        let mut request = register_request("9876501234");
        request.role = Some("admin".to_string());

        let result = service.register(request).await;
        assert!(matches!(result, Err(UserServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_a_conflict() {
        setup_test_env();
        let service = UserService::new(MockUserRepository::new());

        service.register(register_request("9876501234")).await.unwrap();
        let result = service.register(register_request("9876501234")).await;
        assert!(matches!(result, Err(UserServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        setup_test_env();
        let service = UserService::new(MockUserRepository::new());

        service.register(register_request("9876501234")).await.unwrap();
        let result = service.login("9876501234", "wrong-password").await;
        assert!(matches!(result, Err(UserServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_phone_verification_flow() {
        setup_test_env();
        let service = UserService::new(MockUserRepository::new());

        let registered = service.register(register_request("9876512345")).await.unwrap();
        assert!(!registered.user.is_verified);

        let (phone, code) = service
            .request_phone_verification(&registered.user.id)
            .await
            .unwrap();
        assert_eq!(phone, "9876512345");
        assert_eq!(code.len(), 6);

        service.verify_otp(&registered.user.id, &code).await.unwrap();

        let profile = service.profile(&registered.user.id).await.unwrap();
        assert!(profile.is_verified);

        // The code is single use
        let second = service.verify_otp(&registered.user.id, &code).await;
        assert!(matches!(second, Err(UserServiceError::InvalidOtp)));
    }

    #[tokio::test]
    async fn test_wrong_otp_rejected() {
        setup_test_env();
        let service = UserService::new(MockUserRepository::new());

        let registered = service.register(register_request("9876523456")).await.unwrap();
        service
            .request_phone_verification(&registered.user.id)
            .await
            .unwrap();

        let result = service.verify_otp(&registered.user.id, "000000").await;
        assert!(matches!(result, Err(UserServiceError::InvalidOtp)));
    }
}
