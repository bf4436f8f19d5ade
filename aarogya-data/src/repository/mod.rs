// Repository module structure
pub mod errors;
pub mod otp_cache;
mod appointments;
mod communication;
mod emergency;
mod health_records;
mod users;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use appointments::{AppointmentRepository, AppointmentRepositoryTrait};
pub use communication::{CommunicationLogRepository, CommunicationLogRepositoryTrait};
pub use emergency::{EmergencyAlertRepository, EmergencyAlertRepositoryTrait};
pub use health_records::{HealthRecordRepository, HealthRecordRepositoryTrait};
pub use users::{UserRepository, UserRepositoryTrait};

// Re-export mock repositories for testing and when the mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod mocks {
    pub use super::appointments::tests::MockAppointmentRepository;
    pub use super::communication::tests::MockCommunicationLogRepository;
    pub use super::emergency::tests::MockEmergencyAlertRepository;
    pub use super::health_records::tests::MockHealthRecordRepository;
    pub use super::users::tests::MockUserRepository;
}
