// Domain services
// This module contains business logic implementations.

pub mod appointments;
pub mod communication;
pub mod emergency;
pub mod health_records;
pub mod risk;
pub mod users;

// Re-export the scoring engine surface
pub use risk::{assess, RiskAssessment, RiskLevel, VitalSnapshot};
