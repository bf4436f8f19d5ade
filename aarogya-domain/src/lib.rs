// Aarogya Sahayak domain layer
// This crate contains the business logic for the Aarogya Sahayak platform

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Outbound SMS and WhatsApp messaging
pub mod messaging;

// Domain entities
pub mod entities;

// Re-export the database module from aarogya-data for convenience
pub use aarogya_data::database;
