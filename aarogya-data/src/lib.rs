// Aarogya Sahayak data layer
// This crate handles persistence for users, health records, appointments,
// emergency alerts and communication logs.

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
