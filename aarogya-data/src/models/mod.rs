// Storage models shared between the repositories and the domain layer

pub mod appointment;
pub mod communication;
pub mod emergency;
pub mod health_record;
pub mod user;
