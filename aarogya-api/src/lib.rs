// aarogya-api lib.rs
//
// This is the main library file for the Aarogya Sahayak API.
// It re-exports the APIs from the various modules.

// Public modules
pub mod api;
pub mod openapi;

use axum::Router;

/// Create the application router
pub fn create_application() -> Router {
    api::routes::create_app()
}
