//! Chancel API
//!
//! The axum binary crate for the media ingestion service: `/media` routes,
//! health checks, startup validation, and OpenAPI documentation. Modules are
//! exposed so the integration test suite can assemble the router against
//! in-memory backends.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
