//! Stateline API - REST Query Surface and Dataset Refresh
//!
//! This crate provides the service layer over the states dataset: the
//! read-only REST endpoint (Axum), the PostgreSQL store, and the refresh
//! pipeline that pulls the external feed and atomically replaces the stored
//! dataset. The validation and mapping logic lives in stateline-core; this
//! crate wires it to the network and the store.

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod jobs;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod telemetry;

// Re-export commonly used types
pub use config::ApiConfig;
pub use db::{DbConfig, StateStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use ingest::{refresh, RefreshReport, SourceConfig, SourceFormat};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use telemetry::{init_tracing, TelemetryConfig};
