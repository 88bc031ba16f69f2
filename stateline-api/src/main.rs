//! Stateline API Server Entry Point
//!
//! Bootstraps configuration, prepares the states table, and starts the Axum
//! HTTP server. An optional background task refreshes the dataset on an
//! interval when `STATELINE_REFRESH_INTERVAL_SECONDS` is set.

use std::net::SocketAddr;

use axum::Router;
use stateline_api::jobs::{refresh_job_task, RefreshJobConfig};
use stateline_api::telemetry::{init_tracing, TelemetryConfig};
use stateline_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, DbConfig, SourceConfig, StateStore,
};
use stateline_core::ColumnRegistry;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let db_config = DbConfig::from_env()?;
    let store = StateStore::from_config(&db_config)?;

    // Bring the table up and fail fast on a stale schema, before serving.
    store.ensure_schema().await?;
    store.verify_schema().await?;

    let api_config = ApiConfig::from_env();
    let registry = ColumnRegistry::new();

    let app: Router = create_api_router(store.clone(), registry, &api_config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh_config = RefreshJobConfig::from_env();
    let refresh_handle = tokio::spawn(refresh_job_task(
        store,
        SourceConfig::from_env(),
        refresh_config,
        shutdown_rx,
    ));

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting Stateline API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    // Connect-info so the rate limiter sees real client addresses.
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = refresh_handle.await;

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("STATELINE_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("STATELINE_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::internal_error(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::internal_error(format!("Invalid bind address {}: {}", addr, e)))
}
