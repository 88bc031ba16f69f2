//! One-Shot Dataset Refresh Binary
//!
//! Pulls the configured feed and replaces the stored dataset, then prints
//! the refresh report as JSON to stdout. Exits nonzero on any failure,
//! leaving the previously stored dataset untouched.
//!
//! Usage:
//!   DATABASE_URL=postgres://... cargo run -p stateline-api --bin stateline-refresh

use stateline_api::ingest::{self, SourceConfig};
use stateline_api::telemetry::{init_tracing, TelemetryConfig};
use stateline_api::{DbConfig, StateStore};

#[tokio::main]
async fn main() {
    if let Err(e) = init_tracing(&TelemetryConfig::default()) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run().await {
        eprintln!("Refresh failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DbConfig::from_env()?;
    let store = StateStore::from_config(&db_config)?;

    store.ensure_schema().await?;
    store.verify_schema().await?;

    let source = SourceConfig::from_env();
    let client = ingest::http_client()?;

    let report = ingest::refresh(&store, &client, &source).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
