//! Background Jobs for the Stateline API
//!
//! This module contains background tasks that run alongside request serving:
//!
//! - `refresh`: Periodically re-pulls the dataset feed and replaces the
//!   stored dataset
//!
//! # Usage
//!
//! Background jobs are typically spawned during server startup:
//!
//! ```ignore
//! use stateline_api::jobs::{refresh_job_task, RefreshJobConfig};
//! use tokio::sync::watch;
//!
//! // Create shutdown signal
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//! // Spawn refresh task
//! let config = RefreshJobConfig::from_env();
//! tokio::spawn(refresh_job_task(store, source, config, shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod refresh;

// Re-export commonly used types
pub use refresh::{refresh_job_task, RefreshJobConfig, RefreshJobMetrics};
