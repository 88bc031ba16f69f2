//! OpenAPI Specification for the Stateline API
//!
//! This module defines the OpenAPI document for the service. It uses utoipa
//! to generate the specification from Rust types and route annotations.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, states};
use stateline_core::StateRecord;

/// OpenAPI document for the Stateline API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stateline API",
        version = "0.3.0",
        description = "Read-only query service over the classic US state demographics dataset",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "States", description = "Dataset queries with whitelist-validated sorting and name filtering"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        states::list_states,
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Dataset Types ===
            StateRecord,

            // === Health Types ===
            health::HealthResponse, health::HealthStatus,
            health::HealthDetails, health::ComponentHealth,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Stateline API");
        assert_eq!(openapi.info.version, "0.3.0");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 2);

        Ok(())
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;

        // Verify it's valid JSON by parsing it back
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;

        assert!(json.contains("Stateline API"));
        assert!(json.contains("StateRecord"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();

        assert!(!openapi.paths.paths.is_empty());
        assert!(openapi.paths.paths.contains_key("/states"));
        assert!(openapi.paths.paths.contains_key("/health/ping"));
        assert!(openapi.paths.paths.contains_key("/health/live"));
        assert!(openapi.paths.paths.contains_key("/health/ready"));
    }
}
