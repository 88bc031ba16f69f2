//! States REST API Routes
//!
//! The read-only query surface over the states dataset. Sort keys are
//! validated against the column registry before the store is touched, so an
//! unknown key is rejected without spending a connection; the name filter
//! always travels as a bound parameter.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use stateline_core::{build_query, ColumnRegistry, StateRecord};
use utoipa::IntoParams;

use crate::db::StateStore;
use crate::error::{ApiError, ApiResult};

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct StatesState {
    pub store: StateStore,
    pub registry: ColumnRegistry,
}

impl StatesState {
    pub fn new(store: StateStore, registry: ColumnRegistry) -> Self {
        Self { store, registry }
    }
}

// ============================================================================
// TYPES
// ============================================================================

/// Query parameters accepted by the listing endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListStatesParams {
    /// Field to sort by, matched case-insensitively against the public field
    /// names. Defaults to `name`. Results are always ascending.
    pub sort_by: Option<String>,
    /// Case-insensitive substring filter on the state name. An empty value
    /// is treated as no filter.
    pub name_contains: Option<String>,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /states - List states, optionally filtered and sorted
#[utoipa::path(
    get,
    path = "/states",
    tag = "States",
    params(ListStatesParams),
    responses(
        (status = 200, description = "Matching states in ascending sort order", body = Vec<StateRecord>),
        (status = 400, description = "Unknown sort key", body = ApiError),
        (status = 503, description = "Store unavailable", body = ApiError),
        (status = 500, description = "Query execution failed", body = ApiError),
    ),
)]
pub async fn list_states(
    State(state): State<Arc<StatesState>>,
    Query(params): Query<ListStatesParams>,
) -> ApiResult<Json<Vec<StateRecord>>> {
    // Sort key validation happens here, before any store interaction.
    let plan = build_query(
        &state.registry,
        params.sort_by.as_deref(),
        params.name_contains.as_deref(),
    )?;

    let records = state.store.fetch(&plan).await?;
    Ok(Json(records))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the states routes router.
pub fn create_router(store: StateStore, registry: ColumnRegistry) -> Router {
    let state = Arc::new(StatesState::new(store, registry));

    Router::new().route("/", get(list_states)).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_default_to_no_sort_and_no_filter() {
        let params = ListStatesParams::default();
        assert!(params.sort_by.is_none());
        assert!(params.name_contains.is_none());
    }

    #[test]
    fn params_deserialize_from_query_shapes() {
        let params: ListStatesParams =
            serde_json::from_str(r#"{"sort_by": "population", "name_contains": "new"}"#)
                .expect("params deserialize");
        assert_eq!(params.sort_by.as_deref(), Some("population"));
        assert_eq!(params.name_contains.as_deref(), Some("new"));

        let params: ListStatesParams = serde_json::from_str("{}").expect("params deserialize");
        assert!(params.sort_by.is_none());
    }
}
