//! Query Planning
//!
//! The only place query text is assembled. Raw identifiers in the emitted
//! SQL come exclusively from the column registry; anything the caller typed
//! travels as a bound parameter. Sort keys are validated here, before any
//! store interaction, so an unknown key never costs a connection.

use crate::columns::{col, select_list, ColumnRegistry, DEFAULT_SORT_KEY, TABLE};
use crate::error::QueryError;

// ============================================================================
// QUERY PLAN
// ============================================================================

/// A validated read over the states table.
///
/// `order_by` is always a registry-resolved storage identifier; the name
/// filter, when present, is pre-shaped into a `%fragment%` pattern with LIKE
/// wildcards escaped, ready to bind as `$1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    order_by: &'static str,
    name_pattern: Option<String>,
}

impl QueryPlan {
    /// Parameterized statement text for this plan.
    pub fn sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", select_list(), TABLE);
        if self.name_pattern.is_some() {
            sql.push_str(" WHERE ");
            sql.push_str(col::STATE_NAME);
            sql.push_str(" ILIKE $1 ESCAPE '\\'");
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(self.order_by);
        sql.push_str(" ASC");
        sql
    }

    /// Pattern to bind as `$1`, when a name filter was requested.
    pub fn name_pattern(&self) -> Option<&str> {
        self.name_pattern.as_deref()
    }

    /// Storage identifier the results are ordered by.
    pub fn order_by(&self) -> &'static str {
        self.order_by
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Validate a sort key and optional substring filter into a [`QueryPlan`].
///
/// The sort key is matched ASCII case-insensitively against the registry's
/// public names; a `None` key falls back to [`DEFAULT_SORT_KEY`]. Unknown
/// keys fail with [`QueryError::InvalidSortKey`] carrying the full set of
/// valid names. An empty filter is treated as absent.
pub fn build_query(
    registry: &ColumnRegistry,
    sort_key: Option<&str>,
    name_filter: Option<&str>,
) -> Result<QueryPlan, QueryError> {
    let requested = sort_key.unwrap_or(DEFAULT_SORT_KEY);
    let order_by = registry
        .resolve(requested)
        .ok_or_else(|| QueryError::InvalidSortKey {
            requested: requested.to_string(),
            valid: registry.public_names().collect(),
        })?;

    let name_pattern = name_filter
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| format!("%{}%", escape_like(fragment)));

    Ok(QueryPlan {
        order_by,
        name_pattern,
    })
}

/// Escape LIKE wildcards so a caller fragment matches literally inside the
/// surrounding `%...%` pattern.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
