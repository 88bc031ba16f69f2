//! Error types for Stateline operations

use thiserror::Error;

/// Query planning errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown sort key \"{requested}\"; valid keys: {}", .valid.join(", "))]
    InvalidSortKey {
        requested: String,
        valid: Vec<&'static str>,
    },
}

/// Source-row mapping errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Source row missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Schema drift: stored table missing columns {missing:?}")]
    SchemaDrift { missing: Vec<String> },
}

/// Dataset refresh errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    // The feed location is named `url` because thiserror reserves `source`
    // for the error-chain cause.
    #[error("Fetch from {url} failed: {reason}")]
    SourceFetchFailed { url: String, reason: String },

    #[error("Source payload unusable: {0}")]
    SourceParseFailed(String),

    #[error("Store write failed: {0}")]
    StoreWriteFailed(String),
}

// =============================================================================
// TESTS
// =============================================================================
