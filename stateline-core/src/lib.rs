//! Stateline Core - States Dataset Domain
//!
//! Pure domain logic for the states dataset: the column registry, query
//! planning, and source-row mapping. No I/O happens in this crate; the API
//! layer wires these pieces to the relational store and the network feed.

pub mod columns;
pub mod error;
pub mod mapping;
pub mod query;
pub mod record;

// Re-export commonly used types
pub use columns::{
    col, create_table_sql, insert_sql, select_list, ColumnDef, ColumnKind, ColumnRegistry,
    DEFAULT_SORT_KEY, STATE_COLUMNS, TABLE,
};
pub use error::{IngestError, MappingError, QueryError, StoreError};
pub use mapping::record_from_row;
pub use query::{build_query, QueryPlan};
pub use record::StateRecord;
