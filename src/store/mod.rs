//! Table-store seam. Services speak this trait; the PostgREST client and the
//! in-memory test double both implement it.

pub mod memory;
pub mod postgrest;

pub use memory::MemStore;
pub use postgrest::PostgrestClient;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("remote store is not configured: {0}")]
    NotConfigured(String),
    #[error("column {table}.{column} does not exist")]
    MissingColumn { table: String, column: String },
    #[error("table {table} does not exist")]
    MissingTable { table: String },
    #[error("duplicate key: {0}")]
    Conflict(String),
    #[error("no rows matched")]
    NotFound,
    #[error("permission denied: {0}")]
    Permission(String),
    #[error("remote store error: {0}")]
    Remote(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Equality filter on one column. The only predicate this layer needs;
/// PostgREST renders it as `col=eq.value`.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: true,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
        }
    }
}

pub type Row = Map<String, Value>;

pub trait TableStore: Send + Sync {
    /// All rows matching the filters, in the given order.
    fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError>;

    /// First matching row, or None. Zero rows is not an error.
    fn select_one(&self, table: &str, filters: &[Filter]) -> Result<Option<Value>, StoreError>;

    /// Insert one row and return it with server-assigned fields.
    fn insert(&self, table: &str, row: &Row) -> Result<Value, StoreError>;

    /// Patch all rows matching the filters; returns the first updated row.
    /// Zero rows updated is `NotFound`.
    fn update(&self, table: &str, filters: &[Filter], patch: &Row) -> Result<Value, StoreError>;

    /// Insert-or-update on the given conflict columns.
    fn upsert(
        &self,
        table: &str,
        rows: &[Row],
        on_conflict: &[&str],
    ) -> Result<Vec<Value>, StoreError>;

    /// Delete all rows matching the filters; returns how many were removed.
    /// Zero is success.
    fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError>;

    /// Rows where any of `columns` contains `needle`, case-insensitively.
    fn search(
        &self,
        table: &str,
        columns: &[&str],
        needle: &str,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Short label for log lines ("service-role" / "anon" / "memory").
    fn label(&self) -> &str;
}
