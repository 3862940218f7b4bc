pub mod memory;
pub mod postgrest;

pub use memory::InMemoryStore;
pub use postgrest::PostgrestStore;

use async_trait::async_trait;
use serde_json::Value;

/// Equality filter on a single column.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Result ordering on a single column.
#[derive(Debug, Clone)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(String),
    #[error("store rejected {operation} on {table} ({status}): {detail}")]
    Rejected {
        operation: &'static str,
        table: String,
        status: u16,
        detail: String,
    },
    #[error("store returned a malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// Narrow insert/select/update/delete contract over the external tabular
/// store. The store assigns ids and creation timestamps on insert; rows
/// come back as JSON objects.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn insert(&self, table: &str, fields: Value) -> Result<Vec<Value>, StoreError>;

    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<Order>,
    ) -> Result<Vec<Value>, StoreError>;

    async fn update(
        &self,
        table: &str,
        fields: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError>;

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError>;
}
