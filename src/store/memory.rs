use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Filter, Order, StoreClient, StoreError};

/// In-memory stand-in for the external store, used by the test suite and
/// handy for local development. Rows live in a mutex-guarded map of
/// tables; ids and creation timestamps are assigned on insert, matching
/// the contract the remote store provides.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Vec<Map<String, Value>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held in a table. Lets tests assert the
    /// absence of side effects after a rejected request.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .expect("store lock poisoned")
            .get(table)
            .map_or(0, |rows| rows.len())
    }
}

fn matches(row: &Map<String, Value>, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        row.get(&filter.column).is_some_and(|value| match value {
            Value::String(s) => s == &filter.value,
            other => other.to_string() == filter.value,
        })
    })
}

fn sort_key(row: &Map<String, Value>, column: &str) -> String {
    row.get(column).map_or(String::new(), |value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn insert(&self, table: &str, fields: Value) -> Result<Vec<Value>, StoreError> {
        let mut row = match fields {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Decode(format!(
                    "insert expects an object, got {}",
                    other
                )))
            }
        };

        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        row.insert(
            "created_at".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );

        let mut tables = self.tables.lock().expect("store lock poisoned");
        tables.entry(table.to_string()).or_default().push(row.clone());

        Ok(vec![Value::Object(row)])
    }

    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.lock().expect("store lock poisoned");
        let mut rows: Vec<Map<String, Value>> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches(r, filters)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let key_a = sort_key(a, &order.column);
                let key_b = sort_key(b, &order.column);
                if order.descending {
                    key_b.cmp(&key_a)
                } else {
                    key_a.cmp(&key_b)
                }
            });
        }

        Ok(rows.into_iter().map(Value::Object).collect())
    }

    async fn update(
        &self,
        table: &str,
        fields: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError> {
        let changes = match fields {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Decode(format!(
                    "update expects an object, got {}",
                    other
                )))
            }
        };

        let mut tables = self.tables.lock().expect("store lock poisoned");
        let mut updated = Vec::new();

        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches(r, filters)) {
                for (column, value) in &changes {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(Value::Object(row.clone()));
            }
        }

        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store lock poisoned");
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| !matches(r, filters));
        }

        Ok(())
    }
}
