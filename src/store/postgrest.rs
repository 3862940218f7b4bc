use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{Filter, Order, StoreClient, StoreError};

/// Store client speaking the PostgREST dialect exposed by Supabase.
/// Requests carry the project key both as `apikey` and as a bearer
/// credential; mutations ask for the affected rows back.
pub struct PostgrestStore {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    fn table_url(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Url, StoreError> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{}", table))
            .map_err(|e| StoreError::Transport(format!("invalid store url: {}", e)))?;

        // query_pairs_mut leaves a dangling "?" when nothing is appended
        if !filters.is_empty() || order.is_some() {
            let mut pairs = url.query_pairs_mut();
            for filter in filters {
                pairs.append_pair(&filter.column, &format!("eq.{}", filter.value));
            }
            if let Some(order) = order {
                let direction = if order.descending { "desc" } else { "asc" };
                pairs.append_pair("order", &format!("{}.{}", order.column, direction));
            }
        }

        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = request
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Ok(response)
    }

    async fn expect_rows(
        operation: &'static str,
        table: &str,
        response: reqwest::Response,
    ) -> Result<Vec<Value>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                operation,
                table: table.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl StoreClient for PostgrestStore {
    async fn insert(&self, table: &str, fields: Value) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table, &[], None)?;
        let response = self
            .send(
                self.http
                    .post(url)
                    .header("Prefer", "return=representation")
                    .json(&fields),
            )
            .await?;

        Self::expect_rows("insert", table, response).await
    }

    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table, filters, order.as_ref())?;
        let response = self.send(self.http.get(url)).await?;

        Self::expect_rows("select", table, response).await
    }

    async fn update(
        &self,
        table: &str,
        fields: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table, filters, None)?;
        let response = self
            .send(
                self.http
                    .patch(url)
                    .header("Prefer", "return=representation")
                    .json(&fields),
            )
            .await?;

        Self::expect_rows("update", table, response).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        let url = self.table_url(table, filters, None)?;
        let response = self.send(self.http.delete(url)).await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                operation: "delete",
                table: table.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        Ok(())
    }
}
