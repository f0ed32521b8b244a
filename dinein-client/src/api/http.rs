//! HTTP implementation of the API traits

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};
use shared::models::{Order, OrderCreate, Table, TableSession, TableStatus, TableStatusUpdate};
use shared::response::ApiEnvelope;
use std::time::Duration;

use super::{OrderApi, TableApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP client for the restaurant backend
///
/// Every endpoint answers with an [`ApiEnvelope`]. Failed requests are not
/// retried; callers decide whether to surface or repeat them.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApiClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorize(self.client.get(self.url(path)));
        Self::send(request).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<T> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        Self::send(request).await
    }

    /// POST a command whose answer carries no data
    async fn post_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<()> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        let bytes = Self::send_raw(request).await?;
        Self::parse_ack(&bytes)
    }

    async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<T> {
        let request = self.authorize(self.client.patch(self.url(path)).json(body));
        Self::send(request).await
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let bytes = Self::send_raw(request).await?;
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes)?;
        Ok(envelope.into_result()?)
    }

    /// Body of a successful response
    async fn send_raw(request: RequestBuilder) -> ClientResult<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "API request failed");
            return Err(ClientError::Status { status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn parse_ack(body: &[u8]) -> ClientResult<()> {
        let envelope: ApiEnvelope<IgnoredAny> = serde_json::from_slice(body)?;
        Ok(envelope.into_ack()?)
    }
}

#[async_trait]
impl OrderApi for HttpApiClient {
    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.get(&format!("/api/orders/{}", order_id)).await
    }

    async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        order.validate()?;
        let created: Order = self.post("/api/orders", order).await?;
        tracing::info!(order_id = %created.id, order_number = %created.order_number, "Order placed");
        Ok(created)
    }

    async fn orders_by_restaurant(&self, restaurant_id: &str) -> ClientResult<Vec<Value>> {
        self.get(&format!("/api/restaurants/{}/orders", restaurant_id))
            .await
    }

    async fn cancel_order(&self, order_id: &str) -> ClientResult<Order> {
        self.post(&format!("/api/orders/{}/cancel", order_id), &json!({}))
            .await
    }

    async fn request_assistance(&self, table_id: &str, message: Option<&str>) -> ClientResult<()> {
        self.post_ack(
            &format!("/api/tables/{}/assistance", table_id),
            &json!({ "message": message }),
        )
        .await?;
        tracing::info!(table_id = %table_id, "Assistance requested");
        Ok(())
    }
}

#[async_trait]
impl TableApi for HttpApiClient {
    async fn tables_by_restaurant(&self, restaurant_id: &str) -> ClientResult<Vec<Table>> {
        self.get(&format!("/api/restaurants/{}/tables", restaurant_id))
            .await
    }

    async fn update_table_status(&self, table_id: &str, status: TableStatus) -> ClientResult<Table> {
        self.patch(
            &format!("/api/tables/{}/status", table_id),
            &TableStatusUpdate { status },
        )
        .await
    }

    async fn sessions_by_table(&self, table_id: &str) -> ClientResult<Vec<TableSession>> {
        self.get(&format!("/api/tables/{}/sessions", table_id)).await
    }

    async fn close_session(&self, session_id: &str) -> ClientResult<TableSession> {
        self.post(&format!("/api/sessions/{}/close", session_id), &json!({}))
            .await
    }
}
