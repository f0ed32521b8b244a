//! REST API surface used by the views
//!
//! Views depend on the [`OrderApi`] and [`TableApi`] traits so they can run
//! against test doubles; [`HttpApiClient`] is the production implementation.

mod http;

pub use http::HttpApiClient;

use async_trait::async_trait;
use serde_json::Value;
use shared::models::{Order, OrderCreate, Table, TableSession, TableStatus};

use crate::error::ClientResult;

/// Order endpoints
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn get_order(&self, order_id: &str) -> ClientResult<Order>;

    async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order>;

    /// Raw order records for dashboards
    ///
    /// Kept as JSON: revenue fields vary in name and type between backend
    /// versions and are interpreted by the metrics aggregator.
    async fn orders_by_restaurant(&self, restaurant_id: &str) -> ClientResult<Vec<Value>>;

    async fn cancel_order(&self, order_id: &str) -> ClientResult<Order>;

    /// Ask staff to come to the table
    async fn request_assistance(&self, table_id: &str, message: Option<&str>) -> ClientResult<()>;
}

/// Table and table-session endpoints
#[async_trait]
pub trait TableApi: Send + Sync {
    async fn tables_by_restaurant(&self, restaurant_id: &str) -> ClientResult<Vec<Table>>;

    async fn update_table_status(&self, table_id: &str, status: TableStatus) -> ClientResult<Table>;

    async fn sessions_by_table(&self, table_id: &str) -> ClientResult<Vec<TableSession>>;

    async fn close_session(&self, session_id: &str) -> ClientResult<TableSession>;
}
