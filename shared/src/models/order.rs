//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::money::{self, OrderTotals, TaxConfig};
use crate::status::OrderStatus;

/// Selected customization on a line item (e.g. "Size: Large")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    /// Price added per unit
    #[serde(default)]
    pub price_modifier: f64,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: u32,
    /// Base unit price in currency unit
    pub unit_price: f64,
    /// Line subtotal as computed by the server
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customizations: Vec<Customization>,
}

impl OrderItem {
    /// Unit price including customization modifiers
    pub fn effective_unit_price(&self) -> f64 {
        let modifiers: f64 = self.customizations.iter().map(|c| c.price_modifier).sum();
        money::round_money(self.unit_price + modifiers)
    }

    /// Line subtotal recomputed locally
    pub fn computed_subtotal(&self) -> f64 {
        money::to_f64(money::line_subtotal(
            self.effective_unit_price(),
            self.quantity,
        ))
    }
}

/// Guest contact details attached to an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuestInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Order (server-owned; the client holds a cached projection)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_info: Option<GuestInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Estimated minutes until ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Order {
    /// Create a freshly placed order in RECEIVED state
    pub fn new(id: impl Into<String>, order_number: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            order_number: order_number.into(),
            status: OrderStatus::Received,
            items: Vec::new(),
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            guest_info: None,
            created_at: now,
            updated_at: now,
            estimated_time: None,
            table_id: None,
            session_id: None,
            restaurant_id: None,
            notes: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, i| count.saturating_add(i.quantity))
    }

    /// Totals recomputed from the line items with the given tax formula
    pub fn compute_totals(&self, tax: &TaxConfig) -> OrderTotals {
        money::order_totals(
            self.items
                .iter()
                .map(|i| (i.effective_unit_price(), i.quantity)),
            tax,
        )
    }

    /// Overwrite subtotal/tax/total (and line subtotals) from the items
    pub fn recompute_totals(&mut self, tax: &TaxConfig) {
        for item in &mut self.items {
            item.subtotal = item.computed_subtotal();
        }
        let totals = self.compute_totals(tax);
        self.subtotal = totals.subtotal;
        self.tax = totals.tax;
        self.total = totals.total;
    }

    /// `total == subtotal + tax` within one cent
    pub fn totals_consistent(&self) -> bool {
        money::money_eq(self.total, self.subtotal + self.tax)
    }

    /// Like [`Self::totals_consistent`] but as an error for callers that propagate
    pub fn check_totals(&self) -> AppResult<()> {
        if self.totals_consistent() {
            return Ok(());
        }
        Err(AppError::new(ErrorCode::OrderTotalsMismatch)
            .with_detail("orderId", self.id.clone())
            .with_detail("subtotal", self.subtotal)
            .with_detail("tax", self.tax)
            .with_detail("total", self.total))
    }
}

/// Line item of an order being placed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub menu_item_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customizations: Vec<Customization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Create order payload (`order.create`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub restaurant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub items: Vec<OrderItemInput>,
    pub guest_info: GuestInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderCreate {
    /// Checks the backend would otherwise answer with a 400
    pub fn validate(&self) -> AppResult<()> {
        if self.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        if self.guest_info.name.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "Guest name is required",
            )
            .with_detail("field", "guestInfo.name"));
        }
        if let Some(idx) = self.items.iter().position(|i| i.quantity == 0) {
            return Err(AppError::validation("Quantity must be at least 1")
                .with_detail("field", format!("items[{}].quantity", idx)));
        }
        Ok(())
    }
}
