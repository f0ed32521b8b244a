//! Table Session Model
//!
//! A table session groups the guests seated at one table and the orders
//! they place, with its own payment lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{sub_money, to_decimal, to_f64};
use crate::status::{OrderStatus, SessionStatus};

/// Guest attached to a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
}

/// Order reference inside a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionOrder {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub total: f64,
}

/// Multi-guest tab on a table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableSession {
    pub id: String,
    pub session_code: String,
    pub table_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub paid_amount: f64,
    #[serde(default)]
    pub users: Vec<SessionUser>,
    #[serde(default)]
    pub orders: Vec<SessionOrder>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl TableSession {
    /// `total_amount - paid_amount`
    ///
    /// Not clamped: an overpaid session reports a negative remainder, the
    /// backend owns the `paid <= total` invariant.
    pub fn remaining(&self) -> f64 {
        to_f64(sub_money(
            to_decimal(self.total_amount),
            to_decimal(self.paid_amount),
        ))
    }

    pub fn is_fully_paid(&self) -> bool {
        self.total_amount > 0.0 && self.remaining() <= 0.0
    }

    /// Paid share of the total, clamped to 0..=100 for display
    pub fn payment_progress(&self) -> f64 {
        if self.total_amount <= 0.0 {
            return 0.0;
        }
        let paid = to_decimal(self.paid_amount);
        let ratio = paid
            .checked_div(to_decimal(self.total_amount))
            .and_then(|r| r.checked_mul(rust_decimal::Decimal::ONE_HUNDRED));
        match ratio {
            Some(ratio) => to_f64(ratio).clamp(0.0, 100.0),
            None => {
                tracing::warn!(
                    session_id = %self.id,
                    paid = self.paid_amount,
                    total = self.total_amount,
                    "Payment progress overflowed"
                );
                if paid.is_sign_positive() { 100.0 } else { 0.0 }
            }
        }
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Orders still in the kitchen flow
    pub fn active_order_count(&self) -> usize {
        self.orders.iter().filter(|o| !o.status.is_terminal()).count()
    }
}
