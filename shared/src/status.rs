//! Order and table-session status model
//!
//! Closed status enums plus the display registry every view renders from:
//! label, description, icon and color per status, and the ordinal position
//! used by progress indicators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display metadata for a status value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Neutral entry for status values the registry does not know
pub const FALLBACK_STATUS_INFO: StatusInfo = StatusInfo {
    label: "Processing",
    description: "Your order is being processed",
    icon: "clock",
    color: "#6B7280",
};

// ============================================================================
// Order status
// ============================================================================

/// Kitchen/fulfillment progress of a single order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Received,
    Preparing,
    Ready,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses of the normal flow, in progression order
    pub const PROGRESSION: [OrderStatus; 5] = [
        OrderStatus::Received,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ];

    /// Parse a raw status string from the backend
    ///
    /// Case-insensitive; `-` and spaces are accepted as separators. Unknown
    /// values yield `None`, never a panic.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "RECEIVED" => Some(Self::Received),
            "PREPARING" => Some(Self::Preparing),
            "READY" => Some(Self::Ready),
            "DELIVERED" => Some(Self::Delivered),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" | "CANCELED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Registry entry for this status
    pub fn info(&self) -> &'static StatusInfo {
        match self {
            Self::Received => &StatusInfo {
                label: "Order Received",
                description: "The restaurant has received your order",
                icon: "clipboard-check",
                color: "#3B82F6",
            },
            Self::Preparing => &StatusInfo {
                label: "Preparing",
                description: "The kitchen is preparing your order",
                icon: "chef-hat",
                color: "#F59E0B",
            },
            Self::Ready => &StatusInfo {
                label: "Ready",
                description: "Your order is ready and on its way",
                icon: "bell",
                color: "#10B981",
            },
            Self::Delivered => &StatusInfo {
                label: "Delivered",
                description: "Your order has been served. Enjoy your meal!",
                icon: "utensils",
                color: "#8B5CF6",
            },
            Self::Completed => &StatusInfo {
                label: "Completed",
                description: "Thank you for dining with us",
                icon: "check-circle",
                color: "#059669",
            },
            Self::Cancelled => &StatusInfo {
                label: "Cancelled",
                description: "This order has been cancelled",
                icon: "x-circle",
                color: "#EF4444",
            },
        }
    }

    /// COMPLETED and CANCELLED end the lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether moving to `next` follows the normal flow
    ///
    /// Forward moves along [`Self::PROGRESSION`], or CANCELLED from any
    /// non-terminal state. Informational only: real-time updates are applied
    /// even when this returns `false`.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Cancelled {
            return true;
        }
        match (status_index(*self), status_index(next)) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal position of a status in the progress bar
///
/// CANCELLED is not part of the progression and returns `None`.
pub fn status_index(status: OrderStatus) -> Option<usize> {
    OrderStatus::PROGRESSION.iter().position(|s| *s == status)
}

/// Progress through the normal flow as a percentage (0..=100)
pub fn progress_percent(status: OrderStatus) -> u8 {
    let last = OrderStatus::PROGRESSION.len() - 1;
    match status_index(status) {
        Some(idx) => ((idx * 100) / last) as u8,
        None => 0,
    }
}

/// Registry lookup for a raw, possibly unknown, status string
pub fn status_info_for_raw(raw: &str) -> &'static StatusInfo {
    OrderStatus::parse(raw)
        .map(|s| s.info())
        .unwrap_or(&FALLBACK_STATUS_INFO)
}

// ============================================================================
// Table session status
// ============================================================================

/// Lifecycle of a multi-guest table session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Active,
    OrderingLocked,
    PaymentPending,
    Closed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::OrderingLocked => "ORDERING_LOCKED",
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::Closed => "CLOSED",
        }
    }

    pub fn info(&self) -> &'static StatusInfo {
        match self {
            Self::Active => &StatusInfo {
                label: "Active",
                description: "Guests can place orders",
                icon: "users",
                color: "#10B981",
            },
            Self::OrderingLocked => &StatusInfo {
                label: "Ordering Locked",
                description: "No new orders can be placed",
                icon: "lock",
                color: "#F59E0B",
            },
            Self::PaymentPending => &StatusInfo {
                label: "Payment Pending",
                description: "Waiting for the bill to be settled",
                icon: "credit-card",
                color: "#3B82F6",
            },
            Self::Closed => &StatusInfo {
                label: "Closed",
                description: "This session has ended",
                icon: "check-circle",
                color: "#6B7280",
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether guests may still add orders
    pub fn accepts_orders(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Active, OrderingLocked | PaymentPending | Closed)
                | (OrderingLocked, Active | PaymentPending | Closed)
                | (PaymentPending, Active | Closed)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
