//! Dining Table Model

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::StatusInfo;

/// Physical table status, changed by staff only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Occupied => "OCCUPIED",
            Self::Reserved => "RESERVED",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    pub fn info(&self) -> &'static StatusInfo {
        match self {
            Self::Available => &StatusInfo {
                label: "Available",
                description: "Ready for guests",
                icon: "circle-check",
                color: "#10B981",
            },
            Self::Occupied => &StatusInfo {
                label: "Occupied",
                description: "Guests are seated",
                icon: "users",
                color: "#EF4444",
            },
            Self::Reserved => &StatusInfo {
                label: "Reserved",
                description: "Held for a reservation",
                icon: "calendar",
                color: "#F59E0B",
            },
            Self::Maintenance => &StatusInfo {
                label: "Maintenance",
                description: "Temporarily out of service",
                icon: "wrench",
                color: "#6B7280",
            },
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub status: TableStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
}

impl Table {
    /// Name shown on the floor plan, falling back to "Table {number}"
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Table {}", self.number))
    }
}

/// Update table status payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableStatusUpdate {
    pub status: TableStatus,
}
