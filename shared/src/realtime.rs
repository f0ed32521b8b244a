//! Real-time event envelope
//!
//! The backend pushes named events with JSON payloads whose shape varies
//! between event kinds and backend versions. The envelope keeps the payload
//! as raw JSON; interpretation happens in the client's normalizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named real-time events the clients subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    OrderStatusUpdated,
    OrderUpdated,
    OrderCreated,
    AssistanceRequested,
    NotificationCreated,
    /// Any event this library does not interpret
    Other(String),
}

impl EventName {
    pub fn as_str(&self) -> &str {
        match self {
            EventName::OrderStatusUpdated => "order:status_updated",
            EventName::OrderUpdated => "order:updated",
            EventName::OrderCreated => "order:created",
            EventName::AssistanceRequested => "assistance:requested",
            EventName::NotificationCreated => "notification:created",
            EventName::Other(name) => name,
        }
    }

    /// Events that may carry an order status change
    pub fn is_order_update(&self) -> bool {
        matches!(self, EventName::OrderStatusUpdated | EventName::OrderUpdated)
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        match name {
            "order:status_updated" => EventName::OrderStatusUpdated,
            "order:updated" => EventName::OrderUpdated,
            "order:created" => EventName::OrderCreated,
            "assistance:requested" => EventName::AssistanceRequested,
            "notification:created" => EventName::NotificationCreated,
            other => EventName::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EventName::from(name.as_str()))
    }
}

/// One event as delivered by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeEvent {
    pub name: EventName,
    pub payload: serde_json::Value,
    /// Local arrival time
    pub received_at: DateTime<Utc>,
}

impl RealtimeEvent {
    pub fn new(name: impl Into<EventName>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
            received_at: Utc::now(),
        }
    }
}
