//! Real-time payload normalization
//!
//! Order events arrive in several shapes depending on which backend path
//! emitted them:
//!
//! ```json
//! { "orderId": "o1", "status": "READY", "timestamp": "..." }
//! { "order": { "id": "o1", "status": "READY", "estimatedTime": 5 } }
//! { "orderId": "o1", "newStatus": "READY", "changes": { "notes": "..." } }
//! ```
//!
//! [`normalize`] is the only place that knows about these shapes; the
//! reconciler sees a [`NormalizedUpdate`] only.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use shared::status::OrderStatus;
use shared::util::{parse_number, parse_timestamp};

/// Top-level keys describing the event rather than the order
pub const METADATA_KEYS: [&str; 5] = ["orderId", "timestamp", "restaurantId", "tableId", "userId"];

/// Keys applied through dedicated fields of [`NormalizedUpdate`]
const CANONICAL_KEYS: [&str; 6] = [
    "status",
    "newStatus",
    "order",
    "changes",
    "updatedAt",
    "estimatedTime",
];

/// Where the mergeable fields of an update came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Full nested `order` object
    NestedOrder,
    /// Partial `changes` diff
    Changes,
    /// Bare top-level fields
    TopLevel,
}

/// Canonical form of an order update event
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedUpdate {
    pub order_id: Option<String>,
    pub status: OrderStatus,
    pub updated_at: Option<DateTime<Utc>>,
    /// Estimated minutes until ready
    pub estimated_time: Option<u32>,
    /// Other order fields to shallow-merge (camelCase keys)
    pub fields: Map<String, Value>,
    pub source: FieldSource,
}

impl NormalizedUpdate {
    /// Status-only update, used when an event carries nothing else
    pub fn status_only(order_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            order_id: Some(order_id.into()),
            status,
            updated_at: None,
            estimated_time: None,
            fields: Map::new(),
            source: FieldSource::TopLevel,
        }
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Whether this update targets `order_id` (updates without an id match anything)
    pub fn targets(&self, order_id: &str) -> bool {
        self.order_id.as_deref().is_none_or(|id| id == order_id)
    }
}

/// Extract a canonical update from a raw payload
///
/// Returns `None` (no-op) when the payload is not an object or no status
/// resolves from `status`, `order.status` or `newStatus`.
pub fn normalize(payload: &Value) -> Option<NormalizedUpdate> {
    let Some(obj) = payload.as_object() else {
        tracing::warn!(payload = %payload, "Ignoring non-object real-time payload");
        return None;
    };

    let nested_order = obj.get("order").and_then(Value::as_object);
    let changes = obj.get("changes").and_then(Value::as_object);

    let Some(status) = resolve_status(obj, nested_order) else {
        tracing::warn!(
            keys = ?obj.keys().collect::<Vec<_>>(),
            "Real-time payload has no resolvable status, skipping update"
        );
        return None;
    };

    let order_id = obj
        .get("orderId")
        .and_then(id_string)
        .or_else(|| nested_order.and_then(|o| o.get("id")).and_then(id_string))
        .or_else(|| obj.get("id").and_then(id_string));

    let updated_at = ["timestamp", "updatedAt"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(parse_timestamp))
        .or_else(|| {
            nested_order
                .and_then(|o| o.get("updatedAt"))
                .and_then(parse_timestamp)
        })
        .or_else(|| changes.and_then(|c| c.get("updatedAt")).and_then(parse_timestamp));

    let estimated_time = obj
        .get("estimatedTime")
        .or_else(|| nested_order.and_then(|o| o.get("estimatedTime")))
        .or_else(|| changes.and_then(|c| c.get("estimatedTime")))
        .and_then(parse_minutes);

    let (source, fields) = match (nested_order, changes) {
        (Some(order), _) => (FieldSource::NestedOrder, strip_canonical(order, &[])),
        (None, Some(changes)) => (FieldSource::Changes, strip_canonical(changes, &[])),
        (None, None) => (FieldSource::TopLevel, strip_canonical(obj, &METADATA_KEYS)),
    };

    Some(NormalizedUpdate {
        order_id,
        status,
        updated_at,
        estimated_time,
        fields,
        source,
    })
}

/// First status candidate that names a known status
fn resolve_status(obj: &Map<String, Value>, nested_order: Option<&Map<String, Value>>) -> Option<OrderStatus> {
    let candidates = [
        ("status", obj.get("status")),
        ("order.status", nested_order.and_then(|o| o.get("status"))),
        ("newStatus", obj.get("newStatus")),
    ];

    candidates.into_iter().find_map(|(path, value)| {
        let raw = value?.as_str()?;
        let parsed = OrderStatus::parse(raw);
        if parsed.is_none() {
            tracing::warn!(path, raw, "Unknown order status in real-time payload");
        }
        parsed
    })
}

fn strip_canonical(source: &Map<String, Value>, extra: &[&str]) -> Map<String, Value> {
    source
        .iter()
        .filter(|(k, _)| !CANONICAL_KEYS.contains(&k.as_str()) && !extra.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// String or numeric identifier as text
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_minutes(value: &Value) -> Option<u32> {
    let minutes = parse_number(value)?;
    (minutes >= 0.0 && minutes <= u32::MAX as f64).then(|| minutes.round() as u32)
}
