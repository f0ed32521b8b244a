//! Merge normalized real-time updates into cached order snapshots
//!
//! Events are applied in arrival order and the last write wins per field.
//! Nothing in the event stream carries a sequence number, so a late event
//! can move the displayed status backwards. [`ReconcilePolicy::MonotonicUpdatedAt`]
//! rejects updates older than the snapshot instead; it changes observable
//! behaviour and is therefore opt-in.

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::models::Order;
use shared::status::OrderStatus;
use std::str::FromStr;

use crate::error::ClientError;
use crate::normalizer::NormalizedUpdate;
use crate::notify::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Apply every update in arrival order
    #[default]
    LastWriteWins,
    /// Drop updates whose timestamp is older than the snapshot's `updated_at`
    MonotonicUpdatedAt,
}

impl FromStr for ReconcilePolicy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_write_wins" | "lww" => Ok(Self::LastWriteWins),
            "monotonic" | "monotonic_updated_at" => Ok(Self::MonotonicUpdatedAt),
            other => Err(ClientError::Config(format!(
                "unknown reconcile policy: {}",
                other
            ))),
        }
    }
}

/// Side effect requested by a reconciliation
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show a transient notification
    Notify(Notification),
    /// The order reached DELIVERED: offer payment
    PaymentAvailable,
}

/// Result of applying one update
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub order: Order,
    pub previous_status: OrderStatus,
    pub status_changed: bool,
    pub effects: Vec<Effect>,
}

/// Why an update was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No snapshot loaded yet
    NoSnapshot,
    /// Update is for a different order
    OtherOrder,
    /// Update is older than the snapshot (monotonic policy only)
    Stale,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Apply `update` to `previous`
    ///
    /// Returns `None` when there is nothing to merge into, or when the
    /// update is skipped (see [`Self::check`]).
    pub fn reconcile(
        &self,
        previous: Option<&Order>,
        update: &NormalizedUpdate,
        now: DateTime<Utc>,
    ) -> Option<Reconciled> {
        match self.try_reconcile(previous, update, now) {
            Ok(reconciled) => Some(reconciled),
            Err(reason) => {
                tracing::debug!(
                    ?reason,
                    order_id = ?update.order_id,
                    status = %update.status,
                    "Skipping order update"
                );
                None
            }
        }
    }

    /// Like [`Self::reconcile`] but reports why an update was skipped
    pub fn try_reconcile(
        &self,
        previous: Option<&Order>,
        update: &NormalizedUpdate,
        now: DateTime<Utc>,
    ) -> Result<Reconciled, SkipReason> {
        let previous = previous.ok_or(SkipReason::NoSnapshot)?;
        self.check(previous, update)?;

        let mut order = merge_fields(previous, update);
        order.status = update.status;
        order.updated_at = update.updated_at.unwrap_or(now);
        if let Some(minutes) = update.estimated_time {
            order.estimated_time = Some(minutes);
        }

        let previous_status = previous.status;
        let status_changed = previous_status != update.status;
        let mut effects = Vec::new();

        if status_changed {
            if !previous_status.can_advance_to(update.status) {
                tracing::warn!(
                    order_id = %order.id,
                    from = %previous_status,
                    to = %update.status,
                    "Applying out-of-flow status change"
                );
            } else {
                tracing::info!(
                    order_id = %order.id,
                    from = %previous_status,
                    to = %update.status,
                    "Order status changed"
                );
            }
            effects.push(Effect::Notify(Notification::for_status(update.status)));
            if update.status == OrderStatus::Delivered {
                effects.push(Effect::PaymentAvailable);
            }
        }

        Ok(Reconciled {
            order,
            previous_status,
            status_changed,
            effects,
        })
    }

    /// Whether `update` may be applied on top of `previous`
    pub fn check(&self, previous: &Order, update: &NormalizedUpdate) -> Result<(), SkipReason> {
        if !update.targets(&previous.id) {
            return Err(SkipReason::OtherOrder);
        }
        if self.policy == ReconcilePolicy::MonotonicUpdatedAt
            && let Some(ts) = update.updated_at
            && ts < previous.updated_at
        {
            return Err(SkipReason::Stale);
        }
        Ok(())
    }
}

/// Shallow-merge the update's extra fields into the order
///
/// If the merged object no longer describes a valid order (e.g. a field of
/// the wrong type) the extra fields are dropped and only the canonical
/// fields get applied by the caller.
fn merge_fields(previous: &Order, update: &NormalizedUpdate) -> Order {
    if update.fields.is_empty() {
        return previous.clone();
    }

    let mut merged = match serde_json::to_value(previous) {
        Ok(Value::Object(map)) => map,
        _ => return previous.clone(),
    };
    for (key, value) in &update.fields {
        merged.insert(key.clone(), value.clone());
    }

    match serde_json::from_value::<Order>(Value::Object(merged)) {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(
                order_id = %previous.id,
                error = %e,
                "Dropping unmergeable order fields from real-time update"
            );
            previous.clone()
        }
    }
}
