//! Order tracking view model
//!
//! One tracker follows one order: it holds the cached snapshot, applies
//! real-time events through the normalizer and reconciler, dispatches
//! notifications, and exposes everything the tracking screen renders
//! (timeline, elapsed time, available actions).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Order;
use shared::money::{OrderTotals, TaxConfig, money_eq};
use shared::realtime::{EventName, RealtimeEvent};
use shared::status::{OrderStatus, StatusInfo, status_index};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::OrderApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::normalizer::{id_string, normalize};
use crate::notify::{Notification, NotificationLevel, Notifier};
use crate::reconciler::{Effect, ReconcilePolicy, Reconciler};
use crate::transport::SharedTransport;

/// Default wait between two "call waiter" requests
pub const DEFAULT_ASSISTANCE_COOLDOWN: Duration = Duration::from_secs(60);

/// Feature switches of a tracking screen
#[derive(Debug, Clone)]
pub struct TrackerOptions {
    pub order_id: String,
    pub policy: ReconcilePolicy,
    pub payment_enabled: bool,
    pub assistance_enabled: bool,
    pub cancel_enabled: bool,
    pub assistance_cooldown: Duration,
    /// Tax formula used to audit the totals the backend sends
    pub tax: TaxConfig,
}

impl TrackerOptions {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            policy: ReconcilePolicy::default(),
            payment_enabled: true,
            assistance_enabled: true,
            cancel_enabled: true,
            assistance_cooldown: DEFAULT_ASSISTANCE_COOLDOWN,
            tax: TaxConfig::default(),
        }
    }

    /// Options carrying the configured reconcile policy and tax formula
    pub fn from_config(order_id: impl Into<String>, config: &ClientConfig) -> Self {
        Self::new(order_id)
            .with_policy(config.reconcile_policy)
            .with_tax(config.tax)
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_payment(mut self, enabled: bool) -> Self {
        self.payment_enabled = enabled;
        self
    }

    pub fn with_assistance(mut self, enabled: bool) -> Self {
        self.assistance_enabled = enabled;
        self
    }

    pub fn with_cancel(mut self, enabled: bool) -> Self {
        self.cancel_enabled = enabled;
        self
    }

    pub fn with_assistance_cooldown(mut self, cooldown: Duration) -> Self {
        self.assistance_cooldown = cooldown;
        self
    }

    pub fn with_tax(mut self, tax: TaxConfig) -> Self {
        self.tax = tax;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Completed,
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub info: &'static StatusInfo,
    pub state: StepState,
}

/// User actions a tracking screen may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderAction {
    PayNow,
    CallWaiter,
    Cancel,
}

/// What handling an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// An order update was merged into the snapshot
    Applied { status_changed: bool },
    /// The tracked order was adopted from an `order:created` event
    Adopted,
    /// A notification was surfaced
    Notified,
    /// Not relevant to this tracker, or a no-op payload
    Ignored,
}

/// Cloneable state published to observers of a running tracker
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerSnapshot {
    pub order: Option<Order>,
    pub payment_available: bool,
}

pub struct OrderTracker {
    options: TrackerOptions,
    reconciler: Reconciler,
    order: Option<Order>,
    payment_available: bool,
    last_assistance: Option<DateTime<Utc>>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for OrderTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderTracker")
            .field("options", &self.options)
            .field("order", &self.order)
            .field("payment_available", &self.payment_available)
            .finish_non_exhaustive()
    }
}

impl OrderTracker {
    pub fn new(options: TrackerOptions, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            reconciler: Reconciler::new(options.policy),
            options,
            order: None,
            payment_available: false,
            last_assistance: None,
            notifier,
        }
    }

    /// Install the snapshot fetched over REST
    ///
    /// A reload replaces the snapshot wholesale, like a manual refresh.
    pub fn load(&mut self, order: Order) {
        if order.id != self.options.order_id {
            tracing::warn!(
                expected = %self.options.order_id,
                got = %order.id,
                "Loaded order does not match tracker"
            );
        }
        if !order.items.is_empty() {
            let expected = order.compute_totals(&self.options.tax);
            if !money_eq(expected.total, order.total) {
                tracing::warn!(
                    order_id = %order.id,
                    expected = expected.total,
                    received = order.total,
                    "Order total differs from the configured tax formula"
                );
            }
        }
        self.payment_available |= order.status == OrderStatus::Delivered;
        self.order = Some(order);
    }

    /// Totals of the cached order recomputed with the configured tax formula
    pub fn expected_totals(&self) -> Option<OrderTotals> {
        self.order
            .as_ref()
            .map(|o| o.compute_totals(&self.options.tax))
    }

    pub fn options(&self) -> &TrackerOptions {
        &self.options
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn status(&self) -> Option<OrderStatus> {
        self.order.as_ref().map(|o| o.status)
    }

    pub fn payment_available(&self) -> bool {
        self.payment_available
    }

    /// Error unless "Pay now" may be offered for the cached order
    pub fn check_payment(&self) -> AppResult<()> {
        let active = self.order.as_ref().is_some_and(Order::is_active);
        if self.options.payment_enabled && self.payment_available && active {
            return Ok(());
        }
        Err(AppError::new(ErrorCode::PaymentNotAvailable)
            .with_detail("orderId", self.options.order_id.clone()))
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            order: self.order.clone(),
            payment_available: self.payment_available,
        }
    }

    /// Route one real-time event
    ///
    /// The event's arrival time stands in for "now" when the payload has no
    /// timestamp of its own.
    pub fn handle_event(&mut self, event: &RealtimeEvent) -> TrackerOutcome {
        match &event.name {
            EventName::OrderStatusUpdated | EventName::OrderUpdated => {
                self.apply_order_update(&event.payload, event.received_at)
            }
            EventName::OrderCreated => self.adopt_created(&event.payload),
            EventName::AssistanceRequested => {
                self.on_assistance_requested(&event.payload, event.received_at)
            }
            EventName::NotificationCreated => self.on_notification(&event.payload),
            EventName::Other(name) => {
                tracing::trace!(event = %name, "Ignoring unhandled event");
                TrackerOutcome::Ignored
            }
        }
    }

    fn apply_order_update(&mut self, payload: &Value, now: DateTime<Utc>) -> TrackerOutcome {
        let Some(update) = normalize(payload) else {
            return TrackerOutcome::Ignored;
        };
        if !update.targets(&self.options.order_id) {
            return TrackerOutcome::Ignored;
        }
        let Some(reconciled) = self.reconciler.reconcile(self.order.as_ref(), &update, now) else {
            return TrackerOutcome::Ignored;
        };

        for effect in reconciled.effects {
            match effect {
                Effect::Notify(notification) => self.notifier.notify(notification),
                Effect::PaymentAvailable => self.payment_available = true,
            }
        }
        self.order = Some(reconciled.order);
        TrackerOutcome::Applied {
            status_changed: reconciled.status_changed,
        }
    }

    fn adopt_created(&mut self, payload: &Value) -> TrackerOutcome {
        if self.order.is_some() {
            return TrackerOutcome::Ignored;
        }
        let candidate = payload.get("order").unwrap_or(payload);
        match serde_json::from_value::<Order>(candidate.clone()) {
            Ok(order) if order.id == self.options.order_id => {
                tracing::debug!(order_id = %order.id, "Adopted order from creation event");
                self.load(order);
                TrackerOutcome::Adopted
            }
            Ok(_) => TrackerOutcome::Ignored,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable order:created payload");
                TrackerOutcome::Ignored
            }
        }
    }

    fn on_assistance_requested(&mut self, payload: &Value, now: DateTime<Utc>) -> TrackerOutcome {
        if !self.options.assistance_enabled || !self.concerns_us(payload) {
            return TrackerOutcome::Ignored;
        }
        self.last_assistance = Some(now);
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("A staff member is on the way");
        self.notifier.notify(Notification::new(
            NotificationLevel::Info,
            "Assistance requested",
            message,
        ));
        TrackerOutcome::Notified
    }

    fn on_notification(&mut self, payload: &Value) -> TrackerOutcome {
        if !self.concerns_us(payload) {
            return TrackerOutcome::Ignored;
        }
        let Some(message) = payload.get("message").and_then(Value::as_str) else {
            tracing::warn!(payload = %payload, "notification:created without message");
            return TrackerOutcome::Ignored;
        };
        let title = payload
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Notification");
        let level = payload
            .get("type")
            .and_then(Value::as_str)
            .map(NotificationLevel::from_backend)
            .unwrap_or_default();
        self.notifier.notify(Notification::new(level, title, message));
        TrackerOutcome::Notified
    }

    /// Payloads naming another order or another table are not for this screen
    fn concerns_us(&self, payload: &Value) -> bool {
        if let Some(order_id) = payload.get("orderId").and_then(id_string) {
            return order_id == self.options.order_id;
        }
        if let Some(table_id) = payload.get("tableId").and_then(id_string) {
            return self
                .order
                .as_ref()
                .and_then(|o| o.table_id.as_deref())
                .is_some_and(|ours| ours == table_id);
        }
        true
    }

    /// Tell the user real-time updates stopped
    fn on_transport_closed(&self) {
        tracing::warn!(order_id = %self.options.order_id, "Real-time transport closed");
        self.notifier
            .notify(Notification::error(ClientError::TransportClosed.user_message()));
    }

    // ========== View model ==========

    /// Progress steps; a cancelled order renders a single cancelled step
    pub fn timeline(&self) -> Vec<TimelineStep> {
        let Some(status) = self.status() else {
            return Vec::new();
        };
        let Some(current) = status_index(status) else {
            return vec![TimelineStep {
                status,
                info: status.info(),
                state: StepState::Active,
            }];
        };

        OrderStatus::PROGRESSION
            .iter()
            .enumerate()
            .map(|(idx, step)| TimelineStep {
                status: *step,
                info: step.info(),
                state: if idx < current || (*step == OrderStatus::Completed && idx == current) {
                    StepState::Completed
                } else if idx == current {
                    StepState::Active
                } else {
                    StepState::Pending
                },
            })
            .collect()
    }

    /// Time since the order was placed, while it is still in progress
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let order = self.order.as_ref()?;
        if !order.is_active() {
            return None;
        }
        Some((now - order.created_at).max(chrono::Duration::zero()))
    }

    /// Elapsed indicator text ("<1 min", "12 min", "1 h 5 min")
    pub fn formatted_elapsed(&self, now: DateTime<Utc>) -> Option<String> {
        let minutes = self.elapsed(now)?.num_minutes();
        Some(match minutes {
            0 => "<1 min".to_string(),
            m if m < 60 => format!("{} min", m),
            m => format!("{} h {} min", m / 60, m % 60),
        })
    }

    pub fn actions(&self) -> Vec<OrderAction> {
        let Some(order) = self.order.as_ref() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if self.options.payment_enabled && self.payment_available && order.is_active() {
            actions.push(OrderAction::PayNow);
        }
        if self.options.assistance_enabled && order.is_active() {
            actions.push(OrderAction::CallWaiter);
        }
        if self.options.cancel_enabled && order.status == OrderStatus::Received {
            actions.push(OrderAction::Cancel);
        }
        actions
    }

    /// Start the assistance cooldown
    ///
    /// Returns the remaining wait when a request was made too recently. The
    /// caller performs the actual API request after `Ok`.
    pub fn request_assistance(&mut self, now: DateTime<Utc>) -> Result<(), Duration> {
        if let Some(remaining) = self.assistance_cooldown_remaining(now) {
            return Err(remaining);
        }
        self.last_assistance = Some(now);
        Ok(())
    }

    /// Cancel the order through `api` and install the returned snapshot
    ///
    /// Only a RECEIVED order can be cancelled; anything else is rejected
    /// without a request.
    pub async fn cancel<A>(&mut self, api: &A) -> ClientResult<()>
    where
        A: OrderApi + ?Sized,
    {
        if !self.actions().contains(&OrderAction::Cancel) {
            let status = self.status().map(|s| s.as_str()).unwrap_or("UNKNOWN");
            return Err(AppError::new(ErrorCode::OrderNotCancellable)
                .with_detail("orderId", self.options.order_id.clone())
                .with_detail("status", status)
                .into());
        }
        let cancelled = api.cancel_order(&self.options.order_id).await?;
        tracing::info!(order_id = %cancelled.id, "Order cancelled by guest");
        self.load(cancelled);
        Ok(())
    }

    pub fn assistance_cooldown_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_assistance?;
        let cooldown = chrono::Duration::from_std(self.options.assistance_cooldown).ok()?;
        let remaining = (last + cooldown) - now;
        remaining
            .to_std()
            .ok()
            .filter(|d| !d.is_zero())
    }
}

// ============================================================================
// Running a tracker against a transport
// ============================================================================

/// Handle to a tracker running on its own task
///
/// Dropping the handle stops the task, like unmounting the screen.
#[derive(Debug)]
pub struct TrackerHandle {
    snapshots: watch::Receiver<TrackerSnapshot>,
    cancel: CancellationToken,
    task: Option<JoinHandle<OrderTracker>>,
}

impl TrackerHandle {
    /// Latest published snapshot
    pub fn current(&self) -> TrackerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every applied event
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the task and get the tracker back
    pub async fn shutdown(mut self) -> Option<OrderTracker> {
        self.cancel.cancel();
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Run `tracker` on a tokio task fed by `transport`
pub fn spawn_tracker(tracker: OrderTracker, transport: &SharedTransport) -> TrackerHandle {
    let mut events = transport.subscribe();
    let (tx, rx) = watch::channel(tracker.snapshot());
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let mut tracker = tracker;
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                received = events.recv() => match received {
                    Ok(event) => {
                        if tracker.handle_event(&event) != TrackerOutcome::Ignored {
                            let _ = tx.send(tracker.snapshot());
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Tracker lagged behind real-time events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracker.on_transport_closed();
                        break;
                    }
                },
            }
        }
        tracing::debug!(order_id = %tracker.options.order_id, "Tracker stopped");
        tracker
    });

    TrackerHandle {
        snapshots: rx,
        cancel,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 19, minute, 0).unwrap()
    }

    fn event(name: &str, payload: Value, minute: u32) -> RealtimeEvent {
        RealtimeEvent {
            name: EventName::from(name),
            payload,
            received_at: at(minute),
        }
    }

    fn placed_order() -> Order {
        let mut order = Order::new("o1", "A-7");
        order.table_id = Some("t3".to_string());
        order.created_at = at(0);
        order.updated_at = at(0);
        order
    }

    fn tracker(options: TrackerOptions) -> (OrderTracker, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let mut tracker = OrderTracker::new(options, Arc::new(notifier.clone()));
        tracker.load(placed_order());
        (tracker, notifier)
    }

    #[test]
    fn test_initial_view() {
        let (tracker, _) = tracker(TrackerOptions::new("o1"));
        let timeline = tracker.timeline();
        assert_eq!(timeline.len(), 5);
        assert_eq!(timeline[0].state, StepState::Active);
        assert!(timeline[1..].iter().all(|s| s.state == StepState::Pending));
        assert_eq!(
            tracker.actions(),
            vec![OrderAction::CallWaiter, OrderAction::Cancel]
        );
    }

    #[test]
    fn test_ignores_other_orders_and_noise() {
        let (mut tracker, notifier) = tracker(TrackerOptions::new("o1"));
        let outcomes = [
            tracker.handle_event(&event("order:status_updated", json!({ "orderId": "o2", "status": "READY" }), 1)),
            tracker.handle_event(&event("order:updated", json!({ "orderId": "o1" }), 1)),
            tracker.handle_event(&event("table:moved", json!({}), 1)),
        ];
        assert!(outcomes.iter().all(|o| *o == TrackerOutcome::Ignored));
        assert_eq!(tracker.status(), Some(OrderStatus::Received));
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn test_delivered_enables_pay_now() {
        let (mut tracker, _) = tracker(TrackerOptions::new("o1"));
        tracker.handle_event(&event("order:updated", json!({ "order": { "id": "o1", "status": "DELIVERED" } }), 30));

        assert!(tracker.payment_available());
        assert_eq!(
            tracker.actions(),
            vec![OrderAction::PayNow, OrderAction::CallWaiter]
        );
    }

    #[test]
    fn test_payment_disabled_hides_pay_now() {
        let (mut tracker, _) = tracker(TrackerOptions::new("o1").with_payment(false));
        tracker.handle_event(&event("order:status_updated", json!({ "orderId": "o1", "status": "DELIVERED" }), 30));
        assert!(tracker.payment_available());
        assert!(!tracker.actions().contains(&OrderAction::PayNow));
    }

    #[test]
    fn test_cancelled_timeline_and_no_elapsed() {
        let (mut tracker, notifier) = tracker(TrackerOptions::new("o1"));
        tracker.handle_event(&event("order:status_updated", json!({ "orderId": "o1", "status": "CANCELLED" }), 4));

        let timeline = tracker.timeline();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].status, OrderStatus::Cancelled);
        assert_eq!(tracker.elapsed(at(5)), None);
        assert!(tracker.actions().is_empty());
        assert_eq!(notifier.count_titled("Cancelled"), 1);
    }

    #[test]
    fn test_completed_marks_every_step_done() {
        let (mut tracker, _) = tracker(TrackerOptions::new("o1"));
        tracker.handle_event(&event("order:status_updated", json!({ "orderId": "o1", "status": "COMPLETED" }), 50));
        assert!(tracker.timeline().iter().all(|s| s.state == StepState::Completed));
    }

    #[test]
    fn test_formatted_elapsed() {
        let (tracker, _) = tracker(TrackerOptions::new("o1"));
        assert_eq!(tracker.formatted_elapsed(at(0)).as_deref(), Some("<1 min"));
        assert_eq!(tracker.formatted_elapsed(at(12)).as_deref(), Some("12 min"));
        let later = at(0) + chrono::Duration::minutes(65);
        assert_eq!(tracker.formatted_elapsed(later).as_deref(), Some("1 h 5 min"));
    }

    #[test]
    fn test_assistance_cooldown() {
        let (mut tracker, _) = tracker(
            TrackerOptions::new("o1").with_assistance_cooldown(Duration::from_secs(60)),
        );
        assert!(tracker.request_assistance(at(1)).is_ok());

        let wait = tracker
            .request_assistance(at(1) + chrono::Duration::seconds(20))
            .unwrap_err();
        assert_eq!(wait, Duration::from_secs(40));

        assert!(tracker.request_assistance(at(2)).is_ok());
    }

    #[test]
    fn test_assistance_event_for_our_table() {
        let (mut tracker, notifier) = tracker(TrackerOptions::new("o1"));
        let outcome = tracker.handle_event(&event("assistance:requested", json!({ "tableId": "t3" }), 2));
        assert_eq!(outcome, TrackerOutcome::Notified);
        assert_eq!(notifier.count_titled("Assistance requested"), 1);
        assert!(tracker.assistance_cooldown_remaining(at(2)).is_some());

        let outcome = tracker.handle_event(&event("assistance:requested", json!({ "tableId": "t9" }), 2));
        assert_eq!(outcome, TrackerOutcome::Ignored);
    }

    #[test]
    fn test_backend_notification_forwarded() {
        let (mut tracker, notifier) = tracker(TrackerOptions::new("o1"));
        tracker.handle_event(&event(
            "notification:created",
            json!({ "title": "Kitchen", "message": "Your drinks are coming", "type": "success" }),
            3,
        ));
        let received = notifier.notifications();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].title, "Kitchen");
        assert_eq!(received[0].level, NotificationLevel::Success);
    }

    #[test]
    fn test_adopt_from_created_event() {
        let notifier = RecordingNotifier::new();
        let mut tracker = OrderTracker::new(TrackerOptions::new("o1"), Arc::new(notifier));
        let payload = json!({ "order": serde_json::to_value(placed_order()).unwrap() });

        assert_eq!(
            tracker.handle_event(&event("order:created", payload.clone(), 0)),
            TrackerOutcome::Adopted
        );
        // Already holding a snapshot: later creation events are ignored
        assert_eq!(
            tracker.handle_event(&event("order:created", payload, 0)),
            TrackerOutcome::Ignored
        );
    }

    #[test]
    fn test_update_before_load_is_noop() {
        let notifier = RecordingNotifier::new();
        let mut tracker = OrderTracker::new(TrackerOptions::new("o1"), Arc::new(notifier.clone()));
        let outcome = tracker.handle_event(&event(
            "order:status_updated",
            json!({ "orderId": "o1", "status": "READY" }),
            1,
        ));
        assert_eq!(outcome, TrackerOutcome::Ignored);
        assert!(tracker.order().is_none());
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn test_numeric_ids_in_payloads() {
        let notifier = RecordingNotifier::new();
        let mut tracker = OrderTracker::new(TrackerOptions::new("42"), Arc::new(notifier.clone()));
        let mut order = placed_order();
        order.id = "42".to_string();
        order.table_id = Some("7".to_string());
        tracker.load(order);

        let ours = json!({ "orderId": 42, "title": "Kitchen", "message": "Almost there" });
        let theirs = json!({ "orderId": 43, "title": "Kitchen", "message": "Not yours" });
        assert_eq!(tracker.handle_event(&event("notification:created", ours, 1)), TrackerOutcome::Notified);
        assert_eq!(tracker.handle_event(&event("notification:created", theirs, 1)), TrackerOutcome::Ignored);

        let outcome = tracker.handle_event(&event("assistance:requested", json!({ "tableId": 7 }), 2));
        assert_eq!(outcome, TrackerOutcome::Notified);
        let outcome = tracker.handle_event(&event("assistance:requested", json!({ "tableId": 8 }), 2));
        assert_eq!(outcome, TrackerOutcome::Ignored);
        assert_eq!(notifier.notifications().len(), 2);
    }

    #[test]
    fn test_payment_check() {
        let (mut guest, _) = tracker(TrackerOptions::new("o1"));
        let err = guest.check_payment().unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentNotAvailable);

        guest.handle_event(&event("order:status_updated", json!({ "orderId": "o1", "status": "DELIVERED" }), 30));
        assert!(guest.check_payment().is_ok());

        let (mut disabled, _) = tracker(TrackerOptions::new("o1").with_payment(false));
        disabled.handle_event(&event("order:status_updated", json!({ "orderId": "o1", "status": "DELIVERED" }), 30));
        assert!(disabled.check_payment().is_err());
    }

    #[test]
    fn test_options_from_config() {
        let config = ClientConfig::default()
            .with_reconcile_policy(ReconcilePolicy::MonotonicUpdatedAt)
            .with_tax(TaxConfig::new(0.1, 0.0));
        let options = TrackerOptions::from_config("o1", &config);
        assert_eq!(options.policy, ReconcilePolicy::MonotonicUpdatedAt);
        assert_eq!(options.tax, TaxConfig::new(0.1, 0.0));

        let (mut tracker, _) = tracker(options);
        let mut order = placed_order();
        order.items.push(shared::models::OrderItem {
            menu_item_id: "m1".to_string(),
            name: "Ramen".to_string(),
            quantity: 2,
            unit_price: 10.0,
            subtotal: 20.0,
            customizations: vec![],
        });
        // Backend applied no tax; the audit only logs
        order.subtotal = 20.0;
        order.total = 20.0;
        tracker.load(order);

        let expected = tracker.expected_totals().unwrap();
        assert_eq!(expected.tax, 2.0);
        assert_eq!(expected.total, 22.0);
        assert_eq!(tracker.order().unwrap().total, 20.0);
    }

    struct FakeOrders {
        calls: std::sync::Mutex<Vec<String>>,
    }

    impl FakeOrders {
        fn new() -> Self {
            Self {
                calls: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl OrderApi for FakeOrders {
        async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
            Ok(Order::new(order_id, "A-7"))
        }

        async fn create_order(&self, _order: &shared::models::OrderCreate) -> ClientResult<Order> {
            Err(ClientError::InvalidResponse("not used".to_string()))
        }

        async fn orders_by_restaurant(&self, _restaurant_id: &str) -> ClientResult<Vec<Value>> {
            Ok(vec![])
        }

        async fn cancel_order(&self, order_id: &str) -> ClientResult<Order> {
            self.calls.lock().unwrap().push(format!("cancel:{}", order_id));
            let mut order = placed_order();
            order.status = OrderStatus::Cancelled;
            Ok(order)
        }

        async fn request_assistance(&self, _table_id: &str, _message: Option<&str>) -> ClientResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cancel_received_order() {
        let (mut tracker, _) = tracker(TrackerOptions::new("o1"));
        let api = FakeOrders::new();
        tracker.cancel(&api).await.unwrap();
        assert_eq!(tracker.status(), Some(OrderStatus::Cancelled));
        assert_eq!(*api.calls.lock().unwrap(), vec!["cancel:o1"]);
    }

    #[tokio::test]
    async fn test_cancel_rejected_once_preparing() {
        let (mut tracker, _) = tracker(TrackerOptions::new("o1"));
        tracker.handle_event(&event("order:status_updated", json!({ "orderId": "o1", "status": "PREPARING" }), 3));
        let api = FakeOrders::new();

        let err = tracker.cancel(&api).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrderNotCancellable);
        assert!(api.calls.lock().unwrap().is_empty());
        assert_eq!(tracker.status(), Some(OrderStatus::Preparing));
    }
}
