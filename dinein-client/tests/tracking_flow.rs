// dinein-client/tests/tracking_flow.rs
// End-to-end: transport -> tracker -> notifications

use chrono::{Duration as ChronoDuration, Utc};
use dinein_client::tracker::{OrderAction, StepState};
use dinein_client::{
    MemoryTransport, Notification, NotificationLevel, Order, OrderStatus, OrderTracker,
    ReconcilePolicy, RecordingNotifier, TrackerHandle, TrackerOptions, spawn_tracker,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn received_order(placed_minutes_ago: i64) -> Order {
    let mut order = Order::new("ord-1", "A-12");
    order.table_id = Some("t-4".to_string());
    order.created_at = Utc::now() - ChronoDuration::minutes(placed_minutes_ago);
    order.updated_at = order.created_at;
    order
}

fn tracker_with(options: TrackerOptions, order: Order) -> (OrderTracker, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let mut tracker = OrderTracker::new(options, Arc::new(notifier.clone()));
    tracker.load(order);
    (tracker, notifier)
}

#[tokio::test]
async fn test_received_to_preparing_end_to_end() {
    let transport = MemoryTransport::new();
    let (tracker, notifier) = tracker_with(TrackerOptions::new("ord-1"), received_order(5));

    let handle = spawn_tracker(tracker, &transport.shared());
    let mut snapshots = handle.subscribe();

    transport.publish(
        "order:status_updated",
        json!({ "orderId": "ord-1", "status": "PREPARING" }),
    );

    timeout(Duration::from_secs(2), snapshots.changed())
        .await
        .expect("tracker did not publish")
        .unwrap();
    assert_eq!(
        handle.current().order.map(|o| o.status),
        Some(OrderStatus::Preparing)
    );

    let tracker = handle.shutdown().await.expect("tracker task");
    let timeline = tracker.timeline();
    assert_eq!(timeline[0].status, OrderStatus::Received);
    assert_eq!(timeline[0].state, StepState::Completed);
    assert_eq!(timeline[1].status, OrderStatus::Preparing);
    assert_eq!(timeline[1].state, StepState::Active);
    assert!(timeline[2..].iter().all(|s| s.state == StepState::Pending));

    assert!(tracker.elapsed(Utc::now()).is_some());
    assert_eq!(
        tracker.formatted_elapsed(Utc::now()).as_deref(),
        Some("5 min")
    );
    assert_eq!(notifier.count_titled("Preparing"), 1);
    assert_eq!(notifier.notifications().len(), 1);
}

#[tokio::test]
async fn test_duplicate_status_event_notifies_once() {
    let transport = MemoryTransport::new();
    let (tracker, notifier) = tracker_with(TrackerOptions::new("ord-1"), received_order(1));
    let handle = spawn_tracker(tracker, &transport.shared());

    for _ in 0..2 {
        transport.publish(
            "order:status_updated",
            json!({ "orderId": "ord-1", "status": "PREPARING" }),
        );
    }
    // Unrelated traffic on the shared connection
    transport.publish(
        "order:status_updated",
        json!({ "orderId": "ord-2", "status": "READY" }),
    );

    let tracker = handle.shutdown_after_drain(&transport, &notifier).await;
    assert_eq!(tracker.status(), Some(OrderStatus::Preparing));
    assert_eq!(notifier.count_titled("Preparing"), 1);
}

#[tokio::test]
async fn test_late_event_regresses_under_last_write_wins() {
    let transport = MemoryTransport::new();
    let (tracker, notifier) = tracker_with(TrackerOptions::new("ord-1"), received_order(10));
    let handle = spawn_tracker(tracker, &transport.shared());

    let now = Utc::now();
    transport.publish(
        "order:status_updated",
        json!({ "orderId": "ord-1", "status": "READY", "timestamp": now.to_rfc3339() }),
    );
    transport.publish(
        "order:status_updated",
        json!({
            "orderId": "ord-1",
            "status": "PREPARING",
            "timestamp": (now - ChronoDuration::minutes(2)).to_rfc3339()
        }),
    );

    let tracker = handle.shutdown_after_drain(&transport, &notifier).await;
    assert_eq!(tracker.status(), Some(OrderStatus::Preparing));
}

#[tokio::test]
async fn test_monotonic_policy_keeps_newest_status() {
    let transport = MemoryTransport::new();
    let options = TrackerOptions::new("ord-1").with_policy(ReconcilePolicy::MonotonicUpdatedAt);
    let (tracker, notifier) = tracker_with(options, received_order(10));
    let handle = spawn_tracker(tracker, &transport.shared());

    let now = Utc::now();
    transport.publish(
        "order:status_updated",
        json!({ "orderId": "ord-1", "status": "READY", "timestamp": now.to_rfc3339() }),
    );
    transport.publish(
        "order:status_updated",
        json!({
            "orderId": "ord-1",
            "status": "PREPARING",
            "timestamp": (now - ChronoDuration::minutes(2)).to_rfc3339()
        }),
    );

    let tracker = handle.shutdown_after_drain(&transport, &notifier).await;
    assert_eq!(tracker.status(), Some(OrderStatus::Ready));
}

#[tokio::test]
async fn test_delivery_offers_payment() {
    let transport = MemoryTransport::new();
    let (tracker, notifier) = tracker_with(TrackerOptions::new("ord-1"), received_order(20));
    let handle = spawn_tracker(tracker, &transport.shared());

    transport.publish(
        "order:updated",
        json!({ "order": { "id": "ord-1", "status": "DELIVERED", "estimatedTime": 0 } }),
    );

    let tracker = handle.shutdown_after_drain(&transport, &notifier).await;
    assert!(tracker.payment_available());
    assert!(tracker.actions().contains(&OrderAction::PayNow));
    assert_eq!(notifier.count_titled("Delivered"), 1);
}

#[tokio::test]
async fn test_malformed_payloads_are_ignored() {
    let transport = MemoryTransport::new();
    let (tracker, notifier) = tracker_with(TrackerOptions::new("ord-1"), received_order(1));
    let handle = spawn_tracker(tracker, &transport.shared());

    transport.publish("order:status_updated", json!(null));
    transport.publish("order:status_updated", json!({ "orderId": "ord-1" }));
    transport.publish("order:updated", json!({ "orderId": "ord-1", "status": 42 }));

    let tracker = handle.shutdown_after_drain(&transport, &notifier).await;
    assert_eq!(tracker.status(), Some(OrderStatus::Received));
    assert!(user_notifications(&notifier).is_empty());
}

#[tokio::test]
async fn test_closed_transport_is_reported() {
    let transport = MemoryTransport::new();
    let (tracker, notifier) = tracker_with(TrackerOptions::new("ord-1"), received_order(3));
    let shared = transport.shared();
    let handle = spawn_tracker(tracker, &shared);
    let mut snapshots = handle.subscribe();

    transport.publish(
        "order:status_updated",
        json!({ "orderId": "ord-1", "status": "PREPARING" }),
    );
    drop(shared);
    drop(transport);

    // The task stops on its own once the channel closes, dropping its sender
    while timeout(Duration::from_secs(2), snapshots.changed())
        .await
        .expect("tracker did not stop")
        .is_ok()
    {}

    let tracker = handle.shutdown().await.expect("tracker task");
    assert_eq!(tracker.status(), Some(OrderStatus::Preparing));
    let errors: Vec<Notification> = notifier
        .notifications()
        .into_iter()
        .filter(|n| n.level == NotificationLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Real-time connection lost");
}

const DRAIN_MARKER: &str = "drain-marker";

/// Notifications other than the drain marker
fn user_notifications(notifier: &RecordingNotifier) -> Vec<Notification> {
    notifier
        .notifications()
        .into_iter()
        .filter(|n| n.title != DRAIN_MARKER)
        .collect()
}

/// Stop the tracker once it has consumed everything already published
///
/// Events are delivered in order, so seeing the marker notification means
/// every earlier event was handled.
trait DrainExt {
    async fn shutdown_after_drain(
        self,
        transport: &MemoryTransport,
        notifier: &RecordingNotifier,
    ) -> OrderTracker;
}

impl DrainExt for TrackerHandle {
    async fn shutdown_after_drain(
        self,
        transport: &MemoryTransport,
        notifier: &RecordingNotifier,
    ) -> OrderTracker {
        let mut snapshots = self.subscribe();
        transport.publish(
            "notification:created",
            json!({ "title": DRAIN_MARKER, "message": "drained" }),
        );
        while notifier.count_titled(DRAIN_MARKER) == 0 {
            timeout(Duration::from_secs(2), snapshots.changed())
                .await
                .expect("tracker did not drain")
                .expect("tracker stopped early");
        }
        self.shutdown().await.expect("tracker task")
    }
}
