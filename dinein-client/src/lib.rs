//! Dine-in client - real-time order and table synchronization
//!
//! Keeps cached order snapshots in sync with the restaurant backend's
//! real-time events and derives everything the guest and staff screens
//! render from them.
//!
//! The pipeline for an order event is
//! [`transport`] → [`normalizer`] → [`reconciler`] → [`notify`], driven by one
//! [`tracker::OrderTracker`] per tracking screen.

pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod normalizer;
pub mod notify;
pub mod reconciler;
pub mod session;
pub mod tables;
pub mod tracker;
pub mod transport;

pub use api::{HttpApiClient, OrderApi, TableApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use metrics::DashboardMetrics;
pub use normalizer::{NormalizedUpdate, normalize};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use reconciler::{Effect, ReconcilePolicy, Reconciled, Reconciler};
pub use session::{Cart, DiningSession, FileSessionStore, MemorySessionStore, SessionResolver, SessionStore};
pub use tables::{TableAction, TableCommand, TableStatusView, available_actions};
pub use tracker::{OrderTracker, TrackerHandle, TrackerOptions, spawn_tracker};
pub use transport::{MemoryTransport, RealtimeTransport, SharedTransport};

// Re-export shared types for convenience
pub use shared::models::{Order, Table, TableSession, TableStatus};
pub use shared::realtime::{EventName, RealtimeEvent};
pub use shared::status::{OrderStatus, SessionStatus, StatusInfo};
