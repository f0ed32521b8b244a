//! Transient user notifications (toasts)
//!
//! The library decides *what* to tell the user; rendering is the host's job
//! through the [`Notifier`] trait.

use serde::{Deserialize, Serialize};
use shared::status::OrderStatus;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    #[default]
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    /// Map the backend's free-form `type` field
    pub fn from_backend(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" | "warn" => Self::Warning,
            "error" | "danger" => Self::Error,
            _ => Self::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    /// Order status this notification announces, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Toast announcing a status change, built from the status registry
    pub fn for_status(status: OrderStatus) -> Self {
        let info = status.info();
        let level = match status {
            OrderStatus::Cancelled => NotificationLevel::Warning,
            OrderStatus::Ready | OrderStatus::Delivered | OrderStatus::Completed => {
                NotificationLevel::Success
            }
            OrderStatus::Received | OrderStatus::Preparing => NotificationLevel::Info,
        };
        Self {
            level,
            title: info.label.to_string(),
            message: info.description.to_string(),
            status: Some(status),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, "Error", message)
    }
}

/// Sink for user-visible notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that only logs; the default for headless consumers
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                tracing::error!(title = %notification.title, "{}", notification.message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(title = %notification.title, "{}", notification.message)
            }
            _ => tracing::info!(title = %notification.title, "{}", notification.message),
        }
    }
}

/// Notifier that keeps everything it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    /// Notifications whose title matches `title`
    pub fn count_titled(&self, title: &str) -> usize {
        self.notifications()
            .iter()
            .filter(|n| n.title == title)
            .count()
    }

    pub fn clear(&self) {
        if let Ok(mut list) = self.received.lock() {
            list.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut list) = self.received.lock() {
            list.push(notification);
        }
    }
}
