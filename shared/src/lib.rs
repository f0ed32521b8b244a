//! Shared types for the dine-in platform
//!
//! Domain models, status registry, money math, error types and the
//! real-time event envelope used by every client crate.

pub mod error;
pub mod models;
pub mod money;
pub mod realtime;
pub mod response;
pub mod status;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use models::{Order, Table, TableSession, TableStatus};
pub use realtime::{EventName, RealtimeEvent};
pub use response::ApiEnvelope;
pub use status::{OrderStatus, SessionStatus, StatusInfo};
