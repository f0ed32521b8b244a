//! Data models
//!
//! All entities are owned by the backend; clients hold best-effort copies.
//! Wire format is camelCase JSON with SCREAMING_SNAKE_CASE enums.

pub mod order;
pub mod session;
pub mod table;

// Re-exports
pub use order::*;
pub use session::*;
pub use table::*;
