//! Unified error codes for the dine-in platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Auth / session errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as `u16` on the wire so every consumer (Rust or the web
/// frontends) can match on the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth / Session ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Permission denied
    PermissionDenied = 1002,
    /// Session has expired
    SessionExpired = 1003,
    /// No dining session could be resolved
    SessionMissing = 1004,
    /// Dining session is already closed
    SessionClosed = 1005,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order data rejected by the backend
    OrderInvalid = 4002,
    /// Order is already in a terminal state
    OrderAlreadyFinished = 4003,
    /// Order cannot be cancelled in its current state
    OrderNotCancellable = 4004,
    /// Order totals do not add up
    OrderTotalsMismatch = 4005,
    /// Order is empty
    OrderEmpty = 4006,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Payment is not yet available for this order
    PaymentNotAvailable = 5002,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Action is not offered for the table's current status
    TableActionNotAllowed = 7002,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Real-time transport disconnected
    TransportDisconnected = 9301,
    /// Local storage failure
    StorageError = 9401,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth / Session
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::SessionExpired => "Session expired, redirecting",
            ErrorCode::SessionMissing => "Dining session not found, please refresh the page",
            ErrorCode::SessionClosed => "Dining session is already closed",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderInvalid => "Invalid order data",
            ErrorCode::OrderAlreadyFinished => "Order is already finished",
            ErrorCode::OrderNotCancellable => "Order can no longer be cancelled",
            ErrorCode::OrderTotalsMismatch => "Order total does not match subtotal plus tax",
            ErrorCode::OrderEmpty => "Order is empty",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentNotAvailable => "Payment is not available yet",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableActionNotAllowed => "Action not allowed for the table status",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::TransportDisconnected => "Real-time connection lost",
            ErrorCode::StorageError => "Local storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::PermissionDenied),
            1003 => Ok(ErrorCode::SessionExpired),
            1004 => Ok(ErrorCode::SessionMissing),
            1005 => Ok(ErrorCode::SessionClosed),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderInvalid),
            4003 => Ok(ErrorCode::OrderAlreadyFinished),
            4004 => Ok(ErrorCode::OrderNotCancellable),
            4005 => Ok(ErrorCode::OrderTotalsMismatch),
            4006 => Ok(ErrorCode::OrderEmpty),

            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentNotAvailable),

            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableActionNotAllowed),

            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9301 => Ok(ErrorCode::TransportDisconnected),
            9401 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

/// Returned when a numeric code has no [`ErrorCode`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}
