//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the backend
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Backend answered `success: false` or a malformed envelope
    #[error("API error: {0}")]
    Api(#[from] AppError),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// No dining session could be resolved from any storage tier
    #[error("No dining session found")]
    SessionMissing,

    /// Real-time transport closed
    #[error("Transport closed")]
    TransportClosed,

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),
}

impl ClientError {
    /// Error code this failure maps to
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            ClientError::Http(_) => ErrorCode::NetworkError,
            ClientError::Status { status, .. } => ErrorCode::from_http_status(*status),
            ClientError::Api(e) => e.code,
            ClientError::InvalidResponse(_) | ClientError::Serialization(_) => {
                ErrorCode::InvalidFormat
            }
            ClientError::Storage(_) => ErrorCode::StorageError,
            ClientError::SessionMissing => ErrorCode::SessionMissing,
            ClientError::TransportClosed => ErrorCode::TransportDisconnected,
            ClientError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Text for the transient notification shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api(e) => e.message.clone(),
            other => other.code().message().to_string(),
        }
    }

    /// Whether the view should send the user back through session setup
    pub fn requires_redirect(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::SessionExpired | ErrorCode::SessionMissing | ErrorCode::NotAuthenticated
        )
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
