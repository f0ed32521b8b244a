//! API Response envelope
//!
//! Every REST endpoint of the ordering backend answers with:
//! ```json
//! {
//!     "success": true,
//!     "data": { ... },
//!     "error": null
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Error part of the envelope; the backend sends either a string or an object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EnvelopeError {
    Message(String),
    Detailed {
        #[serde(default)]
        code: Option<String>,
        message: String,
    },
}

impl EnvelopeError {
    pub fn message(&self) -> &str {
        match self {
            EnvelopeError::Message(m) => m,
            EnvelopeError::Detailed { message, .. } => message,
        }
    }
}

/// Unified API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful envelope
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed envelope
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(EnvelopeError::Message(message.into())),
        }
    }

    /// Unwrap the envelope into its data
    ///
    /// `success: false` or a missing `data` field both become an [`AppError`].
    pub fn into_result(self) -> Result<T, AppError> {
        self.check_success()?;
        self.data.ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidFormat, "Response is missing data")
        })
    }

    /// Accept a command acknowledgement
    ///
    /// Only `success` matters; `data` may be absent or null.
    pub fn into_ack(self) -> Result<(), AppError> {
        self.check_success()
    }

    fn check_success(&self) -> Result<(), AppError> {
        if self.success {
            return Ok(());
        }
        let message = self
            .error
            .as_ref()
            .map(|e| e.message().to_string())
            .unwrap_or_else(|| ErrorCode::Unknown.message().to_string());
        Err(AppError::with_message(ErrorCode::InvalidRequest, message))
    }
}
