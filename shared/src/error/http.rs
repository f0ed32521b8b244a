//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::OrderNotFound | Self::TableNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists | Self::OrderAlreadyFinished | Self::SessionClosed => {
                StatusCode::CONFLICT
            }

            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied | Self::SessionExpired => StatusCode::FORBIDDEN,

            Self::NetworkError | Self::TimeoutError | Self::TransportDisconnected => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            Self::InternalError | Self::ConfigError | Self::StorageError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Map an HTTP status returned by the backend to the closest error code
    ///
    /// Used by the REST client where the body carries no structured code.
    pub fn from_http_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::OrderInvalid,
            StatusCode::UNAUTHORIZED => Self::NotAuthenticated,
            StatusCode::FORBIDDEN => Self::SessionExpired,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::AlreadyExists,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::TimeoutError,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => Self::NetworkError,
            s if s.is_success() => Self::Success,
            _ => Self::InternalError,
        }
    }
}
