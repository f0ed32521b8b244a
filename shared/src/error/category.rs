//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Auth / session errors
/// - 4xxx: Order errors
/// - 5xxx: Payment errors
/// - 7xxx: Table errors
/// - everything else: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Auth / session errors (1xxx)
    Auth,
    /// Order errors (4xxx)
    Order,
    /// Payment errors (5xxx)
    Payment,
    /// Table errors (7xxx)
    Table,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            4000..5000 => Self::Order,
            5000..6000 => Self::Payment,
            7000..8000 => Self::Table,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Order => "order",
            Self::Payment => "payment",
            Self::Table => "table",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1003), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5002), ErrorCategory::Payment);
        assert_eq!(ErrorCategory::from_code(7002), ErrorCategory::Table);
        assert_eq!(ErrorCategory::from_code(9401), ErrorCategory::System);
        // Unused ranges fold into System
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::SessionMissing.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::OrderInvalid.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::PaymentFailed.category(), ErrorCategory::Payment);
        assert_eq!(
            ErrorCode::TableActionNotAllowed.category(),
            ErrorCategory::Table
        );
        assert_eq!(ErrorCode::StorageError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        assert_eq!(
            serde_json::to_string(&ErrorCategory::Table).unwrap(),
            "\"table\""
        );
        let category: ErrorCategory = serde_json::from_str("\"payment\"").unwrap();
        assert_eq!(category, ErrorCategory::Payment);
    }
}
