//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 4xxx: Order errors
/// - 5xxx: Settlement errors
/// - 6xxx: Split-bill errors
/// - 7xxx: Session/table errors
/// - 8xxx: Employee/assignment errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Order,
    Settlement,
    SplitBill,
    Session,
    Assignment,
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..4000 => Self::Permission,
            4000..5000 => Self::Order,
            5000..6000 => Self::Settlement,
            6000..7000 => Self::SplitBill,
            7000..8000 => Self::Session,
            8000..9000 => Self::Assignment,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Order => "order",
            Self::Settlement => "settlement",
            Self::SplitBill => "split_bill",
            Self::Session => "session",
            Self::Assignment => "assignment",
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
    fn categorizes_known_ranges() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Settlement);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::SplitBill);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Session);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::Assignment);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
    }

    #[test]
    fn error_code_category_matches() {
        assert_eq!(
            ErrorCode::OrderJustificationRequired.category(),
            ErrorCategory::Order
        );
        assert_eq!(
            ErrorCode::TransferNotAuthorized.category(),
            ErrorCategory::Assignment
        );
    }
}
