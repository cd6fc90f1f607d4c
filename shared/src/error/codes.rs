//! Unified error codes for the restaurant operations core
//!
//! Error codes are organized by category so that the leading digit tells a
//! caller which subsystem raised it, independent of the [`super::category::ErrorCategory`]
//! it maps to:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors (actor has no valid session)
//! - 2xxx: Permission errors (actor's scope does not allow the action)
//! - 4xxx: Order / transition errors
//! - 5xxx: Settlement / payment errors
//! - 6xxx: Split-bill errors
//! - 7xxx: Session / table / area errors
//! - 8xxx: Employee / assignment / transfer errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum.
///
/// Represented as `u16` for compact, stable wire serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    Success = 0,
    Unknown = 1,
    ValidationFailed = 2,
    NotFound = 3,
    AlreadyExists = 4,
    InvalidRequest = 5,
    InvalidFormat = 6,
    RequiredField = 7,
    ValueOutOfRange = 8,
    Conflict = 9,
    Locked = 10,

    // ==================== 1xxx: Auth ====================
    NotAuthenticated = 1001,

    // ==================== 2xxx: Permission ====================
    PermissionDenied = 2001,

    // ==================== 4xxx: Order ====================
    OrderNotFound = 4001,
    OrderInvalidTransition = 4002,
    OrderTerminalState = 4003,
    OrderJustificationRequired = 4004,
    OrderItemNotFound = 4005,
    OrderKitchenRequired = 4006,
    OrderInvalidPaymentMethod = 4007,
    OrderModificationNotFound = 4008,
    OrderModificationNotPending = 4009,

    // ==================== 5xxx: Settlement ====================
    PaymentInvalidMethod = 5001,
    SessionAlreadyPaid = 5002,
    SettlementInvalidState = 5003,
    TipInvalidInput = 5004,
    PartialPaymentOrderMismatch = 5005,

    // ==================== 6xxx: Split bill ====================
    SplitNotFound = 6001,
    SplitAlreadyActive = 6002,
    SplitPersonNotFound = 6003,
    SplitPortionExceeded = 6004,
    SplitPersonAlreadyPaid = 6005,
    SplitNotActive = 6006,
    SplitInvalidPeopleCount = 6007,

    // ==================== 7xxx: Session / table ====================
    SessionNotFound = 7001,
    SessionExpired = 7002,
    SessionClosed = 7003,
    TableNotFound = 7101,
    TableCodeInvalid = 7102,
    AreaNotFound = 7103,
    SessionRaceUnresolved = 7104,

    // ==================== 8xxx: Employee / assignment ====================
    EmployeeNotFound = 8001,
    CustomerNotFound = 8002,
    AssignmentConflict = 8003,
    TransferNotFound = 8004,
    TransferNotPending = 8005,
    TransferNotAuthorized = 8006,
    PendingTransferExists = 8007,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    LockTimeout = 9003,
    ConfigError = 9004,
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
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::Conflict => "Operation conflicts with current state",
            ErrorCode::Locked => "Row lock acquisition timed out",

            ErrorCode::NotAuthenticated => "Actor is not authenticated",

            ErrorCode::PermissionDenied => "Actor's scope does not allow this action",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderInvalidTransition => "No such transition from the order's current status",
            ErrorCode::OrderTerminalState => "Order is in a terminal status and cannot transition",
            ErrorCode::OrderJustificationRequired => "This transition requires a non-empty justification",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderKitchenRequired => "Order contains an item that requires kitchen preparation",
            ErrorCode::OrderInvalidPaymentMethod => "Unknown payment method",
            ErrorCode::OrderModificationNotFound => "Order modification not found",
            ErrorCode::OrderModificationNotPending => "Order modification is not pending review",

            ErrorCode::PaymentInvalidMethod => "Unknown payment method",
            ErrorCode::SessionAlreadyPaid => "Session has already been paid",
            ErrorCode::SettlementInvalidState => "Session is not in a state that allows this settlement step",
            ErrorCode::TipInvalidInput => "Exactly one of fixed or percent must be given, within range",
            ErrorCode::PartialPaymentOrderMismatch => "One or more orders do not belong to this session",

            ErrorCode::SplitNotFound => "Split bill not found",
            ErrorCode::SplitAlreadyActive => "Session already has an active split",
            ErrorCode::SplitPersonNotFound => "Split bill person not found",
            ErrorCode::SplitPortionExceeded => "Assigned portions for this item would exceed 1",
            ErrorCode::SplitPersonAlreadyPaid => "Split bill person has already paid",
            ErrorCode::SplitNotActive => "Split bill is not active",
            ErrorCode::SplitInvalidPeopleCount => "number_of_people must be at least 2",

            ErrorCode::SessionNotFound => "Dining session not found",
            ErrorCode::SessionExpired => "Dining session has expired",
            ErrorCode::SessionClosed => "Dining session is already closed",
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableCodeInvalid => "Table code does not match the required format",
            ErrorCode::AreaNotFound => "Area not found",
            ErrorCode::SessionRaceUnresolved => "Concurrent session creation race could not be resolved",

            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::AssignmentConflict => "Table is already actively assigned to another waiter",
            ErrorCode::TransferNotFound => "Transfer request not found",
            ErrorCode::TransferNotPending => "Transfer request is not pending",
            ErrorCode::TransferNotAuthorized => "Only the target waiter may resolve this transfer",
            ErrorCode::PendingTransferExists => "A pending transfer request already exists for this table",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::LockTimeout => "Lock acquisition timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

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
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::Conflict),
            10 => Ok(ErrorCode::Locked),

            1001 => Ok(ErrorCode::NotAuthenticated),

            2001 => Ok(ErrorCode::PermissionDenied),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderInvalidTransition),
            4003 => Ok(ErrorCode::OrderTerminalState),
            4004 => Ok(ErrorCode::OrderJustificationRequired),
            4005 => Ok(ErrorCode::OrderItemNotFound),
            4006 => Ok(ErrorCode::OrderKitchenRequired),
            4007 => Ok(ErrorCode::OrderInvalidPaymentMethod),
            4008 => Ok(ErrorCode::OrderModificationNotFound),
            4009 => Ok(ErrorCode::OrderModificationNotPending),

            5001 => Ok(ErrorCode::PaymentInvalidMethod),
            5002 => Ok(ErrorCode::SessionAlreadyPaid),
            5003 => Ok(ErrorCode::SettlementInvalidState),
            5004 => Ok(ErrorCode::TipInvalidInput),
            5005 => Ok(ErrorCode::PartialPaymentOrderMismatch),

            6001 => Ok(ErrorCode::SplitNotFound),
            6002 => Ok(ErrorCode::SplitAlreadyActive),
            6003 => Ok(ErrorCode::SplitPersonNotFound),
            6004 => Ok(ErrorCode::SplitPortionExceeded),
            6005 => Ok(ErrorCode::SplitPersonAlreadyPaid),
            6006 => Ok(ErrorCode::SplitNotActive),
            6007 => Ok(ErrorCode::SplitInvalidPeopleCount),

            7001 => Ok(ErrorCode::SessionNotFound),
            7002 => Ok(ErrorCode::SessionExpired),
            7003 => Ok(ErrorCode::SessionClosed),
            7101 => Ok(ErrorCode::TableNotFound),
            7102 => Ok(ErrorCode::TableCodeInvalid),
            7103 => Ok(ErrorCode::AreaNotFound),
            7104 => Ok(ErrorCode::SessionRaceUnresolved),

            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::CustomerNotFound),
            8003 => Ok(ErrorCode::AssignmentConflict),
            8004 => Ok(ErrorCode::TransferNotFound),
            8005 => Ok(ErrorCode::TransferNotPending),
            8006 => Ok(ErrorCode::TransferNotAuthorized),
            8007 => Ok(ErrorCode::PendingTransferExists),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::LockTimeout),
            9004 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant_through_u16() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderJustificationRequired,
            ErrorCode::SplitPortionExceeded,
            ErrorCode::SessionRaceUnresolved,
            ErrorCode::TransferNotAuthorized,
            ErrorCode::InternalError,
        ];
        for code in codes {
            let value: u16 = code.into();
            assert_eq!(ErrorCode::try_from(value).unwrap(), code);
        }
    }

    #[test]
    fn rejects_unknown_code() {
        assert!(ErrorCode::try_from(65535).is_err());
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
    }
}
