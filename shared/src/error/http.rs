//! Error kind classification and HTTP status code mapping
//!
//! The core's public contract speaks in terms of the six kinds from the
//! specification (`NotFound`, `BadRequest`, `Forbidden`, `Conflict`, `Locked`,
//! `Internal`); every [`ErrorCode`] maps to exactly one kind, and the kind is
//! what a caller ultimately translates to an HTTP status.

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// The six error kinds from the specification's error handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Forbidden,
    Conflict,
    Locked,
    Internal,
}

impl ErrorKind {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Locked => StatusCode::LOCKED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorCode {
    /// Classify this error code into one of the six kinds from §7.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Success => ErrorKind::Internal, // never surfaced as an error

            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::OrderModificationNotFound
            | Self::SessionNotFound
            | Self::TableNotFound
            | Self::AreaNotFound
            | Self::SplitNotFound
            | Self::SplitPersonNotFound
            | Self::EmployeeNotFound
            | Self::CustomerNotFound
            | Self::TransferNotFound => ErrorKind::NotFound,

            Self::NotAuthenticated
            | Self::PermissionDenied
            | Self::TransferNotAuthorized => ErrorKind::Forbidden,

            Self::AlreadyExists
            | Self::Conflict
            | Self::OrderTerminalState
            | Self::OrderKitchenRequired
            | Self::SessionAlreadyPaid
            | Self::SettlementInvalidState
            | Self::SplitAlreadyActive
            | Self::SplitPersonAlreadyPaid
            | Self::SplitNotActive
            | Self::SessionClosed
            | Self::SessionRaceUnresolved
            | Self::AssignmentConflict
            | Self::TransferNotPending
            | Self::PendingTransferExists
            | Self::OrderModificationNotPending => ErrorKind::Conflict,

            Self::Locked | Self::LockTimeout => ErrorKind::Locked,

            Self::InternalError | Self::DatabaseError | Self::ConfigError => ErrorKind::Internal,

            // Everything else is a documented precondition violation.
            Self::Unknown
            | Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::OrderInvalidTransition
            | Self::OrderJustificationRequired
            | Self::OrderInvalidPaymentMethod
            | Self::PaymentInvalidMethod
            | Self::TipInvalidInput
            | Self::PartialPaymentOrderMismatch
            | Self::SplitPortionExceeded
            | Self::SplitInvalidPeopleCount
            | Self::SessionExpired
            | Self::TableCodeInvalid => ErrorKind::BadRequest,
        }
    }

    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        if self.is_success() {
            return StatusCode::OK;
        }
        self.kind().http_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_maps_to_ok() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn not_found_family_maps_to_404() {
        assert_eq!(ErrorCode::OrderNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            ErrorCode::OrderNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn justification_required_is_bad_request() {
        assert_eq!(
            ErrorCode::OrderJustificationRequired.kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn terminal_state_is_conflict() {
        assert_eq!(ErrorCode::OrderTerminalState.kind(), ErrorKind::Conflict);
        assert_eq!(
            ErrorCode::OrderTerminalState.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn scope_forbidden_maps_to_403() {
        assert_eq!(ErrorCode::PermissionDenied.kind(), ErrorKind::Forbidden);
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn lock_timeout_maps_to_423() {
        assert_eq!(ErrorCode::LockTimeout.http_status(), StatusCode::LOCKED);
    }
}
