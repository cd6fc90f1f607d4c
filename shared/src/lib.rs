//! Shared types for the restaurant operations core
//!
//! Common types used across the core crate and its tests: the unified error
//! system, money/decimal helpers, encrypted PII value types, authorization
//! scopes, and table-code validation.

pub mod error;
pub mod money;
pub mod pii;
pub mod scope;
pub mod table_code;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, ErrorKind};
pub use scope::{Actor, Scope};
