//! Repository module
//!
//! Free functions for Postgres access via sqlx, taking `&mut PgConnection`
//! so callers control the transaction (and can acquire `SELECT ... FOR
//! UPDATE` locks) rather than the repository opening its own.

pub mod area;
pub mod assignment;
pub mod customer;
pub mod employee;
pub mod modification;
pub mod order;
pub mod session;
pub mod split_bill;
pub mod table;
pub mod waiter_call;

use shared::error::AppError;
use thiserror::Error;

/// Postgres unique_violation SQLSTATE.
pub const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres foreign_key_violation SQLSTATE.
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl RepoError {
    /// True iff this error is a unique-constraint violation — the session
    /// get-or-create race path (§4.2) and the assignment backstop (§5) both
    /// need to distinguish this from an ordinary database error.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, RepoError::Duplicate(_))
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("record not found".into()),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some(PG_UNIQUE_VIOLATION) => RepoError::Duplicate(msg),
                    Some(PG_FOREIGN_KEY_VIOLATION) => RepoError::Validation(msg),
                    _ => RepoError::Database(msg),
                }
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
