//! WaiterCall model — §3 WaiterCall

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WaiterCallStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// Sentinel note tag used to request the check — distinguishes a
/// checkout-triggered call from a plain "come to my table" call.
pub const NOTE_CHECKOUT_REQUEST: &str = "checkout_request";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WaiterCall {
    pub id: i64,
    pub session_id: i64,
    pub table_code: String,
    pub status: WaiterCallStatus,
    pub note: String,
    pub confirmed_by_employee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
