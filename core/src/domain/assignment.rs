//! WaiterTableAssignment and TableTransferRequest models — §3, §4.5

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WaiterTableAssignment {
    pub id: i64,
    pub waiter_id: i64,
    pub table_id: i64,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
    pub unassigned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TableTransferRequest {
    pub id: i64,
    pub table_id: i64,
    pub from_waiter_id: i64,
    pub to_waiter_id: i64,
    pub status: TransferStatus,
    pub transfer_orders: Option<bool>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
