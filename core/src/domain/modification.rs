//! OrderModification model — §3 OrderModification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModificationInitiator {
    Customer,
    Waiter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModificationStatus {
    Pending,
    Approved,
    Rejected,
    Applied,
}

/// The changes payload: added/removed/updated item lines, as free-form JSON
/// (menu item id, quantity, modifiers) — the catalog shape itself is out of
/// scope for this core.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct OrderModification {
    pub id: i64,
    pub order_id: i64,
    pub initiator: ModificationInitiator,
    pub status: ModificationStatus,
    pub changes: serde_json::Value,
    pub reason: Option<String>,
    pub reviewer_employee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
