//! Table and Area models — §3 Table, Area

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    pub code: String,
    pub qr_token: String,
    pub area_id: i64,
    pub capacity: i32,
    pub status: TableStatus,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub shape: Option<String>,
    pub is_active: bool,
}
