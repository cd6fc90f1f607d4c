//! Area model — §3 Area

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Area {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    pub prefix: String,
    pub background_image: Option<String>,
    pub is_active: bool,
}
