//! SplitBill / SplitBillPerson / SplitBillAssignment models — §3, §4.4

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    ByItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SplitStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SplitBill {
    pub id: i64,
    pub session_id: i64,
    pub split_type: SplitType,
    pub status: SplitStatus,
    pub number_of_people: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SplitPersonPaymentStatus {
    Unpaid,
    Paid,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SplitPerson {
    pub id: i64,
    pub split_id: i64,
    pub label: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub tip_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_status: SplitPersonPaymentStatus,
    pub payment_method: Option<super::PaymentMethod>,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SplitAssignment {
    pub id: i64,
    pub split_id: i64,
    pub person_id: i64,
    pub order_item_id: i64,
    pub quantity_portion: Decimal,
    pub amount: Decimal,
}
