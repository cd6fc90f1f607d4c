//! Order, OrderItem, OrderItemModifier models — §3, transition table in §4.1

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order workflow states — the nodes of the fixed transition graph in §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Queued,
    Preparing,
    Ready,
    Delivered,
    AwaitingPayment,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Whether an order in this status must carry a non-null `waiter_id`
    /// (post-condition in §4.1).
    pub fn requires_waiter(&self) -> bool {
        matches!(
            self,
            Self::Queued
                | Self::Preparing
                | Self::Ready
                | Self::Delivered
                | Self::AwaitingPayment
                | Self::Paid
        )
    }

    /// Statuses an active (still-in-flight) order can be in — used by the
    /// transfer workflow's "re-point active orders" step (§4.5).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::New | Self::Queued | Self::Preparing | Self::Ready)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    AwaitingTip,
    Paid,
}

/// A single append-only history entry — invariant #3 in §8 is then trivially
/// true by construction: the newest entry's status is always the last write.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderHistoryEntry {
    pub order_id: i64,
    pub seq: i32,
    pub status: OrderStatus,
    pub actor_employee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub session_id: i64,
    pub customer_id: i64,
    pub workflow_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub tip_amount: Decimal,
    pub total_amount: Decimal,
    pub waiter_id: Option<i64>,
    pub chef_id: Option<i64>,
    pub delivery_waiter_id: Option<i64>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub waiter_accepted_at: Option<DateTime<Utc>>,
    pub chef_accepted_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub check_requested_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<super::PaymentMethod>,
    pub payment_reference: Option<String>,
    pub payment_meta: Option<serde_json::Value>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Invariant #1: `total_amount == subtotal + tax_amount + tip_amount`.
    pub fn recompute_total(&mut self) {
        self.total_amount = shared::money::quantize(self.subtotal + self.tax_amount + self.tip_amount);
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub special_instructions: Option<String>,
    pub delivered_quantity: i32,
    pub is_fully_delivered: bool,
    pub is_quick_serve: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivered_by_employee_id: Option<i64>,
}

impl OrderItem {
    pub fn line_total(&self, modifiers: &[OrderItemModifier]) -> Decimal {
        let modifier_total: Decimal = modifiers.iter().map(|m| m.unit_price_adjustment * Decimal::from(m.quantity)).sum();
        shared::money::quantize(self.unit_price * Decimal::from(self.quantity) + modifier_total)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct OrderItemModifier {
    pub id: i64,
    pub order_item_id: i64,
    pub modifier_id: i64,
    pub quantity: i32,
    pub unit_price_adjustment: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_are_paid_and_cancelled() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
    }

    #[test]
    fn requires_waiter_excludes_new() {
        assert!(!OrderStatus::New.requires_waiter());
        assert!(OrderStatus::Queued.requires_waiter());
        assert!(OrderStatus::Paid.requires_waiter());
    }

    #[test]
    fn active_statuses_exclude_post_delivery() {
        assert!(OrderStatus::New.is_active());
        assert!(OrderStatus::Ready.is_active());
        assert!(!OrderStatus::Delivered.is_active());
        assert!(!OrderStatus::Paid.is_active());
    }

    #[test]
    fn line_total_sums_item_and_modifiers() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            menu_item_id: 1,
            quantity: 2,
            unit_price: Decimal::new(1099, 2),
            special_instructions: None,
            delivered_quantity: 0,
            is_fully_delivered: false,
            is_quick_serve: false,
            delivered_at: None,
            delivered_by_employee_id: None,
        };
        let modifiers = vec![OrderItemModifier {
            id: 1,
            order_item_id: 1,
            modifier_id: 1,
            quantity: 2,
            unit_price_adjustment: Decimal::new(150, 2),
        }];
        // 2 * 10.99 + 2 * 1.50 = 21.98 + 3.00 = 24.98
        assert_eq!(item.line_total(&modifiers), Decimal::new(2498, 2));
    }

    #[test]
    fn order_recompute_total_sums_the_three_components() {
        let mut order = Order {
            id: 1,
            session_id: 1,
            customer_id: 1,
            workflow_status: OrderStatus::New,
            payment_status: PaymentStatus::Unpaid,
            subtotal: Decimal::new(1000, 2),
            tax_amount: Decimal::new(160, 2),
            tip_amount: Decimal::new(200, 2),
            total_amount: Decimal::ZERO,
            waiter_id: None,
            chef_id: None,
            delivery_waiter_id: None,
            accepted_at: None,
            waiter_accepted_at: None,
            chef_accepted_at: None,
            ready_at: None,
            delivered_at: None,
            check_requested_at: None,
            paid_at: None,
            payment_method: None,
            payment_reference: None,
            payment_meta: None,
            notes: String::new(),
            created_at: Utc::now(),
        };
        order.recompute_total();
        assert_eq!(order.total_amount, Decimal::new(1360, 2));
    }
}
