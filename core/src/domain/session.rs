//! DiningSession model — §3 DiningSession, settlement lifecycle in §4.3

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    AwaitingTip,
    AwaitingPayment,
    AwaitingPaymentConfirmation,
    Closed,
    Paid,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct DiningSession {
    pub id: i64,
    pub customer_id: i64,
    pub table_id: Option<i64>,
    pub table_code: Option<String>,
    pub status: SessionStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub tip_amount: Decimal,
    pub total_amount: Decimal,
    pub total_paid: Decimal,
    pub payment_method: Option<super::PaymentMethod>,
    pub payment_reference: Option<String>,
    pub check_requested_at: Option<DateTime<Utc>>,
    pub tip_requested_at: Option<DateTime<Utc>>,
    pub tip_confirmed_at: Option<DateTime<Utc>>,
}

impl DiningSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Open && self.expires_at <= now
    }

    /// Invariant: `total_amount == subtotal + tax_amount + tip_amount`.
    pub fn recompute_total(&mut self) {
        self.total_amount = shared::money::quantize(self.subtotal + self.tax_amount + self.tip_amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(status: SessionStatus, expires_at: DateTime<Utc>) -> DiningSession {
        let now = Utc::now();
        DiningSession {
            id: 1,
            customer_id: 1,
            table_id: Some(1),
            table_code: Some("A1".into()),
            status,
            opened_at: now,
            closed_at: None,
            expires_at,
            notes: None,
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            tip_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            payment_method: None,
            payment_reference: None,
            check_requested_at: None,
            tip_requested_at: None,
            tip_confirmed_at: None,
        }
    }

    #[test]
    fn open_session_past_expiry_is_expired() {
        let now = Utc::now();
        let s = session(SessionStatus::Open, now - chrono::Duration::hours(1));
        assert!(s.is_expired(now));
    }

    #[test]
    fn open_session_before_expiry_is_not_expired() {
        let now = Utc::now();
        let s = session(SessionStatus::Open, now + chrono::Duration::hours(1));
        assert!(!s.is_expired(now));
    }

    #[test]
    fn closed_session_is_never_reported_expired() {
        let now = Utc::now();
        let s = session(SessionStatus::Closed, now - chrono::Duration::hours(1));
        assert!(!s.is_expired(now));
    }

    #[test]
    fn recompute_total_sums_components() {
        let mut s = session(SessionStatus::Open, Utc::now());
        s.subtotal = Decimal::new(5000, 2);
        s.tax_amount = Decimal::new(800, 2);
        s.tip_amount = Decimal::new(1000, 2);
        s.recompute_total();
        assert_eq!(s.total_amount, Decimal::new(6800, 2));
    }
}
