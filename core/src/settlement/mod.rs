//! SettlementEngine — check, tip, pay, confirm (§4.3)

use crate::db::repository::order as order_repo;
use crate::db::repository::session as session_repo;
use crate::db::repository::waiter_call as waiter_call_repo;
use crate::domain::{DiningSession, PaymentMethod, SessionStatus};
use crate::realtime::{bus::RealtimeBus, events};
use rust_decimal::Decimal;
use shared::error::AppError;
use shared::util::snowflake_id;
use sqlx::PgPool;

pub struct SettlementEngine;

impl SettlementEngine {
    pub async fn request_check(pool: &PgPool, session_id: i64, bus: &RealtimeBus) -> Result<DiningSession, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let session = session_repo::lock_for_update(&mut tx, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("session"))?;

        if !matches!(session.status, SessionStatus::Open | SessionStatus::AwaitingTip | SessionStatus::AwaitingPayment) {
            return Err(AppError::conflict("check cannot be requested in this session state"));
        }

        let updated = session_repo::request_check(&mut tx, session_id).await?;

        let pending = waiter_call_repo::find_pending_by_session(&mut tx, session_id).await?;
        if !pending.iter().any(|c| c.note == crate::domain::waiter_call::NOTE_CHECKOUT_REQUEST) {
            waiter_call_repo::insert(
                &mut tx,
                snowflake_id(),
                session_id,
                updated.table_code.as_deref().unwrap_or(""),
                crate::domain::waiter_call::NOTE_CHECKOUT_REQUEST,
            )
            .await?;
        }

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, payload) =
            events::session_status_changed(updated.id, updated.status, updated.table_code.as_deref());
        bus.publish(event_type, payload).await;

        Ok(updated)
    }

    pub async fn apply_tip(
        pool: &PgPool,
        session_id: i64,
        fixed: Option<Decimal>,
        percent: Option<Decimal>,
        bus: &RealtimeBus,
    ) -> Result<DiningSession, AppError> {
        if fixed.is_some() == percent.is_some() {
            return Err(AppError::invalid_request("exactly one of fixed or percent must be provided"));
        }

        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let session = session_repo::lock_for_update(&mut tx, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("session"))?;

        if !matches!(session.status, SessionStatus::Open | SessionStatus::AwaitingTip | SessionStatus::AwaitingPayment) {
            return Err(AppError::conflict("tip cannot be applied in this session state"));
        }

        let tip = if let Some(fixed) = fixed {
            if fixed < Decimal::ZERO || fixed > Decimal::new(1_000_000, 2) {
                return Err(AppError::invalid_request("fixed tip out of range"));
            }
            shared::money::quantize(fixed)
        } else {
            let percent = percent.unwrap();
            if percent < Decimal::ZERO || percent > Decimal::from(100) {
                return Err(AppError::invalid_request("percent must be within [0, 100]"));
            }
            shared::money::quantize(session.subtotal * percent / Decimal::from(100))
        };

        let updated = session_repo::apply_tip(&mut tx, session_id, tip).await?;

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, payload) =
            events::session_status_changed(updated.id, updated.status, updated.table_code.as_deref());
        bus.publish(event_type, payload).await;

        Ok(updated)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn finalize_payment(
        pool: &PgPool,
        session_id: i64,
        method: PaymentMethod,
        tip: Option<Decimal>,
        reference: Option<&str>,
        contact_email: Option<&str>,
        pii_key: &shared::pii::PiiKey,
        bus: &RealtimeBus,
    ) -> Result<(DiningSession, bool), AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let session = session_repo::lock_for_update(&mut tx, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("session"))?;

        if session.status == SessionStatus::Paid {
            return Err(AppError::conflict("session is already paid"));
        }

        if let Some(email) = contact_email {
            let customer = crate::db::repository::customer::find_by_id(&mut tx, session.customer_id)
                .await?
                .ok_or_else(|| AppError::not_found("customer"))?;
            if customer.is_anonymous(pii_key) {
                let encrypted = shared::pii::EncryptedField::encrypt(pii_key, email);
                crate::db::repository::customer::update_email(&mut tx, session.customer_id, &encrypted).await?;
            }
        }

        let session = if let Some(tip) = tip {
            session_repo::apply_tip(&mut tx, session_id, shared::money::quantize(tip)).await?
        } else {
            session
        };

        let requires_confirmation = method.requires_confirmation();
        let next_status = if requires_confirmation {
            SessionStatus::AwaitingPaymentConfirmation
        } else {
            SessionStatus::Paid
        };

        let updated = session_repo::finalize_payment(
            &mut tx,
            session_id,
            method,
            reference,
            next_status,
            session.total_amount,
        )
        .await?;

        if !requires_confirmation {
            mark_all_orders_paid(&mut tx, session_id, method, reference).await?;
        }

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, payload) =
            events::session_status_changed(updated.id, updated.status, updated.table_code.as_deref());
        bus.publish(event_type, payload).await;

        Ok((updated, requires_confirmation))
    }

    pub async fn confirm_payment(pool: &PgPool, session_id: i64, bus: &RealtimeBus) -> Result<DiningSession, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let session = session_repo::lock_for_update(&mut tx, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("session"))?;

        if session.status != SessionStatus::AwaitingPaymentConfirmation {
            return Err(AppError::conflict("session is not awaiting payment confirmation"));
        }

        let method = session.payment_method.ok_or_else(|| AppError::internal("session has no payment method set"))?;
        mark_all_orders_paid(&mut tx, session_id, method, session.payment_reference.as_deref()).await?;

        let updated = session_repo::finalize_payment(
            &mut tx,
            session_id,
            method,
            session.payment_reference.as_deref(),
            SessionStatus::Paid,
            session.total_amount,
        )
        .await?;

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, payload) =
            events::session_status_changed(updated.id, updated.status, updated.table_code.as_deref());
        bus.publish(event_type, payload).await;

        Ok(updated)
    }

    pub async fn confirm_partial_payment(
        pool: &PgPool,
        session_id: i64,
        order_ids: &[i64],
        method: PaymentMethod,
        reference: Option<&str>,
        bus: &RealtimeBus,
    ) -> Result<DiningSession, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let session = session_repo::lock_for_update(&mut tx, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("session"))?;

        if session.status != SessionStatus::AwaitingPaymentConfirmation {
            return Err(AppError::conflict("session is not awaiting payment confirmation"));
        }

        let all_orders = order_repo::find_by_session(&mut tx, session_id).await?;
        for order_id in order_ids {
            if !all_orders.iter().any(|o| o.id == *order_id) {
                return Err(AppError::invalid_request("order does not belong to this session"));
            }
            order_repo::finalize_payment(&mut tx, *order_id, method, reference, None).await?;
        }

        let refreshed = order_repo::find_by_session(&mut tx, session_id).await?;
        let all_paid = refreshed
            .iter()
            .all(|o| o.workflow_status == crate::domain::OrderStatus::Paid);

        let updated = if all_paid {
            session_repo::finalize_payment(
                &mut tx,
                session_id,
                method,
                reference,
                SessionStatus::Paid,
                session.total_amount,
            )
            .await?
        } else {
            session
        };

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, payload) =
            events::session_status_changed(updated.id, updated.status, updated.table_code.as_deref());
        bus.publish(event_type, payload).await;

        Ok(updated)
    }
}

async fn mark_all_orders_paid(
    conn: &mut sqlx::PgConnection,
    session_id: i64,
    method: PaymentMethod,
    reference: Option<&str>,
) -> Result<(), AppError> {
    let orders = order_repo::find_by_session(conn, session_id).await?;
    for order in orders {
        if order.workflow_status != crate::domain::OrderStatus::Paid {
            order_repo::finalize_payment(conn, order.id, method, reference, None).await?;
        }
    }
    Ok(())
}
