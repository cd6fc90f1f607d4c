//! SplitBillEngine — equal and by-item splits (§4.4)

use crate::db::repository::order as order_repo;
use crate::db::repository::session as session_repo;
use crate::db::repository::split_bill as split_repo;
use crate::domain::{PaymentMethod, SessionStatus, SplitBill, SplitPerson, SplitStatus, SplitType};
use crate::realtime::{bus::RealtimeBus, events};
use rust_decimal::Decimal;
use shared::error::AppError;
use shared::money::{equal_shares, proportional_shares, quantize};
use shared::util::snowflake_id;
use sqlx::PgPool;

pub struct SplitBillEngine;

impl SplitBillEngine {
    pub async fn create(
        pool: &PgPool,
        session_id: i64,
        split_type: SplitType,
        number_of_people: i32,
    ) -> Result<(SplitBill, Vec<SplitPerson>), AppError> {
        if number_of_people < 2 {
            return Err(AppError::invalid_request("number_of_people must be at least 2"));
        }

        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        if split_repo::find_active_by_session(&mut tx, session_id).await?.is_some() {
            return Err(AppError::conflict("session already has an active split"));
        }

        let split = split_repo::insert(&mut tx, snowflake_id(), session_id, split_type, number_of_people).await?;

        let mut persons = Vec::with_capacity(number_of_people as usize);
        for i in 1..=number_of_people {
            let person = split_repo::insert_person(&mut tx, snowflake_id(), split.id, &format!("Persona {i}")).await?;
            persons.push(person);
        }

        if split_type == SplitType::Equal {
            let session = session_repo::find_by_id(&mut tx, session_id)
                .await?
                .ok_or_else(|| AppError::not_found("session"))?;
            persons = Self::apply_equal_split(&mut tx, &persons, &session).await?;
        }

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
        Ok((split, persons))
    }

    async fn apply_equal_split(
        conn: &mut sqlx::PgConnection,
        persons: &[SplitPerson],
        session: &crate::domain::DiningSession,
    ) -> Result<Vec<SplitPerson>, AppError> {
        let n = persons.len() as u32;
        let subtotals = equal_shares(session.subtotal, n);
        let taxes = equal_shares(session.tax_amount, n);
        let tips = equal_shares(session.tip_amount, n);

        let mut updated = Vec::with_capacity(persons.len());
        for (i, person) in persons.iter().enumerate() {
            let row = split_repo::update_person_amounts(conn, person.id, subtotals[i], taxes[i], tips[i]).await?;
            updated.push(row);
        }
        Ok(updated)
    }

    /// `AssignItem(splitID, personID, orderItemID, portion)` — by-items split.
    pub async fn assign_item(
        pool: &PgPool,
        split_id: i64,
        person_id: i64,
        order_item_id: i64,
        portion: Decimal,
    ) -> Result<(), AppError> {
        if portion <= Decimal::ZERO || portion > Decimal::ONE {
            return Err(AppError::invalid_request("portion must be within (0, 1]"));
        }

        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let split = split_repo::lock_for_update(&mut tx, split_id)
            .await?
            .ok_or_else(|| AppError::not_found("split"))?;
        if split.status != SplitStatus::Active {
            return Err(AppError::conflict("split is not active"));
        }

        let existing = split_repo::find_assignments(&mut tx, split_id).await?;
        let already: Decimal = existing
            .iter()
            .filter(|a| a.order_item_id == order_item_id)
            .map(|a| a.quantity_portion)
            .sum();

        if already + portion > Decimal::ONE + Decimal::new(1, 3) {
            return Err(AppError::conflict("assigned portions exceed the item's quantity"));
        }

        let item = find_item_across_orders(&mut tx, order_item_id).await?;
        let modifiers = order_repo::find_item_modifiers(&mut tx, order_item_id).await?;
        let line_total = item.line_total(&modifiers);
        let amount = quantize(line_total * portion);

        split_repo::insert_assignment(&mut tx, snowflake_id(), split_id, person_id, order_item_id, portion, amount).await?;

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
        Ok(())
    }

    /// `Recalculate(splitID)` — recompute each person's subtotal from their
    /// assignments, then distribute session tax and tip proportionally to
    /// each person's share of `session.subtotal`.
    pub async fn recalculate(pool: &PgPool, split_id: i64) -> Result<Vec<SplitPerson>, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let split = split_repo::find_by_id(&mut tx, split_id)
            .await?
            .ok_or_else(|| AppError::not_found("split"))?;
        let session = session_repo::find_by_id(&mut tx, split.session_id)
            .await?
            .ok_or_else(|| AppError::not_found("session"))?;

        let persons = split_repo::find_persons(&mut tx, split_id).await?;
        let assignments = split_repo::find_assignments(&mut tx, split_id).await?;

        let mut subtotals = Vec::with_capacity(persons.len());
        for person in &persons {
            let subtotal: Decimal = assignments
                .iter()
                .filter(|a| a.person_id == person.id)
                .map(|a| a.amount)
                .sum();
            subtotals.push(quantize(subtotal));
        }

        let taxes = proportional_shares(session.tax_amount, &subtotals);
        let tips = proportional_shares(session.tip_amount, &subtotals);

        let mut updated = Vec::with_capacity(persons.len());
        for (i, person) in persons.iter().enumerate() {
            let row = split_repo::update_person_amounts(&mut tx, person.id, subtotals[i], taxes[i], tips[i]).await?;
            updated.push(row);
        }

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
        Ok(updated)
    }

    /// `PaySplitPerson(splitID, personID, method, reference?)`.
    pub async fn pay_person(
        pool: &PgPool,
        split_id: i64,
        person_id: i64,
        method: PaymentMethod,
        reference: Option<&str>,
        bus: &RealtimeBus,
    ) -> Result<(SplitPerson, bool), AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let split = split_repo::lock_for_update(&mut tx, split_id)
            .await?
            .ok_or_else(|| AppError::not_found("split"))?;
        if split.status != SplitStatus::Active {
            return Err(AppError::conflict("split is not active"));
        }

        let person = split_repo::lock_person_for_update(&mut tx, person_id)
            .await?
            .ok_or_else(|| AppError::not_found("split person"))?;
        if person.payment_status == crate::domain::split_bill::SplitPersonPaymentStatus::Paid {
            return Err(AppError::conflict("person has already paid"));
        }

        let paid_person = split_repo::mark_person_paid(&mut tx, person_id, method, reference).await?;

        let all_persons = split_repo::find_persons(&mut tx, split_id).await?;
        let split_completed = all_persons
            .iter()
            .all(|p| p.payment_status == crate::domain::split_bill::SplitPersonPaymentStatus::Paid);

        if split_completed {
            split_repo::set_status(&mut tx, split_id, SplitStatus::Completed).await?;

            let reference = format!("split-{split_id}");
            let orders = order_repo::find_by_session(&mut tx, split.session_id).await?;
            for order in orders {
                if order.workflow_status != crate::domain::OrderStatus::Paid {
                    order_repo::finalize_payment(&mut tx, order.id, PaymentMethod::SplitBill, Some(&reference), None).await?;
                }
            }

            let session = session_repo::find_by_id(&mut tx, split.session_id)
                .await?
                .ok_or_else(|| AppError::not_found("session"))?;
            session_repo::finalize_payment(
                &mut tx,
                split.session_id,
                PaymentMethod::SplitBill,
                Some(&reference),
                SessionStatus::Paid,
                session.total_amount,
            )
            .await?;
        }

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        if split_completed {
            let (event_type, payload) = events::session_status_changed(split.session_id, SessionStatus::Paid, None);
            bus.publish(event_type, payload).await;
        }

        Ok((paid_person, split_completed))
    }
}

async fn find_item_across_orders(
    conn: &mut sqlx::PgConnection,
    order_item_id: i64,
) -> Result<crate::domain::OrderItem, AppError> {
    let item = sqlx::query_as::<_, crate::domain::OrderItem>("SELECT * FROM order_items WHERE id = $1")
        .bind(order_item_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found("order item"))?;
    Ok(item)
}
