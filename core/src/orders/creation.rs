//! Order creation — session resolution, waiter-call resolution, and the
//! first realtime emission for a new order (§4.2 "Waiter-call resolution",
//! §4.5 "Waiter-call resolution").

use crate::config::Config;
use crate::db::repository::assignment as assignment_repo;
use crate::db::repository::order as order_repo;
use crate::domain::{Order, OrderStatus};
use crate::realtime::{bus::RealtimeBus, events};
use crate::sessions::{SessionCoordinator, SessionHint};
use rust_decimal::Decimal;
use shared::error::AppError;
use shared::util::snowflake_id;
use sqlx::PgPool;

pub struct NewOrderItem {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub special_instructions: Option<String>,
    pub is_quick_serve: bool,
    pub modifiers: Vec<NewOrderItemModifier>,
}

pub struct NewOrderItemModifier {
    pub modifier_id: i64,
    pub quantity: i32,
    pub unit_price_adjustment: Decimal,
}

pub async fn create_order(
    pool: &PgPool,
    hint: SessionHint,
    items: Vec<NewOrderItem>,
    notes: &str,
    config: &Config,
    bus: &RealtimeBus,
) -> Result<Order, AppError> {
    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

    let session = SessionCoordinator::get_or_create(&mut tx, &hint, config).await?;

    let order_id = snowflake_id();
    let mut order = order_repo::insert(&mut tx, order_id, session.id, hint.customer_id, notes).await?;

    let mut subtotal = Decimal::ZERO;
    let mut tax_amount = Decimal::ZERO;
    let mut all_quick_serve = true;

    for new_item in &items {
        let item = order_repo::insert_item(
            &mut tx,
            snowflake_id(),
            order.id,
            new_item.menu_item_id,
            new_item.quantity,
            new_item.unit_price,
            new_item.special_instructions.as_deref(),
            new_item.is_quick_serve,
        )
        .await?;

        let mut modifiers = Vec::with_capacity(new_item.modifiers.len());
        for modifier in &new_item.modifiers {
            let row = order_repo::insert_item_modifier(
                &mut tx,
                snowflake_id(),
                item.id,
                modifier.modifier_id,
                modifier.quantity,
                modifier.unit_price_adjustment,
            )
            .await?;
            modifiers.push(row);
        }

        let line_total = item.line_total(&modifiers);
        let (line_subtotal, line_tax) = SessionCoordinator::compute_order_tax(config, line_total);
        subtotal += line_subtotal;
        tax_amount += line_tax;

        if !new_item.is_quick_serve {
            all_quick_serve = false;
        }
    }

    order = order_repo::update_totals(&mut tx, order.id, shared::money::quantize(subtotal), shared::money::quantize(tax_amount)).await?;
    order.recompute_total();

    let table_id = hint.table_id;
    let mut auto_accepted = false;
    let mut assigned_waiter_id = None;

    if let Some(table_id) = table_id {
        if let Some(assignment) = assignment_repo::find_active_by_table(&mut tx, table_id).await? {
            let next_status = if all_quick_serve { OrderStatus::Ready } else { OrderStatus::Queued };
            order = order_repo::apply_transition(
                &mut tx,
                order.id,
                next_status,
                Some(assignment.waiter_id),
                None,
                Some(assignment.waiter_id),
                Some("accepted_at"),
            )
            .await?;
            sqlx::query("UPDATE orders SET waiter_accepted_at = now() WHERE id = $1")
                .bind(order.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            auto_accepted = true;
            assigned_waiter_id = Some(assignment.waiter_id);
        }
    }

    SessionCoordinator::recompute_totals(&mut tx, session.id).await?;

    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    let item_count = order_repo_item_count(&items);
    let (event_type, payload) = events::order_created(
        order.id,
        order.session_id,
        session.table_code.as_deref(),
        !all_quick_serve,
        item_count,
    );
    bus.publish(event_type, payload).await;

    if let Some(waiter_id) = assigned_waiter_id {
        if auto_accepted {
            let (event_type, payload) = events::order_auto_accepted(
                order.id,
                waiter_id,
                table_id.unwrap_or_default(),
                order.session_id,
            );
            bus.publish(event_type, payload).await;
        }
    }

    Ok(order)
}

fn order_repo_item_count(items: &[NewOrderItem]) -> i32 {
    items.iter().map(|i| i.quantity).sum()
}
