//! TransitionEngine — the order state machine (§4.1)

use crate::assignment::AssignmentEngine;
use crate::db::repository::employee as employee_repo;
use crate::db::repository::order as order_repo;
use crate::db::repository::session as session_repo;
use crate::domain::{Order, OrderItem, OrderStatus};
use crate::realtime::{bus::RealtimeBus, events};
use crate::sessions::SessionCoordinator;
use shared::error::AppError;
use shared::scope::Scope;
use sqlx::PgPool;

/// A single legal `(from, to)` edge and the policy gating it.
struct Edge {
    from: OrderStatus,
    to: OrderStatus,
    action: Action,
    allowed_scopes: &'static [Scope],
    requires_justification: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AcceptOrQueue,
    KitchenStart,
    SkipKitchen,
    KitchenComplete,
    Deliver,
    MarkAwaitingPayment,
    Pay,
    PayDirect,
    Cancel,
}

use OrderStatus::*;
use Scope::{Admin, Cashier, Chef, Client, System, Waiter};

const TABLE: &[Edge] = &[
    Edge { from: New, to: Queued, action: Action::AcceptOrQueue, allowed_scopes: &[Waiter, Admin, System], requires_justification: false },
    Edge { from: New, to: Cancelled, action: Action::Cancel, allowed_scopes: &[Client, Waiter, Admin, System], requires_justification: false },
    Edge { from: Queued, to: Preparing, action: Action::KitchenStart, allowed_scopes: &[Chef, Admin, System], requires_justification: false },
    Edge { from: Queued, to: Ready, action: Action::SkipKitchen, allowed_scopes: &[System], requires_justification: false },
    Edge { from: Queued, to: Cancelled, action: Action::Cancel, allowed_scopes: &[Client, Waiter, Admin, System], requires_justification: false },
    Edge { from: Preparing, to: Ready, action: Action::KitchenComplete, allowed_scopes: &[Chef, Admin, System], requires_justification: false },
    Edge { from: Preparing, to: Cancelled, action: Action::Cancel, allowed_scopes: &[Waiter, Admin, System], requires_justification: true },
    Edge { from: Ready, to: Delivered, action: Action::Deliver, allowed_scopes: &[Waiter, Admin, System], requires_justification: false },
    Edge { from: Ready, to: Cancelled, action: Action::Cancel, allowed_scopes: &[Admin, System], requires_justification: true },
    Edge { from: Delivered, to: AwaitingPayment, action: Action::MarkAwaitingPayment, allowed_scopes: &[Cashier, Admin, System], requires_justification: false },
    Edge { from: Delivered, to: Paid, action: Action::PayDirect, allowed_scopes: &[Admin, System], requires_justification: true },
    Edge { from: Delivered, to: Cancelled, action: Action::Cancel, allowed_scopes: &[Admin, System], requires_justification: true },
    Edge { from: AwaitingPayment, to: Paid, action: Action::Pay, allowed_scopes: &[Cashier, Admin, System], requires_justification: false },
    Edge { from: AwaitingPayment, to: Cancelled, action: Action::Cancel, allowed_scopes: &[Admin, System], requires_justification: true },
];

fn find_edge(from: OrderStatus, to: OrderStatus) -> Option<&'static Edge> {
    TABLE.iter().find(|e| e.from == from && e.to == to)
}

/// Caller-supplied payload for a `Transition` call.
#[derive(Debug, Clone, Default)]
pub struct TransitionPayload {
    pub justification: Option<String>,
    pub payment_method: Option<crate::domain::PaymentMethod>,
    pub payment_reference: Option<String>,
    pub payment_meta: Option<serde_json::Value>,
    pub item_ids: Option<Vec<i64>>,
}

pub struct TransitionEngine;

impl TransitionEngine {
    /// Validate and apply a single order state change (§4.1 public contract).
    pub async fn transition(
        pool: &PgPool,
        order_id: i64,
        to: OrderStatus,
        scope: Scope,
        actor_id: Option<i64>,
        payload: TransitionPayload,
        bus: &RealtimeBus,
    ) -> Result<Order, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let order = order_repo::lock_for_update(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("order"))?;

        if order.workflow_status == to {
            tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
            return Ok(order);
        }

        if order.workflow_status.is_terminal() {
            return Err(AppError::conflict("order is in a terminal status"));
        }

        let edge = find_edge(order.workflow_status, to)
            .ok_or_else(|| AppError::invalid_request("no such transition"))?;

        if !edge.allowed_scopes.contains(&scope) {
            return Err(AppError::forbidden("scope not permitted for this transition"));
        }

        if edge.requires_justification {
            match &payload.justification {
                Some(j) if !j.trim().is_empty() => {}
                _ => return Err(AppError::justification_required()),
            }
        }

        if edge.action == Action::SkipKitchen {
            let items = order_repo::find_items(&mut tx, order_id).await?;
            if items.iter().any(|i| !i.is_quick_serve) {
                return Err(AppError::conflict("kitchen is required for this order"));
            }
        }

        let updated = apply_action(&mut tx, &order, edge, actor_id, &payload).await?;

        if edge.action == Action::Cancel {
            let session = SessionCoordinator::recompute_totals(&mut tx, order.session_id).await?;
            let remaining = order_repo::find_by_session(&mut tx, order.session_id).await?;
            if remaining.iter().all(|o| o.workflow_status == Cancelled) {
                SessionCoordinator::close_in_place(&mut tx, session.id).await?;
            }
        }

        // accept_or_queue chains directly to `ready` when no item needs the kitchen.
        let mut final_order = updated.clone();
        if edge.action == Action::AcceptOrQueue {
            let items = order_repo::find_items(&mut tx, order_id).await?;
            if items.iter().all(|i: &OrderItem| i.is_quick_serve) {
                let chain_edge = find_edge(Queued, Ready).expect("queued->ready is a defined edge");
                final_order = apply_action(&mut tx, &updated, chain_edge, None, &TransitionPayload::default()).await?;
            }
        }

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, event_payload) = events::order_status_changed(
            final_order.id,
            final_order.workflow_status,
            final_order.session_id,
            None,
        );
        bus.publish(event_type, event_payload).await;

        if edge.action == Action::AcceptOrQueue {
            if let Some(waiter_id) = actor_id {
                auto_assign_on_accept(pool, waiter_id, &final_order).await;
            }
        }

        Ok(final_order)
    }

    /// `DeliverItems(orderID, itemIDs, employeeID)` — partial delivery.
    pub async fn deliver_items(
        pool: &PgPool,
        order_id: i64,
        item_ids: &[i64],
        employee_id: i64,
        bus: &RealtimeBus,
    ) -> Result<Order, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let order = order_repo::lock_for_update(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("order"))?;

        if !matches!(order.workflow_status, Ready | Delivered) {
            return Err(AppError::conflict("order must be ready or delivered to record deliveries"));
        }

        let now = chrono::Utc::now();
        for item_id in item_ids {
            let items = order_repo::find_items(&mut tx, order_id).await?;
            let item = items
                .iter()
                .find(|i| i.id == *item_id)
                .ok_or_else(|| AppError::not_found("order item"))?;
            order_repo::mark_item_delivered(&mut tx, item.id, item.quantity, true, employee_id, now).await?;
        }

        let items = order_repo::find_items(&mut tx, order_id).await?;
        let all_delivered = items.iter().all(|i| i.is_fully_delivered);

        let final_order = if all_delivered && order.workflow_status == Ready {
            let edge = find_edge(Ready, Delivered).expect("ready->delivered is a defined edge");
            let updated = apply_action(&mut tx, &order, edge, Some(employee_id), &TransitionPayload::default()).await?;
            tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
            let (event_type, event_payload) =
                events::order_status_changed(updated.id, updated.workflow_status, updated.session_id, None);
            bus.publish(event_type, event_payload).await;
            updated
        } else {
            tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
            order
        };

        Ok(final_order)
    }
}

/// §4.5 "Auto-assign on accept": when the accepting waiter's preference is
/// on, assign them the order's table best-effort and re-point the session's
/// other `new` orders to them. Runs after commit — failures here must not
/// undo the transition that triggered them.
async fn auto_assign_on_accept(pool: &PgPool, waiter_id: i64, order: &Order) {
    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(err) => {
            tracing::warn!(error = %err, "auto-assign: failed to acquire connection");
            return;
        }
    };

    let employee = match employee_repo::find_by_id(&mut conn, waiter_id).await {
        Ok(Some(employee)) => employee,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, waiter_id, "auto-assign: failed to load employee");
            return;
        }
    };
    if !employee.auto_assign_on_accept() {
        return;
    }

    let session = match session_repo::find_by_id(&mut conn, order.session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, session_id = order.session_id, "auto-assign: failed to load session");
            return;
        }
    };

    if let Some(table_id) = session.table_id {
        AssignmentEngine::assign_tables_best_effort(pool, waiter_id, &[table_id]).await;
    }

    if let Err(err) =
        AssignmentEngine::repoint_sibling_new_orders(&mut conn, order.session_id, order.id, waiter_id).await
    {
        tracing::warn!(error = %err, session_id = order.session_id, "auto-assign: failed to repoint sibling orders");
    }
}

async fn apply_action(
    conn: &mut sqlx::PgConnection,
    order: &Order,
    edge: &Edge,
    actor_id: Option<i64>,
    payload: &TransitionPayload,
) -> Result<Order, AppError> {
    let mut notes = order.notes.clone();
    if let Some(justification) = &payload.justification {
        if edge.requires_justification {
            let scope_tag = edge
                .allowed_scopes
                .first()
                .map(|s| s.as_str())
                .unwrap_or("unknown");
            notes.push_str(&format!("\n[{scope_tag}] {justification}"));
        }
    }

    let updated = match edge.action {
        Action::AcceptOrQueue => {
            let updated = sqlx::query_as::<_, Order>(
                r#"
                UPDATE orders
                SET workflow_status = $2, waiter_id = $3, accepted_at = now(), waiter_accepted_at = now()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(order.id)
            .bind(edge.to)
            .bind(actor_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
            order_repo::append_history(conn, order.id, edge.to, actor_id).await?;
            updated
        }
        Action::KitchenStart => {
            order_repo::apply_transition(conn, order.id, edge.to, None, actor_id, actor_id, Some("chef_accepted_at"))
                .await?
        }
        Action::KitchenComplete => {
            order_repo::apply_transition(conn, order.id, edge.to, None, None, actor_id, Some("ready_at")).await?
        }
        Action::Deliver => {
            let updated = sqlx::query_as::<_, Order>(
                r#"
                UPDATE orders
                SET workflow_status = $2, delivery_waiter_id = $3, delivered_at = now(), payment_status = 'awaiting_tip'
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(order.id)
            .bind(edge.to)
            .bind(actor_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
            order_repo::append_history(conn, order.id, edge.to, actor_id).await?;
            updated
        }
        Action::MarkAwaitingPayment => {
            order_repo::apply_transition(conn, order.id, edge.to, None, None, actor_id, Some("check_requested_at")).await?
        }
        Action::Pay | Action::PayDirect => {
            let method = payload
                .payment_method
                .ok_or_else(|| AppError::invalid_request("payment_method is required"))?;
            order_repo::finalize_payment(conn, order.id, method, payload.payment_reference.as_deref(), payload.payment_meta.clone())
                .await?
        }
        Action::SkipKitchen => order_repo::apply_transition(conn, order.id, edge.to, None, None, actor_id, None).await?,
        Action::Cancel => {
            let clear_assignment = matches!(order.workflow_status, New | Queued);
            let updated = if clear_assignment {
                sqlx::query_as::<_, Order>(
                    r#"
                    UPDATE orders
                    SET workflow_status = $2, waiter_id = NULL, accepted_at = NULL,
                        chef_id = NULL, delivery_waiter_id = NULL, payment_status = 'unpaid'
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(order.id)
                .bind(edge.to)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| AppError::database(e.to_string()))?
            } else {
                sqlx::query_as::<_, Order>(
                    "UPDATE orders SET workflow_status = $2, payment_status = 'unpaid' WHERE id = $1 RETURNING *",
                )
                .bind(order.id)
                .bind(edge.to)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| AppError::database(e.to_string()))?
            };
            order_repo::append_history(conn, order.id, edge.to, actor_id).await?;
            updated
        }
    };

    if !notes.is_empty() && notes != order.notes {
        sqlx::query("UPDATE orders SET notes = $2 WHERE id = $1")
            .bind(order.id)
            .bind(&notes)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_to_queued_is_a_defined_edge_for_waiters() {
        let edge = find_edge(New, Queued).expect("accept_or_queue must be defined");
        assert_eq!(edge.action, Action::AcceptOrQueue);
        assert!(edge.allowed_scopes.contains(&Waiter));
        assert!(!edge.requires_justification);
    }

    #[test]
    fn terminal_to_anything_is_undefined() {
        assert!(find_edge(Paid, Cancelled).is_none());
        assert!(find_edge(Cancelled, New).is_none());
    }

    #[test]
    fn pay_direct_bypasses_awaiting_payment_and_requires_justification() {
        let edge = find_edge(Delivered, Paid).expect("pay_direct must be defined");
        assert_eq!(edge.action, Action::PayDirect);
        assert!(edge.requires_justification);
        assert!(edge.allowed_scopes.contains(&Admin));
        assert!(!edge.allowed_scopes.contains(&Cashier));
    }

    #[test]
    fn cancel_from_preparing_requires_justification_but_not_from_new() {
        let from_new = find_edge(New, Cancelled).expect("cancel from new must be defined");
        assert!(!from_new.requires_justification);

        let from_preparing = find_edge(Preparing, Cancelled).expect("cancel from preparing must be defined");
        assert!(from_preparing.requires_justification);
    }

    #[test]
    fn skip_kitchen_is_system_only() {
        let edge = find_edge(Queued, Ready).expect("skip_kitchen must be defined");
        assert_eq!(edge.action, Action::SkipKitchen);
        assert_eq!(edge.allowed_scopes, &[System]);
    }
}
