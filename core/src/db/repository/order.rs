//! Order repository — Order, OrderItem, OrderItemModifier, and the
//! append-only OrderHistoryEntry (§3, transition table in §4.1).

use super::RepoResult;
use crate::domain::{Order, OrderHistoryEntry, OrderItem, OrderItemModifier, OrderStatus, PaymentStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Lock the order row for the duration of the caller's transaction — every
/// `Transition` call acquires this before validating and applying a move
/// (§4.1 "Row locking").
pub async fn lock_for_update(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Orders belonging to any session currently seated at `table_id` — used by
/// the transfer workflow's "re-point active orders" step (§4.5).
pub async fn find_by_session_for_table(conn: &mut PgConnection, table_id: i64) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
        SELECT o.* FROM orders o
        JOIN dining_sessions s ON s.id = o.session_id
        WHERE s.table_id = $1
        ORDER BY o.created_at
        "#,
    )
    .bind(table_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

pub async fn find_by_session(conn: &mut PgConnection, session_id: i64) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE session_id = $1 ORDER BY created_at",
    )
    .bind(session_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

pub async fn insert(
    conn: &mut PgConnection,
    id: i64,
    session_id: i64,
    customer_id: i64,
    notes: &str,
) -> RepoResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders
            (id, session_id, customer_id, workflow_status, payment_status,
             subtotal, tax_amount, tip_amount, total_amount, notes, created_at)
        VALUES ($1, $2, $3, 'new', 'unpaid', 0, 0, 0, 0, $4, now())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(session_id)
    .bind(customer_id)
    .bind(notes)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn insert_item(
    conn: &mut PgConnection,
    id: i64,
    order_id: i64,
    menu_item_id: i64,
    quantity: i32,
    unit_price: Decimal,
    special_instructions: Option<&str>,
    is_quick_serve: bool,
) -> RepoResult<OrderItem> {
    let item = sqlx::query_as::<_, OrderItem>(
        r#"
        INSERT INTO order_items
            (id, order_id, menu_item_id, quantity, unit_price, special_instructions,
             delivered_quantity, is_fully_delivered, is_quick_serve)
        VALUES ($1, $2, $3, $4, $5, $6, 0, false, $7)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(menu_item_id)
    .bind(quantity)
    .bind(unit_price)
    .bind(special_instructions)
    .bind(is_quick_serve)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn insert_item_modifier(
    conn: &mut PgConnection,
    id: i64,
    order_item_id: i64,
    modifier_id: i64,
    quantity: i32,
    unit_price_adjustment: Decimal,
) -> RepoResult<OrderItemModifier> {
    let modifier = sqlx::query_as::<_, OrderItemModifier>(
        r#"
        INSERT INTO order_item_modifiers (id, order_item_id, modifier_id, quantity, unit_price_adjustment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(order_item_id)
    .bind(modifier_id)
    .bind(quantity)
    .bind(unit_price_adjustment)
    .fetch_one(conn)
    .await?;
    Ok(modifier)
}

pub async fn find_items(conn: &mut PgConnection, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

pub async fn delete_item(conn: &mut PgConnection, item_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM order_item_modifiers WHERE order_item_id = $1")
        .bind(item_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM order_items WHERE id = $1")
        .bind(item_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_item(
    conn: &mut PgConnection,
    item_id: i64,
    quantity: i32,
    special_instructions: Option<&str>,
) -> RepoResult<OrderItem> {
    let item = sqlx::query_as::<_, OrderItem>(
        "UPDATE order_items SET quantity = $2, special_instructions = $3 WHERE id = $1 RETURNING *",
    )
    .bind(item_id)
    .bind(quantity)
    .bind(special_instructions)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn find_item_modifiers(
    conn: &mut PgConnection,
    order_item_id: i64,
) -> RepoResult<Vec<OrderItemModifier>> {
    let modifiers = sqlx::query_as::<_, OrderItemModifier>(
        "SELECT * FROM order_item_modifiers WHERE order_item_id = $1 ORDER BY id",
    )
    .bind(order_item_id)
    .fetch_all(conn)
    .await?;
    Ok(modifiers)
}

pub async fn update_totals(
    conn: &mut PgConnection,
    order_id: i64,
    subtotal: Decimal,
    tax_amount: Decimal,
) -> RepoResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET subtotal = $2, tax_amount = $3, total_amount = $2 + $3 + tip_amount
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(subtotal)
    .bind(tax_amount)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Apply a workflow status move and append the corresponding history entry
/// in the same transaction (invariant #3: last history entry always matches
/// `workflow_status`).
#[allow(clippy::too_many_arguments)]
pub async fn apply_transition(
    conn: &mut PgConnection,
    order_id: i64,
    new_status: OrderStatus,
    waiter_id: Option<i64>,
    chef_id: Option<i64>,
    actor_employee_id: Option<i64>,
    timestamp_column: Option<&str>,
) -> RepoResult<Order> {
    let order = if let Some(column) = timestamp_column {
        let query = format!(
            r#"
            UPDATE orders
            SET workflow_status = $2,
                waiter_id = COALESCE($3, waiter_id),
                chef_id = COALESCE($4, chef_id),
                {column} = now()
            WHERE id = $1
            RETURNING *
            "#
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(new_status)
            .bind(waiter_id)
            .bind(chef_id)
            .fetch_one(&mut *conn)
            .await?
    } else {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET workflow_status = $2,
                waiter_id = COALESCE($3, waiter_id),
                chef_id = COALESCE($4, chef_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(new_status)
        .bind(waiter_id)
        .bind(chef_id)
        .fetch_one(&mut *conn)
        .await?
    };

    append_history(conn, order_id, new_status, actor_employee_id).await?;
    Ok(order)
}

pub async fn append_history(
    conn: &mut PgConnection,
    order_id: i64,
    status: OrderStatus,
    actor_employee_id: Option<i64>,
) -> RepoResult<OrderHistoryEntry> {
    let entry = sqlx::query_as::<_, OrderHistoryEntry>(
        r#"
        INSERT INTO order_history (order_id, seq, status, actor_employee_id, created_at)
        VALUES (
            $1,
            COALESCE((SELECT MAX(seq) FROM order_history WHERE order_id = $1), 0) + 1,
            $2, $3, now()
        )
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(status)
    .bind(actor_employee_id)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

pub async fn find_history(conn: &mut PgConnection, order_id: i64) -> RepoResult<Vec<OrderHistoryEntry>> {
    let entries = sqlx::query_as::<_, OrderHistoryEntry>(
        "SELECT * FROM order_history WHERE order_id = $1 ORDER BY seq",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}

pub async fn mark_item_delivered(
    conn: &mut PgConnection,
    item_id: i64,
    delivered_quantity: i32,
    is_fully_delivered: bool,
    delivered_by_employee_id: i64,
    now: DateTime<Utc>,
) -> RepoResult<OrderItem> {
    let item = sqlx::query_as::<_, OrderItem>(
        r#"
        UPDATE order_items
        SET delivered_quantity = $2, is_fully_delivered = $3,
            delivered_by_employee_id = $4, delivered_at = $5
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(item_id)
    .bind(delivered_quantity)
    .bind(is_fully_delivered)
    .bind(delivered_by_employee_id)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn set_payment_status(
    conn: &mut PgConnection,
    order_id: i64,
    payment_status: PaymentStatus,
) -> RepoResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET payment_status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(payment_status)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

#[allow(clippy::too_many_arguments)]
pub async fn finalize_payment(
    conn: &mut PgConnection,
    order_id: i64,
    payment_method: crate::domain::PaymentMethod,
    payment_reference: Option<&str>,
    payment_meta: Option<serde_json::Value>,
) -> RepoResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET workflow_status = 'paid', payment_status = 'paid',
            payment_method = $2, payment_reference = $3, payment_meta = $4, paid_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(payment_method)
    .bind(payment_reference)
    .bind(payment_meta)
    .fetch_one(conn)
    .await?;
    append_history(conn, order_id, OrderStatus::Paid, None).await?;
    Ok(order)
}

pub async fn repoint_waiter(
    conn: &mut PgConnection,
    order_id: i64,
    waiter_id: i64,
) -> RepoResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET waiter_id = $2 WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(waiter_id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}
