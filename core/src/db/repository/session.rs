//! DiningSession repository — §3 DiningSession, get-or-create in §4.2

use super::RepoResult;
use crate::domain::{DiningSession, PaymentMethod, SessionStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<DiningSession>> {
    let session = sqlx::query_as::<_, DiningSession>("SELECT * FROM dining_sessions WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(session)
}

pub async fn lock_for_update(conn: &mut PgConnection, id: i64) -> RepoResult<Option<DiningSession>> {
    let session =
        sqlx::query_as::<_, DiningSession>("SELECT * FROM dining_sessions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(session)
}

/// Any open session for the given table — step 2 of the get-or-create
/// resolution order.
pub async fn find_open_by_table(
    conn: &mut PgConnection,
    table_id: i64,
) -> RepoResult<Option<DiningSession>> {
    let session = sqlx::query_as::<_, DiningSession>(
        "SELECT * FROM dining_sessions WHERE table_id = $1 AND status = 'open'",
    )
    .bind(table_id)
    .fetch_optional(conn)
    .await?;
    Ok(session)
}

/// Any open session for the given customer — step 3 of the get-or-create
/// resolution order (no table resolved).
pub async fn find_open_by_customer(
    conn: &mut PgConnection,
    customer_id: i64,
) -> RepoResult<Option<DiningSession>> {
    let session = sqlx::query_as::<_, DiningSession>(
        "SELECT * FROM dining_sessions WHERE customer_id = $1 AND status = 'open' AND table_id IS NULL",
    )
    .bind(customer_id)
    .fetch_optional(conn)
    .await?;
    Ok(session)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_open(
    conn: &mut PgConnection,
    id: i64,
    customer_id: i64,
    table_id: Option<i64>,
    table_code: Option<&str>,
    expires_at: DateTime<Utc>,
) -> RepoResult<DiningSession> {
    let session = sqlx::query_as::<_, DiningSession>(
        r#"
        INSERT INTO dining_sessions
            (id, customer_id, table_id, table_code, status, opened_at, expires_at,
             subtotal, tax_amount, tip_amount, total_amount, total_paid)
        VALUES ($1, $2, $3, $4, 'open', now(), $5, 0, 0, 0, 0, 0)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(customer_id)
    .bind(table_id)
    .bind(table_code)
    .bind(expires_at)
    .fetch_one(conn)
    .await?;
    Ok(session)
}

/// Recompute totals from non-cancelled child orders (§4.2 RecomputeTotals).
/// Leaves `tip_amount` untouched, per the spec and the "tip reset on cancel"
/// design decision in DESIGN.md.
pub async fn recompute_totals(conn: &mut PgConnection, session_id: i64) -> RepoResult<DiningSession> {
    let (subtotal, tax_amount): (Decimal, Decimal) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(subtotal), 0), COALESCE(SUM(tax_amount), 0)
        FROM orders
        WHERE session_id = $1 AND workflow_status != 'cancelled'
        "#,
    )
    .bind(session_id)
    .fetch_one(&mut *conn)
    .await?;

    let session = sqlx::query_as::<_, DiningSession>(
        r#"
        UPDATE dining_sessions
        SET subtotal = $2, tax_amount = $3, total_amount = $2 + $3 + tip_amount
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(session_id)
    .bind(subtotal)
    .bind(tax_amount)
    .fetch_one(conn)
    .await?;
    Ok(session)
}

pub async fn set_status(
    conn: &mut PgConnection,
    session_id: i64,
    status: SessionStatus,
) -> RepoResult<DiningSession> {
    let session = sqlx::query_as::<_, DiningSession>(
        "UPDATE dining_sessions SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(session_id)
    .bind(status)
    .fetch_one(conn)
    .await?;
    Ok(session)
}

/// Close a session in place (used both by expiry sweeps and by settlement),
/// zeroing the monetary fields — matches the "all children cancelled" design
/// decision in DESIGN.md.
pub async fn close_zeroed(conn: &mut PgConnection, session_id: i64) -> RepoResult<DiningSession> {
    let session = sqlx::query_as::<_, DiningSession>(
        r#"
        UPDATE dining_sessions
        SET status = 'closed', closed_at = now(),
            subtotal = 0, tax_amount = 0, tip_amount = 0, total_amount = 0
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(session_id)
    .fetch_one(conn)
    .await?;
    Ok(session)
}

#[allow(clippy::too_many_arguments)]
pub async fn apply_tip(
    conn: &mut PgConnection,
    session_id: i64,
    tip_amount: Decimal,
) -> RepoResult<DiningSession> {
    let session = sqlx::query_as::<_, DiningSession>(
        r#"
        UPDATE dining_sessions
        SET tip_amount = $2, tip_confirmed_at = now(), status = 'awaiting_payment',
            total_amount = subtotal + tax_amount + $2
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(session_id)
    .bind(tip_amount)
    .fetch_one(conn)
    .await?;
    Ok(session)
}

pub async fn request_check(conn: &mut PgConnection, session_id: i64) -> RepoResult<DiningSession> {
    let session = sqlx::query_as::<_, DiningSession>(
        r#"
        UPDATE dining_sessions
        SET check_requested_at = now(), tip_requested_at = now(), status = 'awaiting_tip'
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(session_id)
    .fetch_one(conn)
    .await?;
    Ok(session)
}

#[allow(clippy::too_many_arguments)]
pub async fn finalize_payment(
    conn: &mut PgConnection,
    session_id: i64,
    method: PaymentMethod,
    reference: Option<&str>,
    status: SessionStatus,
    total_paid: Decimal,
) -> RepoResult<DiningSession> {
    let closed_at_sql = if status == SessionStatus::Paid {
        "closed_at = now(),"
    } else {
        ""
    };
    let query = format!(
        r#"
        UPDATE dining_sessions
        SET payment_method = $2, payment_reference = $3, total_paid = $4,
            status = $5, {closed_at_sql}
            total_amount = total_amount
        WHERE id = $1
        RETURNING *
        "#
    );
    let session = sqlx::query_as::<_, DiningSession>(&query)
        .bind(session_id)
        .bind(method)
        .bind(reference)
        .bind(total_paid)
        .bind(status)
        .fetch_one(conn)
        .await?;
    Ok(session)
}

/// Sessions whose `expires_at` has passed while still `open` — used by the
/// TTL sweep invoked on touch (§4.2 "TTL and expiration").
pub async fn find_expired_open(
    conn: &mut PgConnection,
    now: DateTime<Utc>,
) -> RepoResult<Vec<DiningSession>> {
    let sessions = sqlx::query_as::<_, DiningSession>(
        "SELECT * FROM dining_sessions WHERE status = 'open' AND expires_at <= $1",
    )
    .bind(now)
    .fetch_all(conn)
    .await?;
    Ok(sessions)
}
