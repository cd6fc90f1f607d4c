//! WaiterTableAssignment and TableTransferRequest repository — §3, §4.5

use super::RepoResult;
use crate::domain::{TableTransferRequest, TransferStatus, WaiterTableAssignment};
use sqlx::PgConnection;

pub async fn find_active_by_table(
    conn: &mut PgConnection,
    table_id: i64,
) -> RepoResult<Option<WaiterTableAssignment>> {
    let assignment = sqlx::query_as::<_, WaiterTableAssignment>(
        "SELECT * FROM waiter_table_assignments WHERE table_id = $1 AND is_active = true",
    )
    .bind(table_id)
    .fetch_optional(conn)
    .await?;
    Ok(assignment)
}

pub async fn find_active_by_waiter(
    conn: &mut PgConnection,
    waiter_id: i64,
) -> RepoResult<Vec<WaiterTableAssignment>> {
    let assignments = sqlx::query_as::<_, WaiterTableAssignment>(
        "SELECT * FROM waiter_table_assignments WHERE waiter_id = $1 AND is_active = true",
    )
    .bind(waiter_id)
    .fetch_all(conn)
    .await?;
    Ok(assignments)
}

/// Lock a table's active-assignment row (if any) — callers serialize
/// concurrent `AssignTables`/`AcceptTransfer` calls against the same table.
pub async fn lock_active_by_table(
    conn: &mut PgConnection,
    table_id: i64,
) -> RepoResult<Option<WaiterTableAssignment>> {
    let assignment = sqlx::query_as::<_, WaiterTableAssignment>(
        "SELECT * FROM waiter_table_assignments WHERE table_id = $1 AND is_active = true FOR UPDATE",
    )
    .bind(table_id)
    .fetch_optional(conn)
    .await?;
    Ok(assignment)
}

pub async fn deactivate(conn: &mut PgConnection, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE waiter_table_assignments SET is_active = false, unassigned_at = now() WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert(
    conn: &mut PgConnection,
    id: i64,
    waiter_id: i64,
    table_id: i64,
) -> RepoResult<WaiterTableAssignment> {
    let assignment = sqlx::query_as::<_, WaiterTableAssignment>(
        r#"
        INSERT INTO waiter_table_assignments (id, waiter_id, table_id, is_active, assigned_at)
        VALUES ($1, $2, $3, true, now())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(waiter_id)
    .bind(table_id)
    .fetch_one(conn)
    .await?;
    Ok(assignment)
}

pub async fn find_transfer_by_id(
    conn: &mut PgConnection,
    id: i64,
) -> RepoResult<Option<TableTransferRequest>> {
    let transfer = sqlx::query_as::<_, TableTransferRequest>(
        "SELECT * FROM table_transfer_requests WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(transfer)
}

pub async fn find_pending_transfers_for_waiter(
    conn: &mut PgConnection,
    to_waiter_id: i64,
) -> RepoResult<Vec<TableTransferRequest>> {
    let transfers = sqlx::query_as::<_, TableTransferRequest>(
        "SELECT * FROM table_transfer_requests WHERE to_waiter_id = $1 AND status = 'pending' ORDER BY created_at",
    )
    .bind(to_waiter_id)
    .fetch_all(conn)
    .await?;
    Ok(transfers)
}

pub async fn insert_transfer(
    conn: &mut PgConnection,
    id: i64,
    table_id: i64,
    from_waiter_id: i64,
    to_waiter_id: i64,
    transfer_orders: Option<bool>,
    message: Option<&str>,
) -> RepoResult<TableTransferRequest> {
    let transfer = sqlx::query_as::<_, TableTransferRequest>(
        r#"
        INSERT INTO table_transfer_requests
            (id, table_id, from_waiter_id, to_waiter_id, status, transfer_orders, message, created_at)
        VALUES ($1, $2, $3, $4, 'pending', $5, $6, now())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(table_id)
    .bind(from_waiter_id)
    .bind(to_waiter_id)
    .bind(transfer_orders)
    .bind(message)
    .fetch_one(conn)
    .await?;
    Ok(transfer)
}

pub async fn resolve_transfer(
    conn: &mut PgConnection,
    id: i64,
    status: TransferStatus,
) -> RepoResult<TableTransferRequest> {
    let transfer = sqlx::query_as::<_, TableTransferRequest>(
        "UPDATE table_transfer_requests SET status = $2, resolved_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_one(conn)
    .await?;
    Ok(transfer)
}
