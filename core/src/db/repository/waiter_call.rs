//! WaiterCall repository — §3 WaiterCall

use super::RepoResult;
use crate::domain::{WaiterCall, WaiterCallStatus};
use sqlx::PgConnection;

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<WaiterCall>> {
    let call = sqlx::query_as::<_, WaiterCall>("SELECT * FROM waiter_calls WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(call)
}

pub async fn find_pending_by_session(
    conn: &mut PgConnection,
    session_id: i64,
) -> RepoResult<Vec<WaiterCall>> {
    let calls = sqlx::query_as::<_, WaiterCall>(
        "SELECT * FROM waiter_calls WHERE session_id = $1 AND status = 'pending' ORDER BY created_at",
    )
    .bind(session_id)
    .fetch_all(conn)
    .await?;
    Ok(calls)
}

pub async fn find_pending_all(conn: &mut PgConnection) -> RepoResult<Vec<WaiterCall>> {
    let calls = sqlx::query_as::<_, WaiterCall>(
        "SELECT * FROM waiter_calls WHERE status = 'pending' ORDER BY created_at",
    )
    .fetch_all(conn)
    .await?;
    Ok(calls)
}

pub async fn insert(
    conn: &mut PgConnection,
    id: i64,
    session_id: i64,
    table_code: &str,
    note: &str,
) -> RepoResult<WaiterCall> {
    let call = sqlx::query_as::<_, WaiterCall>(
        r#"
        INSERT INTO waiter_calls (id, session_id, table_code, status, note, created_at)
        VALUES ($1, $2, $3, 'pending', $4, now())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(session_id)
    .bind(table_code)
    .bind(note)
    .fetch_one(conn)
    .await?;
    Ok(call)
}

pub async fn set_status(
    conn: &mut PgConnection,
    id: i64,
    status: WaiterCallStatus,
    confirmed_by_employee_id: Option<i64>,
) -> RepoResult<WaiterCall> {
    let call = sqlx::query_as::<_, WaiterCall>(
        "UPDATE waiter_calls SET status = $2, confirmed_by_employee_id = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .bind(confirmed_by_employee_id)
    .fetch_one(conn)
    .await?;
    Ok(call)
}
