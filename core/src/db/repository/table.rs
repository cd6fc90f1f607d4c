//! Table repository — §3 Table, row-locking for session get-or-create (§4.2)

use super::RepoResult;
use crate::domain::Table;
use sqlx::PgConnection;

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Table>> {
    let table = sqlx::query_as::<_, Table>("SELECT * FROM tables WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(table)
}

pub async fn find_by_code(conn: &mut PgConnection, code: &str) -> RepoResult<Option<Table>> {
    let table = sqlx::query_as::<_, Table>("SELECT * FROM tables WHERE code = $1")
        .bind(code)
        .fetch_optional(conn)
        .await?;
    Ok(table)
}

/// Lock the table row for the duration of the caller's transaction —
/// serializes concurrent session-creation attempts against the same table
/// (§4.2, §5 locking discipline).
pub async fn lock_for_update(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Table>> {
    let table = sqlx::query_as::<_, Table>("SELECT * FROM tables WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(table)
}

pub async fn set_status(
    conn: &mut PgConnection,
    id: i64,
    status: crate::domain::table::TableStatus,
) -> RepoResult<()> {
    sqlx::query("UPDATE tables SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
