//! OrderModification repository — §3 OrderModification

use super::RepoResult;
use crate::domain::{ModificationInitiator, ModificationStatus, OrderModification};
use sqlx::PgConnection;

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<OrderModification>> {
    let modification =
        sqlx::query_as::<_, OrderModification>("SELECT * FROM order_modifications WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(modification)
}

pub async fn lock_for_update(conn: &mut PgConnection, id: i64) -> RepoResult<Option<OrderModification>> {
    let modification = sqlx::query_as::<_, OrderModification>(
        "SELECT * FROM order_modifications WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(modification)
}

pub async fn insert(
    conn: &mut PgConnection,
    id: i64,
    order_id: i64,
    initiator: ModificationInitiator,
    changes: serde_json::Value,
    reason: Option<&str>,
) -> RepoResult<OrderModification> {
    let modification = sqlx::query_as::<_, OrderModification>(
        r#"
        INSERT INTO order_modifications (id, order_id, initiator, status, changes, reason, created_at)
        VALUES ($1, $2, $3, 'pending', $4, $5, now())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(initiator)
    .bind(changes)
    .bind(reason)
    .fetch_one(conn)
    .await?;
    Ok(modification)
}

pub async fn resolve(
    conn: &mut PgConnection,
    id: i64,
    status: ModificationStatus,
    reviewer_employee_id: i64,
) -> RepoResult<OrderModification> {
    let modification = sqlx::query_as::<_, OrderModification>(
        r#"
        UPDATE order_modifications
        SET status = $2, reviewer_employee_id = $3, resolved_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(reviewer_employee_id)
    .fetch_one(conn)
    .await?;
    Ok(modification)
}
