//! Area repository — §3 Area

use super::RepoResult;
use crate::domain::Area;
use sqlx::PgConnection;

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Area>> {
    let area = sqlx::query_as::<_, Area>("SELECT * FROM areas WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(area)
}

pub async fn find_all_active(conn: &mut PgConnection) -> RepoResult<Vec<Area>> {
    let areas = sqlx::query_as::<_, Area>("SELECT * FROM areas WHERE is_active = true ORDER BY name")
        .fetch_all(conn)
        .await?;
    Ok(areas)
}
