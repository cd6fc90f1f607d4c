//! Employee repository — manual row mapping (PII fields, same reasoning as
//! the customer repository).

use super::RepoResult;
use crate::domain::Employee;
use crate::domain::employee::Role;
use chrono::{DateTime, Utc};
use shared::pii::EncryptedField;
use shared::scope::Scope;
use sqlx::PgConnection;
use sqlx::Row;

fn row_to_employee(row: sqlx::postgres::PgRow) -> Employee {
    let additional_roles: Vec<String> = row.get("additional_roles");
    let allowed_scopes: Vec<String> = row.get("allowed_scopes");
    let preferences: serde_json::Value = row.get("preferences");

    Employee {
        id: row.get("id"),
        display_name: EncryptedField::from_parts(
            row.get("display_name_ciphertext"),
            row.get("display_name_hash"),
        ),
        email: EncryptedField::from_parts(row.get("email_ciphertext"), row.get("email_hash")),
        credential_hash: row.get("credential_hash"),
        primary_role: parse_role(row.get::<String, _>("primary_role").as_str()),
        additional_roles: additional_roles.iter().map(|r| parse_role(r)).collect(),
        is_active: row.get("is_active"),
        allowed_scopes: allowed_scopes.iter().filter_map(|s| Scope::parse(s)).collect(),
        signed_in_at: row.get("signed_in_at"),
        last_activity_at: row.get("last_activity_at"),
        preferences: preferences
            .as_object()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default(),
    }
}

fn parse_role(s: &str) -> Role {
    match s {
        "waiter" => Role::Waiter,
        "chef" => Role::Chef,
        "cashier" => Role::Cashier,
        "admin" => Role::Admin,
        other => panic!("unknown role stored in database: {other}"),
    }
}

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Employee>> {
    let row = sqlx::query("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(row_to_employee))
}

pub async fn find_by_email_hash(conn: &mut PgConnection, hash: &str) -> RepoResult<Option<Employee>> {
    let row = sqlx::query("SELECT * FROM employees WHERE email_hash = $1")
        .bind(hash)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(row_to_employee))
}

pub async fn find_active_waiters(conn: &mut PgConnection) -> RepoResult<Vec<Employee>> {
    let rows = sqlx::query(
        "SELECT * FROM employees WHERE is_active = true AND (primary_role = 'waiter' OR 'waiter' = ANY(additional_roles))",
    )
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(row_to_employee).collect())
}

pub async fn mark_activity(
    conn: &mut PgConnection,
    employee_id: i64,
    now: DateTime<Utc>,
) -> RepoResult<()> {
    sqlx::query("UPDATE employees SET last_activity_at = $2 WHERE id = $1")
        .bind(employee_id)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn set_signed_in(
    conn: &mut PgConnection,
    employee_id: i64,
    signed_in_at: Option<DateTime<Utc>>,
) -> RepoResult<()> {
    sqlx::query("UPDATE employees SET signed_in_at = $2, last_activity_at = $2 WHERE id = $1")
        .bind(employee_id)
        .bind(signed_in_at)
        .execute(conn)
        .await?;
    Ok(())
}
