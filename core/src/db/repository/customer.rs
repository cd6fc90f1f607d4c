//! Customer repository — manual row mapping, since [`shared::pii::EncryptedField`]
//! has no `sqlx::Type` (decryption requires the master key, which the
//! repository layer does not hold).

use super::RepoResult;
use crate::domain::Customer;
use shared::pii::EncryptedField;
use sqlx::PgConnection;
use sqlx::Row;

fn row_to_customer(row: sqlx::postgres::PgRow) -> Customer {
    Customer {
        id: row.get("id"),
        display_name: EncryptedField::from_parts(
            row.get("display_name_ciphertext"),
            row.get("display_name_hash"),
        ),
        email: EncryptedField::from_parts(row.get("email_ciphertext"), row.get("email_hash")),
        phone: match (
            row.try_get::<Option<String>, _>("phone_ciphertext").ok().flatten(),
            row.try_get::<Option<String>, _>("phone_hash").ok().flatten(),
        ) {
            (Some(ciphertext), Some(hash)) => Some(EncryptedField::from_parts(ciphertext, hash)),
            _ => None,
        },
        physical_description: row.get("physical_description"),
        avatar_ref: row.get("avatar_ref"),
        created_at: row.get("created_at"),
    }
}

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<Customer>> {
    let row = sqlx::query("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(row_to_customer))
}

/// Lookup by the normalized email hash, never by plaintext (§3 Customer).
pub async fn find_by_email_hash(conn: &mut PgConnection, hash: &str) -> RepoResult<Option<Customer>> {
    let row = sqlx::query("SELECT * FROM customers WHERE email_hash = $1")
        .bind(hash)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(row_to_customer))
}

pub async fn insert(
    conn: &mut PgConnection,
    id: i64,
    display_name: &EncryptedField,
    email: &EncryptedField,
    phone: Option<&EncryptedField>,
) -> RepoResult<Customer> {
    let row = sqlx::query(
        r#"
        INSERT INTO customers
            (id, display_name_ciphertext, display_name_hash, email_ciphertext, email_hash,
             phone_ciphertext, phone_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(display_name.ciphertext())
    .bind(display_name.normalized_hash())
    .bind(email.ciphertext())
    .bind(email.normalized_hash())
    .bind(phone.map(|p| p.ciphertext()))
    .bind(phone.map(|p| p.normalized_hash()))
    .fetch_one(conn)
    .await?;
    Ok(row_to_customer(row))
}

pub async fn update_email(
    conn: &mut PgConnection,
    customer_id: i64,
    email: &EncryptedField,
) -> RepoResult<()> {
    sqlx::query("UPDATE customers SET email_ciphertext = $2, email_hash = $3 WHERE id = $1")
        .bind(customer_id)
        .bind(email.ciphertext())
        .bind(email.normalized_hash())
        .execute(conn)
        .await?;
    Ok(())
}
