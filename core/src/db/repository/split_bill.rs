//! SplitBill / SplitPerson / SplitAssignment repository — §3, §4.4

use super::RepoResult;
use crate::domain::{SplitAssignment, SplitBill, SplitPerson, SplitPersonPaymentStatus, SplitStatus, SplitType};
use rust_decimal::Decimal;
use sqlx::PgConnection;

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> RepoResult<Option<SplitBill>> {
    let split = sqlx::query_as::<_, SplitBill>("SELECT * FROM split_bills WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(split)
}

pub async fn lock_for_update(conn: &mut PgConnection, id: i64) -> RepoResult<Option<SplitBill>> {
    let split = sqlx::query_as::<_, SplitBill>("SELECT * FROM split_bills WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(split)
}

pub async fn find_active_by_session(
    conn: &mut PgConnection,
    session_id: i64,
) -> RepoResult<Option<SplitBill>> {
    let split = sqlx::query_as::<_, SplitBill>(
        "SELECT * FROM split_bills WHERE session_id = $1 AND status = 'active'",
    )
    .bind(session_id)
    .fetch_optional(conn)
    .await?;
    Ok(split)
}

pub async fn insert(
    conn: &mut PgConnection,
    id: i64,
    session_id: i64,
    split_type: SplitType,
    number_of_people: i32,
) -> RepoResult<SplitBill> {
    let split = sqlx::query_as::<_, SplitBill>(
        r#"
        INSERT INTO split_bills (id, session_id, split_type, status, number_of_people, created_at)
        VALUES ($1, $2, $3, 'active', $4, now())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(session_id)
    .bind(split_type)
    .bind(number_of_people)
    .fetch_one(conn)
    .await?;
    Ok(split)
}

pub async fn set_status(conn: &mut PgConnection, id: i64, status: SplitStatus) -> RepoResult<SplitBill> {
    let split = sqlx::query_as::<_, SplitBill>(
        "UPDATE split_bills SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_one(conn)
    .await?;
    Ok(split)
}

pub async fn insert_person(
    conn: &mut PgConnection,
    id: i64,
    split_id: i64,
    label: &str,
) -> RepoResult<SplitPerson> {
    let person = sqlx::query_as::<_, SplitPerson>(
        r#"
        INSERT INTO split_persons
            (id, split_id, label, subtotal, tax_amount, tip_amount, total_amount, payment_status)
        VALUES ($1, $2, $3, 0, 0, 0, 0, 'unpaid')
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(split_id)
    .bind(label)
    .fetch_one(conn)
    .await?;
    Ok(person)
}

pub async fn find_persons(conn: &mut PgConnection, split_id: i64) -> RepoResult<Vec<SplitPerson>> {
    let persons = sqlx::query_as::<_, SplitPerson>(
        "SELECT * FROM split_persons WHERE split_id = $1 ORDER BY id",
    )
    .bind(split_id)
    .fetch_all(conn)
    .await?;
    Ok(persons)
}

pub async fn lock_person_for_update(
    conn: &mut PgConnection,
    id: i64,
) -> RepoResult<Option<SplitPerson>> {
    let person = sqlx::query_as::<_, SplitPerson>(
        "SELECT * FROM split_persons WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(person)
}

pub async fn update_person_amounts(
    conn: &mut PgConnection,
    id: i64,
    subtotal: Decimal,
    tax_amount: Decimal,
    tip_amount: Decimal,
) -> RepoResult<SplitPerson> {
    let person = sqlx::query_as::<_, SplitPerson>(
        r#"
        UPDATE split_persons
        SET subtotal = $2, tax_amount = $3, tip_amount = $4, total_amount = $2 + $3 + $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(subtotal)
    .bind(tax_amount)
    .bind(tip_amount)
    .fetch_one(conn)
    .await?;
    Ok(person)
}

#[allow(clippy::too_many_arguments)]
pub async fn mark_person_paid(
    conn: &mut PgConnection,
    id: i64,
    payment_method: crate::domain::PaymentMethod,
    payment_reference: Option<&str>,
) -> RepoResult<SplitPerson> {
    let person = sqlx::query_as::<_, SplitPerson>(
        r#"
        UPDATE split_persons
        SET payment_status = $2, payment_method = $3, payment_reference = $4, paid_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(SplitPersonPaymentStatus::Paid)
    .bind(payment_method)
    .bind(payment_reference)
    .fetch_one(conn)
    .await?;
    Ok(person)
}

pub async fn insert_assignment(
    conn: &mut PgConnection,
    id: i64,
    split_id: i64,
    person_id: i64,
    order_item_id: i64,
    quantity_portion: Decimal,
    amount: Decimal,
) -> RepoResult<SplitAssignment> {
    let assignment = sqlx::query_as::<_, SplitAssignment>(
        r#"
        INSERT INTO split_assignments (id, split_id, person_id, order_item_id, quantity_portion, amount)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(split_id)
    .bind(person_id)
    .bind(order_item_id)
    .bind(quantity_portion)
    .bind(amount)
    .fetch_one(conn)
    .await?;
    Ok(assignment)
}

pub async fn find_assignments(conn: &mut PgConnection, split_id: i64) -> RepoResult<Vec<SplitAssignment>> {
    let assignments = sqlx::query_as::<_, SplitAssignment>(
        "SELECT * FROM split_assignments WHERE split_id = $1",
    )
    .bind(split_id)
    .fetch_all(conn)
    .await?;
    Ok(assignments)
}

pub async fn delete_assignments_for_person(conn: &mut PgConnection, person_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM split_assignments WHERE person_id = $1")
        .bind(person_id)
        .execute(conn)
        .await?;
    Ok(())
}
