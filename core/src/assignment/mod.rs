//! AssignmentEngine — waiter/table assignment and transfer protocol (§4.5)

use crate::db::repository::assignment as assignment_repo;
use crate::db::repository::order as order_repo;
use crate::domain::{OrderStatus, TransferStatus, WaiterTableAssignment};
use shared::error::AppError;
use shared::util::snowflake_id;
use sqlx::PgPool;

pub struct AssignmentEngine;

#[derive(Debug, Clone)]
pub struct Conflict {
    pub table_id: i64,
    pub current_waiter_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct AssignResult {
    pub assigned: Vec<WaiterTableAssignment>,
    pub already_assigned: Vec<WaiterTableAssignment>,
    pub conflicts: Vec<Conflict>,
}

impl AssignmentEngine {
    /// `AssignTables(waiterID, tableIDs, force)`.
    pub async fn assign_tables(
        pool: &PgPool,
        waiter_id: i64,
        table_ids: &[i64],
        force: bool,
    ) -> Result<AssignResult, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
        let mut result = AssignResult::default();

        for &table_id in table_ids {
            let active = assignment_repo::lock_active_by_table(&mut tx, table_id).await?;

            match active {
                Some(existing) if existing.waiter_id == waiter_id => {
                    result.already_assigned.push(existing);
                }
                Some(existing) if force => {
                    assignment_repo::deactivate(&mut tx, existing.id).await?;
                    let created = assignment_repo::insert(&mut tx, snowflake_id(), waiter_id, table_id).await?;
                    result.assigned.push(created);
                }
                Some(existing) => {
                    result.conflicts.push(Conflict { table_id, current_waiter_id: existing.waiter_id });
                }
                None => {
                    let created = assignment_repo::insert(&mut tx, snowflake_id(), waiter_id, table_id).await?;
                    result.assigned.push(created);
                }
            }
        }

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
        Ok(result)
    }

    /// Best-effort assignment used by the auto-assign-on-accept path —
    /// errors are swallowed so a repository hiccup never aborts the order
    /// transition that triggered it.
    pub async fn assign_tables_best_effort(pool: &PgPool, waiter_id: i64, table_ids: &[i64]) {
        if let Err(err) = Self::assign_tables(pool, waiter_id, table_ids, false).await {
            tracing::warn!(error = %err, waiter_id, "best-effort table assignment failed");
        }
    }

    /// `CheckConflicts(waiterID, tableIDs)` — the conflicts a non-forced
    /// assign would produce, without writing.
    pub async fn check_conflicts(pool: &PgPool, waiter_id: i64, table_ids: &[i64]) -> Result<Vec<Conflict>, AppError> {
        let mut conn = pool.acquire().await.map_err(|e| AppError::database(e.to_string()))?;
        let mut conflicts = Vec::new();
        for &table_id in table_ids {
            if let Some(existing) = assignment_repo::find_active_by_table(&mut conn, table_id).await? {
                if existing.waiter_id != waiter_id {
                    conflicts.push(Conflict { table_id, current_waiter_id: existing.waiter_id });
                }
            }
        }
        Ok(conflicts)
    }

    pub async fn create_transfer(
        pool: &PgPool,
        from_waiter_id: i64,
        to_waiter_id: i64,
        table_id: i64,
        message: Option<&str>,
    ) -> Result<crate::domain::TableTransferRequest, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let active = assignment_repo::find_active_by_table(&mut tx, table_id)
            .await?
            .ok_or_else(|| AppError::not_found("active assignment for table"))?;
        if active.waiter_id != from_waiter_id {
            return Err(AppError::forbidden("table is not assigned to this waiter"));
        }

        let pending = assignment_repo::find_pending_transfers_for_waiter(&mut tx, to_waiter_id).await?;
        if pending.iter().any(|t| t.table_id == table_id) {
            return Err(AppError::conflict("a pending transfer for this table already exists"));
        }

        let transfer =
            assignment_repo::insert_transfer(&mut tx, snowflake_id(), table_id, from_waiter_id, to_waiter_id, None, message)
                .await?;

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
        Ok(transfer)
    }

    pub async fn accept_transfer(
        pool: &PgPool,
        request_id: i64,
        to_waiter_id: i64,
        transfer_orders: bool,
    ) -> Result<crate::domain::TableTransferRequest, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let transfer = assignment_repo::find_transfer_by_id(&mut tx, request_id)
            .await?
            .ok_or_else(|| AppError::not_found("transfer request"))?;
        if transfer.to_waiter_id != to_waiter_id {
            return Err(AppError::forbidden("only the target waiter may accept this transfer"));
        }
        if transfer.status != TransferStatus::Pending {
            return Err(AppError::conflict("transfer request is no longer pending"));
        }

        if let Some(active) = assignment_repo::find_active_by_table(&mut tx, transfer.table_id).await? {
            assignment_repo::deactivate(&mut tx, active.id).await?;
        }
        assignment_repo::insert(&mut tx, snowflake_id(), to_waiter_id, transfer.table_id).await?;

        if transfer_orders {
            let orders = order_repo::find_by_session_for_table(&mut tx, transfer.table_id).await?;
            for order in orders {
                if order.waiter_id == Some(transfer.from_waiter_id) && order.workflow_status.is_active() {
                    order_repo::repoint_waiter(&mut tx, order.id, to_waiter_id).await?;
                }
            }
        }

        let resolved = assignment_repo::resolve_transfer(&mut tx, request_id, TransferStatus::Accepted).await?;
        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
        Ok(resolved)
    }

    pub async fn reject_transfer(
        pool: &PgPool,
        request_id: i64,
        to_waiter_id: i64,
    ) -> Result<crate::domain::TableTransferRequest, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let transfer = assignment_repo::find_transfer_by_id(&mut tx, request_id)
            .await?
            .ok_or_else(|| AppError::not_found("transfer request"))?;
        if transfer.to_waiter_id != to_waiter_id {
            return Err(AppError::forbidden("only the target waiter may reject this transfer"));
        }
        if transfer.status != TransferStatus::Pending {
            return Err(AppError::conflict("transfer request is no longer pending"));
        }

        let resolved = assignment_repo::resolve_transfer(&mut tx, request_id, TransferStatus::Rejected).await?;
        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
        Ok(resolved)
    }

    /// Re-point every other `new` order of the same session to `waiter_id` —
    /// run as part of `accept_or_queue`'s auto-assign step.
    pub async fn repoint_sibling_new_orders(
        conn: &mut sqlx::PgConnection,
        session_id: i64,
        except_order_id: i64,
        waiter_id: i64,
    ) -> Result<(), AppError> {
        let orders = order_repo::find_by_session(conn, session_id).await?;
        for order in orders {
            if order.id != except_order_id && order.workflow_status == OrderStatus::New {
                order_repo::repoint_waiter(conn, order.id, waiter_id).await?;
            }
        }
        Ok(())
    }
}
