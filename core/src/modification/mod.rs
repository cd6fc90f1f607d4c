//! ModificationEngine — propose, approve, and reject in-flight changes to an
//! order's line items (§3 OrderModification, §4.6 event contract).
//!
//! Approval folds straight into application: the spec's event contract lists
//! only `requested`/`approved`/`rejected`, so there is no separate "apply"
//! moment a consumer needs to observe — approving a modification is the
//! single point where its `items_to_add`/`items_to_remove`/`items_to_update`
//! are applied to the order and its status becomes `applied`.

use crate::config::Config;
use crate::db::repository::modification as modification_repo;
use crate::db::repository::order as order_repo;
use crate::domain::{ModificationInitiator, ModificationStatus, Order, OrderModification};
use crate::realtime::{bus::RealtimeBus, events};
use crate::sessions::SessionCoordinator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::util::snowflake_id;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemToAdd {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub special_instructions: Option<String>,
    pub is_quick_serve: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemToUpdate {
    pub order_item_id: i64,
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

/// The changes payload, serialized verbatim into `order_modifications.changes`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModificationChanges {
    #[serde(default)]
    pub items_to_add: Vec<ItemToAdd>,
    #[serde(default)]
    pub items_to_remove: Vec<i64>,
    #[serde(default)]
    pub items_to_update: Vec<ItemToUpdate>,
}

pub struct ModificationEngine;

impl ModificationEngine {
    /// `RequestModification(orderID, initiator, changes, reason)`.
    pub async fn request(
        pool: &PgPool,
        order_id: i64,
        initiator: ModificationInitiator,
        changes: ModificationChanges,
        reason: Option<&str>,
        bus: &RealtimeBus,
    ) -> Result<OrderModification, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let order = order_repo::find_by_id(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("order"))?;
        if order.workflow_status.is_terminal() {
            return Err(AppError::conflict("order is in a terminal status"));
        }

        let changes_json = serde_json::to_value(&changes)
            .map_err(|e| AppError::internal(format!("failed to serialize changes: {e}")))?;
        let modification = modification_repo::insert(
            &mut tx,
            snowflake_id(),
            order_id,
            initiator,
            changes_json.clone(),
            reason,
        )
        .await?;

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, payload) = events::modification(
            events::EventType::ModificationRequested,
            modification.id,
            order_id,
            order.session_id,
            changes_json,
        );
        bus.publish(event_type, payload).await;

        Ok(modification)
    }

    /// `ApproveModification(modificationID, reviewerID)` — applies the
    /// changes payload to the order's line items and recomputes totals.
    pub async fn approve(
        pool: &PgPool,
        modification_id: i64,
        reviewer_employee_id: i64,
        config: &Config,
        bus: &RealtimeBus,
    ) -> Result<OrderModification, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let modification = modification_repo::lock_for_update(&mut tx, modification_id)
            .await?
            .ok_or_else(|| AppError::not_found("modification"))?;
        if modification.status != ModificationStatus::Pending {
            return Err(AppError::conflict("modification is no longer pending"));
        }

        let order = order_repo::lock_for_update(&mut tx, modification.order_id)
            .await?
            .ok_or_else(|| AppError::not_found("order"))?;
        if order.workflow_status.is_terminal() {
            return Err(AppError::conflict("order is in a terminal status"));
        }

        let changes: ModificationChanges = serde_json::from_value(modification.changes.clone())
            .map_err(|e| AppError::internal(format!("malformed changes payload: {e}")))?;

        for item_id in &changes.items_to_remove {
            order_repo::delete_item(&mut tx, *item_id).await?;
        }
        for update in &changes.items_to_update {
            order_repo::update_item(
                &mut tx,
                update.order_item_id,
                update.quantity,
                update.special_instructions.as_deref(),
            )
            .await?;
        }
        for add in &changes.items_to_add {
            order_repo::insert_item(
                &mut tx,
                snowflake_id(),
                order.id,
                add.menu_item_id,
                add.quantity,
                add.unit_price,
                add.special_instructions.as_deref(),
                add.is_quick_serve,
            )
            .await?;
        }

        recompute_order_totals(&mut tx, &order, config).await?;
        SessionCoordinator::recompute_totals(&mut tx, order.session_id).await?;

        let resolved =
            modification_repo::resolve(&mut tx, modification_id, ModificationStatus::Applied, reviewer_employee_id)
                .await?;

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, payload) = events::modification(
            events::EventType::ModificationApproved,
            resolved.id,
            resolved.order_id,
            order.session_id,
            resolved.changes.clone(),
        );
        bus.publish(event_type, payload).await;

        Ok(resolved)
    }

    /// `RejectModification(modificationID, reviewerID)` — no mutation to the
    /// order, only the modification's own status.
    pub async fn reject(
        pool: &PgPool,
        modification_id: i64,
        reviewer_employee_id: i64,
        bus: &RealtimeBus,
    ) -> Result<OrderModification, AppError> {
        let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let modification = modification_repo::lock_for_update(&mut tx, modification_id)
            .await?
            .ok_or_else(|| AppError::not_found("modification"))?;
        if modification.status != ModificationStatus::Pending {
            return Err(AppError::conflict("modification is no longer pending"));
        }

        let order = order_repo::find_by_id(&mut tx, modification.order_id)
            .await?
            .ok_or_else(|| AppError::not_found("order"))?;

        let resolved =
            modification_repo::resolve(&mut tx, modification_id, ModificationStatus::Rejected, reviewer_employee_id)
                .await?;

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        let (event_type, payload) = events::modification(
            events::EventType::ModificationRejected,
            resolved.id,
            resolved.order_id,
            order.session_id,
            resolved.changes.clone(),
        );
        bus.publish(event_type, payload).await;

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_payload_defaults_missing_fields_to_empty() {
        let changes: ModificationChanges = serde_json::from_value(serde_json::json!({
            "items_to_add": [{"menu_item_id": 1, "quantity": 2, "unit_price": "9.50"}]
        }))
        .unwrap();
        assert_eq!(changes.items_to_add.len(), 1);
        assert!(changes.items_to_remove.is_empty());
        assert!(changes.items_to_update.is_empty());
    }

    #[test]
    fn changes_payload_round_trips_through_json() {
        let changes = ModificationChanges {
            items_to_add: vec![ItemToAdd {
                menu_item_id: 7,
                quantity: 1,
                unit_price: Decimal::new(850, 2),
                special_instructions: Some("no onions".into()),
                is_quick_serve: false,
            }],
            items_to_remove: vec![42],
            items_to_update: vec![ItemToUpdate { order_item_id: 3, quantity: 2, special_instructions: None }],
        };
        let json = serde_json::to_value(&changes).unwrap();
        let back: ModificationChanges = serde_json::from_value(json).unwrap();
        assert_eq!(back.items_to_remove, vec![42]);
        assert_eq!(back.items_to_add[0].unit_price, Decimal::new(850, 2));
    }
}

async fn recompute_order_totals(
    conn: &mut sqlx::PgConnection,
    order: &Order,
    config: &Config,
) -> Result<(), AppError> {
    let items = order_repo::find_items(conn, order.id).await?;
    let mut subtotal = Decimal::ZERO;
    let mut tax_amount = Decimal::ZERO;
    for item in &items {
        let modifiers = order_repo::find_item_modifiers(conn, item.id).await?;
        let (line_subtotal, line_tax) =
            SessionCoordinator::compute_order_tax(config, item.line_total(&modifiers));
        subtotal += line_subtotal;
        tax_amount += line_tax;
    }
    order_repo::update_totals(conn, order.id, shared::money::quantize(subtotal), shared::money::quantize(tax_amount)).await?;
    Ok(())
}
