//! Typed realtime event payloads — §4.6 event contract

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The event kind, used as the `event_type` column and the `topic` read by
/// SSE subscribers matching on audience/type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    OrderCreated,
    OrderStatusChanged,
    OrderAutoAccepted,
    SessionStatusChanged,
    WaiterCallCreated,
    WaiterCallConfirmed,
    WaiterCallCancelled,
    SupervisorCalled,
    TableTransferRequested,
    TableTransferAccepted,
    TableTransferRejected,
    ModificationRequested,
    ModificationApproved,
    ModificationRejected,
    Notification(String),
}

impl EventType {
    /// The wire/topic string, e.g. `order.status_changed` or
    /// `notification.waiter` for an audience-scoped notification.
    pub fn topic(&self) -> String {
        match self {
            Self::OrderCreated => "order.created".to_string(),
            Self::OrderStatusChanged => "order.status_changed".to_string(),
            Self::OrderAutoAccepted => "order.auto_accepted".to_string(),
            Self::SessionStatusChanged => "session.status_changed".to_string(),
            Self::WaiterCallCreated => "waiter_call.created".to_string(),
            Self::WaiterCallConfirmed => "waiter_call.confirmed".to_string(),
            Self::WaiterCallCancelled => "waiter_call.cancelled".to_string(),
            Self::SupervisorCalled => "supervisor.called".to_string(),
            Self::TableTransferRequested => "table.transfer_requested".to_string(),
            Self::TableTransferAccepted => "table.transfer_accepted".to_string(),
            Self::TableTransferRejected => "table.transfer_rejected".to_string(),
            Self::ModificationRequested => "modification.requested".to_string(),
            Self::ModificationApproved => "modification.approved".to_string(),
            Self::ModificationRejected => "modification.rejected".to_string(),
            Self::Notification(audience) => format!("notification.{audience}"),
        }
    }
}

/// A single entry read back off the bus: an opaque monotone id, the topic,
/// and the JSON payload described per-topic in §4.6.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RealtimeEvent {
    pub id: i64,
    pub topic: String,
    pub payload: Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub fn order_created(order_id: i64, session_id: i64, table_code: Option<&str>, requires_kitchen: bool, item_count: i32) -> (EventType, Value) {
    (
        EventType::OrderCreated,
        serde_json::json!({
            "order_id": order_id,
            "session_id": session_id,
            "table_code": table_code,
            "requires_kitchen": requires_kitchen,
            "item_count": item_count,
        }),
    )
}

pub fn order_status_changed(
    order_id: i64,
    status: crate::domain::OrderStatus,
    session_id: i64,
    table_code: Option<&str>,
) -> (EventType, Value) {
    (
        EventType::OrderStatusChanged,
        serde_json::json!({
            "order_id": order_id,
            "status": status,
            "session_id": session_id,
            "table_code": table_code,
        }),
    )
}

pub fn order_auto_accepted(order_id: i64, waiter_id: i64, table_id: i64, session_id: i64) -> (EventType, Value) {
    (
        EventType::OrderAutoAccepted,
        serde_json::json!({
            "order_id": order_id,
            "waiter_id": waiter_id,
            "table_id": table_id,
            "session_id": session_id,
        }),
    )
}

pub fn session_status_changed(
    session_id: i64,
    status: crate::domain::SessionStatus,
    table_code: Option<&str>,
) -> (EventType, Value) {
    (
        EventType::SessionStatusChanged,
        serde_json::json!({
            "session_id": session_id,
            "status": status,
            "table_code": table_code,
        }),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn waiter_call(
    kind: EventType,
    call_id: i64,
    session_id: i64,
    table_code: &str,
    status: crate::domain::WaiterCallStatus,
    call_type: &str,
    order_numbers: &[i64],
    waiter_id: Option<i64>,
) -> (EventType, Value) {
    (
        kind,
        serde_json::json!({
            "call_id": call_id,
            "session_id": session_id,
            "table_code": table_code,
            "status": status,
            "call_type": call_type,
            "order_numbers": order_numbers,
            "waiter_id": waiter_id,
        }),
    )
}

pub fn supervisor_called(employee_id: i64, table_code: Option<&str>, order_id: Option<i64>) -> (EventType, Value) {
    (
        EventType::SupervisorCalled,
        serde_json::json!({
            "employee_id": employee_id,
            "table_code": table_code,
            "order_id": order_id,
        }),
    )
}

pub fn table_transfer(
    kind: EventType,
    transfer_id: i64,
    table_id: i64,
    from_waiter_id: i64,
    to_waiter_id: i64,
    order_count: Option<i64>,
) -> (EventType, Value) {
    (
        kind,
        serde_json::json!({
            "transfer_id": transfer_id,
            "table_id": table_id,
            "from_waiter_id": from_waiter_id,
            "to_waiter_id": to_waiter_id,
            "order_count": order_count,
        }),
    )
}

pub fn modification(kind: EventType, modification_id: i64, order_id: i64, session_id: i64, changes: Value) -> (EventType, Value) {
    (
        kind,
        serde_json::json!({
            "modification_id": modification_id,
            "order_id": order_id,
            "session_id": session_id,
            "changes": changes,
        }),
    )
}

pub fn notification(audience: &str, notification_type: &str, title: &str, message: &str, data: Value, priority: &str) -> (EventType, Value) {
    (
        EventType::Notification(audience.to_string()),
        serde_json::json!({
            "notification_type": notification_type,
            "title": title,
            "message": message,
            "data": data,
            "priority": priority,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_event_type_has_a_dotted_topic() {
        let cases = [
            (EventType::OrderCreated, "order.created"),
            (EventType::OrderStatusChanged, "order.status_changed"),
            (EventType::OrderAutoAccepted, "order.auto_accepted"),
            (EventType::SessionStatusChanged, "session.status_changed"),
            (EventType::WaiterCallCreated, "waiter_call.created"),
            (EventType::WaiterCallConfirmed, "waiter_call.confirmed"),
            (EventType::WaiterCallCancelled, "waiter_call.cancelled"),
            (EventType::SupervisorCalled, "supervisor.called"),
            (EventType::TableTransferRequested, "table.transfer_requested"),
            (EventType::TableTransferAccepted, "table.transfer_accepted"),
            (EventType::TableTransferRejected, "table.transfer_rejected"),
            (EventType::ModificationRequested, "modification.requested"),
            (EventType::ModificationApproved, "modification.approved"),
            (EventType::ModificationRejected, "modification.rejected"),
        ];
        for (event, expected) in cases {
            assert_eq!(event.topic(), expected);
        }
    }

    #[test]
    fn notification_topic_is_scoped_by_audience() {
        assert_eq!(EventType::Notification("cashier".into()).topic(), "notification.cashier");
    }

    #[test]
    fn order_created_payload_carries_item_count() {
        let (event_type, payload) = order_created(1, 2, Some("A1"), true, 3);
        assert_eq!(event_type, EventType::OrderCreated);
        assert_eq!(payload["item_count"], 3);
        assert_eq!(payload["table_code"], "A1");
    }

    #[test]
    fn modification_payload_preserves_requested_kind() {
        let (event_type, payload) =
            modification(EventType::ModificationRejected, 1, 2, 3, serde_json::json!({"items_to_remove": [5]}));
        assert_eq!(event_type, EventType::ModificationRejected);
        assert_eq!(payload["modification_id"], 1);
    }
}
