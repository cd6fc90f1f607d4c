//! RealtimeBus — a durable, ordered, append-only event log (§4.6).
//!
//! Events are rows in `realtime_events`, ordered by the `id` bigserial
//! primary key. Consumers poll with `read(after_id, max_count)`; there is no
//! push transport here, matching the "durable log + poll" contract rather
//! than the teacher's in-process broadcast channel — a broadcast channel
//! cannot replay events to a consumer that connects late or reconnects.

use super::events::{EventType, RealtimeEvent};
use shared::error::AppError;
use sqlx::{PgConnection, PgPool};

#[derive(Clone)]
pub struct RealtimeBus {
    pool: PgPool,
}

impl RealtimeBus {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an event inside the caller's transaction. Per §4.6, callers
    /// invoke this only after deciding to commit — the transaction wrapping
    /// this call is the same one that wrote the domain row being announced.
    pub async fn publish_in_txn(
        conn: &mut PgConnection,
        event_type: EventType,
        payload: serde_json::Value,
    ) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO realtime_events (topic, payload, created_at) VALUES ($1, $2, now()) RETURNING id",
        )
        .bind(event_type.topic())
        .bind(payload)
        .fetch_one(conn)
        .await?;
        Ok(id)
    }

    /// Publish after the originating transaction has already committed.
    /// Per §4.6, a failure here is logged, not propagated — the domain
    /// mutation already succeeded and must not be rolled back for this.
    pub async fn publish(&self, event_type: EventType, payload: serde_json::Value) {
        let result = sqlx::query("INSERT INTO realtime_events (topic, payload, created_at) VALUES ($1, $2, now())")
            .bind(event_type.topic())
            .bind(payload)
            .execute(&self.pool)
            .await;
        if let Err(err) = result {
            tracing::error!(error = %err, "failed to publish realtime event");
        }
    }

    /// Read events strictly after `after_id`, oldest first, capped at
    /// `max_count`. Returns the events and the last id read (or `after_id`
    /// unchanged if nothing new was available), so the caller can pass that
    /// back as the next `after_id`. `after_id = 0` means "from the beginning".
    pub async fn read(&self, after_id: i64, max_count: i64) -> Result<(Vec<RealtimeEvent>, i64), AppError> {
        let events = sqlx::query_as::<_, RealtimeEvent>(
            "SELECT * FROM realtime_events WHERE id > $1 ORDER BY id ASC LIMIT $2",
        )
        .bind(after_id)
        .bind(max_count)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

        let last_id = events.last().map(|e| e.id).unwrap_or(after_id);
        Ok((events, last_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_strings_match_spec_naming() {
        assert_eq!(EventType::OrderCreated.topic(), "order.created");
        assert_eq!(EventType::Notification("waiter".into()).topic(), "notification.waiter");
    }
}
