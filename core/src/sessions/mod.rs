//! SessionCoordinator — get-or-create under table lock (§4.2)

use crate::config::{Config, PriceDisplayMode};
use crate::db::repository::session as session_repo;
use crate::db::repository::table as table_repo;
use crate::db::repository::RepoError;
use crate::domain::{DiningSession, SessionStatus};
use rust_decimal::Decimal;
use shared::error::AppError;
use shared::util::snowflake_id;
use sqlx::PgConnection;

pub struct SessionCoordinator;

/// Caller-supplied hints for resolving the session an order attaches to.
#[derive(Debug, Clone, Default)]
pub struct SessionHint {
    pub hint_session_id: Option<i64>,
    pub table_id: Option<i64>,
    pub table_code: Option<String>,
    pub customer_id: i64,
}

impl SessionCoordinator {
    /// Resolve or create exactly one open session per the deterministic
    /// resolution order in §4.2.
    pub async fn get_or_create(
        conn: &mut PgConnection,
        hint: &SessionHint,
        config: &Config,
    ) -> Result<DiningSession, AppError> {
        let now = chrono::Utc::now();

        if let Some(hint_id) = hint.hint_session_id {
            if let Some(session) = session_repo::find_by_id(conn, hint_id).await? {
                if session.status == SessionStatus::Open && session.expires_at > now {
                    return Ok(session);
                }
            }
        }

        if let Some(table_id) = hint.table_id {
            table_repo::lock_for_update(conn, table_id)
                .await?
                .ok_or_else(|| AppError::not_found("table"))?;

            if let Some(session) = session_repo::find_open_by_table(conn, table_id).await? {
                if session.is_expired(now) {
                    session_repo::close_zeroed(conn, session.id).await?;
                } else {
                    return Ok(session);
                }
            }

            return Self::create(conn, hint, config, now).await;
        }

        if let Some(session) = session_repo::find_open_by_customer(conn, hint.customer_id).await? {
            if session.is_expired(now) {
                session_repo::close_zeroed(conn, session.id).await?;
            } else {
                return Ok(session);
            }
        }

        Self::create(conn, hint, config, now).await
    }

    async fn create(
        conn: &mut PgConnection,
        hint: &SessionHint,
        config: &Config,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<DiningSession, AppError> {
        let expires_at = now + chrono::Duration::from_std(config.session_ttl).unwrap_or(chrono::Duration::hours(4));
        let id = snowflake_id();

        match session_repo::insert_open(
            conn,
            id,
            hint.customer_id,
            hint.table_id,
            hint.table_code.as_deref(),
            expires_at,
        )
        .await
        {
            Ok(session) => Ok(session),
            Err(RepoError::Duplicate(_)) => {
                let table_id = hint
                    .table_id
                    .ok_or_else(|| AppError::internal("session race unresolved"))?;
                session_repo::find_open_by_table(conn, table_id)
                    .await?
                    .ok_or_else(|| AppError::internal("session race unresolved"))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// `RecomputeTotals(session, txn)` — loads all non-cancelled child
    /// orders and resets `subtotal`/`tax_amount`/`total_amount`, leaving
    /// `tip_amount` untouched.
    pub async fn recompute_totals(conn: &mut PgConnection, session_id: i64) -> Result<DiningSession, AppError> {
        Ok(session_repo::recompute_totals(conn, session_id).await?)
    }

    /// Close a session in place, zeroing its monetary fields — used both by
    /// the TTL sweep and when the last non-cancelled child order of a
    /// session is cancelled (all children are already cancelled by then).
    pub async fn close_in_place(conn: &mut PgConnection, session_id: i64) -> Result<DiningSession, AppError> {
        Ok(session_repo::close_zeroed(conn, session_id).await?)
    }

    /// Compute `(subtotal, tax_amount)` for a new order's line items,
    /// consistent with the session's configured pricing/tax mode (§4.2).
    pub fn compute_order_tax(config: &Config, displayed_total: Decimal) -> (Decimal, Decimal) {
        match config.price_display_mode {
            PriceDisplayMode::TaxIncluded => {
                let tax = shared::money::quantize(displayed_total * config.tax_rate / (Decimal::ONE + config.tax_rate));
                let subtotal = shared::money::quantize(displayed_total - tax);
                (subtotal, tax)
            }
            PriceDisplayMode::TaxExcluded => {
                let tax = shared::money::quantize(displayed_total * config.tax_rate);
                (displayed_total, tax)
            }
        }
    }

    /// Sweep `open` sessions whose TTL has elapsed, closing each in place —
    /// a read that observes expiration must close the session before
    /// returning (§4.2 "TTL and expiration").
    pub async fn expire_stale(conn: &mut PgConnection) -> Result<u32, AppError> {
        let now = chrono::Utc::now();
        let expired = session_repo::find_expired_open(conn, now).await?;
        let count = expired.len() as u32;
        for session in expired {
            Self::close_in_place(conn, session.id).await?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: PriceDisplayMode) -> Config {
        Config {
            database_url: String::new(),
            bind_addr: String::new(),
            session_ttl: std::time::Duration::from_secs(4 * 3600),
            tax_rate: Decimal::new(16, 2),
            price_display_mode: mode,
            closed_sessions_history: std::time::Duration::from_secs(24 * 3600),
            store_cancel_reason: true,
            assignment_auto_on_accept_default: true,
            pii_key: shared::pii::PiiKey::generate(),
        }
    }

    #[test]
    fn tax_excluded_adds_tax_on_top() {
        let cfg = config(PriceDisplayMode::TaxExcluded);
        let (subtotal, tax) = SessionCoordinator::compute_order_tax(&cfg, Decimal::new(10000, 2));
        assert_eq!(subtotal, Decimal::new(10000, 2));
        assert_eq!(tax, Decimal::new(1600, 2));
    }

    #[test]
    fn tax_included_extracts_tax_from_total() {
        let cfg = config(PriceDisplayMode::TaxIncluded);
        let (subtotal, tax) = SessionCoordinator::compute_order_tax(&cfg, Decimal::new(11600, 2));
        assert_eq!(subtotal, Decimal::new(10000, 2));
        assert_eq!(tax, Decimal::new(1600, 2));
    }
}
