//! # Report Repository
//!
//! Read-only querying of past sessions and their summaries.
//!
//! ## Frozen vs Live
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  session_detail(id)                                                     │
//! │       │                                                                 │
//! │       ├── status == closed ──► read register_session_summaries row     │
//! │       │                        (frozen at close, never recomputed)     │
//! │       │                                                                 │
//! │       └── status == open   ──► load live movements, summarize()        │
//! │                                (the set underneath is still growing,   │
//! │                                 so every call recomputes)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads here are unordered with respect to concurrent writes and may be
//! slightly stale; only closed-session data is guaranteed immutable.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use till_core::aggregator::summarize;
use till_core::{CoreError, DateRange, Movement, Session, SessionStatus, Summary};

/// Repository for historical reporting.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Lists sessions in a branch whose start time falls in the range,
    /// newest first, pageable.
    pub async fn list_sessions(
        &self,
        branch_id: &str,
        range: DateRange,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, register_id, branch_id, tenant_id, status,
                   start_time, end_time, initial_cash_cents,
                   end_cash_cents, end_card_cents, end_transfer_cents, end_other_cents,
                   difference_cents, opened_by, closed_by, notes
            FROM register_sessions
            WHERE branch_id = ?1
              AND start_time >= ?2
              AND (?3 IS NULL OR start_time < ?3)
            ORDER BY start_time DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Returns a session together with its summary.
    ///
    /// Closed sessions serve the summary frozen at close time; open sessions
    /// recompute it from the live movement set.
    pub async fn session_detail(&self, session_id: &str) -> DbResult<(Session, Summary)> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, register_id, branch_id, tenant_id, status,
                   start_time, end_time, initial_cash_cents,
                   end_cash_cents, end_card_cents, end_transfer_cents, end_other_cents,
                   difference_cents, opened_by, closed_by, notes
            FROM register_sessions
            WHERE id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        let summary = match session.status {
            SessionStatus::Closed => self.frozen_summary(session_id).await?,
            SessionStatus::Open => {
                let movements = self.live_movements(session_id).await?;
                summarize(&movements)
            }
        };

        Ok((session, summary))
    }

    /// Reads the summary row written by the close transaction.
    async fn frozen_summary(&self, session_id: &str) -> DbResult<Summary> {
        sqlx::query_as::<_, Summary>(
            r#"
            SELECT total_sales_cents, cash_sales_cents, card_sales_cents,
                   transfer_sales_cents, other_sales_cents, tips_cents,
                   income_cents, expense_cents,
                   order_count, completed_count, cancelled_count
            FROM register_session_summaries
            WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        // Written in the same transaction that closes a session, so a
        // closed session without one indicates a corrupted store.
        .ok_or_else(|| DbError::Internal(format!("missing frozen summary for {session_id}")))
    }

    async fn live_movements(&self, session_id: &str) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, register_id, session_id, movement_type, amount_cents,
                   payment_method, category, description, order_id, created_at
            FROM register_movements
            WHERE session_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}
