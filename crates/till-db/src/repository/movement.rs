//! # Movement Repository
//!
//! The append-only ledger of cash-affecting events.
//!
//! ## Append-Only
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  There is no update and no delete entry point on this repository,      │
//! │  and none exists anywhere else in the codebase. A wrong movement is    │
//! │  corrected by a second movement tagged "reversal":                     │
//! │                                                                         │
//! │    sale  cash  $5.50                    ← typo, should have been card  │
//! │    sale  cash  $5.50  category=reversal ← cancels the cash entry       │
//! │    sale  card  $5.50                    ← the correct entry            │
//! │                                                                         │
//! │  The aggregator applies the inverse sign to reversal-tagged rows.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recording requires an open session on the register; the session lookup
//! and the insert share one transaction, so a movement can never attach to
//! a session that a concurrent close already froze.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::events::{RegisterEvent, RegisterEvents};
use till_core::validation::{validate_amount_cents, validate_description};
use till_core::{CoreError, DateRange, Movement, MovementType, NewMovement, PaymentMethod};

/// Filter for ledger queries.
///
/// Scope is always one register; narrow further by session or time range,
/// and optionally by type and payment method.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub session_id: Option<String>,
    pub range: Option<DateRange>,
    pub movement_type: Option<MovementType>,
    pub payment_method: Option<PaymentMethod>,
}

/// Repository for the movement ledger.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
    events: RegisterEvents,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool, events: RegisterEvents) -> Self {
        MovementRepository { pool, events }
    }

    /// Records a movement against the register's open session.
    ///
    /// ## Preconditions
    /// - `amount_cents > 0` (corrections are reversal-tagged, never negative)
    /// - A session is open on the register
    ///
    /// The session id and timestamp are assigned here, never by the caller.
    pub async fn record(&self, register_id: &str, new: NewMovement) -> DbResult<Movement> {
        validate_amount_cents(new.amount_cents).map_err(CoreError::from)?;
        validate_description(&new.description).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        // Resolve the open session inside the same transaction as the
        // insert: a close committing concurrently forces this transaction
        // to abort rather than letting the movement land on a frozen
        // session.
        let open: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM register_sessions WHERE register_id = ?1 AND status = 'open'",
        )
        .bind(register_id)
        .fetch_optional(&mut *tx)
        .await?;

        let session_id = match open {
            Some((id,)) => id,
            None => {
                let register_exists: Option<(String,)> =
                    sqlx::query_as("SELECT id FROM registers WHERE id = ?1")
                        .bind(register_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                let err = if register_exists.is_some() {
                    CoreError::NoOpenSession {
                        register_id: register_id.to_string(),
                    }
                } else {
                    CoreError::RegisterNotFound(register_id.to_string())
                };
                return Err(err.into());
            }
        };

        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            session_id: session_id.clone(),
            movement_type: new.movement_type,
            amount_cents: new.amount_cents,
            payment_method: new.payment_method,
            category: new.category,
            description: new.description.trim().to_string(),
            order_id: new.order_id,
            created_at: Utc::now(),
        };

        debug!(
            id = %movement.id,
            session_id = %session_id,
            movement_type = ?movement.movement_type,
            amount = movement.amount_cents,
            "Recording movement"
        );

        sqlx::query(
            r#"
            INSERT INTO register_movements (
                id, register_id, session_id, movement_type, amount_cents,
                payment_method, category, description, order_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.register_id)
        .bind(&movement.session_id)
        .bind(movement.movement_type)
        .bind(movement.amount_cents)
        .bind(movement.payment_method)
        .bind(&movement.category)
        .bind(&movement.description)
        .bind(&movement.order_id)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.events.publish(RegisterEvent::MovementRecorded {
            register_id: register_id.to_string(),
            session_id,
            movement_id: movement.id.clone(),
        });

        Ok(movement)
    }

    /// Queries the ledger, newest first, pageable.
    ///
    /// Read-only and idempotent; safe to retry freely.
    pub async fn query(
        &self,
        register_id: &str,
        filter: &MovementFilter,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<Movement>> {
        let (range_start, range_end) = match filter.range {
            Some(range) => (Some(range.start), range.end),
            None => (None, None),
        };

        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, register_id, session_id, movement_type, amount_cents,
                   payment_method, category, description, order_id, created_at
            FROM register_movements
            WHERE register_id = ?1
              AND (?2 IS NULL OR session_id = ?2)
              AND (?3 IS NULL OR created_at >= ?3)
              AND (?4 IS NULL OR created_at < ?4)
              AND (?5 IS NULL OR movement_type = ?5)
              AND (?6 IS NULL OR payment_method = ?6)
            ORDER BY created_at DESC
            LIMIT ?7 OFFSET ?8
            "#,
        )
        .bind(register_id)
        .bind(&filter.session_id)
        .bind(range_start)
        .bind(range_end)
        .bind(filter.movement_type)
        .bind(filter.payment_method)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Returns a session's full movement set in timestamp order.
    ///
    /// This is the same ordering the close path snapshots, so re-running the
    /// aggregator over this set reproduces a frozen summary exactly.
    pub async fn for_session(&self, session_id: &str) -> DbResult<Vec<Movement>> {
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
