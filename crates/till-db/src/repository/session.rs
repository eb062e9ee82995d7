//! # Session Repository
//!
//! The session lifecycle: open, close, append-only notes.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Lifecycle                                  │
//! │                                                                         │
//! │  1. OPEN                                                                │
//! │     └── open() → Session { status: Open, initial_cash }                │
//! │         (INSERT hits the one-open-per-register unique index:           │
//! │          the insert IS the atomic check-and-create)                     │
//! │                                                                         │
//! │  2. ACCUMULATE                                                          │
//! │     └── MovementRepository::record() appends to the ledger             │
//! │                                                                         │
//! │  3. CLOSE (single transaction)                                          │
//! │     ├── load session, verify Open                                      │
//! │     ├── fence = now                                                    │
//! │     ├── snapshot movements in [start_time, fence)                      │
//! │     ├── summarize → reconcile against counted amounts                  │
//! │     ├── UPDATE … WHERE status = 'open'  (guard against double close)   │
//! │     ├── freeze summary row                                             │
//! │     └── COMMIT                                                         │
//! │                                                                         │
//! │  CLOSED is terminal: no reopen, no further movements, notes may        │
//! │  still be appended.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A movement committed between the close's snapshot read and its write
//! aborts the transaction under WAL snapshot isolation; the close surfaces a
//! transient `Busy` error and the session stays open. A movement is either
//! deterministically included in the frozen summary or the close fails —
//! never silently dropped, never double-counted.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::{RegisterEvent, RegisterEvents};
use till_core::aggregator::summarize;
use till_core::reconcile::reconcile;
use till_core::validation::{validate_actor, validate_cash_cents, validate_counted, validate_note};
use till_core::{CoreError, CountedAmounts, Movement, Session, SessionStatus, Summary};

/// Column list shared by every session SELECT.
const SESSION_COLUMNS: &str = "id, register_id, branch_id, tenant_id, status, \
     start_time, end_time, initial_cash_cents, \
     end_cash_cents, end_card_cents, end_transfer_cents, end_other_cents, \
     difference_cents, opened_by, closed_by, notes";

/// Repository owning the session state machine.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
    events: RegisterEvents,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool, events: RegisterEvents) -> Self {
        SessionRepository { pool, events }
    }

    // =========================================================================
    // Open
    // =========================================================================

    /// Opens a session on a register.
    ///
    /// ## Preconditions
    /// - The register exists and is active
    /// - No session is currently open on it
    ///
    /// The open check is not a read-then-write pair: the INSERT lands on the
    /// partial unique index over open sessions, so of two concurrent callers
    /// exactly one succeeds and the other gets `SessionAlreadyOpen`. A failed
    /// insert leaves no row behind.
    pub async fn open(
        &self,
        register_id: &str,
        initial_cash_cents: i64,
        opened_by: &str,
        notes: Option<&str>,
    ) -> DbResult<Session> {
        validate_cash_cents("initial cash", initial_cash_cents).map_err(CoreError::from)?;
        validate_actor("opened_by", opened_by).map_err(CoreError::from)?;
        if let Some(notes) = notes {
            validate_note(notes).map_err(CoreError::from)?;
        }

        // Resolve tenant/branch from the register row; inactive registers
        // accept no new sessions.
        let register: Option<(String, String, bool)> = sqlx::query_as(
            "SELECT tenant_id, branch_id, is_active FROM registers WHERE id = ?1",
        )
        .bind(register_id)
        .fetch_optional(&self.pool)
        .await?;

        let (tenant_id, branch_id, is_active) =
            register.ok_or_else(|| CoreError::RegisterNotFound(register_id.to_string()))?;
        if !is_active {
            return Err(CoreError::RegisterInactive(register_id.to_string()).into());
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            branch_id,
            tenant_id,
            status: SessionStatus::Open,
            start_time: Utc::now(),
            end_time: None,
            initial_cash_cents,
            end_cash_cents: None,
            end_card_cents: None,
            end_transfer_cents: None,
            end_other_cents: None,
            difference_cents: None,
            opened_by: opened_by.to_string(),
            closed_by: None,
            notes: notes.unwrap_or_default().to_string(),
        };

        debug!(id = %session.id, register_id = %register_id, "Opening session");

        let inserted = sqlx::query(
            r#"
            INSERT INTO register_sessions (
                id, register_id, branch_id, tenant_id, status,
                start_time, end_time, initial_cash_cents,
                end_cash_cents, end_card_cents, end_transfer_cents, end_other_cents,
                difference_cents, opened_by, closed_by, notes
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16
            )
            "#,
        )
        .bind(&session.id)
        .bind(&session.register_id)
        .bind(&session.branch_id)
        .bind(&session.tenant_id)
        .bind(session.status)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.initial_cash_cents)
        .bind(session.end_cash_cents)
        .bind(session.end_card_cents)
        .bind(session.end_transfer_cents)
        .bind(session.end_other_cents)
        .bind(session.difference_cents)
        .bind(&session.opened_by)
        .bind(&session.closed_by)
        .bind(&session.notes)
        .execute(&self.pool)
        .await;

        if let Err(err) = inserted {
            return Err(self.map_open_conflict(register_id, err.into()).await);
        }

        info!(
            session_id = %session.id,
            register_id = %register_id,
            initial_cash = session.initial_cash_cents,
            "Session opened"
        );

        self.events.publish(RegisterEvent::SessionOpened {
            register_id: register_id.to_string(),
            session_id: session.id.clone(),
        });

        Ok(session)
    }

    /// Translates a unique-index hit on open into the conflict error,
    /// naming the session that holds the slot.
    async fn map_open_conflict(&self, register_id: &str, err: DbError) -> DbError {
        if !matches!(err, DbError::UniqueViolation { .. }) {
            return err;
        }

        let holder: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM register_sessions WHERE register_id = ?1 AND status = 'open'",
        )
        .bind(register_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None);

        CoreError::SessionAlreadyOpen {
            register_id: register_id.to_string(),
            session_id: holder.map(|(id,)| id).unwrap_or_else(|| "unknown".to_string()),
        }
        .into()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets the open session for a register, if any.
    pub async fn get_open(&self, register_id: &str) -> DbResult<Option<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions \
             WHERE register_id = ?1 AND status = 'open'"
        );

        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(register_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM register_sessions WHERE id = ?1");

        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    // =========================================================================
    // Close
    // =========================================================================

    /// Closes a session against the counted amounts.
    ///
    /// Snapshot, summarize, reconcile, freeze — one transaction. Fails with
    /// `SessionNotFound` for an unknown id, `InvalidSessionStatus` if the
    /// session is already closed (including a concurrent close that won the
    /// race), and a transient error if the transaction could not commit; in
    /// the transient case nothing was written and the session is still open.
    pub async fn close(
        &self,
        session_id: &str,
        counted: CountedAmounts,
        closed_by: &str,
        notes: Option<&str>,
    ) -> DbResult<Session> {
        validate_counted(&counted).map_err(CoreError::from)?;
        validate_actor("closed_by", closed_by).map_err(CoreError::from)?;
        if let Some(notes) = notes {
            validate_note(notes).map_err(CoreError::from)?;
        }

        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {SESSION_COLUMNS} FROM register_sessions WHERE id = ?1");
        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(session_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        if session.status != SessionStatus::Open {
            return Err(CoreError::InvalidSessionStatus {
                session_id: session_id.to_string(),
                current_status: session.status,
            }
            .into());
        }

        // Close fence: every movement strictly before it belongs to this
        // session; anything at or after it belongs to the next one.
        let fence = Utc::now();

        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, register_id, session_id, movement_type, amount_cents,
                   payment_method, category, description, order_id, created_at
            FROM register_movements
            WHERE session_id = ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(session_id)
        .bind(fence)
        .fetch_all(&mut *tx)
        .await?;

        let summary = summarize(&movements);
        let reconciliation = reconcile(session.initial_cash_cents, &summary, &counted);

        debug!(
            session_id = %session_id,
            movements = movements.len(),
            expected = session.initial_cash_cents + summary.total_sales_cents,
            counted = counted.total().cents(),
            difference = reconciliation.difference_cents,
            "Reconciled session"
        );

        let notes = merge_notes(&session.notes, notes);

        // The status guard makes the transition idempotent-hostile on
        // purpose: a second closer sees zero rows affected.
        let result = sqlx::query(
            r#"
            UPDATE register_sessions SET
                status = 'closed',
                end_time = ?2,
                end_cash_cents = ?3,
                end_card_cents = ?4,
                end_transfer_cents = ?5,
                end_other_cents = ?6,
                difference_cents = ?7,
                closed_by = ?8,
                notes = ?9
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(session_id)
        .bind(fence)
        .bind(counted.cash_cents)
        .bind(counted.card_cents)
        .bind(counted.transfer_cents)
        .bind(counted.other_cents)
        .bind(reconciliation.difference_cents)
        .bind(closed_by)
        .bind(&notes)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InvalidSessionStatus {
                session_id: session_id.to_string(),
                current_status: SessionStatus::Closed,
            }
            .into());
        }

        insert_summary(&mut tx, session_id, &summary).await?;

        tx.commit().await.map_err(|e| match DbError::from(e) {
            busy @ DbError::Busy(_) => busy,
            other => DbError::TransactionFailed(other.to_string()),
        })?;

        info!(
            session_id = %session_id,
            difference = reconciliation.difference_cents,
            status = ?reconciliation.status,
            "Session closed"
        );

        self.events.publish(RegisterEvent::SessionClosed {
            register_id: session.register_id.clone(),
            session_id: session_id.to_string(),
            difference_cents: reconciliation.difference_cents,
        });

        Ok(Session {
            status: SessionStatus::Closed,
            end_time: Some(fence),
            end_cash_cents: Some(counted.cash_cents),
            end_card_cents: Some(counted.card_cents),
            end_transfer_cents: Some(counted.transfer_cents),
            end_other_cents: Some(counted.other_cents),
            difference_cents: Some(reconciliation.difference_cents),
            closed_by: Some(closed_by.to_string()),
            notes,
            ..session
        })
    }

    // =========================================================================
    // Notes
    // =========================================================================

    /// Appends a note to a session.
    ///
    /// The one mutation allowed after close; everything else on a closed
    /// session is frozen.
    pub async fn append_note(&self, session_id: &str, note: &str) -> DbResult<()> {
        validate_actor("note", note).map_err(CoreError::from)?;
        validate_note(note).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE register_sessions SET
                notes = CASE WHEN notes = '' THEN ?2 ELSE notes || char(10) || ?2 END
            WHERE id = ?1
            "#,
        )
        .bind(session_id)
        .bind(note.trim())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::SessionNotFound(session_id.to_string()).into());
        }

        Ok(())
    }
}

/// Writes the frozen summary row inside the close transaction.
async fn insert_summary(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    session_id: &str,
    summary: &Summary,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO register_session_summaries (
            session_id, total_sales_cents, cash_sales_cents, card_sales_cents,
            transfer_sales_cents, other_sales_cents, tips_cents,
            income_cents, expense_cents,
            order_count, completed_count, cancelled_count
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(session_id)
    .bind(summary.total_sales_cents)
    .bind(summary.cash_sales_cents)
    .bind(summary.card_sales_cents)
    .bind(summary.transfer_sales_cents)
    .bind(summary.other_sales_cents)
    .bind(summary.tips_cents)
    .bind(summary.income_cents)
    .bind(summary.expense_cents)
    .bind(summary.order_count)
    .bind(summary.completed_count)
    .bind(summary.cancelled_count)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Appends close-time notes below whatever the session already carries.
fn merge_notes(existing: &str, incoming: Option<&str>) -> String {
    match incoming.map(str::trim).filter(|n| !n.is_empty()) {
        None => existing.to_string(),
        Some(incoming) if existing.is_empty() => incoming.to_string(),
        Some(incoming) => format!("{existing}\n{incoming}"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
