//! # Domain Types
//!
//! Core domain types for the Till reconciliation engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Register     │   │     Session     │   │    Movement     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  branch_id      │   │  register_id    │   │  session_id     │       │
//! │  │  name           │   │  status         │   │  movement_type  │       │
//! │  │  is_active      │   │  initial_cash   │   │  amount_cents   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SessionStatus  │   │  MovementType   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Open           │   │  Sale           │   │  Cash           │       │
//! │  │  Closed         │   │  Income         │   │  Card           │       │
//! │  └─────────────────┘   │  Expense        │   │  Transfer       │       │
//! │                        └─────────────────┘   │  Other          │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! A `Register` hosts sequential `Session`s. A session is opened with a cash
//! float, accumulates immutable `Movement`s while open, and is closed exactly
//! once against a set of [`CountedAmounts`]. The derived [`Summary`] and the
//! signed difference are frozen at close time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Register
// =============================================================================

/// A named cash-handling point within a branch.
///
/// Long-lived; created by configuration, deactivated rather than deleted so
/// historical sessions keep their back-reference.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Register {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this register belongs to.
    pub tenant_id: String,

    /// Branch hosting the register.
    pub branch_id: String,

    /// Display name shown to staff ("Front counter", "Bar").
    pub name: String,

    /// Whether the register accepts new sessions (soft delete).
    pub is_active: bool,

    /// When the register was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Session Status
// =============================================================================

/// The status of a register session.
///
/// `Open → Closed` is the only transition; `Closed` is terminal. There is no
/// reopen, and no movement is accepted against a closed session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session is accepting movements.
    Open,
    /// Session has been reconciled and frozen.
    Closed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Open
    }
}

// =============================================================================
// Session
// =============================================================================

/// One open-to-close cycle on a register.
///
/// Owned exclusively by the session repository; immutable once closed except
/// for append-only notes. The `end_*_cents` columns hold the humanly counted
/// amounts entered at close, `difference_cents` the signed variance.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Session {
    pub id: String,
    pub register_id: String,
    pub branch_id: String,
    pub tenant_id: String,
    pub status: SessionStatus,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    /// Set at close time; doubles as the close fence for movement inclusion.
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,
    /// Opening cash float.
    pub initial_cash_cents: i64,
    /// Counted cash at close (includes the float).
    pub end_cash_cents: Option<i64>,
    /// Counted card receipts at close.
    pub end_card_cents: Option<i64>,
    /// Counted transfer receipts at close.
    pub end_transfer_cents: Option<i64>,
    /// Counted amounts in any other tender at close.
    pub end_other_cents: Option<i64>,
    /// counted − expected; negative = short, positive = over.
    pub difference_cents: Option<i64>,
    /// Opaque actor identifier supplied by the identity collaborator.
    pub opened_by: String,
    pub closed_by: Option<String>,
    /// Free-form notes; append-only after close.
    pub notes: String,
}

impl Session {
    /// Returns the opening float as Money.
    #[inline]
    pub fn initial_cash(&self) -> Money {
        Money::from_cents(self.initial_cash_cents)
    }

    /// Returns the frozen difference as Money, if the session is closed.
    #[inline]
    pub fn difference(&self) -> Option<Money> {
        self.difference_cents.map(Money::from_cents)
    }

    /// Checks whether the session is still accepting movements.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// The session's time window: `[start_time, end_time ?? now)`.
    pub fn window(&self) -> DateRange {
        DateRange {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

// =============================================================================
// Movement Type
// =============================================================================

/// The kind of a cash-affecting event.
///
/// Closed tagged union; the aggregator matches it exhaustively so a new kind
/// cannot be added without deciding how it is summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Revenue from an order.
    Sale,
    /// Cash in that is not a sale (tip pool, float top-up).
    Income,
    /// Cash out (supplier paid from the drawer, petty expense).
    Expense,
}

// =============================================================================
// Payment Method
// =============================================================================

/// Tender used for a movement or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash in the drawer.
    Cash,
    /// Card payment on a terminal.
    Card,
    /// Bank transfer.
    Transfer,
    /// Anything else (vouchers, delivery-platform wallets).
    Other,
}

// =============================================================================
// Movement
// =============================================================================

/// A single recorded cash-affecting event.
///
/// Immutable once created. Corrections are new movements tagged with
/// [`crate::REVERSAL_CATEGORY`]; the amount stays strictly positive and the
/// aggregator applies the inverse sign.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    pub id: String,
    pub register_id: String,
    pub session_id: String,
    pub movement_type: MovementType,
    /// Amount in cents; always > 0.
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    /// Optional tag ("reversal", "tip", "supplier", ...).
    pub category: Option<String>,
    pub description: String,
    /// Back-reference to the order that produced this movement, if any.
    pub order_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Whether this movement reverses an earlier one.
    #[inline]
    pub fn is_reversal(&self) -> bool {
        self.category.as_deref() == Some(crate::REVERSAL_CATEGORY)
    }

    /// Whether this movement is a recorded tip.
    #[inline]
    pub fn is_tip(&self) -> bool {
        self.category.as_deref() == Some(crate::TIP_CATEGORY)
    }
}

/// Input for recording a new movement.
///
/// The id, session attribution, and timestamp are assigned by the ledger at
/// insert time, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMovement {
    pub movement_type: MovementType,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub category: Option<String>,
    pub description: String,
    pub order_id: Option<String>,
}

// =============================================================================
// Summary
// =============================================================================

/// Aggregated view of a session window.
///
/// Derived, never authored by hand. For a closed session the summary is
/// frozen at close time and re-served as-is; for an open session it is
/// recomputed on every request because the movement set underneath is still
/// growing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Summary {
    /// Net sales across all tenders.
    pub total_sales_cents: i64,
    pub cash_sales_cents: i64,
    pub card_sales_cents: i64,
    pub transfer_sales_cents: i64,
    pub other_sales_cents: i64,
    /// Tips received during the window (not part of sales).
    pub tips_cents: i64,
    /// Non-sale, non-tip income (informational; not in the expected total).
    pub income_cents: i64,
    /// Expenses paid from the drawer (informational).
    pub expense_cents: i64,
    /// Orders seen in the window, cancelled excluded.
    pub order_count: i64,
    pub completed_count: i64,
    pub cancelled_count: i64,
}

impl Summary {
    /// Returns total sales as Money.
    #[inline]
    pub fn total_sales(&self) -> Money {
        Money::from_cents(self.total_sales_cents)
    }

    /// Sales for one payment method as Money.
    pub fn sales_for(&self, method: PaymentMethod) -> Money {
        let cents = match method {
            PaymentMethod::Cash => self.cash_sales_cents,
            PaymentMethod::Card => self.card_sales_cents,
            PaymentMethod::Transfer => self.transfer_sales_cents,
            PaymentMethod::Other => self.other_sales_cents,
        };
        Money::from_cents(cents)
    }
}

// =============================================================================
// Counted Amounts
// =============================================================================

/// The physically verified amounts entered by the person closing a register.
///
/// The cash figure includes the opening float; each figure must be >= 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CountedAmounts {
    pub cash_cents: i64,
    pub card_cents: i64,
    pub transfer_cents: i64,
    pub other_cents: i64,
}

impl CountedAmounts {
    /// Sum across all tenders.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(
            self.cash_cents + self.card_cents + self.transfer_cents + self.other_cents,
        )
    }
}

// =============================================================================
// Order (external collaborator record)
// =============================================================================

/// Lifecycle state of an order, as supplied by the order subsystem.
///
/// Read-only input; the order workflow itself is out of scope here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Read-only order record consumed by the aggregator's fallback path.
///
/// `total_cents` excludes the tip; tips are tracked separately so the
/// fallback path and the ledger path land in the same summary buckets.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub branch_id: String,
    pub total_cents: i64,
    pub tip_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Date Range
// =============================================================================

/// A half-open time window `[start, end)`.
///
/// An absent end means "still open": the window extends to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Builds a bounded window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateRange {
            start,
            end: Some(end),
        }
    }

    /// Builds a window that is still open on the right.
    pub fn since(start: DateTime<Utc>) -> Self {
        DateRange { start, end: None }
    }

    /// Checks containment against the half-open bounds.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if instant < self.start {
            return false;
        }
        match self.end {
            Some(end) => instant < end,
            None => true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
