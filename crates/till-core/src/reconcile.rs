//! # Reconciliation Engine
//!
//! Compares an expected summary against the humanly counted amounts and
//! produces a signed difference.
//!
//! ## The Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_counted  = counted.cash + counted.card                           │
//! │                 + counted.transfer + counted.other                      │
//! │  total_expected = initial_cash + expected.total_sales                   │
//! │  difference     = total_counted − total_expected                        │
//! │                                                                         │
//! │  difference == 0  →  balanced                                           │
//! │  difference  < 0  →  short   (drawer is missing money)                  │
//! │  difference  > 0  →  over    (drawer has extra money)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no tolerance band and no auto-approval: every nonzero
//! difference is flagged. Whether a variance is acceptable is a policy
//! decision that belongs to the caller, not to this engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CountedAmounts, Summary};

// =============================================================================
// Reconciliation Status
// =============================================================================

/// Outcome classification of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// Counted equals expected exactly.
    Balanced,
    /// Counted is below expected.
    Short,
    /// Counted is above expected.
    Over,
}

// =============================================================================
// Per-Method Deltas
// =============================================================================

/// Counted − expected, split by payment method.
///
/// The cash delta carries the opening float; the four deltas always sum to
/// the overall difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodDeltas {
    pub cash_cents: i64,
    pub card_cents: i64,
    pub transfer_cents: i64,
    pub other_cents: i64,
}

// =============================================================================
// Reconciliation Result
// =============================================================================

/// The full result of reconciling a session window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reconciliation {
    /// counted − expected, signed.
    pub difference_cents: i64,
    pub per_method_delta: MethodDeltas,
    pub status: ReconciliationStatus,
}

impl Reconciliation {
    /// Returns the difference as Money.
    #[inline]
    pub fn difference(&self) -> Money {
        Money::from_cents(self.difference_cents)
    }
}

// =============================================================================
// Reconcile
// =============================================================================

/// Reconciles counted amounts against the expected summary.
///
/// Pure function over integer cents. With zero sales in the window the
/// difference reduces to `counted_total − initial_cash`.
///
/// ## Example
/// ```rust
/// use till_core::reconcile::{reconcile, ReconciliationStatus};
/// use till_core::types::{CountedAmounts, Summary};
///
/// let expected = Summary {
///     total_sales_cents: 800,
///     cash_sales_cents: 500,
///     card_sales_cents: 300,
///     ..Summary::default()
/// };
/// let counted = CountedAmounts {
///     cash_cents: 1500,
///     card_cents: 300,
///     transfer_cents: 0,
///     other_cents: 0,
/// };
///
/// let result = reconcile(1000, &expected, &counted);
/// assert_eq!(result.difference_cents, 0);
/// assert_eq!(result.status, ReconciliationStatus::Balanced);
/// ```
pub fn reconcile(
    initial_cash_cents: i64,
    expected: &Summary,
    counted: &CountedAmounts,
) -> Reconciliation {
    let total_counted = counted.total().cents();
    let total_expected = initial_cash_cents + expected.total_sales_cents;
    let difference_cents = total_counted - total_expected;

    let per_method_delta = MethodDeltas {
        // Cash expectation includes the opening float.
        cash_cents: counted.cash_cents - (initial_cash_cents + expected.cash_sales_cents),
        card_cents: counted.card_cents - expected.card_sales_cents,
        transfer_cents: counted.transfer_cents - expected.transfer_sales_cents,
        other_cents: counted.other_cents - expected.other_sales_cents,
    };

    let status = if difference_cents == 0 {
        ReconciliationStatus::Balanced
    } else if difference_cents < 0 {
        ReconciliationStatus::Short
    } else {
        ReconciliationStatus::Over
    };

    Reconciliation {
        difference_cents,
        per_method_delta,
        status,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
