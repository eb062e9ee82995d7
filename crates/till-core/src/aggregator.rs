//! # Aggregator
//!
//! Pure summarization of a session window.
//!
//! ## Two Paths, One Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Summary Derivation                                 │
//! │                                                                         │
//! │  Ledger path (preferred)                                               │
//! │    Movements in [start, fence) ──► summarize() ──► Summary             │
//! │                                                                         │
//! │  Fallback path (no ledger for the window)                              │
//! │    Orders with created_at in window                                    │
//! │    and status == completed        ──► summarize_orders() ──► Summary  │
//! │                                                                         │
//! │  Both paths bucket by payment method and sum integer cents.           │
//! │  Identical underlying facts ⇒ identical Summary, bit for bit.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! No hidden state, no I/O, no clock reads. A closed session's frozen
//! summary can be re-derived from its movement snapshot at any later time
//! for audit and must match exactly — which is only possible because these
//! functions are deterministic over their inputs.
//!
//! Summation is associative, so concurrent movement recording needs no
//! coordination: any interleaving of appends produces the same totals.

use crate::types::{DateRange, Movement, MovementType, Order, OrderStatus, PaymentMethod, Summary};

// =============================================================================
// Ledger Path
// =============================================================================

/// Summarizes a set of movements.
///
/// ## Bucketing Rule
/// - `Sale` movements add to the per-method bucket and to total sales;
///   each non-reversal sale counts one order (completed by definition —
///   only completed orders produce sale movements).
/// - Movements tagged `"reversal"` contribute the inverse sign to the
///   money buckets; counts are not decremented, a reversed sale stays
///   visible as activity.
/// - `Income` tagged `"tip"` accumulates into tips; other income into the
///   informational income bucket.
/// - `Expense` accumulates into the informational expense bucket.
///
/// All arithmetic is integer cents; there is no rounding anywhere.
pub fn summarize(movements: &[Movement]) -> Summary {
    let mut summary = Summary::default();

    for movement in movements {
        let sign = if movement.is_reversal() { -1 } else { 1 };
        let cents = movement.amount_cents * sign;

        match movement.movement_type {
            MovementType::Sale => {
                summary.total_sales_cents += cents;
                match movement.payment_method {
                    PaymentMethod::Cash => summary.cash_sales_cents += cents,
                    PaymentMethod::Card => summary.card_sales_cents += cents,
                    PaymentMethod::Transfer => summary.transfer_sales_cents += cents,
                    PaymentMethod::Other => summary.other_sales_cents += cents,
                }
                if sign > 0 {
                    summary.order_count += 1;
                    summary.completed_count += 1;
                }
            }
            MovementType::Income => {
                if movement.is_tip() {
                    summary.tips_cents += cents;
                } else {
                    summary.income_cents += cents;
                }
            }
            MovementType::Expense => {
                summary.expense_cents += cents;
            }
        }
    }

    summary
}

// =============================================================================
// Fallback Path
// =============================================================================

/// Recomputes the summary directly from raw orders.
///
/// Used when no explicit movement ledger exists for a window. Applies the
/// identical bucketing rule as [`summarize`]:
/// - cancelled orders are excluded from sale totals but increment the
///   cancelled count;
/// - all non-cancelled orders increment the order count;
/// - only completed orders contribute money and the completed count.
pub fn summarize_orders(orders: &[Order], window: &DateRange) -> Summary {
    let mut summary = Summary::default();

    for order in orders {
        if !window.contains(order.created_at) {
            continue;
        }

        match order.status {
            OrderStatus::Cancelled => {
                summary.cancelled_count += 1;
            }
            OrderStatus::Pending => {
                summary.order_count += 1;
            }
            OrderStatus::Completed => {
                summary.order_count += 1;
                summary.completed_count += 1;
                summary.total_sales_cents += order.total_cents;
                match order.payment_method {
                    PaymentMethod::Cash => summary.cash_sales_cents += order.total_cents,
                    PaymentMethod::Card => summary.card_sales_cents += order.total_cents,
                    PaymentMethod::Transfer => summary.transfer_sales_cents += order.total_cents,
                    PaymentMethod::Other => summary.other_sales_cents += order.total_cents,
                }
                summary.tips_cents += order.tip_cents;
            }
        }
    }

    summary
}

// =============================================================================
// Dispatch
// =============================================================================

/// Computes the expected summary for a window.
///
/// Prefers the explicit ledger; falls back to raw orders only when the
/// ledger has nothing for the window and orders were supplied.
pub fn expected_summary(
    movements: &[Movement],
    orders: Option<&[Order]>,
    window: &DateRange,
) -> Summary {
    if movements.is_empty() {
        if let Some(orders) = orders {
            return summarize_orders(orders, window);
        }
    }

    summarize(movements)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{REVERSAL_CATEGORY, TIP_CATEGORY};
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn movement(
        movement_type: MovementType,
        amount_cents: i64,
        payment_method: PaymentMethod,
        category: Option<&str>,
    ) -> Movement {
        Movement {
            id: "m".to_string(),
            register_id: "reg-1".to_string(),
            session_id: "sess-1".to_string(),
            movement_type,
            amount_cents,
            payment_method,
            category: category.map(str::to_string),
            description: "test".to_string(),
            order_id: None,
            created_at: ts(150),
        }
    }

    fn order(
        total_cents: i64,
        tip_cents: i64,
        payment_method: PaymentMethod,
        status: OrderStatus,
        created_secs: i64,
    ) -> Order {
        Order {
            id: "o".to_string(),
            branch_id: "branch-1".to_string(),
            total_cents,
            tip_cents,
            payment_method,
            status,
            created_at: ts(created_secs),
        }
    }

    #[test]
    fn test_summarize_buckets_by_method() {
        let movements = vec![
            movement(MovementType::Sale, 500, PaymentMethod::Cash, None),
            movement(MovementType::Sale, 300, PaymentMethod::Card, None),
            movement(MovementType::Sale, 200, PaymentMethod::Transfer, None),
        ];

        let summary = summarize(&movements);
        assert_eq!(summary.total_sales_cents, 1000);
        assert_eq!(summary.cash_sales_cents, 500);
        assert_eq!(summary.card_sales_cents, 300);
        assert_eq!(summary.transfer_sales_cents, 200);
        assert_eq!(summary.other_sales_cents, 0);
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.completed_count, 3);
        assert_eq!(summary.cancelled_count, 0);
    }

    #[test]
    fn test_summarize_reversal_inverts_money_not_counts() {
        let movements = vec![
            movement(MovementType::Sale, 500, PaymentMethod::Cash, None),
            movement(
                MovementType::Sale,
                500,
                PaymentMethod::Cash,
                Some(REVERSAL_CATEGORY),
            ),
        ];

        let summary = summarize(&movements);
        assert_eq!(summary.total_sales_cents, 0);
        assert_eq!(summary.cash_sales_cents, 0);
        // The original sale still shows as activity.
        assert_eq!(summary.order_count, 1);
        assert_eq!(summary.completed_count, 1);
    }

    #[test]
    fn test_summarize_income_and_expense() {
        let movements = vec![
            movement(MovementType::Income, 250, PaymentMethod::Cash, Some(TIP_CATEGORY)),
            movement(MovementType::Income, 1000, PaymentMethod::Cash, Some("float-topup")),
            movement(MovementType::Expense, 400, PaymentMethod::Cash, Some("supplier")),
        ];

        let summary = summarize(&movements);
        assert_eq!(summary.tips_cents, 250);
        assert_eq!(summary.income_cents, 1000);
        assert_eq!(summary.expense_cents, 400);
        assert_eq!(summary.total_sales_cents, 0);
        assert_eq!(summary.order_count, 0);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let movements = vec![
            movement(MovementType::Sale, 500, PaymentMethod::Cash, None),
            movement(MovementType::Sale, 300, PaymentMethod::Card, None),
        ];

        let first = summarize(&movements);
        let second = summarize(&movements);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summarize_orders_window_and_status() {
        let window = DateRange::new(ts(100), ts(200));
        let orders = vec![
            order(500, 0, PaymentMethod::Cash, OrderStatus::Completed, 150),
            order(300, 50, PaymentMethod::Card, OrderStatus::Completed, 160),
            order(999, 0, PaymentMethod::Cash, OrderStatus::Cancelled, 170),
            order(100, 0, PaymentMethod::Cash, OrderStatus::Pending, 180),
            // Outside the window: ignored entirely.
            order(700, 0, PaymentMethod::Cash, OrderStatus::Completed, 250),
        ];

        let summary = summarize_orders(&orders, &window);
        assert_eq!(summary.total_sales_cents, 800);
        assert_eq!(summary.cash_sales_cents, 500);
        assert_eq!(summary.card_sales_cents, 300);
        assert_eq!(summary.tips_cents, 50);
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.cancelled_count, 1);
    }

    /// The two derivation paths agree for equivalent underlying facts:
    /// each completed order corresponds to a sale movement plus a tip
    /// income movement.
    #[test]
    fn test_paths_agree_for_equivalent_facts() {
        let window = DateRange::new(ts(100), ts(200));
        let orders = vec![
            order(500, 0, PaymentMethod::Cash, OrderStatus::Completed, 150),
            order(300, 50, PaymentMethod::Card, OrderStatus::Completed, 160),
        ];

        let movements = vec![
            movement(MovementType::Sale, 500, PaymentMethod::Cash, None),
            movement(MovementType::Sale, 300, PaymentMethod::Card, None),
            movement(MovementType::Income, 50, PaymentMethod::Card, Some(TIP_CATEGORY)),
        ];

        assert_eq!(summarize(&movements), summarize_orders(&orders, &window));
    }

    #[test]
    fn test_expected_summary_prefers_ledger() {
        let window = DateRange::new(ts(100), ts(200));
        let orders = vec![order(999, 0, PaymentMethod::Cash, OrderStatus::Completed, 150)];
        let movements = vec![movement(MovementType::Sale, 500, PaymentMethod::Cash, None)];

        let summary = expected_summary(&movements, Some(&orders), &window);
        assert_eq!(summary.total_sales_cents, 500);

        let fallback = expected_summary(&[], Some(&orders), &window);
        assert_eq!(fallback.total_sales_cents, 999);

        let empty = expected_summary(&[], None, &window);
        assert_eq!(empty, Summary::default());
    }
}
