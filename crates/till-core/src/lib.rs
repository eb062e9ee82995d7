//! # till-core: Pure Business Logic for the Till Reconciliation Engine
//!
//! This crate is the **heart** of the register-reconciliation core. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Restaurant Platform Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Platform (orders, products, tenants, UI)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 ★ till-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │   money   │  │ aggregator │  │ reconcile │ │   │
//! │  │   │  Session  │  │   Money   │  │  Summary   │  │ variance  │ │   │
//! │  │   │  Movement │  │  (cents)  │  │  buckets   │  │  status   │ │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Database Layer)                     │   │
//! │  │          SQLite queries, migrations, session lifecycle          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Register, Session, Movement, Summary, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`aggregator`] - Pure summarization of a session window
//! - [`reconcile`] - Expected-vs-counted variance computation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::aggregator::summarize;
//! use till_core::reconcile::{reconcile, ReconciliationStatus};
//! use till_core::types::CountedAmounts;
//!
//! // No movements recorded: the drawer should hold exactly the float.
//! let summary = summarize(&[]);
//! let counted = CountedAmounts { cash_cents: 1000, ..Default::default() };
//!
//! let result = reconcile(1000, &summary, &counted);
//! assert_eq!(result.status, ReconciliationStatus::Balanced);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregator;
pub mod error;
pub mod money;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use till_core::Money` instead of
// `use till_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconcile::{MethodDeltas, Reconciliation, ReconciliationStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Category tag marking a movement as the correction of an earlier one.
///
/// Movements are append-only; there is no update or delete. A mistake is
/// corrected by recording a second movement with the same positive amount
/// and this tag, which the aggregator treats as the inverse sign.
pub const REVERSAL_CATEGORY: &str = "reversal";

/// Category tag marking an income movement as a received tip.
///
/// Keeps the ledger path and the order-fallback path aligned on the tips
/// bucket: order handlers record the order total as a sale movement and the
/// tip as a separate income movement with this tag.
pub const TIP_CATEGORY: &str = "tip";

/// Maximum length of a movement description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Maximum accumulated length of a session's notes field.
pub const MAX_NOTE_LENGTH: usize = 4000;
