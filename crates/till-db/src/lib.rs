//! # till-db: Database Layer for the Till Reconciliation Engine
//!
//! This crate provides database access and the session state machine for the
//! register-reconciliation core. It uses SQLite for local storage with sqlx
//! for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Till Data Flow                                │
//! │                                                                         │
//! │  Platform request handler (open register, record sale, close out)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (session.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SessionRepo   │    │ 001_init.sql │  │   │
//! │  │   │ RegisterEvents│    │ MovementRepo  │    │              │  │   │
//! │  │   │               │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, partial unique index guarding the          │
//! │  single-open-session invariant)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (session, movement, ...)
//! - [`events`] - Change-notification broadcast feed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//! use till_core::{CountedAmounts, MovementType, NewMovement, PaymentMethod};
//!
//! let db = Database::new(DbConfig::new("path/to/till.db")).await?;
//!
//! let register = db.registers().create("tenant-1", "branch-1", "Front counter").await?;
//! let session = db.sessions().open(&register.id, 10_000, "user-7", None).await?;
//!
//! db.movements().record(&register.id, NewMovement {
//!     movement_type: MovementType::Sale,
//!     amount_cents: 550,
//!     payment_method: PaymentMethod::Cash,
//!     category: None,
//!     description: "Order 42".into(),
//!     order_id: Some("order-42".into()),
//! }).await?;
//!
//! let counted = CountedAmounts { cash_cents: 10_550, ..Default::default() };
//! let closed = db.sessions().close(&session.id, counted, "user-7", None).await?;
//! assert_eq!(closed.difference_cents, Some(0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use events::{RegisterEvent, RegisterEvents};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::movement::{MovementFilter, MovementRepository};
pub use repository::register::RegisterRepository;
pub use repository::report::ReportRepository;
pub use repository::session::SessionRepository;
