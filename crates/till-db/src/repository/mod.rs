//! # Repository Module
//!
//! Database repository implementations for the Till reconciliation engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.sessions().close(id, counted, "user-7", None)              │
//! │       ▼                                                                 │
//! │  SessionRepository                                                     │
//! │  ├── open(&self, register_id, initial_cash, opened_by, notes)          │
//! │  ├── close(&self, session_id, counted, closed_by, notes)               │
//! │  └── get_open(&self, register_id)                                      │
//! │       │                                                                 │
//! │       │  SQL (transactions where the operation demands atomicity)      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • The pure math in till-core never touches a connection               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`register::RegisterRepository`] - Register configuration
//! - [`session::SessionRepository`] - Open/close lifecycle and reconciliation
//! - [`movement::MovementRepository`] - Append-only movement ledger
//! - [`report::ReportRepository`] - Historical reporting

pub mod movement;
pub mod register;
pub mod report;
pub mod session;
