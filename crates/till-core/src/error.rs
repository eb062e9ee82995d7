//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Conflict / invalid-state / not-found           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - Infrastructure failures, wraps CoreError       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (register id, session id, status)
//! 3. Errors are enum variants, never String
//! 4. None of these are retried automatically: retrying a financial mutation
//!    risks double-application. Only the db layer's transient kinds are
//!    retry-safe.

use thiserror::Error;

use crate::types::SessionStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are returned synchronously to the caller and never retried by this
/// crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A session is already open on the register.
    ///
    /// ## When This Occurs
    /// - `open` called while another session holds the register's open slot
    /// - Two concurrent openers race; exactly one wins, the other gets this
    #[error("Register {register_id} already has open session {session_id}")]
    SessionAlreadyOpen {
        register_id: String,
        session_id: String,
    },

    /// Session is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Closing an already-closed session
    /// - Any mutation other than note-append against a closed session
    #[error("Session {session_id} is {current_status:?}, cannot perform operation")]
    InvalidSessionStatus {
        session_id: String,
        current_status: SessionStatus,
    },

    /// A movement was recorded with no open session on the register.
    ///
    /// A movement cannot exist outside an open-to-close cycle.
    #[error("Register {register_id} has no open session")]
    NoOpenSession { register_id: String },

    /// Register cannot be found.
    #[error("Register not found: {0}")]
    RegisterNotFound(String),

    /// Session cannot be found.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Register exists but has been deactivated.
    #[error("Register {0} is inactive")]
    RegisterInactive(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
