//! # Validation Module
//!
//! Input validation for ledger and lifecycle operations.
//!
//! Validation runs before any business logic or I/O: a movement with a
//! non-positive amount, a negative counted figure, or a malformed id never
//! reaches the database. The persistence layer's constraints back these
//! checks up, but callers see the typed [`ValidationError`] first.

use crate::error::ValidationError;
use crate::types::CountedAmounts;
use crate::{MAX_DESCRIPTION_LENGTH, MAX_NOTE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Monetary Validators
// =============================================================================

/// Validates a movement amount in cents.
///
/// ## Rules
/// - Must be strictly positive (> 0)
/// - Corrections never use negative amounts; they are reversal-tagged
///   movements with positive amounts
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents(550).is_ok());
/// assert!(validate_amount_cents(0).is_err());
/// assert!(validate_amount_cents(-5).is_err());
/// ```
pub fn validate_amount_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a cash figure that may legitimately be zero.
///
/// Used for the opening float and each counted amount: an empty drawer is a
/// valid count, a negative one is not.
pub fn validate_cash_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the full counted set entered at close time.
pub fn validate_counted(counted: &CountedAmounts) -> ValidationResult<()> {
    validate_cash_cents("counted cash", counted.cash_cents)?;
    validate_cash_cents("counted card", counted.card_cents)?;
    validate_cash_cents("counted transfer", counted.transfer_cents)?;
    validate_cash_cents("counted other", counted.other_cents)?;
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates the opaque actor identifier for `opened_by`/`closed_by`.
///
/// The identity collaborator owns resolution; here we only require the id to
/// be present.
pub fn validate_actor(field: &str, actor: &str) -> ValidationResult<()> {
    if actor.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a movement description.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 500 characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    Ok(())
}

/// Validates a session note (may be empty; bounded).
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.len() > MAX_NOTE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTE_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents(1).is_ok());
        assert!(validate_amount_cents(1099).is_ok());

        assert!(validate_amount_cents(0).is_err());
        assert!(validate_amount_cents(-5).is_err());
    }

    #[test]
    fn test_validate_cash_cents() {
        assert!(validate_cash_cents("initial cash", 0).is_ok());
        assert!(validate_cash_cents("initial cash", 10000).is_ok());
        assert!(validate_cash_cents("initial cash", -1).is_err());
    }

    #[test]
    fn test_validate_counted() {
        let ok = CountedAmounts {
            cash_cents: 1500,
            card_cents: 300,
            transfer_cents: 0,
            other_cents: 0,
        };
        assert!(validate_counted(&ok).is_ok());

        let bad = CountedAmounts {
            card_cents: -300,
            ..ok
        };
        assert!(validate_counted(&bad).is_err());
    }

    #[test]
    fn test_validate_actor() {
        assert!(validate_actor("opened_by", "user-77").is_ok());
        assert!(validate_actor("opened_by", "").is_err());
        assert!(validate_actor("opened_by", "   ").is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Lunch order 42").is_ok());
        assert!(validate_description("").is_err());
        assert!(validate_description(&"A".repeat(600)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }
}
