//! # Validation Module
//!
//! Input-shape checks the coordinator runs before it opens a transaction.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Booking page (out of scope)                                  │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (cheap, local, no I/O)                           │
//! │  ├── ids present and bounded                                           │
//! │  ├── time is strict HH:MM                                              │
//! │  ├── date not before today                                             │
//! │  └── notes ≤ 500 characters                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Transaction (slotwise-db)                                    │
//! │  ├── customer / service / staff exist and are active                   │
//! │  ├── conflict re-check                                                 │
//! │  └── partial UNIQUE index on the slot key                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use slotwise_core::validation::{validate_id, validate_notes};
//!
//! validate_id("customer_id", "550e8400-e29b-41d4-a716-446655440000").unwrap();
//! assert_eq!(validate_notes(Some("  ")).unwrap(), None);
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::time::TimeOfDay;
use crate::{MAX_ID_LENGTH, MAX_NOTES_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity reference (tenant, customer, service, staff).
///
/// ## Rules
/// - Must not be blank
/// - At most 64 characters (counted as chars, not bytes)
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.chars().count() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    Ok(())
}

/// Validates free-text notes.
///
/// ## Rules
/// - Optional; blank notes become `None`
/// - At most 500 characters (counted as chars, not bytes)
///
/// ## Returns
/// The trimmed notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LENGTH,
        });
    }

    Ok(Some(notes.to_string()))
}

/// Parses the requested start time.
pub fn validate_time(time: &str) -> ValidationResult<TimeOfDay> {
    time.parse()
        .map_err(|e| ValidationError::time("time", e))
}

// =============================================================================
// Date Validators
// =============================================================================

/// Rejects dates strictly before `today`. Today itself is bookable.
pub fn validate_reservation_date(date: NaiveDate, today: NaiveDate) -> ValidationResult<()> {
    if date < today {
        return Err(ValidationError::DateInPast {
            field: "date".to_string(),
            date,
            today,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("customer_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("customer_id", "c-1").is_ok());

        assert!(matches!(
            validate_id("customer_id", "   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_id("customer_id", &"x".repeat(65)),
            Err(ValidationError::TooLong { max: 64, .. })
        ));
    }

    #[test]
    fn test_validate_id_counts_chars() {
        // 64 chars, 128 bytes
        assert!(validate_id("staff_id", &"é".repeat(64)).is_ok());
        assert!(matches!(
            validate_id("staff_id", &"é".repeat(65)),
            Err(ValidationError::TooLong { max: 64, .. })
        ));
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes(None).unwrap(), None);
        assert_eq!(validate_notes(Some("")).unwrap(), None);
        assert_eq!(
            validate_notes(Some("  window seat  ")).unwrap(),
            Some("window seat".to_string())
        );
        assert!(validate_notes(Some(&"あ".repeat(500))).is_ok());
        assert!(validate_notes(Some(&"a".repeat(501))).is_err());
    }

    #[test]
    fn test_validate_time() {
        assert_eq!(validate_time("09:30").unwrap().minutes(), 570);
        let err = validate_time("9:30").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "time"));
    }

    #[test]
    fn test_validate_reservation_date() {
        let today = NaiveDate::from_ymd_opt(2030, 6, 15).unwrap();
        assert!(validate_reservation_date(today, today).is_ok());
        assert!(validate_reservation_date(today.succ_opt().unwrap(), today).is_ok());
        assert!(matches!(
            validate_reservation_date(today.pred_opt().unwrap(), today),
            Err(ValidationError::DateInPast { .. })
        ));
    }
}
