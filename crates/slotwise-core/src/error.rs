//! # Error Types
//!
//! Domain-specific error types for slotwise-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  slotwise-core errors (this file)                                      │
//! │  ├── TimeError        - HH:MM parsing, minute ranges, slot bounds      │
//! │  ├── ValidationError  - Input-shape failures (before any transaction)  │
//! │  └── BookingError     - Closed taxonomy returned by the coordinator    │
//! │                                                                         │
//! │  slotwise-db errors (separate crate)                                   │
//! │  └── DbError          - Database failures, never leave slotwise-db     │
//! │                                                                         │
//! │  API mapping (api.rs)                                                  │
//! │  └── ApiError         - Stable code + message + HTTP status            │
//! │                                                                         │
//! │  Flow: TimeError → ValidationError → BookingError → ApiError           │
//! │        DbError ─────────────────────► BookingError                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity ID, conflicting key)
//! 3. Errors are enum variants, never String
//! 4. Callers match on variants, never on message text

use chrono::NaiveDate;
use thiserror::Error;

use crate::time::TimeOfDay;
use crate::types::StaffScope;

// =============================================================================
// Time Error
// =============================================================================

/// Time arithmetic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// Not a strict two-digit `HH:MM` string.
    #[error("invalid time '{0}': expected HH:MM")]
    InvalidFormat(String),

    /// Minute offset outside `0..1440`.
    #[error("minute offset {0} is outside 0..1440")]
    OutOfRange(i64),

    /// Slot grid step of zero minutes.
    #[error("slot interval must be greater than zero")]
    ZeroInterval,

    /// Service duration outside `1..=1440`.
    #[error("duration {0} minutes is outside 1..=1440")]
    DurationOutOfRange(i64),

    /// Booking would end after midnight.
    #[error("a {duration_minutes}-minute booking at {start} runs past midnight")]
    PastMidnight { start: String, duration_minutes: i64 },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when the request itself is malformed. They are
/// raised before a transaction is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Invalid format (e.g., malformed time).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Reservation date is strictly before today.
    #[error("{field} {date} is in the past (today is {today})")]
    DateInPast {
        field: String,
        date: NaiveDate,
        today: NaiveDate,
    },
}

impl ValidationError {
    /// Wraps a time error with the name of the offending field.
    pub fn time(field: impl Into<String>, err: TimeError) -> Self {
        match err {
            TimeError::DurationOutOfRange(_) => ValidationError::OutOfRange {
                field: field.into(),
                min: 1,
                max: i64::from(crate::time::MINUTES_PER_DAY),
            },
            other => ValidationError::InvalidFormat {
                field: field.into(),
                reason: other.to_string(),
            },
        }
    }
}

// =============================================================================
// Booking Error
// =============================================================================

/// The closed set of failures `create_reservation` can return.
///
/// ## Categories
/// ```text
/// input-shape     Validation(..)            rejected before BEGIN
/// referential     CustomerNotFound          detected inside the transaction
///                 ServiceNotFound
///                 StaffNotFound
///                 NoActiveStaff             auto-assign with an empty roster
/// conflict        TimeSlotConflict          re-check or unique index
/// infrastructure  TransientStoreError       connection, timeout, busy
///                 StoreFault                corrupt data, failed migration
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// Customer does not exist for the tenant.
    #[error("Customer not found: {customer_id}")]
    CustomerNotFound { customer_id: String },

    /// Service does not exist, belongs to another tenant, or is inactive.
    #[error("Service not found: {service_id}")]
    ServiceNotFound { service_id: String },

    /// Staff does not exist, belongs to another tenant, or is inactive.
    #[error("Staff not found: {staff_id}")]
    StaffNotFound { staff_id: String },

    /// Auto-assignment was requested but the tenant has no active staff.
    #[error("No active staff for tenant {tenant_id}")]
    NoActiveStaff { tenant_id: String },

    /// Requested interval overlaps an occupying reservation.
    ///
    /// `conflicting_reservation_id` is `None` when the conflict surfaced as a
    /// unique-index violation at insert time, or when auto-assignment found
    /// every staff member busy.
    #[error("Time slot {date} {time} is already taken for {scope}")]
    TimeSlotConflict {
        tenant_id: String,
        scope: StaffScope,
        date: NaiveDate,
        time: TimeOfDay,
        conflicting_reservation_id: Option<String>,
    },

    /// Infrastructure failure. Safe to retry.
    #[error("Transient store error: {reason}")]
    TransientStoreError { reason: String },

    /// The store is in a state retrying cannot fix (unreadable rows, schema
    /// out of date). Needs an operator.
    #[error("Store fault: {reason}")]
    StoreFault { reason: String },

    /// Malformed request.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl BookingError {
    /// Only infrastructure failures may be retried with the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::TransientStoreError { .. })
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        BookingError::TransientStoreError {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with BookingError.
pub type BookingResult<T> = Result<T, BookingError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BookingError::TimeSlotConflict {
            tenant_id: "t1".to_string(),
            scope: StaffScope::Staff("staff-a".to_string()),
            date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            time: "14:00".parse().unwrap(),
            conflicting_reservation_id: Some("r1".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Time slot 2030-05-01 14:00 is already taken for staff staff-a"
        );

        let err = BookingError::CustomerNotFound {
            customer_id: "c-404".to_string(),
        };
        assert_eq!(err.to_string(), "Customer not found: c-404");
    }

    #[test]
    fn test_only_transient_errors_are_retryable() {
        assert!(BookingError::transient("pool timed out").is_retryable());
        assert!(!BookingError::StaffNotFound {
            staff_id: "s".to_string()
        }
        .is_retryable());
        assert!(!BookingError::StoreFault {
            reason: "corrupt row".to_string()
        }
        .is_retryable());
        assert!(!BookingError::NoActiveStaff {
            tenant_id: "t".to_string()
        }
        .is_retryable());
        assert!(!BookingError::Validation(ValidationError::Required {
            field: "customer_id".to_string()
        })
        .is_retryable());
    }

    #[test]
    fn test_validation_converts_to_booking_error() {
        let validation_err = ValidationError::Required {
            field: "service_id".to_string(),
        };
        let err: BookingError = validation_err.into();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn test_time_error_carries_field_name() {
        let err = ValidationError::time("time", TimeError::InvalidFormat("9:30".to_string()));
        assert_eq!(
            err.to_string(),
            "time has invalid format: invalid time '9:30': expected HH:MM"
        );

        let err = ValidationError::time("duration", TimeError::DurationOutOfRange(0));
        assert!(matches!(err, ValidationError::OutOfRange { min: 1, max: 1440, .. }));
    }
}
