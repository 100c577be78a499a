//! # API Error Type
//!
//! Lossless translation of booking failures into what the HTTP layer sends.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Slotwise                               │
//! │                                                                         │
//! │  Coordinator                       HTTP layer (out of scope)            │
//! │  ───────────                       ─────────────────────────            │
//! │                                                                         │
//! │  BookingError::StaffNotFound ──┐                                        │
//! │  BookingError::TimeSlotConflict├──► ApiError ──► status + JSON body     │
//! │  UnavailableReason::NoFreeStaff┘                                        │
//! │                                                                         │
//! │  {                                                                      │
//! │    "code": "TIME_SLOT_CONFLICT",                                        │
//! │    "message": "Time slot 2030-05-01 14:00 is already taken for ...",    │
//! │    "status": 409                                                        │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;
use ts_rs::TS;

use crate::error::{BookingError, ValidationError};
use crate::schedule::UnavailableReason;

/// Error payload returned to the booking pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// HTTP status the caller should answer with
    pub status: u16,
}

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Customer missing (404)
    CustomerNotFound,

    /// Service missing or inactive (404)
    ServiceNotFound,

    /// Staff missing or inactive (404)
    StaffNotFound,

    /// Tenant has no active staff to assign (404)
    NoActiveStaff,

    /// Every active staff member is busy (409)
    NoFreeStaff,

    /// Requested interval is taken (409)
    TimeSlotConflict,

    /// Malformed request (400)
    ValidationError,

    /// Requested date is before today (400)
    PastDate,

    /// Infrastructure failure, retryable (500)
    TransientStoreError,

    /// Store needs an operator, not a retry (500)
    InternalError,
}

impl ErrorCode {
    /// Recommended HTTP status for this code.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::CustomerNotFound
            | ErrorCode::ServiceNotFound
            | ErrorCode::StaffNotFound
            | ErrorCode::NoActiveStaff => 404,
            ErrorCode::NoFreeStaff | ErrorCode::TimeSlotConflict => 409,
            ErrorCode::ValidationError | ErrorCode::PastDate => 400,
            ErrorCode::TransientStoreError | ErrorCode::InternalError => 500,
        }
    }
}

impl ApiError {
    /// Creates a new API error with the code's default status.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            status: code.http_status(),
        }
    }
}

/// Converts booking errors to API errors.
impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        let code = match &err {
            BookingError::CustomerNotFound { .. } => ErrorCode::CustomerNotFound,
            BookingError::ServiceNotFound { .. } => ErrorCode::ServiceNotFound,
            BookingError::StaffNotFound { .. } => ErrorCode::StaffNotFound,
            BookingError::NoActiveStaff { .. } => ErrorCode::NoActiveStaff,
            BookingError::TimeSlotConflict { .. } => ErrorCode::TimeSlotConflict,
            BookingError::Validation(ValidationError::DateInPast { .. }) => ErrorCode::PastDate,
            BookingError::Validation(_) => ErrorCode::ValidationError,
            // slotwise-db already logged the reason; keep it off the wire
            BookingError::TransientStoreError { .. } => {
                return ApiError::new(
                    ErrorCode::TransientStoreError,
                    "Booking is temporarily unavailable, please retry",
                );
            }
            BookingError::StoreFault { .. } => {
                return ApiError::new(ErrorCode::InternalError, "Booking failed due to an internal error");
            }
        };

        ApiError::new(code, err.to_string())
    }
}

/// Converts resolver outcomes to API errors.
impl From<UnavailableReason> for ApiError {
    fn from(reason: UnavailableReason) -> Self {
        match reason {
            UnavailableReason::NoActiveStaff => {
                ApiError::new(ErrorCode::NoActiveStaff, "No active staff are available for booking")
            }
            UnavailableReason::NoFreeStaff => {
                ApiError::new(ErrorCode::NoFreeStaff, "All staff are booked at the requested time")
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
