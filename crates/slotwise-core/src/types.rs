//! # Domain Types
//!
//! Core domain types used throughout Slotwise.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │  Service (Menu) │   │     Staff       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  tenant_id      │   │  duration_min   │   │  is_active      │       │
//! │  │  email          │   │  is_active      │   │  created_at     │       │
//! │  └────────┬────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │           │                     │                     │ (nullable)     │
//! │           └──────────┬──────────┴─────────────────────┘                │
//! │                      ▼                                                  │
//! │            ┌─────────────────────┐      ┌─────────────────────┐        │
//! │            │    Reservation      │      │ ReservationStatus   │        │
//! │            │  ─────────────────  │      │  ─────────────────  │        │
//! │            │  reserved_date      │      │  PENDING   ┐occupy  │        │
//! │            │  reserved_time      │      │  CONFIRMED ┘        │        │
//! │            │  status             │      │  CANCELLED          │        │
//! │            └─────────────────────┘      │  COMPLETED          │        │
//! │                                         │  NO_SHOW            │        │
//! │                                         └─────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Customers, services and staff are owned by the surrounding CRUD layer;
//! the engine only reads them.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::time::TimeOfDay;

// =============================================================================
// Customer
// =============================================================================

/// A customer who can hold reservations.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Confirmation emails go here when present.
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Service (Menu)
// =============================================================================

/// A bookable service. Its duration defines how long a reservation occupies
/// the staff member.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Service {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Length of one booking in minutes.
    pub duration_minutes: i64,
    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
    /// Inactive services cannot be booked.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Staff
// =============================================================================

/// A staff member reservations can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Staff {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Inactive staff are never assigned.
    pub is_active: bool,
    /// Auto-assignment walks staff in creation order.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reservation Status
// =============================================================================

/// The status of a reservation.
///
/// Only `Pending` and `Confirmed` occupy the staff member's time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl ReservationStatus {
    /// Statuses that block the slot for other bookings.
    pub const OCCUPYING: [ReservationStatus; 2] =
        [ReservationStatus::Pending, ReservationStatus::Confirmed];

    /// Whether a reservation in this status blocks its interval.
    pub fn is_occupying(&self) -> bool {
        Self::OCCUPYING.contains(self)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::NoShow => "NO_SHOW",
        }
    }
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Pending
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A reservation of one service, for one customer, at one date and time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reservation {
    pub id: String,
    pub tenant_id: String,
    pub customer_id: String,
    pub service_id: String,
    /// `None` places the reservation in the unassigned pool.
    pub staff_id: Option<String>,
    #[ts(as = "String")]
    pub reserved_date: NaiveDate,
    #[ts(type = "string")]
    pub reserved_time: TimeOfDay,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// The conflict scope this reservation lives in.
    pub fn scope(&self) -> StaffScope {
        StaffScope::from(self.staff_id.clone())
    }
}

// =============================================================================
// Staff Scope
// =============================================================================

/// Which set of reservations a booking must not overlap.
///
/// ```text
/// Staff("s-1")  → PENDING/CONFIRMED rows with staff_id = 's-1'
/// Pool          → PENDING/CONFIRMED rows with staff_id IS NULL
/// AnyStaff      → auto-assignment found every active staff member busy
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffScope {
    Staff(String),
    Pool,
    /// Only ever reported in conflicts, never locked or stored.
    AnyStaff,
}

impl StaffScope {
    /// Sentinel used for the unassigned pool in lock keys and unique indexes.
    pub const POOL_KEY: &'static str = "*";

    /// Sentinel for [`StaffScope::AnyStaff`]. No lock row is ever written with it.
    pub const ANY_STAFF_KEY: &'static str = "+";

    /// Key used by the per-(tenant, staff, date) lock row.
    pub fn key(&self) -> &str {
        match self {
            StaffScope::Staff(id) => id,
            StaffScope::Pool => Self::POOL_KEY,
            StaffScope::AnyStaff => Self::ANY_STAFF_KEY,
        }
    }

    pub fn staff_id(&self) -> Option<&str> {
        match self {
            StaffScope::Staff(id) => Some(id),
            StaffScope::Pool | StaffScope::AnyStaff => None,
        }
    }
}

impl From<Option<String>> for StaffScope {
    fn from(staff_id: Option<String>) -> Self {
        staff_id.map_or(StaffScope::Pool, StaffScope::Staff)
    }
}

impl fmt::Display for StaffScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffScope::Staff(id) => write!(f, "staff {}", id),
            StaffScope::Pool => write!(f, "the unassigned pool"),
            StaffScope::AnyStaff => write!(f, "every active staff member"),
        }
    }
}

// =============================================================================
// Staff Choice
// =============================================================================

/// How the customer picked (or did not pick) a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffChoice {
    /// Book this staff member or fail.
    Specific(String),
    /// Let the engine pick the first free active staff member.
    AutoAssign,
    /// Book into the unassigned pool.
    Unassigned,
}

impl From<Option<String>> for StaffChoice {
    fn from(staff_id: Option<String>) -> Self {
        staff_id.map_or(StaffChoice::AutoAssign, StaffChoice::Specific)
    }
}

impl Default for StaffChoice {
    fn default() -> Self {
        StaffChoice::AutoAssign
    }
}

// =============================================================================
// Create Reservation Request
// =============================================================================

/// Input to the reservation coordinator.
///
/// `time` stays a raw string here; the coordinator parses it before opening
/// a transaction so malformed input never reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservation {
    pub tenant_id: String,
    pub customer_id: String,
    pub service_id: String,
    #[serde(default)]
    pub staff: StaffChoice,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_and_confirmed_occupy() {
        assert!(ReservationStatus::Pending.is_occupying());
        assert!(ReservationStatus::Confirmed.is_occupying());
        assert!(!ReservationStatus::Cancelled.is_occupying());
        assert!(!ReservationStatus::Completed.is_occupying());
        assert!(!ReservationStatus::NoShow.is_occupying());
    }

    #[test]
    fn test_status_serializes_like_storage() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
            ReservationStatus::Completed,
            ReservationStatus::NoShow,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_staff_scope_keys() {
        assert_eq!(StaffScope::from(None).key(), "*");
        assert_eq!(StaffScope::from(Some("s-1".to_string())).key(), "s-1");
        assert_eq!(StaffScope::Pool.staff_id(), None);
        assert_eq!(StaffScope::Pool.to_string(), "the unassigned pool");
    }

    #[test]
    fn test_missing_staff_means_auto_assign() {
        assert_eq!(StaffChoice::from(None), StaffChoice::AutoAssign);
        assert_eq!(
            StaffChoice::from(Some("s-1".to_string())),
            StaffChoice::Specific("s-1".to_string())
        );
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: CreateReservation = serde_json::from_str(
            r#"{
                "tenant_id": "t",
                "customer_id": "c",
                "service_id": "m",
                "date": "2030-01-15",
                "time": "10:30"
            }"#,
        )
        .unwrap();
        assert_eq!(req.staff, StaffChoice::AutoAssign);
        assert_eq!(req.notes, None);
    }
}
