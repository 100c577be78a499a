//! # Availability Resolver
//!
//! Read-only answers to "who can take this booking" and "which start times
//! can the booking page offer". Everything here is advisory: the answers can
//! be stale by the time a reservation transaction runs, and the coordinator's
//! in-transaction re-check is what guarantees correctness.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  find_available_staff(conn, tenant, date, 14:00, 60)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  staff::list_active         ← creation order (created_at, id)           │
//! │       │                                                                 │
//! │       ▼  per staff member                                               │
//! │  reservation::occupied_for_scope  ← PENDING/CONFIRMED + durations       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  schedule::assign           ← first staff with no overlap               │
//! │       │                                                                 │
//! │       ├── Assigned(staff_id)                                            │
//! │       ├── Unavailable(NoActiveStaff)                                    │
//! │       └── Unavailable(NoFreeStaff)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{reservation, staff};
use slotwise_core::schedule::{assign, find_conflict, StaffSchedule};
use slotwise_core::time::Slot;
use slotwise_core::{
    Assignment, BookingError, BookingResult, BusinessHours, StaffChoice, StaffScope, TimeOfDay,
    UnavailableReason, ValidationError,
};

/// Builds the interval a booking of `duration_minutes` at `time` occupies.
pub(crate) fn requested_slot(time: TimeOfDay, duration_minutes: i64) -> BookingResult<Slot> {
    Ok(Slot::starting_at(time, duration_minutes).map_err(|e| ValidationError::time("time", e))?)
}

/// Loads every active staff member with their occupied slots for `date`.
pub async fn load_roster(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    date: NaiveDate,
) -> DbResult<Vec<StaffSchedule>> {
    let active = staff::list_active(conn, tenant_id).await?;
    let mut roster = Vec::with_capacity(active.len());

    for member in active {
        let scope = StaffScope::Staff(member.id);
        let occupied = reservation::occupied_for_scope(conn, tenant_id, date, &scope).await?;
        if let StaffScope::Staff(staff_id) = scope {
            roster.push(StaffSchedule { staff_id, occupied });
        }
    }

    Ok(roster)
}

/// Picks the first active staff member (creation order) free for the
/// requested interval.
///
/// Distinguishes a tenant with no active staff (`NoActiveStaff`) from one
/// whose staff are all busy (`NoFreeStaff`).
pub async fn find_available_staff(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    date: NaiveDate,
    time: TimeOfDay,
    duration_minutes: i64,
) -> BookingResult<Assignment> {
    let requested = requested_slot(time, duration_minutes)?;
    let roster = load_roster(conn, tenant_id, date).await?;

    let assignment = assign(&requested, &roster);
    debug!(
        tenant_id = %tenant_id,
        date = %date,
        time = %time,
        staff_checked = roster.len(),
        ?assignment,
        "Resolved staff availability"
    );

    Ok(assignment)
}

/// Start times the booking page can offer for a service of
/// `duration_minutes` on `date`.
///
/// ## Per Staff Choice
/// - `Specific(id)`: grid slots that don't overlap that staff member's bookings
/// - `Unassigned`: same, against the unassigned pool
/// - `AutoAssign`: grid slots where at least one active staff member is free;
///   a tenant with no active staff gets `BookingError::NoActiveStaff`, the same
///   answer `create_reservation` gives
pub async fn available_slots(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    date: NaiveDate,
    hours: &BusinessHours,
    duration_minutes: i64,
    choice: &StaffChoice,
) -> BookingResult<Vec<TimeOfDay>> {
    let candidates = hours
        .candidate_slots(duration_minutes)
        .map_err(|e| ValidationError::time("duration_minutes", e))?;

    let scope = match choice {
        StaffChoice::Specific(id) => StaffScope::Staff(id.clone()),
        StaffChoice::Unassigned => StaffScope::Pool,
        StaffChoice::AutoAssign => {
            let roster = load_roster(conn, tenant_id, date).await?;
            if roster.is_empty() {
                debug!(tenant_id = %tenant_id, reason = ?UnavailableReason::NoActiveStaff, "No slots to offer");
                return Err(BookingError::NoActiveStaff {
                    tenant_id: tenant_id.to_string(),
                });
            }
            return Ok(candidates
                .iter()
                .filter(|slot| matches!(assign(slot, &roster), Assignment::Assigned(_)))
                .map(Slot::start_time)
                .collect());
        }
    };

    let occupied = reservation::occupied_for_scope(conn, tenant_id, date, &scope).await?;

    Ok(candidates
        .iter()
        .filter(|slot| find_conflict(slot, &occupied).is_none())
        .map(Slot::start_time)
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
