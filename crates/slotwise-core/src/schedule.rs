//! # Schedule Rules
//!
//! Pure decisions the availability resolver and the coordinator share:
//! which occupied slot a request collides with, which staff member gets an
//! unassigned booking, and which grid slots a booking page may offer.
//!
//! ## Auto-Assignment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request: 14:00, 60 min                                                 │
//! │                                                                         │
//! │  roster (creation order)     occupied               verdict             │
//! │  ───────────────────────     ─────────────────      ─────────           │
//! │  staff A                     [14:00, 15:00)         overlaps → skip     │
//! │  staff B                     (none)                 free → Assigned(B)  │
//! │  staff C                     ...                    never inspected     │
//! │                                                                         │
//! │  empty roster        → Unavailable(NoActiveStaff)   (configuration)     │
//! │  everyone overlaps   → Unavailable(NoFreeStaff)     (capacity)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TimeError;
use crate::time::{is_break_minute, slot_grid, Slot, TimeOfDay, DEFAULT_SLOT_INTERVAL_MINUTES};

// =============================================================================
// Occupied Slots
// =============================================================================

/// An existing occupying reservation reduced to its interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupied {
    pub reservation_id: String,
    pub slot: Slot,
}

/// Returns the first occupied slot that overlaps `requested`.
pub fn find_conflict<'a>(requested: &Slot, occupied: &'a [Occupied]) -> Option<&'a Occupied> {
    occupied.iter().find(|o| o.slot.overlaps(requested))
}

/// One staff member and the slots already booked for them on a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffSchedule {
    pub staff_id: String,
    pub occupied: Vec<Occupied>,
}

// =============================================================================
// Assignment
// =============================================================================

/// Why no staff member could take a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnavailableReason {
    /// The tenant has no active staff at all.
    NoActiveStaff,
    /// Active staff exist but every one of them is busy.
    NoFreeStaff,
}

/// Outcome of staff auto-assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Assigned(String),
    Unavailable(UnavailableReason),
}

/// Picks the first staff member in `roster` order with no overlap.
pub fn assign(requested: &Slot, roster: &[StaffSchedule]) -> Assignment {
    if roster.is_empty() {
        return Assignment::Unavailable(UnavailableReason::NoActiveStaff);
    }

    roster
        .iter()
        .find(|s| find_conflict(requested, &s.occupied).is_none())
        .map(|s| Assignment::Assigned(s.staff_id.clone()))
        .unwrap_or(Assignment::Unavailable(UnavailableReason::NoFreeStaff))
}

// =============================================================================
// Business Hours
// =============================================================================

/// Opening hours used to build the slot grid for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub open: TimeOfDay,
    pub close: TimeOfDay,
    /// Grid step in minutes.
    pub slot_interval_minutes: u16,
    /// Optional daily break, half-open.
    pub break_time: Option<(TimeOfDay, TimeOfDay)>,
}

impl BusinessHours {
    pub fn new(open: TimeOfDay, close: TimeOfDay) -> Self {
        BusinessHours {
            open,
            close,
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            break_time: None,
        }
    }

    pub fn with_interval(mut self, minutes: u16) -> Self {
        self.slot_interval_minutes = minutes;
        self
    }

    pub fn with_break(mut self, start: TimeOfDay, end: TimeOfDay) -> Self {
        self.break_time = Some((start, end));
        self
    }

    /// Grid slots a booking of `duration_minutes` could start at.
    ///
    /// ## Dropped Slots
    /// - start inside the break
    /// - booking would run into the break
    /// - booking would end after closing time (or past midnight)
    pub fn candidate_slots(&self, duration_minutes: i64) -> Result<Vec<Slot>, TimeError> {
        let mut slots = Vec::new();

        for start in slot_grid(self.open, self.close, self.slot_interval_minutes)? {
            let slot = match Slot::starting_at(start, duration_minutes) {
                Ok(slot) => slot,
                Err(TimeError::PastMidnight { .. }) => continue,
                Err(e) => return Err(e),
            };

            if slot.end > self.close.minutes() {
                continue;
            }

            if let Some((break_start, break_end)) = self.break_time {
                let starts_in_break =
                    is_break_minute(slot.start, break_start.minutes(), break_end.minutes());
                let runs_into_break =
                    break_start < break_end && slot.overlaps(&Slot::between(break_start, break_end));
                if starts_in_break || runs_into_break {
                    continue;
                }
            }

            slots.push(slot);
        }

        Ok(slots)
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        BusinessHours::new(
            TimeOfDay::from_hm(9, 0).unwrap_or(TimeOfDay::MIDNIGHT),
            TimeOfDay::from_hm(18, 0).unwrap_or(TimeOfDay::MIDNIGHT),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
