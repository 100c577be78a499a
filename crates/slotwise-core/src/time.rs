//! # Time Arithmetic
//!
//! Wall-clock parsing, minute offsets, half-open interval overlap and slot
//! grids. Everything here is pure.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Time-of-Day Representation                          │
//! │                                                                         │
//! │  External (API, DB column)       Internal (all arithmetic)              │
//! │  ─────────────────────────       ─────────────────────────              │
//! │  "09:30"  ── parse_time ──►      TimeOfDay(570)                         │
//! │           ◄─ from_minutes ──                                            │
//! │                                                                         │
//! │  A booking occupies a Slot: [start, start + duration)                   │
//! │                                                                         │
//! │  09:00        10:00        11:00                                        │
//! │    ├────A─────┤                                                         │
//! │               ├────B─────┤    A and B touch, they do NOT overlap        │
//! │         ├────C─────┤          A and C overlap                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Strings are parsed once at the boundary into [`TimeOfDay`] so the
//! coordinator and resolver never re-parse or re-format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimeError;

/// Minutes in one calendar day. Valid offsets are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Default step of the slot grid shown on booking pages.
pub const DEFAULT_SLOT_INTERVAL_MINUTES: u16 = 30;

// =============================================================================
// String-Level Functions
// =============================================================================

/// Parses a strict two-digit `HH:MM` string.
///
/// ## Rules
/// - Exactly five characters, `:` in the middle
/// - Hour 00–23, minute 00–59
/// - `"9:30"`, `"009:30"`, `"24:00"`, `"12:60"` all fail
///
/// ## Example
/// ```rust
/// use slotwise_core::time::parse_time;
///
/// assert_eq!(parse_time("09:30").unwrap(), (9, 30));
/// assert!(parse_time("9:30").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<(u8, u8), TimeError> {
    let bytes = s.as_bytes();
    let invalid = || TimeError::InvalidFormat(s.to_string());

    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }

    let digit = |b: u8| -> Result<u8, TimeError> {
        if b.is_ascii_digit() {
            Ok(b - b'0')
        } else {
            Err(invalid())
        }
    };

    let hour = digit(bytes[0])? * 10 + digit(bytes[1])?;
    let minute = digit(bytes[3])? * 10 + digit(bytes[4])?;

    if hour > 23 || minute > 59 {
        return Err(invalid());
    }

    Ok((hour, minute))
}

/// Converts `HH:MM` to a minute offset from midnight.
pub fn to_minutes(s: &str) -> Result<u16, TimeError> {
    let (hour, minute) = parse_time(s)?;
    Ok(u16::from(hour) * 60 + u16::from(minute))
}

/// Formats a minute offset as `HH:MM`.
///
/// Fails for offsets below zero or at/after midnight (`>= 1440`).
pub fn from_minutes(minutes: i64) -> Result<String, TimeError> {
    if !(0..i64::from(MINUTES_PER_DAY)).contains(&minutes) {
        return Err(TimeError::OutOfRange(minutes));
    }
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

/// Half-open interval overlap: `[start_a, end_a)` and `[start_b, end_b)`.
///
/// Back-to-back intervals (`end_a == start_b`) do not overlap.
#[inline]
pub fn overlaps(start_a: u16, end_a: u16, start_b: u16, end_b: u16) -> bool {
    start_a < end_b && start_b < end_a
}

/// True iff `break_start <= time < break_end`.
pub fn is_break_time(time: &str, break_start: &str, break_end: &str) -> Result<bool, TimeError> {
    Ok(is_break_minute(
        to_minutes(time)?,
        to_minutes(break_start)?,
        to_minutes(break_end)?,
    ))
}

/// Minute-level form of [`is_break_time`].
#[inline]
pub fn is_break_minute(minute: u16, break_start: u16, break_end: u16) -> bool {
    break_start <= minute && minute < break_end
}

/// Generates the `HH:MM` grid from `open` (inclusive) to `close` (exclusive).
///
/// ## Example
/// ```rust
/// use slotwise_core::time::generate_slots;
///
/// let slots = generate_slots("09:00", "10:30", 30).unwrap();
/// assert_eq!(slots, vec!["09:00", "09:30", "10:00"]);
/// ```
pub fn generate_slots(open: &str, close: &str, interval_minutes: u16) -> Result<Vec<String>, TimeError> {
    let open = TimeOfDay::from_str(open)?;
    let close = TimeOfDay::from_str(close)?;
    Ok(slot_grid(open, close, interval_minutes)?
        .map(|t| t.to_string())
        .collect())
}

/// Iterator form of [`generate_slots`]. Each call yields a fresh grid.
pub fn slot_grid(
    open: TimeOfDay,
    close: TimeOfDay,
    interval_minutes: u16,
) -> Result<impl Iterator<Item = TimeOfDay>, TimeError> {
    if interval_minutes == 0 {
        return Err(TimeError::ZeroInterval);
    }
    Ok((open.minutes()..close.minutes())
        .step_by(usize::from(interval_minutes))
        .map(TimeOfDay))
}

// =============================================================================
// TimeOfDay
// =============================================================================

/// A wall-clock time with minute precision, stored as a minute offset.
///
/// Serializes as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight (`00:00`).
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Creates a time from a minute offset in `0..1440`.
    pub fn from_minutes(minutes: u16) -> Result<Self, TimeError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(TimeError::OutOfRange(i64::from(minutes)));
        }
        Ok(TimeOfDay(minutes))
    }

    /// Creates a time from hour and minute components.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, TimeError> {
        if hour > 23 || minute > 59 {
            return Err(TimeError::OutOfRange(i64::from(hour) * 60 + i64::from(minute)));
        }
        Ok(TimeOfDay(u16::from(hour) * 60 + u16::from(minute)))
    }

    /// Minute offset from midnight.
    #[inline]
    pub const fn minutes(&self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn hour(&self) -> u8 {
        (self.0 / 60) as u8
    }

    #[inline]
    pub const fn minute(&self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_minutes(s).map(TimeOfDay)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Slot
// =============================================================================

/// Half-open interval `[start, end)` in minutes on one calendar day.
///
/// `end` may equal 1440 (a booking ending exactly at midnight); bookings that
/// would run past midnight are rejected when the slot is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: u16,
    pub end: u16,
}

impl Slot {
    /// Builds the slot a booking occupies.
    ///
    /// ## Errors
    /// - `DurationOutOfRange` if `duration_minutes` is not in `1..=1440`
    /// - `PastMidnight` if the booking would end after `24:00`
    pub fn starting_at(start: TimeOfDay, duration_minutes: i64) -> Result<Self, TimeError> {
        if !(1..=i64::from(MINUTES_PER_DAY)).contains(&duration_minutes) {
            return Err(TimeError::DurationOutOfRange(duration_minutes));
        }

        let end = i64::from(start.minutes()) + duration_minutes;
        if end > i64::from(MINUTES_PER_DAY) {
            return Err(TimeError::PastMidnight {
                start: start.to_string(),
                duration_minutes,
            });
        }

        Ok(Slot {
            start: start.minutes(),
            end: end as u16,
        })
    }

    /// Slot between two times of day. `start` must be before `end`.
    pub fn between(start: TimeOfDay, end: TimeOfDay) -> Self {
        debug_assert!(start < end, "Slot start must be before end");
        Slot {
            start: start.minutes(),
            end: end.minutes(),
        }
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Slot) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    pub fn contains_minute(&self, minute: u16) -> bool {
        is_break_minute(minute, self.start, self.end)
    }

    /// Start of the slot as a time of day.
    pub fn start_time(&self) -> TimeOfDay {
        TimeOfDay(self.start)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
