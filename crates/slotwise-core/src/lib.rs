//! # slotwise-core: Pure Booking Logic for Slotwise
//!
//! This crate is the **heart** of the slot-allocation engine. It contains
//! the booking rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Slotwise Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Booking pages / admin API (out of scope)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CreateReservation / ApiError           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ slotwise-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │   time   │ │ schedule │ │  types   │ │   api    │          │   │
//! │  │   │ HH:MM    │ │ assign   │ │ Reserv.  │ │ ApiError │          │   │
//! │  │   │ overlaps │ │ hours    │ │ Staff    │ │ codes    │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  slotwise-db (Database Layer)                   │   │
//! │  │   repositories, availability resolver, reservation coordinator  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`time`] - `HH:MM` parsing, minute offsets, overlap, slot grids
//! - [`schedule`] - Conflict lookup, staff auto-assignment, business hours
//! - [`types`] - Domain types (Reservation, Service, Staff, Customer)
//! - [`error`] - Time, validation and booking errors
//! - [`validation`] - Input-shape checks run before any transaction
//! - [`api`] - Booking error → stable code + HTTP status
//! - [`clock`] - Injectable source of "today"
//!
//! ## Example Usage
//!
//! ```rust
//! use slotwise_core::time::{Slot, TimeOfDay};
//!
//! let two_pm: TimeOfDay = "14:00".parse().unwrap();
//! let three_pm: TimeOfDay = "15:00".parse().unwrap();
//!
//! let cut = Slot::starting_at(two_pm, 60).unwrap();
//! let colour = Slot::starting_at(three_pm, 90).unwrap();
//!
//! // Back-to-back bookings never collide
//! assert!(!cut.overlaps(&colour));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod clock;
pub mod error;
pub mod schedule;
pub mod time;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use api::{ApiError, ErrorCode};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{BookingError, BookingResult, TimeError, ValidationError};
pub use schedule::{Assignment, BusinessHours, UnavailableReason};
pub use time::{Slot, TimeOfDay};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tenant used by the seed data and local demos.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum length of reservation notes, in characters.
pub const MAX_NOTES_LENGTH: usize = 500;

/// Maximum length of an entity reference.
pub const MAX_ID_LENGTH: usize = 64;
