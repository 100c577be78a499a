//! # Repository Module
//!
//! Database access for Slotwise, one module per table.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Free functions taking `&mut SqliteConnection`                          │
//! │  ─────────────────────────────────────────────                          │
//! │  The caller owns the unit of work. The coordinator passes its open      │
//! │  transaction so every read and write sees one snapshot:                 │
//! │                                                                         │
//! │      reservation::acquire_slot_lock(&mut tx, ..)                        │
//! │      customer::find_for_tenant(&mut tx, ..)                             │
//! │      reservation::occupied_for_scope(&mut tx, ..)                       │
//! │                                                                         │
//! │  Repository structs holding the pool                                    │
//! │  ───────────────────────────────────                                    │
//! │  One-off reads and admin writes outside any booking transaction:        │
//! │                                                                         │
//! │      db.staff().list_active(tenant)                                     │
//! │      db.reservations().update_status(tenant, id, Cancelled)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository)
//! - [`ServiceRepository`](service::ServiceRepository)
//! - [`StaffRepository`](staff::StaffRepository)
//! - [`ReservationRepository`](reservation::ReservationRepository)

pub mod customer;
pub mod reservation;
pub mod service;
pub mod staff;
