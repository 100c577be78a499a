//! # slotwise-db: Database Layer and Reservation Coordinator
//!
//! This crate owns every interaction with the store: the SQLite pool,
//! embedded migrations, repositories, the availability resolver and the
//! reservation transaction coordinator.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Slotwise Data Flow                               │
//! │                                                                         │
//! │  Booking page / admin API (out of scope)                               │
//! │       │  CreateReservation                                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   slotwise-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐    │   │
//! │  │  │ coordinator  │──►│ availability │──►│   repository     │    │   │
//! │  │  │ transaction  │   │ staff picker │   │ customer/service │    │   │
//! │  │  │ + notifier   │   │ slot picker  │   │ staff/reservation│    │   │
//! │  │  └──────┬───────┘   └──────────────┘   └────────┬─────────┘    │   │
//! │  │         │                                      │              │   │
//! │  │  ┌──────▼───────┐   ┌──────────────┐   ┌────────▼─────────┐    │   │
//! │  │  │    config    │   │     pool     │   │    migrations    │    │   │
//! │  │  │ EngineConfig │   │  SqlitePool  │   │ 001 schema       │    │   │
//! │  │  │ from_env     │   │  WAL, busy   │   │ 002 lock rows    │    │   │
//! │  │  └──────────────┘   └──────────────┘   └──────────────────┘    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and their booking-error mapping
//! - [`config`] - Engine configuration from the environment
//! - [`repository`] - Per-table queries
//! - [`availability`] - Advisory staff and slot availability
//! - [`coordinator`] - The reservation transaction
//! - [`notify`] - Post-commit notification seam
//!
//! ## Usage
//!
//! ```rust,ignore
//! use slotwise_db::{Database, DbConfig, EngineConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//! let coordinator = db.coordinator(EngineConfig::from_env()?);
//!
//! let reservation = coordinator.create_reservation(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod migrations;
pub mod notify;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, EngineConfig};
pub use coordinator::ReservationCoordinator;
pub use error::{DbError, DbResult};
pub use notify::{ChannelNotifier, LogNotifier, NoopNotifier, Notifier, NotifyError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::reservation::ReservationRepository;
pub use repository::service::ServiceRepository;
pub use repository::staff::StaffRepository;
