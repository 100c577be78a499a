//! # Reservation Transaction Coordinator
//!
//! Turns a [`CreateReservation`] request into a committed reservation or a
//! [`BookingError`], guaranteeing that concurrent requests for overlapping
//! intervals of the same staff member (or the unassigned pool) produce
//! exactly one winner.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_reservation(request)                                            │
//! │                                                                         │
//! │  1. validate input          ids, HH:MM, notes ≤ 500, date ≥ today       │
//! │     (no transaction yet)    ── ValidationError ─────────────────► Err   │
//! │                                                                         │
//! │  2. resolve staff           AutoAssign only, advisory read              │
//! │                             ── NoFreeStaff → TimeSlotConflict ──► Err   │
//! │                             ── NoActiveStaff ───────────────────► Err   │
//! │                                                                         │
//! │  ┌─── tokio::time::timeout(tx_timeout) ─────────────────────────────┐   │
//! │  │ 3. BEGIN                                                         │   │
//! │  │ 4. lock (tenant, staff_key, date)   first statement, a write     │   │
//! │  │ 5. customer → service → staff       *NotFound ──────────► Err    │   │
//! │  │ 6. conflict re-check                TimeSlotConflict ───► Err    │   │
//! │  │ 7. INSERT status = CONFIRMED        unique index ───────► Err    │   │
//! │  │ 8. COMMIT                                                        │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │     any Err / timeout / dropped future → transaction dropped → ROLLBACK │
//! │                                                                         │
//! │  9. notifier.reservation_confirmed   failure logged, result unchanged  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Conflicting Requests Serialize
//! Step 4 is the first statement of the transaction and it writes, so in
//! SQLite it takes the database write lock before anything is read. A
//! competing transaction waits in SQLite's busy handler (bounded by
//! `busy_timeout`) and, once it gets the lock, its re-check in step 6 reads a
//! snapshot that includes the winner's committed row. The partial unique
//! index on occupied start times catches anything that slips past the
//! re-check.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::availability::{self, requested_slot};
use crate::config::EngineConfig;
use crate::error::DbError;
use crate::notify::{NoopNotifier, Notifier};
use crate::repository::reservation::ReservationRepository;
use crate::repository::{customer, reservation, service, staff};
use slotwise_core::schedule::find_conflict;
use slotwise_core::validation::{
    validate_id, validate_notes, validate_reservation_date, validate_time,
};
use slotwise_core::{
    Assignment, BookingError, BookingResult, Clock, CreateReservation, Reservation,
    ReservationStatus, StaffChoice, StaffScope, SystemClock, TimeOfDay, UnavailableReason,
};

/// A request that passed input-shape validation.
struct ValidRequest {
    time: TimeOfDay,
    notes: Option<String>,
}

/// Runs reservation transactions against one pool.
///
/// Cheap to clone; clones share the pool, clock and notifier.
#[derive(Clone)]
pub struct ReservationCoordinator {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
}

impl ReservationCoordinator {
    /// Coordinator with the system clock and no notifier.
    pub fn new(pool: SqlitePool, config: EngineConfig) -> Self {
        ReservationCoordinator {
            pool,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(NoopNotifier),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Create Reservation
    // =========================================================================

    /// Books one service for one customer at one date and time.
    ///
    /// ## Staff Choice
    /// - `Specific(id)`: book that staff member or fail
    /// - `Unassigned`: book into the unassigned pool
    /// - `AutoAssign`: first free active staff member in creation order;
    ///   `TimeSlotConflict` if all are busy, `NoActiveStaff` if the tenant has
    ///   none
    ///
    /// ## Errors
    /// - `Validation(..)` for malformed input or a past date (no transaction opened)
    /// - `CustomerNotFound`, `ServiceNotFound`, `StaffNotFound`
    /// - `NoActiveStaff` for auto-assignment on a tenant without active staff
    /// - `TimeSlotConflict` when the interval overlaps an occupying reservation
    /// - `TransientStoreError` on busy/timeout/connection failures; safe to retry
    pub async fn create_reservation(&self, request: CreateReservation) -> BookingResult<Reservation> {
        let valid = self.validate(&request)?;

        debug!(
            tenant_id = %request.tenant_id,
            customer_id = %request.customer_id,
            service_id = %request.service_id,
            staff = ?request.staff,
            date = %request.date,
            time = %valid.time,
            "Creating reservation"
        );

        let scope = self
            .within_deadline(self.resolve_scope(&request, valid.time))
            .await?;

        let booked = self
            .within_deadline(self.book(&request, &scope, valid))
            .await?;

        info!(
            reservation_id = %booked.id,
            tenant_id = %booked.tenant_id,
            staff_id = ?booked.staff_id,
            date = %booked.reserved_date,
            time = %booked.reserved_time,
            "Reservation committed"
        );

        self.notify(&booked).await;

        Ok(booked)
    }

    /// Input-shape checks. Runs before any store access.
    fn validate(&self, request: &CreateReservation) -> BookingResult<ValidRequest> {
        validate_id("tenant_id", &request.tenant_id)?;
        validate_id("customer_id", &request.customer_id)?;
        validate_id("service_id", &request.service_id)?;
        if let StaffChoice::Specific(staff_id) = &request.staff {
            validate_id("staff_id", staff_id)?;
        }

        let time = validate_time(&request.time)?;
        let notes = validate_notes(request.notes.as_deref())?;
        validate_reservation_date(request.date, self.clock.today())?;

        Ok(ValidRequest { time, notes })
    }

    /// Decides which staff scope the transaction books into.
    async fn resolve_scope(
        &self,
        request: &CreateReservation,
        time: TimeOfDay,
    ) -> BookingResult<StaffScope> {
        match &request.staff {
            StaffChoice::Specific(staff_id) => return Ok(StaffScope::Staff(staff_id.clone())),
            StaffChoice::Unassigned => return Ok(StaffScope::Pool),
            StaffChoice::AutoAssign => {}
        }

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;

        let service = service::find_bookable(&mut conn, &request.tenant_id, &request.service_id)
            .await?
            .ok_or_else(|| BookingError::ServiceNotFound {
                service_id: request.service_id.clone(),
            })?;

        let assignment = availability::find_available_staff(
            &mut conn,
            &request.tenant_id,
            request.date,
            time,
            service.duration_minutes,
        )
        .await?;

        match assignment {
            Assignment::Assigned(staff_id) => Ok(StaffScope::Staff(staff_id)),
            Assignment::Unavailable(UnavailableReason::NoActiveStaff) => {
                Err(BookingError::NoActiveStaff {
                    tenant_id: request.tenant_id.clone(),
                })
            }
            Assignment::Unavailable(UnavailableReason::NoFreeStaff) => {
                Err(BookingError::TimeSlotConflict {
                    tenant_id: request.tenant_id.clone(),
                    scope: StaffScope::AnyStaff,
                    date: request.date,
                    time,
                    conflicting_reservation_id: None,
                })
            }
        }
    }

    /// The transaction. Returning early drops `tx`, which rolls it back.
    async fn book(
        &self,
        request: &CreateReservation,
        scope: &StaffScope,
        valid: ValidRequest,
    ) -> BookingResult<Reservation> {
        let tenant_id = request.tenant_id.as_str();
        let now = self.clock.now();
        let conflict = |conflicting_reservation_id: Option<String>| BookingError::TimeSlotConflict {
            tenant_id: tenant_id.to_string(),
            scope: scope.clone(),
            date: request.date,
            time: valid.time,
            conflicting_reservation_id,
        };

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        reservation::acquire_slot_lock(&mut tx, tenant_id, scope, request.date, now).await?;

        // Validating
        if customer::find_for_tenant(&mut tx, tenant_id, &request.customer_id)
            .await?
            .is_none()
        {
            return Err(BookingError::CustomerNotFound {
                customer_id: request.customer_id.clone(),
            });
        }

        let service = service::find_bookable(&mut tx, tenant_id, &request.service_id)
            .await?
            .ok_or_else(|| BookingError::ServiceNotFound {
                service_id: request.service_id.clone(),
            })?;

        if let Some(staff_id) = scope.staff_id() {
            if staff::find_active(&mut tx, tenant_id, staff_id).await?.is_none() {
                return Err(BookingError::StaffNotFound {
                    staff_id: staff_id.to_string(),
                });
            }
        }

        // ConflictChecking
        let requested = requested_slot(valid.time, service.duration_minutes)?;
        let occupied =
            reservation::occupied_for_scope(&mut tx, tenant_id, request.date, scope).await?;

        if let Some(hit) = find_conflict(&requested, &occupied) {
            debug!(
                tenant_id = %tenant_id,
                scope = %scope,
                conflicting_reservation_id = %hit.reservation_id,
                "Slot already occupied"
            );
            return Err(conflict(Some(hit.reservation_id.clone())));
        }

        // Inserting
        let booked = Reservation {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            customer_id: request.customer_id.clone(),
            service_id: service.id,
            staff_id: scope.staff_id().map(str::to_string),
            reserved_date: request.date,
            reserved_time: valid.time,
            status: ReservationStatus::Confirmed,
            notes: valid.notes,
            created_at: now,
            updated_at: now,
        };

        match reservation::insert(&mut tx, &booked).await {
            Ok(()) => {}
            Err(e) if e.is_slot_collision() => {
                debug!(tenant_id = %tenant_id, scope = %scope, "Unique index rejected the slot");
                return Err(conflict(None));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await.map_err(DbError::from)?;

        Ok(booked)
    }

    async fn notify(&self, booked: &Reservation) {
        if let Err(e) = self.notifier.reservation_confirmed(booked).await {
            warn!(
                reservation_id = %booked.id,
                error = %e,
                "Confirmation notification failed, reservation stands"
            );
        }
    }

    // =========================================================================
    // Slot Picker
    // =========================================================================

    /// Start times the booking page can offer for `service_id` on `date`,
    /// using the configured business hours. Advisory.
    pub async fn available_slots(
        &self,
        tenant_id: &str,
        date: NaiveDate,
        service_id: &str,
        choice: &StaffChoice,
    ) -> BookingResult<Vec<TimeOfDay>> {
        validate_id("tenant_id", tenant_id)?;
        validate_id("service_id", service_id)?;
        validate_reservation_date(date, self.clock.today())?;

        self.within_deadline(async {
            let mut conn = self.pool.acquire().await.map_err(DbError::from)?;

            let service = service::find_bookable(&mut conn, tenant_id, service_id)
                .await?
                .ok_or_else(|| BookingError::ServiceNotFound {
                    service_id: service_id.to_string(),
                })?;

            if let StaffChoice::Specific(staff_id) = choice {
                if staff::find_active(&mut conn, tenant_id, staff_id).await?.is_none() {
                    return Err(BookingError::StaffNotFound {
                        staff_id: staff_id.clone(),
                    });
                }
            }

            availability::available_slots(
                &mut conn,
                tenant_id,
                date,
                &self.config.business_hours,
                service.duration_minutes,
                choice,
            )
            .await
        })
        .await
    }

    /// Deletes lock rows for days before the clock's today.
    ///
    /// Each booked (tenant, staff, date) key leaves one row behind; call this
    /// periodically (daily is plenty) to keep the table small.
    pub async fn purge_stale_locks(&self) -> BookingResult<u64> {
        let today = self.clock.today();
        self.within_deadline(async {
            let purged = ReservationRepository::new(self.pool.clone())
                .purge_locks_before(today)
                .await?;
            Ok(purged)
        })
        .await
    }

    /// Bounds one unit of work by `tx_timeout`. Expiry drops the future,
    /// rolling back any open transaction.
    async fn within_deadline<T>(
        &self,
        work: impl Future<Output = BookingResult<T>>,
    ) -> BookingResult<T> {
        match tokio::time::timeout(self.config.tx_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout(self.config.tx_timeout).into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
