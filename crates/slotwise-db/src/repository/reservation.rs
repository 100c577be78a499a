//! # Reservation Repository
//!
//! Storage for reservations plus the two statements the coordinator's
//! transaction is built from: the per-key lock write and the occupied-slot
//! read.
//!
//! ## Conflict Key
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (tenant_id, staff_key, reserved_date)                                  │
//! │                                                                         │
//! │  staff_key = staff id      → that staff member's day                    │
//! │  staff_key = '*'           → the unassigned pool's day                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    acquire_slot_lock  ──► UPSERT reservation_locks   (first statement)  │
//! │    occupied_for_scope ──► PENDING/CONFIRMED rows + service durations    │
//! │    insert             ──► may hit ux_reservations_occupied_start        │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use slotwise_core::schedule::Occupied;
use slotwise_core::time::MINUTES_PER_DAY;
use slotwise_core::{Reservation, ReservationStatus, Slot, StaffScope, TimeOfDay};

const RESERVATION_COLUMNS: &str = "id, tenant_id, customer_id, service_id, staff_id, \
     reserved_date, reserved_time, status, notes, created_at, updated_at";

// =============================================================================
// Row Mapping
// =============================================================================

/// A `reservations` row as stored. `reserved_time` is TEXT in the table.
#[derive(Debug, FromRow)]
struct ReservationRow {
    id: String,
    tenant_id: String,
    customer_id: String,
    service_id: String,
    staff_id: Option<String>,
    reserved_date: NaiveDate,
    reserved_time: String,
    status: ReservationStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DbError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let reserved_time: TimeOfDay = row
            .reserved_time
            .parse()
            .map_err(|e| DbError::corrupt("Reservation", &row.id, e))?;

        Ok(Reservation {
            id: row.id,
            tenant_id: row.tenant_id,
            customer_id: row.customer_id,
            service_id: row.service_id,
            staff_id: row.staff_id,
            reserved_date: row.reserved_date,
            reserved_time,
            status: row.status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OccupiedRow {
    id: String,
    reserved_time: String,
    duration_minutes: i64,
}

impl TryFrom<OccupiedRow> for Occupied {
    type Error = DbError;

    fn try_from(row: OccupiedRow) -> Result<Self, Self::Error> {
        let start: TimeOfDay = row
            .reserved_time
            .parse()
            .map_err(|e| DbError::corrupt("Reservation", &row.id, e))?;

        // A service edited after booking may now run past midnight; the stored
        // booking still occupies the rest of its day.
        let end = (i64::from(start.minutes()) + row.duration_minutes.max(1))
            .min(i64::from(MINUTES_PER_DAY)) as u16;

        Ok(Occupied {
            reservation_id: row.id,
            slot: Slot {
                start: start.minutes(),
                end,
            },
        })
    }
}

// =============================================================================
// Unit-of-Work Statements
// =============================================================================

/// Writes the lock row for `(tenant, scope, date)`.
///
/// Must be the first statement of the reservation transaction. In SQLite the
/// first write takes the database write lock; a competing transaction blocks
/// here (inside `busy_timeout`) before it has read anything, so its later
/// conflict re-check sees every row committed ahead of it.
pub async fn acquire_slot_lock(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    scope: &StaffScope,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> DbResult<()> {
    if matches!(scope, StaffScope::AnyStaff) {
        return Err(DbError::Internal("cannot lock an unresolved staff scope".to_string()));
    }

    debug!(tenant_id = %tenant_id, staff_key = %scope.key(), date = %date, "Acquiring slot lock");

    sqlx::query(
        r#"
        INSERT INTO reservation_locks (tenant_id, staff_key, reserved_date, locked_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (tenant_id, staff_key, reserved_date)
        DO UPDATE SET locked_at = excluded.locked_at
        "#,
    )
    .bind(tenant_id)
    .bind(scope.key())
    .bind(date)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Occupying reservations of one staff member (or the pool) on a date, with
/// each row's interval derived from its service's duration.
pub async fn occupied_for_scope(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    date: NaiveDate,
    scope: &StaffScope,
) -> DbResult<Vec<Occupied>> {
    if matches!(scope, StaffScope::AnyStaff) {
        return Err(DbError::Internal("unresolved staff scope has no schedule".to_string()));
    }

    let [pending, confirmed] = ReservationStatus::OCCUPYING;

    // `IS` matches NULL for the pool and behaves like `=` otherwise
    let rows = sqlx::query_as::<_, OccupiedRow>(
        r#"
        SELECT r.id, r.reserved_time, s.duration_minutes
        FROM reservations r
        JOIN services s ON s.id = r.service_id
        WHERE r.tenant_id = ?1
          AND r.reserved_date = ?2
          AND r.staff_id IS ?3
          AND r.status IN (?4, ?5)
        ORDER BY r.reserved_time
        "#,
    )
    .bind(tenant_id)
    .bind(date)
    .bind(scope.staff_id())
    .bind(pending.as_str())
    .bind(confirmed.as_str())
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(Occupied::try_from).collect()
}

/// Inserts a reservation row.
///
/// A second occupying reservation at the same start for the same scope fails
/// with a [`DbError::UniqueViolation`] on `ux_reservations_occupied_start`.
pub async fn insert(conn: &mut SqliteConnection, reservation: &Reservation) -> DbResult<()> {
    debug!(
        id = %reservation.id,
        staff_id = ?reservation.staff_id,
        date = %reservation.reserved_date,
        time = %reservation.reserved_time,
        "Inserting reservation"
    );

    sqlx::query(
        r#"
        INSERT INTO reservations (
            id, tenant_id, customer_id, service_id, staff_id,
            reserved_date, reserved_time, status, notes,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9,
            ?10, ?11
        )
        "#,
    )
    .bind(&reservation.id)
    .bind(&reservation.tenant_id)
    .bind(&reservation.customer_id)
    .bind(&reservation.service_id)
    .bind(&reservation.staff_id)
    .bind(reservation.reserved_date)
    .bind(reservation.reserved_time.to_string())
    .bind(reservation.status.as_str())
    .bind(&reservation.notes)
    .bind(reservation.created_at)
    .bind(reservation.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    id: &str,
) -> DbResult<Option<Reservation>> {
    let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE tenant_id = ?1 AND id = ?2");

    sqlx::query_as::<_, ReservationRow>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(Reservation::try_from)
        .transpose()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reservation reads and status changes outside the
/// booking transaction.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Reservation>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, tenant_id, id).await
    }

    /// All reservations of a tenant on a date, any status, by start time.
    pub async fn list_for_date(&self, tenant_id: &str, date: NaiveDate) -> DbResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE tenant_id = ?1 AND reserved_date = ?2 \
             ORDER BY reserved_time, created_at, id"
        );

        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(tenant_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    pub async fn count_for_tenant(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a reservation outside the booking transaction (imports, tests).
    pub async fn insert(&self, reservation: &Reservation) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, reservation).await
    }

    /// Moves a reservation to a new status, e.g. `CANCELLED` or `NO_SHOW`,
    /// which frees its interval.
    pub async fn update_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: ReservationStatus,
    ) -> DbResult<()> {
        debug!(id = %id, status = %status.as_str(), "Updating reservation status");

        let result = sqlx::query(
            "UPDATE reservations SET status = ?3, updated_at = ?4 WHERE tenant_id = ?1 AND id = ?2",
        )
        .bind(tenant_id)
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }

        Ok(())
    }

    /// Deletes lock rows for days before `cutoff`, across all tenants.
    ///
    /// Past dates can no longer be booked, so their rows are never locked
    /// again. A transaction still holding one makes this wait on the write
    /// lock like any other writer.
    pub async fn purge_locks_before(&self, cutoff: NaiveDate) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM reservation_locks WHERE reserved_date < ?1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        debug!(cutoff = %cutoff, purged = result.rows_affected(), "Purged stale slot locks");
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, reservation, seed_basic, t, memory_db};

    #[tokio::test]
    async fn test_occupied_slots_use_service_duration() {
        let db = memory_db().await;
        seed_basic(&db, "t1").await;

        db.reservations()
            .insert(&reservation("r1", "t1", Some("alice"), "cut", "14:00"))
            .await
            .unwrap();
        db.reservations()
            .insert(&reservation("r2", "t1", Some("alice"), "colour", "09:00"))
            .await
            .unwrap();
        db.reservations()
            .insert(&reservation("r3", "t1", Some("bob"), "cut", "14:00"))
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let occupied = occupied_for_scope(
            &mut conn,
            "t1",
            date(),
            &StaffScope::Staff("alice".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(occupied.len(), 2);
        assert_eq!(occupied[0].reservation_id, "r2");
        assert_eq!(occupied[0].slot, Slot::starting_at(t("09:00"), 90).unwrap());
        assert_eq!(occupied[1].slot, Slot::starting_at(t("14:00"), 60).unwrap());
    }

    #[tokio::test]
    async fn test_cancelled_and_no_show_do_not_occupy() {
        let db = memory_db().await;
        seed_basic(&db, "t1").await;

        for (id, time) in [("r1", "09:00"), ("r2", "11:00"), ("r3", "13:00")] {
            db.reservations()
                .insert(&reservation(id, "t1", Some("alice"), "cut", time))
                .await
                .unwrap();
        }
        db.reservations()
            .update_status("t1", "r1", ReservationStatus::Cancelled)
            .await
            .unwrap();
        db.reservations()
            .update_status("t1", "r2", ReservationStatus::NoShow)
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let occupied = occupied_for_scope(
            &mut conn,
            "t1",
            date(),
            &StaffScope::Staff("alice".to_string()),
        )
        .await
        .unwrap();

        let ids: Vec<&str> = occupied.iter().map(|o| o.reservation_id.as_str()).collect();
        assert_eq!(ids, vec!["r3"]);
    }

    #[tokio::test]
    async fn test_pool_scope_only_sees_unassigned_rows() {
        let db = memory_db().await;
        seed_basic(&db, "t1").await;

        db.reservations()
            .insert(&reservation("r1", "t1", None, "cut", "10:00"))
            .await
            .unwrap();
        db.reservations()
            .insert(&reservation("r2", "t1", Some("alice"), "cut", "12:00"))
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let occupied = occupied_for_scope(&mut conn, "t1", date(), &StaffScope::Pool)
            .await
            .unwrap();
        assert_eq!(occupied.len(), 1);
        assert_eq!(occupied[0].reservation_id, "r1");
    }

    #[tokio::test]
    async fn test_unique_index_rejects_same_start() {
        let db = memory_db().await;
        seed_basic(&db, "t1").await;

        db.reservations()
            .insert(&reservation("r1", "t1", Some("alice"), "cut", "10:00"))
            .await
            .unwrap();

        let err = db
            .reservations()
            .insert(&reservation("r2", "t1", Some("alice"), "colour", "10:00"))
            .await
            .unwrap_err();
        assert!(err.is_slot_collision(), "unexpected error: {err:?}");
        assert!(matches!(
            err,
            DbError::UniqueViolation {
                extended_code: Some(2067),
                ..
            }
        ));

        // Reusing an id is a primary key clash, not a slot collision
        let err = db
            .reservations()
            .insert(&reservation("r1", "t1", Some("bob"), "cut", "12:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }), "unexpected error: {err:?}");
        assert!(!err.is_slot_collision());

        // Cancelling frees the start minute
        db.reservations()
            .update_status("t1", "r1", ReservationStatus::Cancelled)
            .await
            .unwrap();
        db.reservations()
            .insert(&reservation("r2", "t1", Some("alice"), "colour", "10:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_through_storage() {
        let db = memory_db().await;
        seed_basic(&db, "t1").await;

        let mut stored = reservation("r1", "t1", None, "cut", "16:30");
        stored.notes = Some("first visit".to_string());
        db.reservations().insert(&stored).await.unwrap();

        let loaded = db.reservations().get_by_id("t1", "r1").await.unwrap().unwrap();
        assert_eq!(loaded.reserved_time, t("16:30"));
        assert_eq!(loaded.staff_id, None);
        assert_eq!(loaded.status, ReservationStatus::Confirmed);
        assert_eq!(loaded.notes.as_deref(), Some("first visit"));

        assert!(db.reservations().get_by_id("t2", "r1").await.unwrap().is_none());
        assert_eq!(db.reservations().list_for_date("t1", date()).await.unwrap().len(), 1);
        assert_eq!(db.reservations().count_for_tenant("t1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lock_upsert_is_repeatable() {
        let db = memory_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        for _ in 0..2 {
            acquire_slot_lock(&mut conn, "t1", &StaffScope::Pool, date(), Utc::now())
                .await
                .unwrap();
        }

        let locks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservation_locks")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(locks, 1);

        assert!(acquire_slot_lock(&mut conn, "t1", &StaffScope::AnyStaff, date(), Utc::now())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_purge_keeps_today_and_later() {
        let db = memory_db().await;
        let yesterday = date().pred_opt().unwrap();
        let tomorrow = date().succ_opt().unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        for day in [yesterday, date(), tomorrow] {
            acquire_slot_lock(&mut conn, "t1", &StaffScope::Pool, day, Utc::now())
                .await
                .unwrap();
        }
        acquire_slot_lock(&mut conn, "t2", &StaffScope::Staff("alice".to_string()), yesterday, Utc::now())
            .await
            .unwrap();
        drop(conn);

        assert_eq!(db.reservations().purge_locks_before(date()).await.unwrap(), 2);
        assert_eq!(db.reservations().purge_locks_before(date()).await.unwrap(), 0);

        let remaining: Vec<NaiveDate> =
            sqlx::query_scalar("SELECT reserved_date FROM reservation_locks ORDER BY reserved_date")
                .fetch_all(db.pool())
                .await
                .unwrap();
        assert_eq!(remaining, vec![date(), tomorrow]);
    }
}
