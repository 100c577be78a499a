//! Fixtures for the file-backed integration tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use slotwise_core::{CreateReservation, Customer, FixedClock, Service, Staff, StaffChoice};
use slotwise_db::{Database, DbConfig, EngineConfig, ReservationCoordinator};
use tempfile::TempDir;

pub const TENANT: &str = "tenant-1";

pub fn booking_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 5, 1).unwrap()
}

/// A WAL database in a temp dir with a real multi-connection pool.
///
/// Keep the `TempDir` alive for the whole test.
pub async fn file_db(busy_timeout: Duration) -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("slotwise.db"))
        .max_connections(8)
        .busy_timeout(busy_timeout);
    let db = Database::new(config).await.unwrap();
    seed(&db).await;
    (dir, db)
}

/// Customer `c1`, 60-minute service `cut`, staff `alice` then `bob`.
async fn seed(db: &Database) {
    let epoch = Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();

    db.customers()
        .insert(&Customer {
            id: "c1".to_string(),
            tenant_id: TENANT.to_string(),
            name: "Customer One".to_string(),
            email: None,
            created_at: epoch,
        })
        .await
        .unwrap();

    db.services()
        .insert(&Service {
            id: "cut".to_string(),
            tenant_id: TENANT.to_string(),
            name: "Cut".to_string(),
            duration_minutes: 60,
            price_cents: 4_500,
            is_active: true,
            created_at: epoch,
        })
        .await
        .unwrap();

    for (order, id) in ["alice", "bob"].into_iter().enumerate() {
        db.staff()
            .insert(&Staff {
                id: id.to_string(),
                tenant_id: TENANT.to_string(),
                name: id.to_string(),
                is_active: true,
                created_at: epoch + chrono::Duration::minutes(order as i64),
            })
            .await
            .unwrap();
    }
}

pub fn coordinator(db: &Database, tx_timeout: Duration) -> ReservationCoordinator {
    let config = EngineConfig {
        tx_timeout,
        ..EngineConfig::default()
    };
    db.coordinator(config)
        .with_clock(Arc::new(FixedClock::on(booking_date())))
}

pub fn request(staff: StaffChoice, time: &str) -> CreateReservation {
    CreateReservation {
        tenant_id: TENANT.to_string(),
        customer_id: "c1".to_string(),
        service_id: "cut".to_string(),
        staff,
        date: booking_date(),
        time: time.to_string(),
        notes: None,
    }
}

pub fn alice() -> StaffChoice {
    StaffChoice::Specific("alice".to_string())
}

pub async fn reservation_count(db: &Database) -> i64 {
    db.reservations().count_for_tenant(TENANT).await.unwrap()
}
