//! Fixtures shared by the unit tests in this crate.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::pool::{Database, DbConfig};
use slotwise_core::{Customer, Reservation, ReservationStatus, Service, Staff, TimeOfDay};

pub fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

/// The day every fixture books on.
pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 5, 1).unwrap()
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap()
}

pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub fn customer(tenant_id: &str, id: &str) -> Customer {
    Customer {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: format!("Customer {id}"),
        email: Some(format!("{id}@example.com")),
        created_at: epoch(),
    }
}

pub fn service(tenant_id: &str, id: &str, duration_minutes: i64) -> Service {
    Service {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: format!("Service {id}"),
        duration_minutes,
        price_cents: 5_000,
        is_active: true,
        created_at: epoch(),
    }
}

/// Staff member created `order` minutes after the fixture epoch.
pub fn staff_created_at(tenant_id: &str, id: &str, order: i64) -> Staff {
    Staff {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: format!("Staff {id}"),
        is_active: true,
        created_at: epoch() + Duration::minutes(order),
    }
}

/// A confirmed reservation for customer `c1` on [`date()`].
pub fn reservation(
    id: &str,
    tenant_id: &str,
    staff_id: Option<&str>,
    service_id: &str,
    time: &str,
) -> Reservation {
    Reservation {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        customer_id: "c1".to_string(),
        service_id: service_id.to_string(),
        staff_id: staff_id.map(str::to_string),
        reserved_date: date(),
        reserved_time: t(time),
        status: ReservationStatus::Confirmed,
        notes: None,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

/// Customer `c1`, services `cut` (60 min) and `colour` (90 min), staff
/// `alice` then `bob`.
pub async fn seed_basic(db: &Database, tenant_id: &str) {
    db.customers().insert(&customer(tenant_id, "c1")).await.unwrap();
    db.services().insert(&service(tenant_id, "cut", 60)).await.unwrap();
    db.services().insert(&service(tenant_id, "colour", 90)).await.unwrap();
    db.staff().insert(&staff_created_at(tenant_id, "alice", 1)).await.unwrap();
    db.staff().insert(&staff_created_at(tenant_id, "bob", 2)).await.unwrap();
}
