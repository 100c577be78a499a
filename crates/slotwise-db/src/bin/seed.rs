//! # Seed Data Generator
//!
//! Populates the database with a demo tenant for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./slotwise_dev.db
//! cargo run -p slotwise-db --bin seed
//!
//! # Specify database path and how many demo bookings to place tomorrow
//! cargo run -p slotwise-db --bin seed -- --db ./data/slotwise.db --bookings 12
//!
//! # More log output
//! RUST_LOG=slotwise_db=debug cargo run -p slotwise-db --bin seed
//! ```
//!
//! ## Generated Data
//! - Services: a handful of salon menus, 30 to 120 minutes
//! - Staff: four stylists, created one minute apart (auto-assignment order)
//! - Customers: twenty demo customers
//! - Bookings: auto-assigned reservations for tomorrow, placed through the
//!   reservation coordinator

use std::env;
use std::sync::Arc;

use chrono::{Duration, Utc};
use slotwise_core::{
    BookingError, CreateReservation, Customer, Service, Staff, StaffChoice, DEFAULT_TENANT_ID,
};
use slotwise_db::{Database, DbConfig, EngineConfig, LogNotifier};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// (name, minutes, price in cents)
const SERVICES: &[(&str, i64, i64)] = &[
    ("Cut", 60, 4_500),
    ("Cut & Colour", 120, 11_000),
    ("Fringe Trim", 30, 1_500),
    ("Blow Dry", 45, 3_500),
    ("Head Spa", 90, 8_000),
];

const STAFF: &[&str] = &["Aiko", "Bruno", "Chiara", "Dev"];

const CUSTOMERS: usize = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./slotwise_dev.db");
    let mut bookings: usize = 8;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--bookings" | "-b" => {
                if i + 1 < args.len() {
                    bookings = args[i + 1].parse().unwrap_or(bookings);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Slotwise Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./slotwise_dev.db)");
                println!("  -b, --bookings <N>     Demo bookings for tomorrow (default: 8)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Slotwise Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Tenant:   {}", DEFAULT_TENANT_ID);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.staff().list_active(DEFAULT_TENANT_ID).await?;
    if !existing.is_empty() {
        println!("⚠ Tenant already has {} active staff", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    let mut service_ids = Vec::new();
    for (name, minutes, price_cents) in SERVICES {
        let service = Service {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: name.to_string(),
            duration_minutes: *minutes,
            price_cents: *price_cents,
            is_active: true,
            created_at: now,
        };
        db.services().insert(&service).await?;
        service_ids.push(service.id);
    }
    println!("✓ {} services", service_ids.len());

    for (order, name) in STAFF.iter().enumerate() {
        db.staff()
            .insert(&Staff {
                id: Uuid::new_v4().to_string(),
                tenant_id: DEFAULT_TENANT_ID.to_string(),
                name: name.to_string(),
                is_active: true,
                created_at: now + Duration::minutes(order as i64),
            })
            .await?;
    }
    println!("✓ {} staff", STAFF.len());

    let mut customer_ids = Vec::new();
    for n in 1..=CUSTOMERS {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: format!("Demo Customer {:02}", n),
            email: Some(format!("customer{:02}@example.com", n)),
            created_at: now,
        };
        db.customers().insert(&customer).await?;
        customer_ids.push(customer.id);
    }
    println!("✓ {} customers", customer_ids.len());

    // Demo bookings go through the coordinator like real traffic
    let config = EngineConfig::from_env()?;
    let grid = config.business_hours.candidate_slots(60)?;
    let coordinator = db.coordinator(config).with_notifier(Arc::new(LogNotifier));
    let tomorrow = now.date_naive() + Duration::days(1);

    let mut placed = 0;
    let mut conflicts = 0;
    for n in 0..bookings {
        let Some(slot) = grid.get(n % grid.len().max(1)) else {
            break;
        };

        let request = CreateReservation {
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            customer_id: customer_ids[n % customer_ids.len()].clone(),
            service_id: service_ids[n % service_ids.len()].clone(),
            staff: StaffChoice::AutoAssign,
            date: tomorrow,
            time: slot.start_time().to_string(),
            notes: None,
        };

        match coordinator.create_reservation(request).await {
            Ok(_) => placed += 1,
            Err(BookingError::TimeSlotConflict { .. } | BookingError::Validation(_)) => conflicts += 1,
            Err(e) => return Err(e.into()),
        }
    }
    println!("✓ {} bookings for {} ({} skipped)", placed, tomorrow, conflicts);

    let purged = coordinator.purge_stale_locks().await?;
    println!("✓ {} stale slot locks purged", purged);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
