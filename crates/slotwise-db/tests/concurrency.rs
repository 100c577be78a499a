//! Concurrency behaviour of the reservation coordinator against a real,
//! file-backed WAL database with a multi-connection pool.

mod common;

use std::time::Duration;

use common::{alice, coordinator, file_db, request, reservation_count, TENANT};
use slotwise_core::{BookingError, StaffChoice};

const GENEROUS: Duration = Duration::from_secs(10);

/// Holds the SQLite write lock from outside the coordinator.
async fn hold_write_lock(db: &slotwise_db::Database) -> sqlx::Transaction<'static, sqlx::Sqlite> {
    let mut holder = db.pool().begin().await.unwrap();
    sqlx::query(
        "INSERT INTO reservation_locks (tenant_id, staff_key, reserved_date, locked_at) \
         VALUES ('other-tenant', '*', '2030-05-01', '2030-05-01T00:00:00Z')",
    )
    .execute(&mut *holder)
    .await
    .unwrap();
    holder
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_identical_requests_have_exactly_one_winner() {
    let (_dir, db) = file_db(Duration::from_secs(5)).await;
    let coordinator = coordinator(&db, GENEROUS);

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.create_reservation(request(alice(), "14:00")).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(reservation) => winners.push(reservation),
            Err(BookingError::TimeSlotConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, 4);
    assert_eq!(reservation_count(&db).await, 1);

    let stored = db
        .reservations()
        .get_by_id(TENANT, &winners[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.staff_id.as_deref(), Some("alice"));
    assert_eq!(stored.reserved_time.to_string(), "14:00");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_requests_have_exactly_one_winner() {
    let (_dir, db) = file_db(Duration::from_secs(5)).await;
    let coordinator = coordinator(&db, GENEROUS);

    let times = ["14:00", "14:00", "14:15", "14:30", "14:45"];
    let handles: Vec<_> = times
        .iter()
        .map(|time| {
            let coordinator = coordinator.clone();
            let req = request(alice(), time);
            tokio::spawn(async move { coordinator.create_reservation(req).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(reservation) => winners.push(reservation),
            Err(BookingError::TimeSlotConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, 4);
    assert_eq!(reservation_count(&db).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_requests_all_commit() {
    let (_dir, db) = file_db(Duration::from_secs(5)).await;
    let coordinator = coordinator(&db, GENEROUS);

    let requests = vec![
        request(alice(), "14:00"),
        request(StaffChoice::Specific("bob".to_string()), "14:00"),
        request(StaffChoice::Unassigned, "14:00"),
        request(alice(), "10:00"),
        request(alice(), "15:00"),
    ];

    let handles: Vec<_> = requests
        .into_iter()
        .map(|req| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.create_reservation(req).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(reservation_count(&db).await, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_auto_assign_never_double_books() {
    let (_dir, db) = file_db(Duration::from_secs(5)).await;
    let coordinator = coordinator(&db, GENEROUS);

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let coordinator = coordinator.clone();
            let req = request(StaffChoice::AutoAssign, "14:00");
            tokio::spawn(async move { coordinator.create_reservation(req).await })
        })
        .collect();

    let mut staff = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(reservation) => staff.push(reservation.staff_id.unwrap()),
            Err(BookingError::TimeSlotConflict { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    // Two staff members, one 14:00 booking each at most
    staff.sort();
    let before = staff.len();
    staff.dedup();
    assert_eq!(staff.len(), before);
    assert!(!staff.is_empty() && staff.len() <= 2);
    assert_eq!(reservation_count(&db).await, staff.len() as i64);
}

#[tokio::test]
async fn test_busy_store_is_transient_and_retryable() {
    let (_dir, db) = file_db(Duration::from_millis(100)).await;
    let coordinator = coordinator(&db, GENEROUS);

    let holder = hold_write_lock(&db).await;

    let err = coordinator
        .create_reservation(request(alice(), "14:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TransientStoreError { .. }), "got {err:?}");
    assert!(err.is_retryable());

    holder.rollback().await.unwrap();

    coordinator
        .create_reservation(request(alice(), "14:00"))
        .await
        .unwrap();
    assert_eq!(reservation_count(&db).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_transaction_deadline_is_transient() {
    let (_dir, db) = file_db(Duration::from_secs(5)).await;
    let coordinator = coordinator(&db, Duration::from_millis(100));

    let holder = hold_write_lock(&db).await;

    let err = coordinator
        .create_reservation(request(alice(), "14:00"))
        .await
        .unwrap_err();
    match &err {
        BookingError::TransientStoreError { reason } => assert!(reason.contains("timed out")),
        other => panic!("expected transient error, got {other:?}"),
    }

    holder.rollback().await.unwrap();
    assert_eq!(reservation_count(&db).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_request_rolls_back() {
    let (_dir, db) = file_db(Duration::from_secs(5)).await;
    let coordinator = coordinator(&db, GENEROUS);

    let holder = hold_write_lock(&db).await;

    let pending = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.create_reservation(request(alice(), "14:00")).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());

    holder.rollback().await.unwrap();

    // Give the abandoned connection time to roll back
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(reservation_count(&db).await, 0);

    let locks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservation_locks WHERE tenant_id = ?1")
        .bind(TENANT)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(locks, 0);
}

#[tokio::test]
async fn test_missing_customer_leaves_nothing_behind() {
    let (_dir, db) = file_db(Duration::from_secs(5)).await;
    let coordinator = coordinator(&db, GENEROUS);

    let mut req = request(alice(), "14:00");
    req.customer_id = "ghost".to_string();

    let err = coordinator.create_reservation(req).await.unwrap_err();
    assert!(matches!(err, BookingError::CustomerNotFound { .. }));
    assert_eq!(reservation_count(&db).await, 0);
}

#[tokio::test]
async fn test_auto_assign_without_active_staff_is_not_found() {
    let (_dir, db) = file_db(Duration::from_secs(5)).await;
    let coordinator = coordinator(&db, GENEROUS);
    db.staff().set_active(TENANT, "alice", false).await.unwrap();
    db.staff().set_active(TENANT, "bob", false).await.unwrap();

    let err = coordinator
        .create_reservation(request(StaffChoice::AutoAssign, "14:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NoActiveStaff { ref tenant_id } if tenant_id == TENANT));
    assert_eq!(slotwise_core::ApiError::from(err).status, 404);
    assert_eq!(reservation_count(&db).await, 0);
}
