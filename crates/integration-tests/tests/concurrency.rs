//! Simultaneous requests for the same barber and time.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use royal_barber_admin::config::SlotCacheConfig;
use royal_barber_admin::services::{BookingService, SlotCache};
use royal_barber_core::schedule::has_double_booking;
use royal_barber_core::{ErrorKind, ServiceId};
use royal_barber_integration_tests::{
    BEARD, CARLOS, EYEBROWS, HAIRCUT, HAIRCUT_AND_BEARD, ROBERTO, SEEDED_DAY, booking, date,
    seeded_service, seeded_store,
};

/// Overlapping requests for Carlos between 16:00 and 18:05.
const CONTESTED: [(&str, ServiceId); 8] = [
    ("16:00", HAIRCUT),
    ("16:15", BEARD),
    ("16:30", HAIRCUT_AND_BEARD),
    ("16:45", EYEBROWS),
    ("17:00", HAIRCUT),
    ("16:10", EYEBROWS),
    ("16:40", BEARD),
    ("17:15", HAIRCUT_AND_BEARD),
];

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_only_one_of_many_identical_bookings_wins() {
    let service = seeded_service().await;
    let day = date(SEEDED_DAY);

    let tasks: Vec<_> = (0..16)
        .map(|n| {
            let service = service.clone();
            let request = booking(&format!("Client {n}"), CARLOS, HAIRCUT, day, "16:30");
            tokio::spawn(async move { service.create_appointment(request).await })
        })
        .collect();

    let mut booked = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => booked += 1,
            Err(err) => assert_eq!(err.kind(), Some(ErrorKind::Conflict)),
        }
    }
    assert_eq!(booked, 1);

    let schedule = service.day_schedule(day).await.unwrap();
    let at_1630 = schedule
        .iter()
        .filter(|a| a.barber_id == CARLOS && a.time.format("%H:%M").to_string() == "16:30")
        .count();
    assert_eq!(at_1630, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_barbers_book_in_parallel() {
    let service = seeded_service().await;
    let day = date(SEEDED_DAY);

    let first = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .create_appointment(booking("Ana Lima", CARLOS, HAIRCUT, day, "17:00"))
                .await
        })
    };
    let second = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .create_appointment(booking("Bia Rocha", ROBERTO, HAIRCUT, day, "17:00"))
                .await
        })
    };

    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_bookings_never_double_book() {
    let service = seeded_service().await;
    let day = date(SEEDED_DAY);

    let tasks: Vec<_> = (0..4)
        .flat_map(|round| CONTESTED.into_iter().map(move |(time, kind)| (round, time, kind)))
        .map(|(round, time, kind)| {
            let service = service.clone();
            let request = booking(&format!("Client {round} {time}"), CARLOS, kind, day, time);
            tokio::spawn(async move { service.create_appointment(request).await })
        })
        .collect();

    let mut booked = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => booked += 1,
            Err(err) => assert_eq!(err.kind(), Some(ErrorKind::Conflict)),
        }
    }
    assert!(booked >= 1);

    let schedule = service.day_schedule(day).await.unwrap();
    assert!(!has_double_booking(&schedule));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_store_refuses_overlap_across_service_instances() {
    // Each instance has its own lock table, as separate processes would.
    let store = Arc::new(seeded_store().await);
    let day = date(SEEDED_DAY);

    let tasks: Vec<_> = CONTESTED
        .into_iter()
        .map(|(time, kind)| {
            let service = BookingService::new(
                Arc::clone(&store),
                SlotCache::new(SlotCacheConfig::default()),
            );
            let request = booking(&format!("Client {time}"), CARLOS, kind, day, time);
            tokio::spawn(async move { service.create_appointment(request).await })
        })
        .collect();

    let mut booked = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => booked += 1,
            Err(err) => assert_eq!(err.kind(), Some(ErrorKind::Conflict)),
        }
    }
    assert!(booked >= 1);

    let service = BookingService::new(store, SlotCache::new(SlotCacheConfig::default()));
    assert!(!has_double_booking(&service.day_schedule(day).await.unwrap()));
}
