// libs/doctor-cell/tests/availability_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, TimeZone, Utc};

use doctor_cell::models::{DoctorError, Slot, SlotStatus, Specialist, SpecialistRef};
use doctor_cell::services::{
    AvailabilityService, InMemoryDirectoryStore, InMemoryScheduleStore, ScheduleStore,
};

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 10, day, hour, minute, 0).unwrap()
}

fn booked(id: &str, doctor_id: &str, starts_at: DateTime<Utc>) -> Slot {
    Slot {
        status: SlotStatus::Booked,
        ..Slot::open(id, doctor_id, starts_at)
    }
}

fn setup() -> (AvailabilityService, Arc<InMemoryScheduleStore>) {
    let directory = Arc::new(InMemoryDirectoryStore::new(vec![
        Specialist::new("DOC-1", "Dr. Sarah Mehta", "Pulmonology", "Pune"),
        Specialist::new("DOC-2", "Dr. Sarah Menon", "Cardiology", "Pune"),
    ]));

    let schedule = Arc::new(InMemoryScheduleStore::new());
    schedule.insert(Slot::open("S3", "DOC-1", at(23, 10, 0))).unwrap();
    schedule.insert(booked("S2", "DOC-1", at(23, 9, 30))).unwrap();
    schedule.insert(Slot::open("S1", "DOC-1", at(23, 9, 0))).unwrap();
    schedule.insert(Slot::open("P1", "DOC-1", Utc::now() - chrono::Duration::days(1))).unwrap();

    let service = AvailabilityService::new(directory, schedule.clone());
    (service, schedule)
}

#[tokio::test]
async fn test_listing_skips_booked_and_renumbers() {
    let (service, _) = setup();

    let listing = service.list_timeslots(&SpecialistRef::by_id("DOC-1")).await.unwrap();

    assert_eq!(listing.specialist.name, "Dr. Sarah Mehta");
    assert_eq!(listing.slots.len(), 2);
    assert_eq!((listing.slots[0].number, listing.slots[0].slot.starts_at), (1, at(23, 9, 0)));
    assert_eq!((listing.slots[1].number, listing.slots[1].slot.starts_at), (2, at(23, 10, 0)));
    assert!(listing.slots.iter().all(|numbered| numbered.slot.status == SlotStatus::Open));
}

#[tokio::test]
async fn test_listing_excludes_past_slots() {
    let (service, _) = setup();

    let listing = service.list_timeslots(&SpecialistRef::by_id("DOC-1")).await.unwrap();

    assert!(listing.slots.iter().all(|numbered| numbered.slot.id != "P1"));
}

#[tokio::test]
async fn test_listing_is_idempotent() {
    let (service, _) = setup();
    let specialist = SpecialistRef::by_id("DOC-1");

    let first = service.list_timeslots(&specialist).await.unwrap();
    let second = service.list_timeslots(&specialist).await.unwrap();

    assert_eq!(first.slots, second.slots);
}

#[tokio::test]
async fn test_numbering_shifts_after_a_booking() {
    let (service, schedule) = setup();

    assert!(schedule.try_book("DOC-1", "S1", SlotStatus::Open, "hold-1").await.unwrap());
    let listing = service.list_timeslots(&SpecialistRef::by_id("DOC-1")).await.unwrap();

    assert_eq!(listing.slots.len(), 1);
    assert_eq!(listing.slots[0].number, 1);
    assert_eq!(listing.slots[0].slot.id, "S3");
}

#[tokio::test]
async fn test_resolve_by_name_prefers_exact_match() {
    let (service, _) = setup();

    let exact = service.resolve_specialist(&SpecialistRef::by_name("dr. sarah menon")).await.unwrap();
    assert_eq!(exact.id, "DOC-2");

    let partial = service.resolve_specialist(&SpecialistRef::by_name("Mehta")).await.unwrap();
    assert_eq!(partial.id, "DOC-1");
}

#[tokio::test]
async fn test_id_takes_precedence_over_name() {
    let (service, _) = setup();

    let specialist = SpecialistRef {
        doctor_id: Some("DOC-1".to_string()),
        doctor_name: Some("Dr. Sarah Menon".to_string()),
    };

    let resolved = service.resolve_specialist(&specialist).await.unwrap();
    assert_eq!(resolved.id, "DOC-1");
}

#[tokio::test]
async fn test_missing_reference_is_invalid() {
    let (service, _) = setup();

    let result = service.list_timeslots(&SpecialistRef::default()).await;
    assert_matches!(result, Err(DoctorError::InvalidRequest(_)));

    let blank = SpecialistRef {
        doctor_id: Some("   ".to_string()),
        doctor_name: None,
    };
    assert_matches!(service.list_timeslots(&blank).await, Err(DoctorError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_unknown_specialist_is_not_found() {
    let (service, _) = setup();

    assert_matches!(
        service.list_timeslots(&SpecialistRef::by_id("DOC-404")).await,
        Err(DoctorError::NotFound(_))
    );
    assert_matches!(
        service.list_timeslots(&SpecialistRef::by_name("Dr. Nobody")).await,
        Err(DoctorError::NotFound(_))
    );
}

#[tokio::test]
async fn test_specialist_without_slots_lists_empty() {
    let (service, _) = setup();

    let listing = service.list_timeslots(&SpecialistRef::by_id("DOC-2")).await.unwrap();
    assert!(listing.slots.is_empty());
}

#[tokio::test]
async fn test_conditional_writes() {
    let (_, schedule) = setup();

    assert!(schedule.try_book("DOC-1", "S3", SlotStatus::Open, "hold-a").await.unwrap());
    assert!(!schedule.try_book("DOC-1", "S3", SlotStatus::Open, "hold-b").await.unwrap());
    assert!(!schedule.try_book("DOC-1", "missing", SlotStatus::Open, "hold-b").await.unwrap());

    assert!(schedule.release("DOC-1", "S3", "hold-a").await.unwrap());
    assert!(!schedule.release("DOC-1", "S3", "hold-a").await.unwrap());
    assert!(schedule.try_book("DOC-1", "S3", SlotStatus::Open, "hold-b").await.unwrap());
}

#[tokio::test]
async fn test_release_requires_the_holding_reservation() {
    let (_, schedule) = setup();

    assert!(schedule.try_book("DOC-1", "S1", SlotStatus::Open, "hold-a").await.unwrap());

    // A stale release from another reservation leaves the booking alone.
    assert!(!schedule.release("DOC-1", "S1", "hold-b").await.unwrap());
    let s1 = schedule.all_slots("DOC-1").unwrap().into_iter().find(|s| s.id == "S1").unwrap();
    assert_eq!(s1.status, SlotStatus::Booked);
    assert_eq!(s1.hold_id.as_deref(), Some("hold-a"));

    assert!(schedule.release("DOC-1", "S1", "hold-a").await.unwrap());
    let s1 = schedule.all_slots("DOC-1").unwrap().into_iter().find(|s| s.id == "S1").unwrap();
    assert_eq!(s1.status, SlotStatus::Open);
    assert_eq!(s1.hold_id, None);
}
