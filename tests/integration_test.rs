// Integration tests for the booking flow and persistence
mod fixtures;

use fixtures::{dates, events, sessions};

use event_timetable::models::event::EventsByDate;
use event_timetable::models::grid::{CellPosition, Selection};
use event_timetable::models::venue::VenueDirectory;
use event_timetable::services::event::mapper::serialize_events_by_date;
use event_timetable::services::event::EVENTS_STORAGE_KEY;
use event_timetable::services::session::TimetableSession;
use event_timetable::services::storage::{FileStorage, MemoryStorage, Storage};
use event_timetable::utils::date::{start_of_week, week_days};

#[test]
fn test_booking_flow_with_clash_and_retry() {
    let mut session = sessions::fresh();

    // Drag the first hour of the day in the first venue column.
    sessions::drag(&mut session, (0, 0), (3, 0));
    assert_eq!(
        session.selection_summary().expect("selection should exist"),
        "Selected: Venue 1 | 12:00 AM - 1:00 AM"
    );

    let soundcheck = session
        .create_event("Soundcheck")
        .expect("first booking should succeed");
    assert_eq!(session.events().len(), 1);

    // An overlapping drag commits, but the clash blocks the booking.
    sessions::drag(&mut session, (2, 0), (5, 0));
    let clash = session.clash().expect("clash cached after commit");
    assert!(clash.has_clash);
    assert_eq!(clash.clashing_names(), "Soundcheck");
    assert!(!session.can_create());

    let refused = session.create_event("Rehearsal");
    let message = refused.expect_err("clashing booking must be refused").to_string();
    assert!(
        message.contains("Soundcheck"),
        "refusal should name the conflict, got: {message}"
    );
    assert_eq!(session.events().len(), 1);

    // Deleting the conflicting booking clears the way for a retry.
    assert!(session.delete_event(&soundcheck.id));
    assert!(session.can_create());
    session.create_event("Rehearsal").expect("retry should succeed");
    assert_eq!(session.events().len(), 1);
    assert_eq!(session.events()[0].name, "Rehearsal");
    assert_eq!(session.events()[0].selection, Selection::new(2, 5, 0, 0));
}

#[test]
fn test_bookings_survive_across_launches() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("events.json");

    // First launch: book on two days.
    {
        let mut session = TimetableSession::new(
            FileStorage::new(&path),
            VenueDirectory::default(),
            dates::monday(),
        );
        sessions::drag(&mut session, (36, 0), (39, 0));
        session.create_event("Monday Soundcheck").expect("create");

        session.set_date(dates::tuesday());
        sessions::drag(&mut session, (40, 2), (47, 3));
        session.create_event("Tuesday Rehearsal").expect("create");
    }

    // Second launch: both bookings come back from the file.
    {
        let mut session = TimetableSession::new(
            FileStorage::new(&path),
            VenueDirectory::default(),
            dates::monday(),
        );
        assert_eq!(session.events().len(), 1);
        assert_eq!(session.events()[0].name, "Monday Soundcheck");

        session.set_date(dates::tuesday());
        assert_eq!(session.events().len(), 1);
        let event = &session.events()[0];
        assert_eq!(event.name, "Tuesday Rehearsal");
        assert_eq!(event.selection, Selection::new(40, 47, 2, 3));
        assert_eq!(event.venues.len(), 2);
        assert_eq!(event.venues[0].name, "Venue 3");
    }
}

#[test]
fn test_corrupt_data_file_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.json");
    std::fs::write(&path, "definitely not json").expect("write junk");

    let mut session = TimetableSession::new(
        FileStorage::new(&path),
        VenueDirectory::default(),
        dates::monday(),
    );
    assert!(session.events().is_empty());

    // The session keeps working and the next booking replaces the junk.
    sessions::drag(&mut session, (0, 0), (3, 0));
    session.create_event("Fresh Start").expect("create");

    let relaunched = TimetableSession::new(
        FileStorage::new(&path),
        VenueDirectory::default(),
        dates::monday(),
    );
    assert_eq!(relaunched.events().len(), 1);
    assert_eq!(relaunched.events()[0].name, "Fresh Start");
}

#[test]
fn test_corrupt_events_payload_starts_empty() {
    let storage = MemoryStorage::new();
    storage
        .set(EVENTS_STORAGE_KEY, "{not events json")
        .expect("set");

    let session = sessions::sharing(&storage);
    assert!(session.events().is_empty());
}

#[test]
fn test_preseeded_storage_payload_is_visible() {
    let storage = MemoryStorage::new();
    let mut seeded = EventsByDate::new();
    seeded.insert(
        "2025-03-10".to_string(),
        vec![events::booked("seed-1", "Seeded", Selection::new(0, 3, 0, 0))],
    );
    storage
        .set(
            EVENTS_STORAGE_KEY,
            &serialize_events_by_date(&seeded).expect("serialize"),
        )
        .expect("set");

    let mut session = sessions::sharing(&storage);
    assert_eq!(session.events().len(), 1);
    assert_eq!(session.events()[0].id, "seed-1");

    // A seeded booking behaves like a local one: pressing it selects it.
    session.pointer_down(CellPosition::new(2, 0));
    assert_eq!(session.selected_event().expect("selected").name, "Seeded");
}

#[test]
fn test_second_handle_sees_changes_after_refresh() {
    let storage = MemoryStorage::new();
    let mut tab_a = sessions::sharing(&storage);
    let mut tab_b = sessions::sharing(&storage);

    sessions::drag(&mut tab_a, (8, 1), (11, 1));
    tab_a.create_event("Across Tabs").expect("create");

    // Not visible in the other handle until it reloads.
    assert!(tab_b.events().is_empty());
    tab_b.refresh_from_storage();
    assert_eq!(tab_b.events().len(), 1);
    assert_eq!(tab_b.events()[0].name, "Across Tabs");
}

#[test]
fn test_storage_notifies_subscribers_on_create() {
    let storage = MemoryStorage::new();
    let changes = storage.subscribe();

    let mut session = sessions::sharing(&storage);
    sessions::drag(&mut session, (0, 0), (3, 0));
    session.create_event("Ping").expect("create");

    let change = changes.try_recv().expect("a change notification");
    assert_eq!(change.key, EVENTS_STORAGE_KEY);
}

#[test]
fn test_reload_is_last_writer_wins() {
    let storage = MemoryStorage::new();
    let mut tab_a = sessions::sharing(&storage);
    let mut tab_b = sessions::sharing(&storage);

    // Both tabs loaded the empty store; each books without refreshing.
    sessions::drag(&mut tab_a, (0, 0), (3, 0));
    tab_a.create_event("First Writer").expect("create");
    sessions::drag(&mut tab_b, (40, 2), (43, 2));
    tab_b.create_event("Second Writer").expect("create");

    // The second write replaced the first wholesale; the first tab's
    // booking never reached storage again and is gone after reload.
    tab_a.refresh_from_storage();
    tab_b.refresh_from_storage();
    assert_eq!(tab_a.events().len(), 1);
    assert_eq!(tab_a.events()[0].name, "Second Writer");
    assert_eq!(tab_b.events().len(), 1);
    assert_eq!(tab_b.events()[0].name, "Second Writer");
}

#[test]
fn test_external_booking_turns_a_clean_selection_into_a_clash() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.json");

    let mut ours = TimetableSession::new(
        FileStorage::new(&path),
        VenueDirectory::default(),
        dates::monday(),
    );
    let mut theirs = TimetableSession::new(
        FileStorage::new(&path),
        VenueDirectory::default(),
        dates::monday(),
    );

    sessions::drag(&mut ours, (20, 0), (25, 0));
    assert!(ours.can_create());

    sessions::drag(&mut theirs, (22, 0), (27, 0));
    theirs.create_event("Booked Elsewhere").expect("create");

    // After a reload the cached clash is recomputed against what the
    // other writer persisted.
    ours.refresh_from_storage();
    assert!(!ours.can_create());
    assert_eq!(
        ours.clash().expect("clash recomputed").clashing_names(),
        "Booked Elsewhere"
    );
}

#[test]
fn test_week_scan_counts_bookings_per_day() {
    let mut session = sessions::fresh();
    sessions::drag(&mut session, (36, 0), (39, 0));
    session.create_event("Monday Gig").expect("create");

    session.set_date(dates::sunday());
    sessions::drag(&mut session, (36, 1), (39, 1));
    session.create_event("Sunday Gig").expect("create");

    let week = week_days(start_of_week(dates::sunday()));
    assert_eq!(week[0], dates::monday());

    let counts: Vec<usize> = week
        .iter()
        .map(|&day| {
            session.set_date(day);
            session.events().len()
        })
        .collect();
    assert_eq!(counts, vec![1, 0, 0, 0, 0, 0, 1]);
}
