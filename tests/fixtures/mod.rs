// Test fixtures - reusable test data
// Provides consistent dates, events, and sessions across test files
// Not every test crate pulls in every fixture.
#![allow(dead_code)]

use chrono::{Duration, NaiveDate};

use event_timetable::models::event::Event;
use event_timetable::models::grid::{self, Selection};
use event_timetable::models::venue::VenueDirectory;
use event_timetable::services::session::TimetableSession;
use event_timetable::services::storage::{MemoryStorage, Storage};
use event_timetable::utils::date::instant_at;

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Monday, March 10, 2025
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    /// Tuesday, March 11, 2025
    pub fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
    }

    /// Sunday, March 16, 2025 - last day of the same week
    pub fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 16).unwrap()
    }
}

/// Sample events for testing
pub mod events {
    use super::*;

    /// A booked event occupying the given rectangle on the Monday date,
    /// with instants derived from the rectangle the same way the store
    /// derives them.
    pub fn booked(id: &str, name: &str, selection: Selection) -> Event {
        let venues = VenueDirectory::default()
            .slice(selection.start_col, selection.end_col)
            .expect("selection must fit the default venue set")
            .to_vec();
        let start_time = instant_at(
            dates::monday(),
            grid::slot_start(selection.start_row).unwrap(),
        );
        let end_time = instant_at(
            dates::monday(),
            grid::slot_start(selection.end_row).unwrap(),
        ) + Duration::minutes(15);

        Event {
            id: id.to_string(),
            name: name.to_string(),
            venues,
            start_time,
            end_time,
            selection,
        }
    }
}

/// Session helpers wired to in-memory storage
pub mod sessions {
    use super::*;
    use event_timetable::models::grid::CellPosition;

    /// A fresh session over its own empty in-memory storage
    pub fn fresh() -> TimetableSession<MemoryStorage> {
        TimetableSession::new(
            MemoryStorage::new(),
            VenueDirectory::default(),
            dates::monday(),
        )
    }

    /// A session over the given storage handle, like a second browser tab
    pub fn sharing(storage: &MemoryStorage) -> TimetableSession<MemoryStorage> {
        TimetableSession::new(storage.clone(), VenueDirectory::default(), dates::monday())
    }

    /// Drive a full pointer drag from one cell to another
    pub fn drag<S: Storage>(
        session: &mut TimetableSession<S>,
        from: (usize, usize),
        to: (usize, usize),
    ) {
        session.pointer_down(CellPosition::new(from.0, from.1));
        session.pointer_enter(CellPosition::new(to.0, to.1));
        session.pointer_up();
    }
}
