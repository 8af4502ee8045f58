//! Event store entry point.
//! Owns the per-date booking sequences for the lifetime of a session and
//! keeps them synchronized with the storage adapter; the wire format lives
//! in the `mapper` submodule.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Local, NaiveDate};
use uuid::Uuid;

use crate::models::event::{Event, EventsByDate};
use crate::models::grid::{self, GridError, Selection, SLOT_MINUTES};
use crate::models::venue::{Venue, VenueDirectory};
use crate::services::storage::Storage;
use crate::utils::date::{date_key, instant_at};

pub mod mapper;

/// Storage key under which the whole date-to-events mapping is persisted.
pub const EVENTS_STORAGE_KEY: &str = "event-timetable-events";

/// Venue slice and time range described by a selection rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRange {
    pub venues: Vec<Venue>,
    pub start_time: DateTime<Local>,
    /// Exclusive end instant: one quantum past the start of the last
    /// occupied slot.
    pub end_time: DateTime<Local>,
}

/// Service for managing booked events keyed by calendar date.
pub struct EventStore<S: Storage> {
    storage: S,
    venues: VenueDirectory,
    events: EventsByDate,
}

impl<S: Storage> EventStore<S> {
    /// Read the persisted events and build a store over them.
    ///
    /// A missing, unreadable, or malformed payload degrades to an empty
    /// mapping; the failure is logged, never surfaced.
    pub fn load(storage: S, venues: VenueDirectory) -> Self {
        let events = read_events(&storage, &venues);
        let total: usize = events.values().map(Vec::len).sum();
        log::info!("loaded {} events across {} dates", total, events.len());

        Self {
            storage,
            venues,
            events,
        }
    }

    /// Events booked on the given date, in creation order.
    pub fn events_for(&self, date: NaiveDate) -> &[Event] {
        self.events
            .get(&date_key(date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Create an event and append it to the date's sequence.
    ///
    /// Assigns a fresh unique id and persists the whole mapping. Does not
    /// check for clashes: the caller is expected to have consulted the
    /// clash detector and obtained confirmation before calling this.
    pub fn create(
        &mut self,
        date: NaiveDate,
        name: &str,
        selection: Selection,
        range: &SelectedRange,
    ) -> Result<Event> {
        let mut event = Event::new(
            name,
            range.venues.clone(),
            range.start_time,
            range.end_time,
            selection,
        )
        .map_err(|e| anyhow!(e))?;
        event.id = Uuid::new_v4().to_string();

        let key = date_key(date);
        log::info!("creating event \"{}\" ({}) on {}", event.name, event.id, key);
        self.events.entry(key).or_default().push(event.clone());
        self.persist();

        Ok(event)
    }

    /// Remove the event with the given id from the date's sequence.
    ///
    /// Returns whether anything was removed; an unknown id (or a date with
    /// no events) is a silent no-op and nothing is persisted.
    pub fn delete(&mut self, date: NaiveDate, event_id: &str) -> bool {
        let key = date_key(date);
        let Some(events) = self.events.get_mut(&key) else {
            return false;
        };

        let before = events.len();
        events.retain(|event| event.id != event_id);
        if events.len() == before {
            log::debug!("delete of unknown event {event_id} on {key} ignored");
            return false;
        }

        log::info!("deleted event {event_id} on {key}");
        self.persist();
        true
    }

    /// First event (in store order) whose rectangle contains `(row, col)`.
    ///
    /// Deliberately first-match: already-stored events are allowed to
    /// overlap, and the earliest booking wins the lookup.
    pub fn event_at(&self, date: NaiveDate, row: usize, col: usize) -> Option<&Event> {
        self.events_for(date)
            .iter()
            .find(|event| event.selection.contains(row, col))
    }

    /// Event with the given id on the given date, if any.
    pub fn event_by_id(&self, date: NaiveDate, event_id: &str) -> Option<&Event> {
        self.events_for(date)
            .iter()
            .find(|event| event.id == event_id)
    }

    /// Venue slice and instants described by a selection on a date.
    ///
    /// The end instant is exclusive: slot start of `end_row` plus one
    /// 15-minute quantum, which lands on the next day when the selection
    /// runs to the last slot.
    pub fn range_info(
        &self,
        date: NaiveDate,
        selection: &Selection,
    ) -> Result<SelectedRange, GridError> {
        let venues = self
            .venues
            .slice(selection.start_col, selection.end_col)
            .ok_or(GridError::ColOutOfRange(selection.end_col))?
            .to_vec();

        let start_time = instant_at(date, grid::slot_start(selection.start_row)?);
        let last_slot_start = instant_at(date, grid::slot_start(selection.end_row)?);
        let end_time = last_slot_start + Duration::minutes(SLOT_MINUTES as i64);

        Ok(SelectedRange {
            venues,
            start_time,
            end_time,
        })
    }

    /// Replace the in-memory view for every date with a fresh read.
    ///
    /// External-change semantics are a full overwrite, not a merge: a
    /// local mutation that had not reached storage yet is lost.
    pub fn reload(&mut self) {
        self.events = read_events(&self.storage, &self.venues);
    }

    pub fn venues(&self) -> &VenueDirectory {
        &self.venues
    }

    pub fn events_by_date(&self) -> &EventsByDate {
        &self.events
    }

    /// Serialize and write the whole mapping under the single storage key.
    ///
    /// In-memory state stays authoritative for this session even when the
    /// write fails; the failure is reported to the log only.
    fn persist(&self) {
        let payload = match mapper::serialize_events_by_date(&self.events) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("failed to serialize events, skipping persist: {err:#}");
                return;
            }
        };

        if let Err(err) = self.storage.set(EVENTS_STORAGE_KEY, &payload) {
            log::warn!("failed to persist events: {err:#}");
        }
    }
}

fn read_events<S: Storage>(storage: &S, venues: &VenueDirectory) -> EventsByDate {
    match storage.get(EVENTS_STORAGE_KEY) {
        Ok(Some(payload)) => mapper::deserialize_events_by_date(&payload, venues),
        Ok(None) => EventsByDate::new(),
        Err(err) => {
            log::warn!("failed to read stored events, starting empty: {err:#}");
            EventsByDate::new()
        }
    }
}
