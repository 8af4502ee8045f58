// Wire codec for the persisted events payload.
// Events travel as camelCase JSON with venues flattened to their ids and
// instants rendered as RFC 3339 text.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::event::{Event, EventsByDate};
use crate::models::grid::Selection;
use crate::models::venue::VenueDirectory;

/// Persisted form of one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedEvent {
    pub id: String,
    pub name: String,
    pub venue_ids: Vec<i64>,
    pub start_time: String,
    pub end_time: String,
    pub selection: Selection,
}

type SerializedEventsByDate = BTreeMap<String, Vec<SerializedEvent>>;

/// Serialize the whole date-to-events mapping to a JSON string.
pub fn serialize_events_by_date(events_by_date: &EventsByDate) -> Result<String> {
    let serialized: SerializedEventsByDate = events_by_date
        .iter()
        .map(|(date, events)| {
            let events = events.iter().map(serialize_event).collect();
            (date.clone(), events)
        })
        .collect();

    serde_json::to_string(&serialized).context("Failed to serialize events")
}

/// Decode a stored payload against the current venue directory.
///
/// Any decode failure degrades to an empty mapping with a warning in the
/// log; persisted state is never allowed to wedge startup. Venue ids the
/// directory no longer knows are dropped from the restored event.
pub fn deserialize_events_by_date(payload: &str, venues: &VenueDirectory) -> EventsByDate {
    match try_deserialize(payload, venues) {
        Ok(events) => events,
        Err(err) => {
            log::warn!("Failed to load stored events, starting empty: {err:#}");
            EventsByDate::new()
        }
    }
}

fn serialize_event(event: &Event) -> SerializedEvent {
    SerializedEvent {
        id: event.id.clone(),
        name: event.name.clone(),
        venue_ids: event.venues.iter().map(|venue| venue.id).collect(),
        start_time: event.start_time.to_rfc3339(),
        end_time: event.end_time.to_rfc3339(),
        selection: event.selection,
    }
}

fn try_deserialize(payload: &str, venues: &VenueDirectory) -> Result<EventsByDate> {
    let serialized: SerializedEventsByDate =
        serde_json::from_str(payload).context("Failed to parse events payload")?;

    let mut events_by_date = EventsByDate::new();
    for (date, items) in serialized {
        let events = items
            .into_iter()
            .map(|item| restore_event(item, venues))
            .collect::<Result<Vec<_>>>()?;
        events_by_date.insert(date, events);
    }

    Ok(events_by_date)
}

fn restore_event(item: SerializedEvent, venues: &VenueDirectory) -> Result<Event> {
    let stored = item.selection;

    Ok(Event {
        id: item.id,
        name: item.name,
        venues: venues.resolve_ids(&item.venue_ids),
        start_time: parse_instant(&item.start_time)?,
        end_time: parse_instant(&item.end_time)?,
        // Stored rectangles are re-normalized on the way in.
        selection: Selection::new(
            stored.start_row,
            stored.end_row,
            stored.start_col,
            stored.end_col,
        ),
    })
}

fn parse_instant(value: &str) -> Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Local))
        .with_context(|| format!("Failed to parse instant {value:?}"))
}
