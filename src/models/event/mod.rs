// Event module
// A booked block of venues and time slots on one calendar date

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::models::grid::Selection;
use crate::models::venue::Venue;

/// A confirmed booking occupying one rectangular block of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Globally unique id, assigned by the event store on creation.
    pub id: String,
    pub name: String,
    /// Contiguous venue columns covered, in directory order.
    pub venues: Vec<Venue>,
    pub start_time: DateTime<Local>,
    /// Exclusive end instant: the start of the slot after the last
    /// occupied one.
    pub end_time: DateTime<Local>,
    pub selection: Selection,
}

impl Event {
    /// Create a new event with a trimmed name.
    ///
    /// # Returns
    /// Returns `Result<Event, String>` with validation: the name must be
    /// non-empty after trimming, at least one venue must be covered, and
    /// the end instant must come after the start. The id is left empty;
    /// assigning it is the event store's job.
    pub fn new(
        name: impl Into<String>,
        venues: Vec<Venue>,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
        selection: Selection,
    ) -> Result<Self, String> {
        let name = name.into().trim().to_string();

        if name.is_empty() {
            return Err("Event name cannot be empty".to_string());
        }

        if venues.is_empty() {
            return Err("Event must cover at least one venue".to_string());
        }

        if end_time <= start_time {
            return Err("Event end time must be after start time".to_string());
        }

        Ok(Self {
            id: String::new(),
            name,
            venues,
            start_time,
            end_time,
            selection,
        })
    }

    /// Get the duration of the booking.
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

/// Events grouped by their `YYYY-MM-DD` date key, the unit of persistence.
///
/// Keys the current venue set does not recognize still round-trip through
/// load/persist cycles untouched.
pub type EventsByDate = BTreeMap<String, Vec<Event>>;
