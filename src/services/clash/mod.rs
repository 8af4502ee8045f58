// Clash detection
// Pure rectangle-overlap queries against the existing bookings

use crate::models::event::Event;
use crate::models::grid::Selection;

/// Result of checking a candidate rectangle against existing events.
///
/// Ephemeral query output, recomputed whenever the candidate rectangle or
/// the event list changes; never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClashInfo {
    pub has_clash: bool,
    pub clashing_events: Vec<Event>,
}

impl ClashInfo {
    /// Comma-separated names of the conflicting events, for warnings like
    /// "Conflicts with: Soundcheck, Rehearsal".
    pub fn clashing_names(&self) -> String {
        self.clashing_events
            .iter()
            .map(|event| event.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Find every event whose selection overlaps `rect`.
///
/// Matches are reported in the order the events appear in `events`. An
/// event whose id equals `exclude_id` is never reported, even when its
/// rectangle overlaps. Detection only reports; whether a clash blocks an
/// action is the caller's policy.
pub fn detect(rect: &Selection, events: &[Event], exclude_id: Option<&str>) -> ClashInfo {
    let clashing_events: Vec<Event> = events
        .iter()
        .filter(|event| {
            if exclude_id.is_some_and(|id| id == event.id) {
                return false;
            }
            event.selection.intersects(rect)
        })
        .cloned()
        .collect();

    ClashInfo {
        has_clash: !clashing_events.is_empty(),
        clashing_events,
    }
}
