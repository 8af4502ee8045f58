//! Timetable session: the input boundary and commit-flow policy.
//!
//! Owns the grid geometry, the event store, the drag-selection engine, the
//! visible date, and the cached clash result, and turns raw pointer/touch
//! input into selection and booking state. Rendering stays outside; a front
//! end reads the accessors and routes its input events here.

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::models::event::Event;
use crate::models::grid::{CellPosition, GridGeometry, Selection};
use crate::models::venue::VenueDirectory;
use crate::services::clash::{self, ClashInfo};
use crate::services::event::{EventStore, SelectedRange};
use crate::services::selection::SelectionEngine;
use crate::services::storage::Storage;

/// Maps free coordinates (pixels, touch points) to grid cells.
///
/// Touch events report where the finger is, not which cell it is over, so
/// hit-testing is injected: the embedder knows its cell metrics.
pub trait CellResolver {
    fn cell_at(&self, x: f64, y: f64) -> Option<CellPosition>;
}

/// Resolver for a grid of uniformly sized cells anchored at the origin.
#[derive(Debug, Clone)]
pub struct UniformGridResolver {
    cell_width: f64,
    row_height: f64,
    rows: usize,
    cols: usize,
}

impl UniformGridResolver {
    pub fn new(geometry: &GridGeometry, cell_width: f64, row_height: f64) -> Self {
        Self {
            cell_width,
            row_height,
            rows: geometry.row_count(),
            cols: geometry.col_count(),
        }
    }
}

impl CellResolver for UniformGridResolver {
    fn cell_at(&self, x: f64, y: f64) -> Option<CellPosition> {
        if self.cell_width <= 0.0 || self.row_height <= 0.0 {
            return None;
        }
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }

        let col = (x / self.cell_width).floor() as usize;
        let row = (y / self.row_height).floor() as usize;
        (row < self.rows && col < self.cols).then_some(CellPosition::new(row, col))
    }
}

/// One user's view of the timetable for one date at a time.
pub struct TimetableSession<S: Storage> {
    geometry: GridGeometry,
    store: EventStore<S>,
    engine: SelectionEngine,
    date: NaiveDate,
    /// Clash result cached at commit time, recomputed whenever the visible
    /// event list changes underneath a committed selection.
    clash: Option<ClashInfo>,
    selected_event_id: Option<String>,
}

impl<S: Storage> TimetableSession<S> {
    pub fn new(storage: S, venues: VenueDirectory, date: NaiveDate) -> Self {
        let geometry = GridGeometry::new(venues.clone());
        let store = EventStore::load(storage, venues);

        Self {
            geometry,
            store,
            engine: SelectionEngine::new(),
            date,
            clash: None,
            selected_event_id: None,
        }
    }

    /// Pointer pressed on a cell.
    ///
    /// An occupied cell selects the existing booking instead of starting a
    /// drag; where overlapping bookings share the cell the earliest one
    /// wins, matching `event_at`. An empty cell deselects and starts a new
    /// drag. Out-of-grid cells never reach the selection engine.
    pub fn pointer_down(&mut self, cell: CellPosition) {
        if !self.geometry.contains_cell(cell) {
            log::debug!("pointer down outside the grid at {cell:?} ignored");
            return;
        }

        if let Some(event) = self.store.event_at(self.date, cell.row, cell.col) {
            let id = event.id.clone();
            log::debug!("selected event {id}");
            self.selected_event_id = Some(id);
            self.engine.clear();
            self.clash = None;
            return;
        }

        self.selected_event_id = None;
        self.clash = None;
        self.engine.begin_drag(cell);
    }

    /// Pointer moved onto a cell while the button is held.
    pub fn pointer_enter(&mut self, cell: CellPosition) {
        if !self.geometry.contains_cell(cell) {
            return;
        }
        self.engine.extend_drag(cell);
    }

    /// Pointer released: commit the drag and run clash detection.
    ///
    /// The embedder must route releases that happen outside the grid here
    /// too (the document-level listener in a windowed front end), so a drag
    /// is never left uncommitted.
    pub fn pointer_up(&mut self) {
        let Some(selection) = self.engine.commit_drag() else {
            return;
        };

        let info = clash::detect(&selection, self.store.events_for(self.date), None);
        if info.has_clash {
            log::info!("selection clashes with: {}", info.clashing_names());
        }
        self.clash = Some(info);
    }

    /// Touch began on a cell. Same policy as a pointer press.
    pub fn touch_start(&mut self, cell: CellPosition) {
        self.pointer_down(cell);
    }

    /// Finger moved to a free coordinate during a drag.
    ///
    /// A point no cell claims (gaps, off-grid) is skipped and the drag
    /// keeps its last extent.
    pub fn touch_move(&mut self, x: f64, y: f64, resolver: &dyn CellResolver) {
        if !self.engine.is_dragging() {
            return;
        }
        let Some(cell) = resolver.cell_at(x, y) else {
            return;
        };
        self.pointer_enter(cell);
    }

    /// Finger lifted. Same finalization as a pointer release.
    pub fn touch_end(&mut self) {
        self.pointer_up();
    }

    /// The committed selection, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.engine.committed()
    }

    /// Clash result for the committed selection. `None` until a commit.
    pub fn clash(&self) -> Option<&ClashInfo> {
        self.clash.as_ref()
    }

    /// Venues and instants covered by the committed selection.
    pub fn selected_range(&self) -> Option<SelectedRange> {
        let selection = self.engine.committed()?;
        self.store.range_info(self.date, &selection).ok()
    }

    /// The banner line for the committed selection.
    ///
    /// "Selected: Venue 1, Venue 2 | 9:00 AM - 10:00 AM", or the clash
    /// variant naming the conflicting events.
    pub fn selection_summary(&self) -> Option<String> {
        let range = self.selected_range()?;
        let venues = range
            .venues
            .iter()
            .map(|venue| venue.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let times = format!(
            "{} - {}",
            range.start_time.format("%-I:%M %p"),
            range.end_time.format("%-I:%M %p")
        );

        let summary = match self.clash.as_ref().filter(|info| info.has_clash) {
            Some(info) => format!(
                "⚠️ Clash Detected: {venues} | {times} Conflicts with: {}",
                info.clashing_names()
            ),
            None => format!("Selected: {venues} | {times}"),
        };
        Some(summary)
    }

    /// Whether a booking can be created right now: a committed selection
    /// exists and its clash check came back clean.
    pub fn can_create(&self) -> bool {
        self.engine.committed().is_some()
            && !self.clash.as_ref().is_some_and(|info| info.has_clash)
    }

    /// Book the committed selection under the given name.
    ///
    /// Refuses when nothing is selected or when the cached clash check
    /// found conflicts; the error names them. On success the selection is
    /// cleared and the new event becomes the selected one.
    pub fn create_event(&mut self, name: &str) -> Result<Event> {
        let Some(selection) = self.engine.committed() else {
            bail!("Nothing is selected");
        };

        if let Some(info) = self.clash.as_ref().filter(|info| info.has_clash) {
            bail!("Clash detected, conflicts with: {}", info.clashing_names());
        }

        let range = self.store.range_info(self.date, &selection)?;
        let event = self.store.create(self.date, name, selection, &range)?;

        self.engine.clear();
        self.clash = None;
        self.selected_event_id = Some(event.id.clone());

        Ok(event)
    }

    /// Remove a booking from the visible date.
    ///
    /// Returns whether anything was removed. A removed event that was
    /// selected is deselected; the cached clash is recomputed since the
    /// event list under a committed selection may have changed.
    pub fn delete_event(&mut self, event_id: &str) -> bool {
        let removed = self.store.delete(self.date, event_id);
        if !removed {
            return false;
        }

        if self.selected_event_id.as_deref() == Some(event_id) {
            self.selected_event_id = None;
        }
        self.refresh_clash();
        true
    }

    /// Click on an event block: select it, or deselect when already
    /// selected. Selecting drops any committed selection.
    pub fn toggle_event(&mut self, event_id: &str) {
        if self.selected_event_id.as_deref() == Some(event_id) {
            self.selected_event_id = None;
            return;
        }
        if self.store.event_by_id(self.date, event_id).is_none() {
            log::debug!("toggle of unknown event {event_id} ignored");
            return;
        }

        self.selected_event_id = Some(event_id.to_string());
        self.engine.clear();
        self.clash = None;
    }

    pub fn selected_event(&self) -> Option<&Event> {
        let id = self.selected_event_id.as_deref()?;
        self.store.event_by_id(self.date, id)
    }

    /// Drop the committed selection and its clash result. The selected
    /// event, if any, stays selected.
    pub fn clear_selection(&mut self) {
        self.engine.clear();
        self.clash = None;
    }

    /// Switch the visible date.
    ///
    /// A committed selection survives the switch, so its clash result is
    /// recomputed against the newly visible events; a selected event that
    /// does not exist on the new date is deselected.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.refresh_clash();
        self.revalidate_selected_event();
    }

    /// Re-read events from storage, replacing the in-memory view wholesale,
    /// and bring the derived state back in line with what is now visible.
    pub fn refresh_from_storage(&mut self) {
        self.store.reload();
        self.refresh_clash();
        self.revalidate_selected_event();
    }

    /// Whether the cell is inside the live (uncommitted) drag rectangle.
    pub fn is_cell_in_drag(&self, row: usize, col: usize) -> bool {
        self.engine.contains_in_progress(row, col)
    }

    /// Whether the cell is inside the committed selection.
    pub fn is_cell_selected(&self, row: usize, col: usize) -> bool {
        self.engine.contains_committed(row, col)
    }

    /// Whether the cell should render in the clash style: selected, the
    /// commit found conflicts, and one of the conflicting events covers
    /// this cell.
    pub fn clash_at(&self, row: usize, col: usize) -> bool {
        self.is_cell_selected(row, col)
            && self.clash.as_ref().is_some_and(|info| {
                info.has_clash
                    && info
                        .clashing_events
                        .iter()
                        .any(|event| event.selection.contains(row, col))
            })
    }

    /// Events booked on the visible date.
    pub fn events(&self) -> &[Event] {
        self.store.events_for(self.date)
    }

    /// First event covering the cell on the visible date, if any.
    pub fn event_at(&self, row: usize, col: usize) -> Option<&Event> {
        self.store.event_at(self.date, row, col)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn venues(&self) -> &VenueDirectory {
        self.store.venues()
    }

    pub fn is_dragging(&self) -> bool {
        self.engine.is_dragging()
    }

    fn refresh_clash(&mut self) {
        let recomputed = self
            .engine
            .committed()
            .map(|selection| clash::detect(&selection, self.store.events_for(self.date), None));
        self.clash = recomputed;
    }

    fn revalidate_selected_event(&mut self) {
        let still_visible = self
            .selected_event_id
            .as_deref()
            .is_some_and(|id| self.store.event_by_id(self.date, id).is_some());
        if !still_visible {
            self.selected_event_id = None;
        }
    }
}
