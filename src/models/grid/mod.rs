//! Timetable grid geometry.
//!
//! Single source of truth for the row/column coordinate system: 96 rows of
//! 15 minutes each down the time axis, one column per venue across. Maps
//! between discrete grid coordinates and time-of-day / venue identity, and
//! defines the normalized `Selection` rectangle everything else works with.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::venue::{Venue, VenueDirectory};

/// Minutes covered by one grid row.
pub const SLOT_MINUTES: u32 = 15;

/// Rows per day: 24 hours at 15-minute granularity.
pub const SLOTS_PER_DAY: usize = 96;

/// Out-of-range grid lookups are contract violations, not user-facing
/// states: the input boundary only ever emits in-range coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("row index {0} is outside the slot range 0..{SLOTS_PER_DAY}")]
    RowOutOfRange(usize),
    #[error("column index {0} is outside the venue range")]
    ColOutOfRange(usize),
}

/// Raw discrete grid coordinate of a pointer or touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

impl CellPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangular block of grid cells, all bounds inclusive.
///
/// Selections are always stored normalized (`start_row <= end_row`,
/// `start_col <= end_col`); both constructors order their inputs, so an
/// unnormalized rectangle cannot be built through the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl Selection {
    /// Build a selection from row/column bounds, normalizing each axis.
    pub fn new(start_row: usize, end_row: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            start_row: start_row.min(end_row),
            end_row: start_row.max(end_row),
            start_col: start_col.min(end_col),
            end_col: start_col.max(end_col),
        }
    }

    /// Build a selection from two arbitrary corner cells of a drag.
    pub fn from_corners(a: CellPosition, b: CellPosition) -> Self {
        Self::new(a.row, b.row, a.col, b.col)
    }

    /// Inclusive membership test for a single cell.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    /// Inclusive-interval overlap on both axes.
    ///
    /// Rectangles that only touch along an edge (`self.end_row + 1 ==
    /// other.start_row` or the column equivalent) do not intersect.
    pub fn intersects(&self, other: &Selection) -> bool {
        let row_overlap = self.start_row <= other.end_row && self.end_row >= other.start_row;
        let col_overlap = self.start_col <= other.end_col && self.end_col >= other.start_col;
        row_overlap && col_overlap
    }

    /// Number of rows covered.
    pub fn row_span(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Number of columns covered.
    pub fn col_span(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

/// Time-of-day at which the given row's slot starts.
///
/// The slot grid is day-relative; callers attach the calendar date.
pub fn slot_start(row: usize) -> Result<NaiveTime, GridError> {
    if row >= SLOTS_PER_DAY {
        return Err(GridError::RowOutOfRange(row));
    }

    let minutes = row as u32 * SLOT_MINUTES;
    // In range by construction: minutes < 24 * 60.
    Ok(NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap())
}

/// Row whose slot contains the given time-of-day (floor to slot start).
pub fn row_at(time: NaiveTime) -> usize {
    ((time.hour() * 60 + time.minute()) / SLOT_MINUTES) as usize
}

/// Row/column lookups over a concrete venue directory.
#[derive(Debug, Clone)]
pub struct GridGeometry {
    venues: VenueDirectory,
}

impl GridGeometry {
    pub fn new(venues: VenueDirectory) -> Self {
        Self { venues }
    }

    pub fn row_count(&self) -> usize {
        SLOTS_PER_DAY
    }

    pub fn col_count(&self) -> usize {
        self.venues.len()
    }

    /// Slot start time for a row. Fails loudly when out of range.
    pub fn time_slot_at(&self, row: usize) -> Result<NaiveTime, GridError> {
        slot_start(row)
    }

    /// Venue occupying a column. Fails loudly when out of range.
    pub fn venue_at(&self, col: usize) -> Result<&Venue, GridError> {
        self.venues.get(col).ok_or(GridError::ColOutOfRange(col))
    }

    /// Bounds check used by the input boundary before any cell reaches
    /// the selection engine.
    pub fn contains_cell(&self, cell: CellPosition) -> bool {
        cell.row < self.row_count() && cell.col < self.col_count()
    }

    pub fn venues(&self) -> &VenueDirectory {
        &self.venues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 0, 0 ; "midnight")]
    #[test_case(1, 0, 15 ; "first quarter")]
    #[test_case(4, 1, 0 ; "one o clock")]
    #[test_case(36, 9, 0 ; "nine o clock")]
    #[test_case(95, 23, 45 ; "last slot")]
    fn test_slot_start(row: usize, hour: u32, minute: u32) {
        let expected = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
        assert_eq!(slot_start(row), Ok(expected));
    }

    #[test]
    fn test_slot_start_out_of_range() {
        assert_eq!(slot_start(96), Err(GridError::RowOutOfRange(96)));
        assert_eq!(slot_start(1000), Err(GridError::RowOutOfRange(1000)));
    }

    #[test]
    fn test_row_at_floors_to_slot() {
        assert_eq!(row_at(NaiveTime::from_hms_opt(0, 0, 0).unwrap()), 0);
        assert_eq!(row_at(NaiveTime::from_hms_opt(0, 14, 59).unwrap()), 0);
        assert_eq!(row_at(NaiveTime::from_hms_opt(0, 15, 0).unwrap()), 1);
        assert_eq!(row_at(NaiveTime::from_hms_opt(9, 22, 0).unwrap()), 37);
        assert_eq!(row_at(NaiveTime::from_hms_opt(23, 59, 59).unwrap()), 95);
    }

    #[test]
    fn test_row_at_inverts_slot_start() {
        for row in 0..SLOTS_PER_DAY {
            assert_eq!(row_at(slot_start(row).unwrap()), row);
        }
    }

    #[test]
    fn test_from_corners_normalizes_both_orders() {
        let a = CellPosition::new(7, 3);
        let b = CellPosition::new(2, 1);

        let forward = Selection::from_corners(a, b);
        let backward = Selection::from_corners(b, a);

        assert_eq!(forward, backward);
        assert_eq!(forward.start_row, 2);
        assert_eq!(forward.end_row, 7);
        assert_eq!(forward.start_col, 1);
        assert_eq!(forward.end_col, 3);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let sel = Selection::new(2, 5, 1, 3);

        assert!(sel.contains(2, 1));
        assert!(sel.contains(5, 3));
        assert!(sel.contains(3, 2));
        assert!(!sel.contains(1, 1));
        assert!(!sel.contains(6, 1));
        assert!(!sel.contains(2, 0));
        assert!(!sel.contains(2, 4));
    }

    #[test]
    fn test_intersects_overlapping() {
        let a = Selection::new(0, 3, 0, 0);
        let b = Selection::new(2, 5, 0, 0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_intersects_contained() {
        let outer = Selection::new(0, 10, 0, 4);
        let inner = Selection::new(3, 4, 2, 2);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_edge_adjacent_rows_do_not_intersect() {
        let upper = Selection::new(0, 3, 0, 2);
        let lower = Selection::new(4, 6, 0, 2);
        assert!(!upper.intersects(&lower));
        assert!(!lower.intersects(&upper));
    }

    #[test]
    fn test_edge_adjacent_cols_do_not_intersect() {
        let left = Selection::new(0, 5, 0, 1);
        let right = Selection::new(0, 5, 2, 3);
        assert!(!left.intersects(&right));
        assert!(!right.intersects(&left));
    }

    #[test]
    fn test_spans() {
        let sel = Selection::new(4, 7, 1, 2);
        assert_eq!(sel.row_span(), 4);
        assert_eq!(sel.col_span(), 2);
    }

    #[test]
    fn test_selection_wire_shape_is_camel_case() {
        let sel = Selection::new(4, 7, 1, 2);
        let json = serde_json::to_string(&sel).unwrap();
        assert_eq!(
            json,
            r#"{"startRow":4,"endRow":7,"startCol":1,"endCol":2}"#
        );

        let parsed: Selection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sel);
    }

    #[test]
    fn test_geometry_lookups() {
        let geometry = GridGeometry::new(VenueDirectory::default());

        assert_eq!(geometry.row_count(), 96);
        assert_eq!(geometry.col_count(), 5);
        assert_eq!(geometry.venue_at(0).unwrap().name, "Venue 1");
        assert_eq!(geometry.venue_at(5), Err(GridError::ColOutOfRange(5)));
        assert_eq!(
            geometry.time_slot_at(8).unwrap(),
            NaiveTime::from_hms_opt(2, 0, 0).unwrap()
        );
        assert_eq!(geometry.time_slot_at(96), Err(GridError::RowOutOfRange(96)));
    }

    #[test]
    fn test_geometry_contains_cell() {
        let geometry = GridGeometry::new(VenueDirectory::default());

        assert!(geometry.contains_cell(CellPosition::new(0, 0)));
        assert!(geometry.contains_cell(CellPosition::new(95, 4)));
        assert!(!geometry.contains_cell(CellPosition::new(96, 0)));
        assert!(!geometry.contains_cell(CellPosition::new(0, 5)));
    }
}
