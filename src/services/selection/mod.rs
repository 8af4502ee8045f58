//! Drag-selection state machine.
//!
//! Tracks an in-progress drag gesture and the committed rectangular
//! selection: Idle -> Dragging -> Committed -> Idle. The engine works on
//! raw cell coordinates and never clamps them; geometry bounds are the
//! input boundary's job, and the occupied-cell tie-break (clicking an
//! event selects it instead of starting a drag) lives in the caller.

use crate::models::grid::{CellPosition, Selection};

/// Tracks the drag gesture corners and the committed selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    drag_start: Option<CellPosition>,
    drag_end: Option<CellPosition>,
    committed: Option<Selection>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag at `cell`, clearing any previously committed selection.
    ///
    /// Callers must only begin a drag over an empty cell; a press on a cell
    /// holding an event is an event-selection action and never reaches the
    /// engine.
    pub fn begin_drag(&mut self, cell: CellPosition) {
        self.drag_start = Some(cell);
        self.drag_end = Some(cell);
        self.committed = None;
    }

    /// Move the drag's far corner to `cell`. Ignored when no drag is active.
    pub fn extend_drag(&mut self, cell: CellPosition) {
        if self.drag_start.is_none() {
            log::debug!("ignoring drag extension at {cell:?}: no drag in progress");
            return;
        }
        self.drag_end = Some(cell);
    }

    /// Finish the drag, normalizing its corners into the committed
    /// selection. A no-op returning `None` when no drag was begun.
    pub fn commit_drag(&mut self) -> Option<Selection> {
        let (Some(start), Some(end)) = (self.drag_start, self.drag_end) else {
            return None;
        };

        let selection = Selection::from_corners(start, end);
        self.drag_start = None;
        self.drag_end = None;
        self.committed = Some(selection);
        Some(selection)
    }

    /// Drop drag and committed state, from any state.
    pub fn clear(&mut self) {
        self.drag_start = None;
        self.drag_end = None;
        self.committed = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Live normalized preview of the drag rectangle, while dragging.
    pub fn in_progress(&self) -> Option<Selection> {
        match (self.drag_start, self.drag_end) {
            (Some(start), Some(end)) => Some(Selection::from_corners(start, end)),
            _ => None,
        }
    }

    pub fn committed(&self) -> Option<Selection> {
        self.committed
    }

    /// Whether `(row, col)` lies inside the in-progress drag rectangle.
    /// False when no drag is active.
    pub fn contains_in_progress(&self, row: usize, col: usize) -> bool {
        self.in_progress()
            .is_some_and(|selection| selection.contains(row, col))
    }

    /// Whether `(row, col)` lies inside the committed selection.
    /// False when nothing is committed.
    pub fn contains_committed(&self, row: usize, col: usize) -> bool {
        self.committed
            .is_some_and(|selection| selection.contains(row, col))
    }
}
