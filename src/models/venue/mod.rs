// Venue module
// The fixed set of bookable venues shown as grid columns

use serde::{Deserialize, Serialize};

/// A bookable venue, one column of the timetable grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
}

impl Venue {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Immutable, validated list of venues in column order.
///
/// The directory is injected wherever venue identity is needed (grid
/// geometry, event store, wire codec) instead of living in a global,
/// so a custom venue set can be swapped in at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueDirectory {
    venues: Vec<Venue>,
}

impl VenueDirectory {
    /// Build a directory from an ordered venue list.
    ///
    /// # Returns
    /// Returns `Result<VenueDirectory, String>` with validation: the list
    /// must be non-empty, ids must be unique and names non-blank.
    pub fn new(venues: Vec<Venue>) -> Result<Self, String> {
        if venues.is_empty() {
            return Err("Venue list cannot be empty".to_string());
        }

        for venue in &venues {
            if venue.name.trim().is_empty() {
                return Err(format!("Venue {} has a blank name", venue.id));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for venue in &venues {
            if !seen.insert(venue.id) {
                return Err(format!("Duplicate venue id {}", venue.id));
            }
        }

        Ok(Self { venues })
    }

    /// Number of venue columns.
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Venue at the given column index, if in range.
    pub fn get(&self, col: usize) -> Option<&Venue> {
        self.venues.get(col)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Venue> {
        self.venues.iter()
    }

    /// All venues in column order.
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// Contiguous column slice, both bounds inclusive.
    /// `None` when the range is reversed or runs past the last column.
    pub fn slice(&self, start_col: usize, end_col: usize) -> Option<&[Venue]> {
        if start_col > end_col || end_col >= self.venues.len() {
            return None;
        }
        Some(&self.venues[start_col..=end_col])
    }

    /// Resolve persisted venue ids back to venues, in directory order.
    ///
    /// Ids that no longer exist in the directory are silently dropped, so
    /// events stored against a venue that was later removed keep loading
    /// with the venues that remain.
    pub fn resolve_ids(&self, ids: &[i64]) -> Vec<Venue> {
        self.venues
            .iter()
            .filter(|venue| ids.contains(&venue.id))
            .cloned()
            .collect()
    }
}

impl Default for VenueDirectory {
    fn default() -> Self {
        Self {
            venues: (1..=5).map(|i| Venue::new(i, format!("Venue {i}"))).collect(),
        }
    }
}
