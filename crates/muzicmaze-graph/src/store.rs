use dashmap::DashMap;
use muzicmaze_core::{AxialCoordinate, Hex};
use std::sync::Arc;

/// A cell handed out by [`CellStore::get_or_create`].
///
/// Drafts are private to the caller until committed; committed entries are a
/// copy of what other readers currently see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEntry {
    Draft(Hex),
    Committed(Hex),
}

impl CellEntry {
    pub fn hex(&self) -> &Hex {
        match self {
            CellEntry::Draft(hex) | CellEntry::Committed(hex) => hex,
        }
    }

    pub fn hex_mut(&mut self) -> &mut Hex {
        match self {
            CellEntry::Draft(hex) | CellEntry::Committed(hex) => hex,
        }
    }

    pub fn into_hex(self) -> Hex {
        match self {
            CellEntry::Draft(hex) | CellEntry::Committed(hex) => hex,
        }
    }

    pub fn coordinate(&self) -> AxialCoordinate {
        self.hex().coordinate()
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, CellEntry::Committed(_))
    }
}

/// Committed cells keyed by canonical coordinate key.
#[derive(Debug, Clone, Default)]
pub struct CellStore {
    cells: Arc<DashMap<String, Hex>>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed cell at `coordinate`, or a fresh walkable draft.
    pub fn get_or_create(&self, coordinate: AxialCoordinate) -> CellEntry {
        match self.cells.get(&coordinate.key()) {
            Some(hex) => CellEntry::Committed(hex.clone()),
            None => CellEntry::Draft(Hex::new(coordinate)),
        }
    }

    /// Upserts `hex`; the last write for a coordinate wins.
    pub fn commit(&self, hex: Hex) {
        self.cells.insert(hex.key(), hex);
    }

    /// Commits the entry and marks it as committed.
    pub fn commit_entry(&self, entry: &mut CellEntry) {
        let hex = entry.hex().clone();
        self.commit(hex.clone());
        *entry = CellEntry::Committed(hex);
    }

    pub fn contains(&self, coordinate: AxialCoordinate) -> bool {
        self.cells.contains_key(&coordinate.key())
    }

    pub fn get(&self, coordinate: AxialCoordinate) -> Option<Hex> {
        self.cells.get(&coordinate.key()).map(|hex| hex.clone())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every committed cell, ordered by coordinate.
    pub fn snapshot(&self) -> Vec<Hex> {
        let mut cells: Vec<Hex> = self.cells.iter().map(|entry| entry.value().clone()).collect();
        cells.sort_by_key(|hex| hex.coordinate());
        cells
    }
}
