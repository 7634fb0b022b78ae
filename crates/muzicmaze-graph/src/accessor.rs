use crate::{BuildState, CellStore, TrackCache};
use muzicmaze_core::{Hex, Track};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Summary of a finished (or failed) maze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeStats {
    pub state: BuildState,
    pub total_cells: usize,
    pub track_cells: usize,
    pub walkable_cells: usize,
    pub cached_tracks: usize,
}

/// Read-only view of a maze for the rendering layer.
#[derive(Debug, Clone)]
pub struct MazeAccessor {
    cells: CellStore,
    tracks: TrackCache,
    state: watch::Receiver<BuildState>,
}

impl MazeAccessor {
    pub(crate) fn new(cells: CellStore, tracks: TrackCache, state: watch::Receiver<BuildState>) -> Self {
        Self { cells, tracks, state }
    }

    pub fn state(&self) -> BuildState {
        *self.state.borrow()
    }

    /// Suspends until the build leaves `Building`. A builder dropped before
    /// finishing counts as failed.
    pub async fn wait_until_finished(&self) -> BuildState {
        let mut state = self.state.clone();
        let _ = state.wait_for(BuildState::is_terminal).await;
        let current = *state.borrow();
        if current.is_terminal() {
            current
        } else {
            BuildState::Failed
        }
    }

    /// All committed cells once the maze is ready; empty if the build failed.
    pub async fn get_cells(&self) -> Vec<Hex> {
        match self.wait_until_finished().await {
            BuildState::Ready => self.cells.snapshot(),
            _ => Vec::new(),
        }
    }

    /// Like [`get_cells`](Self::get_cells), but empty when the maze has fewer
    /// than `min_cells` cells.
    pub async fn renderable_cells(&self, min_cells: usize) -> Vec<Hex> {
        let cells = self.get_cells().await;
        if cells.len() < min_cells {
            tracing::warn!(cells = cells.len(), min_cells, "Not enough cells to render");
            return Vec::new();
        }
        cells
    }

    /// Metadata for a track node; `None` for walkable cells or uncached tracks.
    pub fn get_track_for(&self, hex: &Hex) -> Option<Track> {
        hex.track_id().and_then(|id| self.tracks.get(id))
    }

    pub async fn stats(&self) -> MazeStats {
        let state = self.wait_until_finished().await;
        let cells = self.get_cells().await;
        let track_cells = cells.iter().filter(|hex| hex.is_track()).count();
        MazeStats {
            state,
            total_cells: cells.len(),
            track_cells,
            walkable_cells: cells.len() - track_cells,
            cached_tracks: self.tracks.len(),
        }
    }
}
