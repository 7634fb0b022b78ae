use crate::{bridge_candidate, seed_slot, BuildState, CellEntry, CellStore, MazeAccessor, TrackCache};
use muzicmaze_core::{
    AxialCoordinate, Hex, MazeError, MuzicMazeConfig, RecommendationOracle, Result, Track,
    AXIAL_DIRECTIONS,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_MAZE_DEPTH: u32 = 7;
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters for a single build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Growth stops at this hex distance from the origin
    pub depth: u32,
    /// Upper bound on each oracle call; an elapsed call counts as "no answer"
    pub oracle_timeout: Duration,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            depth: DEFAULT_MAZE_DEPTH,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }
}

impl BuildOptions {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }
}

impl From<&MuzicMazeConfig> for BuildOptions {
    fn from(config: &MuzicMazeConfig) -> Self {
        Self {
            depth: config.maze.depth,
            oracle_timeout: config.oracle.timeout(),
        }
    }
}

/// Grows a hex maze outward from two seed tracks.
///
/// The builder owns the cell store and track cache; readers get a
/// [`MazeAccessor`] that only exposes them once the build has finished.
/// All bridge lookups during growth run one after another, since each
/// resolution depends on the track assignments made by the previous one.
pub struct MazeBuilder {
    oracle: Arc<dyn RecommendationOracle>,
    options: BuildOptions,
    cells: CellStore,
    tracks: TrackCache,
    state: watch::Sender<BuildState>,
    prefetches: Mutex<Vec<JoinHandle<()>>>,
}

impl MazeBuilder {
    pub fn new(oracle: Arc<dyn RecommendationOracle>, options: BuildOptions) -> Self {
        let (state, _) = watch::channel(BuildState::Uninitialized);
        Self {
            oracle,
            options,
            cells: CellStore::new(),
            tracks: TrackCache::new(),
            state,
            prefetches: Mutex::new(Vec::new()),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn state(&self) -> BuildState {
        *self.state.borrow()
    }

    /// Read-only view of the maze, usable before the build starts.
    pub fn accessor(&self) -> MazeAccessor {
        MazeAccessor::new(self.cells.clone(), self.tracks.clone(), self.state.subscribe())
    }

    /// Bootstraps the maze from two seeds and grows it to the configured depth.
    ///
    /// Fails with [`MazeError::BootstrapFailed`] when the oracle has no bridge
    /// for the seeds; nothing is committed in that case.
    ///
    /// Cells at distance `>= depth` are committed without being resolved, so
    /// no track node is ever placed beyond the depth bound.
    #[instrument(skip(self), fields(depth = self.options.depth))]
    pub async fn initialize(&self, seed1: &str, seed2: &str) -> Result<()> {
        let started = self.state.send_if_modified(|state| {
            if *state == BuildState::Uninitialized {
                *state = BuildState::Building;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(MazeError::InvalidState(format!(
                "maze build already {}",
                self.state()
            )));
        }

        info!("Building maze");

        let bridge = self
            .call_oracle("fetch_bridge", self.oracle.fetch_bridge(seed1, seed2))
            .await;
        let Some(bridge) = bridge else {
            error!("No bridge track for the seed pair, maze build failed");
            self.finish(BuildState::Failed);
            return Err(MazeError::BootstrapFailed {
                seed1: seed1.to_string(),
                seed2: seed2.to_string(),
            });
        };

        let bridge_id = bridge.id.clone();
        self.tracks.insert(bridge);
        self.prefetch_track_info(seed1);
        self.prefetch_track_info(seed2);

        info!(bridge = %bridge_id, "Building maze with third seed track");
        let origin = Hex::origin(vec![seed1.to_string(), seed2.to_string(), bridge_id]);

        match self.grow(origin, self.options.depth).await {
            Ok(()) => {
                self.finish(BuildState::Ready);
                let track_cells = self.cells.snapshot().iter().filter(|h| h.is_track()).count();
                info!(
                    cells = self.cells.len(),
                    track_cells,
                    cached_tracks = self.tracks.len(),
                    "Maze ready"
                );
                Ok(())
            }
            Err(e) => {
                error!("Maze build aborted: {}", e);
                self.finish(BuildState::Failed);
                Err(e)
            }
        }
    }

    /// Waits for the background seed lookups started by `initialize`.
    pub async fn join_prefetch(&self) {
        let handles = std::mem::take(&mut *self.prefetches.lock());
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                warn!("Seed metadata task panicked: {}", e);
            }
        }
    }

    fn finish(&self, state: BuildState) {
        self.state.send_replace(state);
    }

    fn prefetch_track_info(&self, seed: &str) {
        let oracle = Arc::clone(&self.oracle);
        let tracks = self.tracks.clone();
        let timeout = self.options.oracle_timeout;
        let seed = seed.to_string();

        let handle = tokio::spawn(async move {
            match with_timeout(timeout, "fetch_track_info", oracle.fetch_track_info(&seed)).await {
                Some(track) => {
                    debug!(seed = %seed, name = %track.name, "Cached seed metadata");
                    tracks.insert_as(seed, track);
                }
                None => debug!(seed = %seed, "Seed metadata unavailable"),
            }
        });
        self.prefetches.lock().push(handle);
    }

    async fn call_oracle<F>(&self, call: &'static str, request: F) -> Option<Track>
    where
        F: Future<Output = Option<Track>>,
    {
        with_timeout(self.options.oracle_timeout, call, request).await
    }

    /// Breadth-first frontier growth from the origin out to `depth`.
    #[instrument(skip(self, origin))]
    async fn grow(&self, origin: Hex, depth: u32) -> Result<()> {
        let center = origin.coordinate();
        let seeds = origin.accessed_tracks().to_vec();
        self.cells.commit(origin);

        let mut work: Vec<AxialCoordinate> = Vec::new();
        for direction in AXIAL_DIRECTIONS {
            let mut entry = self.cells.get_or_create(center.neighbor(direction));
            match seed_slot(direction) {
                Some(slot) => {
                    let track_id = seeds.get(slot).ok_or_else(|| {
                        MazeError::Geometry(format!("origin is missing seed track {}", slot))
                    })?;
                    entry.hex_mut().assign_track(track_id.clone());
                }
                None => {
                    entry.hex_mut().make_walkable();
                    work.push(entry.coordinate());
                }
            }
            self.cells.commit_entry(&mut entry);
        }

        // Every popped cell gets exactly one chance at resolution and is
        // never queued again.
        let mut processed: HashSet<String> = HashSet::from([center.key()]);

        while let Some(coordinate) = work.pop() {
            if !processed.insert(coordinate.key()) {
                continue;
            }

            let hex = self.cells.get_or_create(coordinate).into_hex();
            let distance = coordinate.distance(&center);
            let mut neighbors: Vec<CellEntry> = coordinate
                .neighbors()
                .into_iter()
                .map(|c| self.cells.get_or_create(c))
                .collect();

            // Cells on the boundary are kept as they are, so nothing lands past `depth`.
            let full = if distance < depth {
                self.resolve(&hex, &mut neighbors).await?
            } else {
                false
            };

            if full || distance >= depth {
                self.cells.commit(hex);
            }

            if distance < depth {
                for neighbor in &neighbors {
                    let key = neighbor.coordinate().key();
                    if neighbor.hex().is_walkable() && !processed.contains(&key) {
                        work.push(neighbor.coordinate());
                    }
                }
            }
        }

        Ok(())
    }

    /// Tries to place a bridge track next to `hex`. Returns whether `hex` is full.
    async fn resolve(&self, hex: &Hex, neighbors: &mut [CellEntry]) -> Result<bool> {
        if hex.is_track() {
            // Track nodes are never adjacent.
            for neighbor in neighbors.iter_mut() {
                if let Some(removed) = neighbor.hex_mut().make_walkable() {
                    warn!(cell = %neighbor.coordinate(), track = %removed, "Demoted track adjacent to {}", hex.coordinate());
                    if neighbor.is_committed() {
                        self.cells.commit_entry(neighbor);
                    }
                }
            }
            return Ok(true);
        }

        let track_neighbors: Vec<(AxialCoordinate, String)> = neighbors
            .iter()
            .filter_map(|n| n.hex().track_id().map(|id| (n.coordinate(), id.to_string())))
            .collect();

        match track_neighbors.as_slice() {
            [] | [_] => Ok(false),
            [(first, first_id), (second, second_id)] => {
                let bridge = self
                    .call_oracle("fetch_bridge", self.oracle.fetch_bridge(first_id, second_id))
                    .await;
                let Some(track) = bridge else {
                    warn!(cell = %hex.coordinate(), first = %first_id, second = %second_id, "No bridge track, leaving cell unresolved");
                    return Ok(false);
                };

                let target = bridge_candidate(hex.coordinate(), *first, *second).ok_or_else(|| {
                    MazeError::Geometry(format!(
                        "no bridge direction from {} between {} and {}",
                        hex.coordinate(),
                        first,
                        second
                    ))
                })?;
                let entry = neighbors
                    .iter_mut()
                    .find(|n| n.coordinate() == target)
                    .ok_or_else(|| {
                        MazeError::Geometry(format!("{} is not a neighbor of {}", target, hex.coordinate()))
                    })?;

                debug!(cell = %target, track = %track.id, "Placed bridge track");
                entry.hex_mut().assign_track(track.id.clone());
                self.tracks.insert(track);
                self.cells.commit_entry(entry);
                Ok(true)
            }
            [_, _, _] => Ok(true),
            more => Err(MazeError::Geometry(format!(
                "{} has {} track neighbors",
                hex.coordinate(),
                more.len()
            ))),
        }
    }
}

async fn with_timeout<F>(timeout: Duration, call: &'static str, request: F) -> Option<Track>
where
    F: Future<Output = Option<Track>>,
{
    match tokio::time::timeout(timeout, request).await {
        Ok(track) => track,
        Err(_) => {
            warn!(call, timeout_ms = timeout.as_millis() as u64, "Oracle call timed out");
            None
        }
    }
}
