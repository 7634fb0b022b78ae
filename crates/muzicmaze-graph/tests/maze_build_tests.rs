use async_trait::async_trait;
use muzicmaze_core::{AxialCoordinate, Hex, MazeError, RecommendationOracle, Track};
use muzicmaze_graph::{BuildOptions, BuildState, MazeBuilder};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How the scripted oracle answers bridge requests.
enum BridgeScript {
    /// Fresh ids "T1", "T2", ... in call order.
    Sequential,
    /// Only the first call (the bootstrap) gets an answer.
    BootstrapOnly,
    /// Never answers.
    Silent,
}

struct ScriptedOracle {
    script: BridgeScript,
    counter: AtomicUsize,
    bridge_calls: Mutex<Vec<(String, String)>>,
    track_info: HashMap<String, Track>,
    delay: Duration,
}

impl ScriptedOracle {
    fn new(script: BridgeScript) -> Self {
        Self {
            script,
            counter: AtomicUsize::new(0),
            bridge_calls: Mutex::new(Vec::new()),
            track_info: HashMap::new(),
            delay: Duration::ZERO,
        }
    }

    fn with_track_info(mut self, track: Track) -> Self {
        self.track_info.insert(track.id.clone(), track);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.bridge_calls.lock().clone()
    }
}

#[async_trait]
impl RecommendationOracle for ScriptedOracle {
    async fn fetch_bridge(&self, first_id: &str, second_id: &str) -> Option<Track> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.bridge_calls
            .lock()
            .push((first_id.to_string(), second_id.to_string()));
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        match self.script {
            BridgeScript::Sequential => Some(Track::new(format!("T{}", n))),
            BridgeScript::BootstrapOnly if n == 1 => Some(Track::new(format!("T{}", n))),
            BridgeScript::BootstrapOnly | BridgeScript::Silent => None,
        }
    }

    async fn fetch_track_info(&self, track_id: &str) -> Option<Track> {
        self.track_info.get(track_id).cloned()
    }
}

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

fn track_at(cells: &[Hex], q: i32, r: i32) -> Option<String> {
    cells
        .iter()
        .find(|hex| hex.coordinate() == AxialCoordinate::new(q, r))
        .and_then(|hex| hex.track_id().map(str::to_string))
}

async fn build(oracle: Arc<ScriptedOracle>, depth: u32) -> (MazeBuilder, Vec<Hex>) {
    let builder = MazeBuilder::new(oracle, BuildOptions::default().with_depth(depth));
    builder.initialize("A", "B").await.unwrap();
    let cells = builder.accessor().get_cells().await;
    (builder, cells)
}

#[tokio::test]
async fn test_depth_zero_yields_origin_and_first_ring() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Sequential));
    let (builder, cells) = build(oracle.clone(), 0).await;

    assert_eq!(builder.state(), BuildState::Ready);
    assert_eq!(cells.len(), 7);
    assert_eq!(cells.iter().filter(|hex| hex.is_track()).count(), 3);
    assert_eq!(cells.iter().filter(|hex| hex.is_walkable()).count(), 4);
    assert_eq!(oracle.calls(), vec![pair("A", "B")]);
}

#[tokio::test]
async fn test_seed_tracks_take_fixed_directions() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Sequential));
    let (_builder, cells) = build(oracle, 1).await;

    assert_eq!(cells.len(), 7);
    assert_eq!(track_at(&cells, 1, -1).as_deref(), Some("A"));
    assert_eq!(track_at(&cells, -1, 0).as_deref(), Some("B"));
    assert_eq!(track_at(&cells, 0, 1).as_deref(), Some("T1"));
    for (q, r) in [(1, 0), (0, -1), (-1, 1), (0, 0)] {
        assert_eq!(track_at(&cells, q, r), None, "({}, {}) should be walkable", q, r);
    }

    let origin = cells
        .iter()
        .find(|hex| hex.coordinate() == AxialCoordinate::ORIGIN)
        .unwrap();
    assert_eq!(origin.accessed_tracks(), ["A", "B", "T1"]);
}

#[tokio::test]
async fn test_missing_bootstrap_bridge_fails_the_build() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Silent));
    let builder = MazeBuilder::new(oracle, BuildOptions::default());
    let accessor = builder.accessor();

    let result = builder.initialize("A", "B").await;

    assert!(matches!(result, Err(MazeError::BootstrapFailed { .. })));
    assert_eq!(builder.state(), BuildState::Failed);
    assert!(accessor.get_cells().await.is_empty());

    let stats = accessor.stats().await;
    assert_eq!(stats.state, BuildState::Failed);
    assert_eq!(stats.total_cells, 0);
    assert_eq!(stats.cached_tracks, 0);
}

#[tokio::test]
async fn test_bridges_are_requested_in_deterministic_order() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Sequential));
    let (_builder, cells) = build(oracle.clone(), 2).await;

    assert_eq!(
        oracle.calls(),
        vec![
            pair("A", "B"),
            pair("T1", "B"),
            pair("A", "B"),
            pair("A", "T1"),
        ]
    );
    assert_eq!(cells.len(), 16);
    assert_eq!(track_at(&cells, -2, 2).as_deref(), Some("T2"));
    assert_eq!(track_at(&cells, 0, -2).as_deref(), Some("T3"));
    assert_eq!(track_at(&cells, 2, 0).as_deref(), Some("T4"));
}

#[tokio::test]
async fn test_bridge_lands_two_steps_from_first_parent_off_both_axes() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Sequential));
    let (_builder, cells) = build(oracle, 2).await;

    // (-1, 1) saw "T1" at (0, 1) and "B" at (-1, 0) and asked for their bridge.
    let center = AxialCoordinate::new(-1, 1);
    let first = AxialCoordinate::new(0, 1);
    let second = AxialCoordinate::new(-1, 0);
    let bridge = cells
        .iter()
        .find(|hex| hex.track_id() == Some("T2"))
        .unwrap()
        .coordinate();

    assert_eq!(bridge.distance(&first), 2);
    let direction = bridge.offset_from(&center);
    assert!(!direction.is_collinear(&first.offset_from(&center)));
    assert!(!direction.is_collinear(&second.offset_from(&center)));
}

#[tokio::test]
async fn test_default_depth_build_upholds_maze_invariants() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Sequential));
    let builder = MazeBuilder::new(oracle.clone(), BuildOptions::default());
    builder.initialize("A", "B").await.unwrap();
    let accessor = builder.accessor();
    let cells = accessor.get_cells().await;

    assert_eq!(builder.options().depth, 7);
    assert_eq!(cells.len(), 169);

    let tracks: Vec<&Hex> = cells.iter().filter(|hex| hex.is_track()).collect();
    assert_eq!(tracks.len(), 57);

    for hex in &cells {
        assert!(hex.coordinate().distance(&AxialCoordinate::ORIGIN) <= 7);
    }

    for (i, a) in tracks.iter().enumerate() {
        for b in &tracks[i + 1..] {
            assert_ne!(
                a.coordinate().distance(&b.coordinate()),
                1,
                "{} and {} are adjacent track nodes",
                a.name(),
                b.name()
            );
        }
    }

    // Seeds "A" and "B" only have metadata when the prefetch succeeds.
    for hex in &tracks {
        let id = hex.track_id().unwrap();
        if id != "A" && id != "B" {
            assert!(accessor.get_track_for(hex).is_some(), "{} is not cached", id);
        }
    }

    let by_coordinate: HashMap<AxialCoordinate, &Hex> =
        cells.iter().map(|hex| (hex.coordinate(), hex)).collect();
    for hex in cells.iter().filter(|hex| hex.is_walkable()) {
        let track_neighbors = hex
            .coordinate()
            .neighbors()
            .iter()
            .filter(|c| by_coordinate.get(*c).is_some_and(|n| n.is_track()))
            .count();
        assert!(track_neighbors <= 3);
    }
}

#[tokio::test]
async fn test_unanswered_bridges_leave_cells_unresolved() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::BootstrapOnly));
    let (builder, cells) = build(oracle.clone(), 7).await;

    assert_eq!(builder.state(), BuildState::Ready);
    assert_eq!(cells.iter().filter(|hex| hex.is_track()).count(), 3);
    assert_eq!(cells.len(), 49);

    // Every unresolved cell is asked about once and never retried.
    let calls = oracle.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], pair("A", "B"));
}

#[tokio::test]
async fn test_get_cells_waits_for_the_build() {
    let oracle = Arc::new(
        ScriptedOracle::new(BridgeScript::Sequential).with_delay(Duration::from_millis(20)),
    );
    let builder = MazeBuilder::new(oracle, BuildOptions::default().with_depth(1));
    let accessor = builder.accessor();
    assert_eq!(accessor.state(), BuildState::Uninitialized);

    let reader = tokio::spawn({
        let accessor = accessor.clone();
        async move { accessor.get_cells().await }
    });

    builder.initialize("A", "B").await.unwrap();
    let cells = reader.await.unwrap();

    assert_eq!(cells.len(), 7);
    assert_eq!(accessor.state(), BuildState::Ready);
}

#[tokio::test]
async fn test_dropped_builder_releases_waiting_readers() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Sequential));
    let builder = MazeBuilder::new(oracle, BuildOptions::default());
    let accessor = builder.accessor();
    drop(builder);

    assert!(accessor.get_cells().await.is_empty());
    assert_eq!(accessor.wait_until_finished().await, BuildState::Failed);
}

#[tokio::test]
async fn test_slow_bootstrap_times_out_as_failure() {
    let oracle = Arc::new(
        ScriptedOracle::new(BridgeScript::Sequential).with_delay(Duration::from_secs(5)),
    );
    let options = BuildOptions::default().with_oracle_timeout(Duration::from_millis(50));
    let builder = MazeBuilder::new(oracle.clone(), options);

    let result = builder.initialize("A", "B").await;

    assert!(matches!(result, Err(MazeError::BootstrapFailed { .. })));
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn test_initialize_runs_once() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Sequential));
    let (builder, _cells) = build(oracle.clone(), 0).await;

    let again = builder.initialize("A", "B").await;

    assert!(matches!(again, Err(MazeError::InvalidState(_))));
    assert_eq!(builder.state(), BuildState::Ready);
    assert_eq!(oracle.calls().len(), 1);
}

#[tokio::test]
async fn test_seed_metadata_is_prefetched() {
    let oracle = Arc::new(
        ScriptedOracle::new(BridgeScript::Sequential)
            .with_track_info(Track::new("A").with_name("Seed One").with_artist("First")),
    );
    let (builder, cells) = build(oracle, 0).await;
    builder.join_prefetch().await;
    let accessor = builder.accessor();

    let seed_cell = cells
        .iter()
        .find(|hex| hex.coordinate() == AxialCoordinate::new(1, -1))
        .unwrap();
    let track = accessor.get_track_for(seed_cell).unwrap();
    assert_eq!(track.label(), "Seed One\nby First");

    // "B" has no metadata; its failed lookup does not affect the build.
    let other_seed = cells
        .iter()
        .find(|hex| hex.coordinate() == AxialCoordinate::new(-1, 0))
        .unwrap();
    assert!(accessor.get_track_for(other_seed).is_none());
    assert_eq!(builder.state(), BuildState::Ready);

    let walkable = cells.iter().find(|hex| hex.is_walkable()).unwrap();
    assert!(accessor.get_track_for(walkable).is_none());
}

#[tokio::test]
async fn test_renderable_cells_threshold() {
    let oracle = Arc::new(ScriptedOracle::new(BridgeScript::Sequential));
    let (builder, _cells) = build(oracle, 0).await;
    let accessor = builder.accessor();

    assert_eq!(accessor.renderable_cells(7).await.len(), 7);
    assert!(accessor.renderable_cells(8).await.is_empty());

    let stats = accessor.stats().await;
    assert_eq!(stats.state, BuildState::Ready);
    assert_eq!(stats.total_cells, 7);
    assert_eq!(stats.track_cells, 3);
    assert_eq!(stats.walkable_cells, 4);
}
