use dashmap::DashMap;
use muzicmaze_core::Track;
use std::sync::Arc;

/// Track metadata by id. Entries live as long as the maze.
#[derive(Debug, Clone, Default)]
pub struct TrackCache {
    tracks: Arc<DashMap<String, Track>>,
}

impl TrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, track: Track) {
        self.tracks.insert(track.id.clone(), track);
    }

    /// Caches `track` under a caller-chosen id (the requested seed id).
    pub fn insert_as(&self, id: impl Into<String>, track: Track) {
        self.tracks.insert(id.into(), track);
    }

    pub fn get(&self, id: &str) -> Option<Track> {
        self.tracks.get(id).map(|track| track.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
