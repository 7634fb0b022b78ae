use crate::AxialCoordinate;
use serde::{Deserialize, Serialize};

/// A single maze cell.
///
/// A cell is either walkable or a track node; it carries a track id exactly
/// when it is not walkable, so walkability is derived rather than stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    coordinate: AxialCoordinate,
    track_id: Option<String>,
    /// Seed and bridge ids used to bootstrap growth. Only set on the origin.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    accessed_tracks: Vec<String>,
}

impl Hex {
    /// A walkable cell.
    pub fn new(coordinate: AxialCoordinate) -> Self {
        Self {
            coordinate,
            track_id: None,
            accessed_tracks: Vec::new(),
        }
    }

    pub fn with_track(coordinate: AxialCoordinate, track_id: impl Into<String>) -> Self {
        Self {
            coordinate,
            track_id: Some(track_id.into()),
            accessed_tracks: Vec::new(),
        }
    }

    /// The walkable origin cell, remembering the tracks that seeded the maze.
    pub fn origin(accessed_tracks: Vec<String>) -> Self {
        Self {
            coordinate: AxialCoordinate::ORIGIN,
            track_id: None,
            accessed_tracks,
        }
    }

    pub fn coordinate(&self) -> AxialCoordinate {
        self.coordinate
    }

    pub fn key(&self) -> String {
        self.coordinate.key()
    }

    pub fn is_walkable(&self) -> bool {
        self.track_id.is_none()
    }

    pub fn is_track(&self) -> bool {
        self.track_id.is_some()
    }

    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref()
    }

    pub fn accessed_tracks(&self) -> &[String] {
        &self.accessed_tracks
    }

    /// Turns the cell into a track node.
    pub fn assign_track(&mut self, track_id: impl Into<String>) {
        self.track_id = Some(track_id.into());
    }

    /// Clears any track, returning the id that was removed.
    pub fn make_walkable(&mut self) -> Option<String> {
        self.track_id.take()
    }

    /// `"(q, r)"`, followed by the track id on track nodes.
    pub fn name(&self) -> String {
        match &self.track_id {
            Some(id) => format!("{} {}", self.coordinate, id),
            None => self.coordinate.to_string(),
        }
    }
}
