use serde::{Deserialize, Serialize};

pub const DEFAULT_TRACK_NAME: &str = "No name";
pub const DEFAULT_ARTIST: &str = "Anonymous";

/// Metadata for one track returned by the recommendation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub image_url: Option<String>,
    pub audio_preview_url: Option<String>,
}

impl Track {
    /// A track with placeholder name and artist.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: DEFAULT_TRACK_NAME.to_string(),
            artist: DEFAULT_ARTIST.to_string(),
            image_url: None,
            audio_preview_url: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_audio_preview_url(mut self, url: impl Into<String>) -> Self {
        self.audio_preview_url = Some(url.into());
        self
    }

    /// Two-line caption shown above a track node.
    pub fn label(&self) -> String {
        format!("{}\nby {}", self.name, self.artist)
    }
}
