use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use muzicmaze_core::{OracleConfig, RecommendationOracle, Track};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Recommendation service reached over HTTP.
///
/// Serves `GET {base}/recommendations/{a}-{b}` and `GET {base}/track/{id}`,
/// both answering with a single track object.
pub struct HttpOracle {
    base_url: Url,
    client: Client,
}

impl HttpOracle {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(anyhow!("Recommendation service base URL is required"));
        }
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("Invalid recommendation service URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Recommendation service URL cannot carry a path: {}", base_url));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Appends path segments to the base URL, percent-encoding each one so
    /// ids containing `/`, `?` or `#` stay inside their segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Recommendation service URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn bridge_url(&self, first_id: &str, second_id: &str) -> Result<Url> {
        self.endpoint(&["recommendations", &format!("{}-{}", first_id, second_id)])
    }

    fn track_url(&self, track_id: &str) -> Result<Url> {
        self.endpoint(&["track", track_id])
    }

    /// One GET; `Ok(None)` when the body carries no track id.
    async fn try_request(&self, url: Url) -> Result<Option<Track>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request to recommendation service")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Recommendation service error ({}): {}", status, error_text));
        }

        let body = response
            .json::<TrackBody>()
            .await
            .context("Failed to parse recommendation service response")?;

        Ok(body.into_track())
    }

    /// Failures and empty answers look the same to callers.
    async fn fetch(&self, url: Result<Url>) -> Option<Track> {
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                debug!("Could not build recommendation request: {:#}", e);
                return None;
            }
        };

        match self.try_request(url.clone()).await {
            Ok(Some(track)) => Some(track),
            Ok(None) => {
                debug!(url = %url, "Recommendation service had no answer");
                None
            }
            Err(e) => {
                debug!(url = %url, "Recommendation request failed: {:#}", e);
                None
            }
        }
    }
}

#[async_trait]
impl RecommendationOracle for HttpOracle {
    async fn fetch_bridge(&self, first_id: &str, second_id: &str) -> Option<Track> {
        self.fetch(self.bridge_url(first_id, second_id)).await
    }

    async fn fetch_track_info(&self, track_id: &str) -> Option<Track> {
        self.fetch(self.track_url(track_id)).await
    }
}

#[derive(Debug, Deserialize)]
struct TrackBody {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    artists: Vec<ArtistBody>,
    preview_url: Option<String>,
    album: Option<AlbumBody>,
}

#[derive(Debug, Deserialize)]
struct ArtistBody {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumBody {
    #[serde(default)]
    images: Vec<ImageBody>,
}

#[derive(Debug, Deserialize)]
struct ImageBody {
    url: String,
    width: Option<u32>,
}

impl TrackBody {
    fn into_track(self) -> Option<Track> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let mut track = Track::new(id);

        if let Some(name) = self.name.filter(|n| !n.is_empty()) {
            track.name = name;
        }
        if let Some(artist) = self.artists.into_iter().next().and_then(|a| a.name) {
            track.artist = artist;
        }
        track.audio_preview_url = self.preview_url.filter(|u| !u.is_empty());
        track.image_url = self.album.and_then(|album| pick_image(album.images));

        Some(track)
    }
}

/// Widest image that reports a width, otherwise the first one listed.
fn pick_image(images: Vec<ImageBody>) -> Option<String> {
    let widest = images
        .iter()
        .filter_map(|image| image.width.map(|w| (w, image)))
        .max_by_key(|(w, _)| *w)
        .map(|(_, image)| image.url.clone());

    widest.or_else(|| images.into_iter().next().map(|image| image.url))
}
