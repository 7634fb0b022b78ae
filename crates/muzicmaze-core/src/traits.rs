use crate::Track;
use async_trait::async_trait;

/// Source of track metadata and bridging recommendations.
///
/// Implementations never surface errors: a failed call and a call with no
/// answer both yield `None`.
#[async_trait]
pub trait RecommendationOracle: Send + Sync {
    /// A track that harmonizes with both inputs.
    async fn fetch_bridge(&self, first_id: &str, second_id: &str) -> Option<Track>;

    /// Metadata for a single track id.
    async fn fetch_track_info(&self, track_id: &str) -> Option<Track>;
}
