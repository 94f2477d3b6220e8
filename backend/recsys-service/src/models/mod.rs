use serde::{Deserialize, Serialize};

/// Opaque track identifier
pub type TrackId = u64;

/// Opaque user identifier
pub type UserId = u64;

/// A candidate track with its similarity score (higher = more similar)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrack {
    pub track_id: TrackId,
    pub score: f64,
}

impl ScoredTrack {
    pub fn new(track_id: TrackId, score: f64) -> Self {
        Self { track_id, score }
    }
}

/// Row of the similarity table
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityEdge {
    pub track_id_1: TrackId,
    pub track_id_2: TrackId,
    pub score: f64,
}

/// Row of the personal offline recommendations table
#[derive(Debug, Clone, Deserialize)]
pub struct OfflineEntry {
    pub user_id: UserId,
    pub track_id: TrackId,
    pub rank: i64,
}

/// Row of the global popularity table
#[derive(Debug, Clone, Deserialize)]
pub struct PopularityEntry {
    pub track_id: TrackId,
    pub rank: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Personal, // 用戶有個人離線推薦
    Popular,  // 全局熱門兜底
}

impl RecommendationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationSource::Personal => "personal",
            RecommendationSource::Popular => "popular",
        }
    }
}

/// Offline lookup result, tagged with the table it came from
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineRecommendations {
    pub source: RecommendationSource,
    pub tracks: Vec<TrackId>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct EventStats {
    pub total_events: u64,
    pub unique_users: u64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SimilarityStats {
    pub total_similarities: u64,
    pub requests_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct OfflineStats {
    pub personal: u64,
    pub popular: u64,
}
