use crate::metrics::{record_online_outcome, OnlineOutcome, BLENDED_REQUEST_DURATION_SECONDS};
use crate::models::{OfflineRecommendations, TrackId, UserId};
use crate::services::blending::BlendingEngine;
use crate::services::offline::OfflineRecommendationIndex;
use crate::services::online::{OnlineCandidateGenerator, OnlineCandidates};
use resilience::{presets, with_timeout};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Recommender - 離線 + 在線兩路並行，最後混排
///
/// The offline leg is an in-memory lookup and always answers. The online leg
/// runs under a latency ceiling; when it overruns it resolves to no
/// candidates and the request is served offline-only.
pub struct Recommender {
    offline: Arc<OfflineRecommendationIndex>,
    online: Arc<OnlineCandidateGenerator>,
    online_budget: Duration,
}

impl Recommender {
    pub fn new(
        offline: Arc<OfflineRecommendationIndex>,
        online: Arc<OnlineCandidateGenerator>,
    ) -> Self {
        Self {
            offline,
            online,
            online_budget: presets::online_leg_config().timeout.duration,
        }
    }

    pub fn with_online_budget(mut self, online_budget: Duration) -> Self {
        self.online_budget = online_budget;
        self
    }

    pub fn offline(&self, user_id: UserId, k: usize) -> OfflineRecommendations {
        self.offline.recommend(user_id, k)
    }

    pub async fn online(&self, user_id: UserId, k: usize) -> Vec<TrackId> {
        self.online.generate(user_id, k).await.track_ids()
    }

    /// Blended ranking of at most `k` tracks
    pub async fn blended(&self, user_id: UserId, k: usize) -> Vec<TrackId> {
        let timer = BLENDED_REQUEST_DURATION_SECONDS.start_timer();

        let offline_leg = async { self.offline.recommend(user_id, k) };
        let online_leg = self.online_within_budget(user_id, k);
        let (offline, online) = tokio::join!(offline_leg, online_leg);

        let online_ids = online.track_ids();
        let recs = if online_ids.is_empty() {
            // no online signal: offline ranking as-is
            offline.tracks
        } else {
            BlendingEngine::blend(&online_ids, &offline.tracks, k)
        };

        timer.observe_duration();

        info!(
            user_id = user_id,
            k = k,
            offline_source = offline.source.as_str(),
            online_candidates = online_ids.len(),
            online_outcome = online.outcome.as_str(),
            returned = recs.len(),
            "Blended recommendations served"
        );

        recs
    }

    async fn online_within_budget(&self, user_id: UserId, k: usize) -> OnlineCandidates {
        match with_timeout(self.online_budget, self.online.generate(user_id, k)).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(user_id = user_id, error = %e, "Online leg exceeded its budget");
                record_online_outcome(OnlineOutcome::Degraded);
                OnlineCandidates {
                    tracks: Vec::new(),
                    outcome: OnlineOutcome::Degraded,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollaboratorError;
    use crate::models::{OfflineEntry, PopularityEntry, ScoredTrack, SimilarityEdge};
    use crate::services::events::EventHistoryStore;
    use crate::services::online::SimilaritySource;
    use crate::services::similarity::SimilarityIndex;
    use async_trait::async_trait;

    struct StalledSimilarity;

    #[async_trait]
    impl SimilaritySource for StalledSimilarity {
        async fn similar_tracks(
            &self,
            _track_id: TrackId,
            _k: usize,
        ) -> Result<Vec<ScoredTrack>, CollaboratorError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![ScoredTrack::new(1, 1.0)])
        }
    }

    fn offline_index() -> Arc<OfflineRecommendationIndex> {
        Arc::new(OfflineRecommendationIndex::new(
            vec![
                OfflineEntry {
                    user_id: 1,
                    track_id: 300,
                    rank: 1,
                },
                OfflineEntry {
                    user_id: 1,
                    track_id: 400,
                    rank: 2,
                },
                OfflineEntry {
                    user_id: 1,
                    track_id: 500,
                    rank: 3,
                },
            ],
            vec![
                PopularityEntry {
                    track_id: 900,
                    rank: 1,
                },
                PopularityEntry {
                    track_id: 901,
                    rank: 2,
                },
            ],
        ))
    }

    fn similarity_index() -> Arc<SimilarityIndex> {
        Arc::new(SimilarityIndex::from_edges(vec![
            SimilarityEdge {
                track_id_1: 50,
                track_id_2: 100,
                score: 0.9,
            },
            SimilarityEdge {
                track_id_1: 50,
                track_id_2: 400,
                score: 0.8,
            },
        ]))
    }

    #[tokio::test]
    async fn test_blended_interleaves_online_first() {
        let events = Arc::new(EventHistoryStore::new(20));
        events.record(1, 50);
        let online = Arc::new(OnlineCandidateGenerator::new(events, similarity_index()));
        let recommender = Recommender::new(offline_index(), online);

        assert_eq!(recommender.online(1, 10).await, vec![100, 400]);
        assert_eq!(recommender.blended(1, 10).await, vec![100, 300, 400, 500]);
        assert_eq!(recommender.blended(1, 2).await, vec![100, 300]);
    }

    #[tokio::test]
    async fn test_blended_without_history_is_offline() {
        let events = Arc::new(EventHistoryStore::new(20));
        let online = Arc::new(OnlineCandidateGenerator::new(events, similarity_index()));
        let recommender = Recommender::new(offline_index(), online);

        assert_eq!(recommender.blended(1, 10).await, vec![300, 400, 500]);
        assert_eq!(recommender.blended(2, 1).await, vec![900]);
        assert!(recommender.blended(2, 0).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_online_leg_degrades_to_offline() {
        let events = Arc::new(EventHistoryStore::new(20));
        events.record(1, 50);
        let online = Arc::new(
            OnlineCandidateGenerator::new(events, Arc::new(StalledSimilarity))
                .with_call_timeout(Duration::from_secs(30)),
        );
        let recommender = Recommender::new(offline_index(), online)
            .with_online_budget(Duration::from_millis(200));

        assert_eq!(recommender.blended(1, 10).await, vec![300, 400, 500]);
    }
}
