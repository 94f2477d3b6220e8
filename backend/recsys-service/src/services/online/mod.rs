mod remote;

use crate::error::CollaboratorError;
use crate::metrics::{record_online_outcome, OnlineOutcome};
use crate::models::{ScoredTrack, TrackId, UserId};
use crate::services::events::EventHistoryStore;
use crate::services::similarity::SimilarityIndex;
use crate::utils::dedup_truncate;
use async_trait::async_trait;
use futures::future::join_all;
use resilience::{or_fallback, presets, with_timeout_result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use remote::{RemoteEventSource, RemoteSimilaritySource};

/// Seeds drawn from the user's history per request
pub const DEFAULT_SEED_COUNT: usize = 5;

/// Where the online leg reads a user's recent plays from
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn recent_events(
        &self,
        user_id: UserId,
        k: usize,
    ) -> Result<Vec<TrackId>, CollaboratorError>;
}

/// Where the online leg expands a seed track into similar tracks
#[async_trait]
pub trait SimilaritySource: Send + Sync {
    async fn similar_tracks(
        &self,
        track_id: TrackId,
        k: usize,
    ) -> Result<Vec<ScoredTrack>, CollaboratorError>;
}

#[async_trait]
impl EventSource for EventHistoryStore {
    async fn recent_events(
        &self,
        user_id: UserId,
        k: usize,
    ) -> Result<Vec<TrackId>, CollaboratorError> {
        Ok(self.recent(user_id, k))
    }
}

#[async_trait]
impl SimilaritySource for SimilarityIndex {
    async fn similar_tracks(
        &self,
        track_id: TrackId,
        k: usize,
    ) -> Result<Vec<ScoredTrack>, CollaboratorError> {
        Ok(self.similar(track_id, k))
    }
}

/// Online candidates plus how they were obtained
#[derive(Debug, Clone, PartialEq)]
pub struct OnlineCandidates {
    pub tracks: Vec<ScoredTrack>,
    pub outcome: OnlineOutcome,
}

impl OnlineCandidates {
    fn empty(outcome: OnlineOutcome) -> Self {
        Self {
            tracks: Vec::new(),
            outcome,
        }
    }

    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.track_id).collect()
    }
}

/// Turns a user's recent plays into similar-track candidates.
///
/// Algorithm:
/// 1. Take the newest `seed_count` plays as seeds
/// 2. Expand every seed into its top-k similar tracks (one timed call each)
/// 3. Pool all pairs, sort by score descending, keep the first of each track
/// 4. Truncate to k
///
/// Collaborator failures never propagate: a failed history read yields no
/// candidates, a failed seed lookup only loses that seed.
pub struct OnlineCandidateGenerator {
    events: Arc<dyn EventSource>,
    similarity: Arc<dyn SimilaritySource>,
    seed_count: usize,
    call_timeout: Duration,
}

impl OnlineCandidateGenerator {
    pub fn new(events: Arc<dyn EventSource>, similarity: Arc<dyn SimilaritySource>) -> Self {
        Self {
            events,
            similarity,
            seed_count: DEFAULT_SEED_COUNT,
            call_timeout: presets::collaborator_config().timeout.duration,
        }
    }

    pub fn with_seed_count(mut self, seed_count: usize) -> Self {
        self.seed_count = seed_count;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub async fn generate(&self, user_id: UserId, k: usize) -> OnlineCandidates {
        if k == 0 {
            return OnlineCandidates::empty(OnlineOutcome::NoSignal);
        }

        let seeds = match self.fetch_seeds(user_id).await {
            Ok(seeds) => seeds,
            Err(e) => {
                warn!(
                    user_id = user_id,
                    error = %e,
                    "Event history unavailable, no online candidates"
                );
                record_online_outcome(OnlineOutcome::Degraded);
                return OnlineCandidates::empty(OnlineOutcome::Degraded);
            }
        };

        if seeds.is_empty() {
            debug!(user_id = user_id, "No recent events, no online signal");
            record_online_outcome(OnlineOutcome::NoSignal);
            return OnlineCandidates::empty(OnlineOutcome::NoSignal);
        }

        let lookups = seeds.iter().map(|seed| self.expand_seed(*seed, k));
        let expansions = join_all(lookups).await;

        let failed_seeds = expansions.iter().filter(|r| r.is_err()).count();
        let pooled: Vec<ScoredTrack> = expansions
            .into_iter()
            .flat_map(|result| substitute_empty(result, "similar_tracks"))
            .collect();

        let tracks = rank_candidates(pooled, k);
        let outcome = if !tracks.is_empty() {
            OnlineOutcome::Candidates
        } else if failed_seeds > 0 {
            OnlineOutcome::Degraded
        } else {
            OnlineOutcome::NoSignal
        };
        record_online_outcome(outcome);

        info!(
            user_id = user_id,
            seeds = seeds.len(),
            failed_seeds = failed_seeds,
            candidates = tracks.len(),
            "Online candidates generated"
        );

        OnlineCandidates { tracks, outcome }
    }

    async fn fetch_seeds(&self, user_id: UserId) -> Result<Vec<TrackId>, CollaboratorError> {
        with_timeout_result(
            self.call_timeout,
            self.events.recent_events(user_id, self.seed_count),
        )
        .await
        .map_err(|e| CollaboratorError::from_timeout("event-history", e))
    }

    async fn expand_seed(
        &self,
        seed: TrackId,
        k: usize,
    ) -> Result<Vec<ScoredTrack>, CollaboratorError> {
        with_timeout_result(self.call_timeout, self.similarity.similar_tracks(seed, k))
            .await
            .map_err(|e| CollaboratorError::from_timeout("similarity", e))
    }
}

/// Substitution policy for a failed online-path call: no candidates.
pub fn substitute_empty<T>(result: Result<Vec<T>, CollaboratorError>, operation: &str) -> Vec<T> {
    or_fallback(result, operation)
}

/// Global score-descending order across all seeds, first occurrence of each
/// track wins, then truncate. Equal scores keep pooled (seed, neighbour) order.
pub fn rank_candidates(mut pooled: Vec<ScoredTrack>, k: usize) -> Vec<ScoredTrack> {
    pooled.sort_by(|a, b| b.score.total_cmp(&a.score));
    dedup_truncate(pooled, k, |t| t.track_id)
}
