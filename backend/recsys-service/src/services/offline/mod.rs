use crate::metrics::OFFLINE_REQUESTS_TOTAL;
use crate::models::{
    OfflineEntry, OfflineRecommendations, OfflineStats, PopularityEntry, RecommendationSource,
    TrackId, UserId,
};
use crate::utils::dedup_preserving_order;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Precomputed per-user rankings with a global popularity fallback.
///
/// Both tables are sorted by rank once at construction; equal ranks keep
/// their table order. A track listed twice for the same user keeps its best
/// rank only.
pub struct OfflineRecommendationIndex {
    personal: HashMap<UserId, Vec<TrackId>>,
    popular: Vec<TrackId>,
    personal_requests: AtomicU64,
    popular_requests: AtomicU64,
}

impl OfflineRecommendationIndex {
    pub fn new(entries: Vec<OfflineEntry>, popularity: Vec<PopularityEntry>) -> Self {
        let personal_rows = entries.len();
        let mut grouped: HashMap<UserId, Vec<(i64, TrackId)>> = HashMap::new();
        for entry in entries {
            grouped
                .entry(entry.user_id)
                .or_default()
                .push((entry.rank, entry.track_id));
        }

        let personal: HashMap<UserId, Vec<TrackId>> = grouped
            .into_iter()
            .map(|(user_id, mut rows)| {
                rows.sort_by_key(|(rank, _)| *rank);
                let tracks = dedup_preserving_order(rows.into_iter().map(|(_, t)| t), |t| *t);
                (user_id, tracks)
            })
            .collect();

        let mut popularity = popularity;
        popularity.sort_by_key(|entry| entry.rank);
        let popular =
            dedup_preserving_order(popularity.into_iter().map(|e| e.track_id), |t| *t);

        info!(
            personal_rows = personal_rows,
            users = personal.len(),
            popular_tracks = popular.len(),
            "Offline recommendation index built"
        );

        Self {
            personal,
            popular,
            personal_requests: AtomicU64::new(0),
            popular_requests: AtomicU64::new(0),
        }
    }

    /// Personal ranking for the user, if any rows exist for them
    pub fn personal(&self, user_id: UserId) -> Option<&[TrackId]> {
        self.personal.get(&user_id).map(Vec::as_slice)
    }

    /// Global popularity ranking
    pub fn popular(&self) -> &[TrackId] {
        &self.popular
    }

    /// Up to `k` tracks: the personal ranking when present, else popularity
    pub fn recommend(&self, user_id: UserId, k: usize) -> OfflineRecommendations {
        let (source, ranked) = match self.personal(user_id) {
            Some(tracks) => {
                self.personal_requests.fetch_add(1, Ordering::Relaxed);
                (RecommendationSource::Personal, tracks)
            }
            None => {
                self.popular_requests.fetch_add(1, Ordering::Relaxed);
                (RecommendationSource::Popular, self.popular())
            }
        };

        OFFLINE_REQUESTS_TOTAL
            .with_label_values(&[source.as_str()])
            .inc();

        let tracks = ranked[..k.min(ranked.len())].to_vec();

        debug!(
            user_id = user_id,
            k = k,
            source = source.as_str(),
            returned = tracks.len(),
            "Offline recommendations served"
        );

        OfflineRecommendations { source, tracks }
    }

    pub fn stats(&self) -> OfflineStats {
        OfflineStats {
            personal: self.personal_requests.load(Ordering::Relaxed),
            popular: self.popular_requests.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal(user_id: UserId, track_id: TrackId, rank: i64) -> OfflineEntry {
        OfflineEntry {
            user_id,
            track_id,
            rank,
        }
    }

    fn popular(track_id: TrackId, rank: i64) -> PopularityEntry {
        PopularityEntry { track_id, rank }
    }

    fn sample_index() -> OfflineRecommendationIndex {
        OfflineRecommendationIndex::new(
            vec![
                personal(1, 103, 3),
                personal(1, 101, 1),
                personal(1, 102, 2),
                personal(2, 900, 1),
            ],
            vec![popular(902, 2), popular(901, 1), popular(903, 3), popular(900, 4)],
        )
    }

    #[test]
    fn test_personal_in_rank_order() {
        let index = sample_index();
        let recs = index.recommend(1, 10);

        assert_eq!(recs.source, RecommendationSource::Personal);
        assert_eq!(recs.tracks, vec![101, 102, 103]);
        assert_eq!(index.recommend(1, 2).tracks, vec![101, 102]);
    }

    #[test]
    fn test_single_personal_entry_wins_over_popularity() {
        let index = sample_index();
        let recs = index.recommend(2, 10);

        assert_eq!(recs.source, RecommendationSource::Personal);
        assert_eq!(recs.tracks, vec![900]);
    }

    #[test]
    fn test_unknown_user_gets_popularity_prefix() {
        let index = sample_index();
        let recs = index.recommend(77, 3);

        assert_eq!(recs.source, RecommendationSource::Popular);
        assert_eq!(recs.tracks, index.popular()[..3].to_vec());
        assert_eq!(recs.tracks, vec![901, 902, 903]);
    }

    #[test]
    fn test_personal_never_leaks_popular_tracks() {
        let index = sample_index();
        let personal_tracks = index.personal(1).expect("user 1 has entries").to_vec();

        for track in index.recommend(1, 100).tracks {
            assert!(personal_tracks.contains(&track));
        }
    }

    #[test]
    fn test_zero_k_and_counters() {
        let index = sample_index();
        assert!(index.recommend(1, 0).tracks.is_empty());
        assert!(index.recommend(55, 0).tracks.is_empty());
        let _ = index.recommend(56, 5);

        assert_eq!(
            index.stats(),
            OfflineStats {
                personal: 1,
                popular: 2
            }
        );
    }

    #[test]
    fn test_equal_ranks_keep_table_order_and_duplicates_collapse() {
        let index = OfflineRecommendationIndex::new(
            vec![
                personal(3, 50, 2),
                personal(3, 40, 1),
                personal(3, 60, 1),
                personal(3, 40, 5),
            ],
            vec![],
        );

        assert_eq!(index.recommend(3, 10).tracks, vec![40, 60, 50]);
        assert!(index.recommend(4, 10).tracks.is_empty());
    }
}
