use crate::models::{ScoredTrack, SimilarityEdge, SimilarityStats, TrackId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Read-only nearest-neighbour table: track -> similar tracks, best first.
///
/// Neighbour lists are sorted once at construction (score descending, ties
/// kept in table order), so a lookup is a hash probe plus a slice copy.
pub struct SimilarityIndex {
    neighbors: HashMap<TrackId, Vec<ScoredTrack>>,
    total_similarities: u64,
    requests_count: AtomicU64,
}

/// What construction discarded from the raw edge list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EdgeFilterReport {
    pub(crate) self_pairs: usize,
    pub(crate) non_finite_scores: usize,
}

impl SimilarityIndex {
    pub fn from_edges(edges: Vec<SimilarityEdge>) -> Self {
        let (index, report) = Self::build(edges);

        if report.self_pairs > 0 {
            info!(
                dropped = report.self_pairs,
                "Filtered self-similarity pairs"
            );
        }
        if report.non_finite_scores > 0 {
            warn!(
                dropped = report.non_finite_scores,
                "Filtered similarity edges with non-finite scores"
            );
        }

        info!(
            similarities = index.total_similarities,
            sources = index.neighbors.len(),
            "Similarity index built"
        );

        index
    }

    fn build(edges: Vec<SimilarityEdge>) -> (Self, EdgeFilterReport) {
        let mut report = EdgeFilterReport::default();
        let mut neighbors: HashMap<TrackId, Vec<ScoredTrack>> = HashMap::new();
        let mut total = 0_u64;

        for edge in edges {
            if edge.track_id_1 == edge.track_id_2 {
                report.self_pairs += 1;
                continue;
            }
            if !edge.score.is_finite() {
                report.non_finite_scores += 1;
                continue;
            }

            neighbors
                .entry(edge.track_id_1)
                .or_default()
                .push(ScoredTrack::new(edge.track_id_2, edge.score));
            total += 1;
        }

        // stable: equal scores stay in table order
        for list in neighbors.values_mut() {
            list.sort_by(|a, b| b.score.total_cmp(&a.score));
        }

        let index = Self {
            neighbors,
            total_similarities: total,
            requests_count: AtomicU64::new(0),
        };

        (index, report)
    }

    /// Up to `k` most similar tracks for `track_id`, score descending.
    /// Unknown tracks yield an empty list.
    pub fn similar(&self, track_id: TrackId, k: usize) -> Vec<ScoredTrack> {
        self.requests_count.fetch_add(1, Ordering::Relaxed);

        match self.neighbors.get(&track_id) {
            Some(list) => list[..k.min(list.len())].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn stats(&self) -> SimilarityStats {
        SimilarityStats {
            total_similarities: self.total_similarities,
            requests_count: self.requests_count.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: TrackId, target: TrackId, score: f64) -> SimilarityEdge {
        SimilarityEdge {
            track_id_1: source,
            track_id_2: target,
            score,
        }
    }

    #[test]
    fn test_similar_sorted_by_score_desc() {
        let index = SimilarityIndex::from_edges(vec![
            edge(1, 2, 0.3),
            edge(1, 3, 0.9),
            edge(1, 4, 0.6),
            edge(2, 1, 0.5),
        ]);

        let ids: Vec<TrackId> = index.similar(1, 10).iter().map(|s| s.track_id).collect();
        assert_eq!(ids, vec![3, 4, 2]);

        let top = index.similar(1, 2);
        assert_eq!(top, vec![ScoredTrack::new(3, 0.9), ScoredTrack::new(4, 0.6)]);
    }

    #[test]
    fn test_self_pairs_are_dropped() {
        let (index, report) = SimilarityIndex::build(vec![
            edge(5, 5, 1.0),
            edge(5, 6, 0.4),
            edge(6, 6, 1.0),
        ]);

        assert_eq!(report.self_pairs, 2);
        assert_eq!(index.stats().total_similarities, 1);
        assert!(index.similar(5, 10).iter().all(|s| s.track_id != 5));
        assert!(index.similar(6, 10).is_empty());
    }

    #[test]
    fn test_ties_keep_table_order() {
        let index = SimilarityIndex::from_edges(vec![
            edge(1, 30, 0.5),
            edge(1, 10, 0.5),
            edge(1, 20, 0.5),
        ]);

        let ids: Vec<TrackId> = index.similar(1, 3).iter().map(|s| s.track_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn test_single_neighbor_is_still_a_list() {
        let index = SimilarityIndex::from_edges(vec![edge(8, 9, 0.1)]);
        assert_eq!(index.similar(8, 10), vec![ScoredTrack::new(9, 0.1)]);
    }

    #[test]
    fn test_unknown_track_and_zero_k() {
        let index = SimilarityIndex::from_edges(vec![edge(1, 2, 0.3)]);

        assert!(index.similar(404, 10).is_empty());
        assert!(index.similar(1, 0).is_empty());
        assert_eq!(index.stats().requests_count, 2);
    }

    #[test]
    fn test_nan_scores_are_dropped() {
        let (index, report) =
            SimilarityIndex::build(vec![edge(1, 2, f64::NAN), edge(1, 3, 0.2)]);

        assert_eq!(report.non_finite_scores, 1);
        assert_eq!(index.similar(1, 10), vec![ScoredTrack::new(3, 0.2)]);
    }
}
