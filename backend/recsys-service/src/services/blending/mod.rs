use crate::models::TrackId;
use crate::utils::dedup_truncate;

/// Blending Layer - 在線/離線候選合併
///
/// Interleaves the online and offline rankings (online first in every pair),
/// appends whatever is left of the longer list, drops repeated tracks and cuts
/// the result to `k`. Pure and deterministic: identical inputs always produce
/// identical output.
pub struct BlendingEngine;

impl BlendingEngine {
    pub fn blend(online: &[TrackId], offline: &[TrackId], k: usize) -> Vec<TrackId> {
        // No online signal: the offline ranking is served untouched
        if online.is_empty() {
            return offline[..k.min(offline.len())].to_vec();
        }

        dedup_truncate(Self::interleave(online, offline), k, |t| *t)
    }

    /// on[0], off[0], on[1], off[1], ..., then the tail of on, then the tail of off
    fn interleave(online: &[TrackId], offline: &[TrackId]) -> Vec<TrackId> {
        let paired = online.len().min(offline.len());
        let mut merged = Vec::with_capacity(online.len() + offline.len());

        for (on, off) in online.iter().zip(offline.iter()) {
            merged.push(*on);
            merged.push(*off);
        }
        merged.extend_from_slice(&online[paired..]);
        merged.extend_from_slice(&offline[paired..]);

        merged
    }
}
