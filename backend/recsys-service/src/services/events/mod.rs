// ============================================
// Event History Store
// ============================================
//
// Keeps the most recent plays per user in memory:
// - record: append newest, evict oldest once over capacity (FIFO)
// - recent: newest-first window of up to k tracks
//
// Writes for one user are serialized by the map shard lock; different users
// only contend when they hash to the same shard.

use crate::models::{EventStats, TrackId, UserId};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Default number of plays retained per user
pub const DEFAULT_MAX_EVENTS_PER_USER: usize = 20;

pub struct EventHistoryStore {
    events: DashMap<UserId, VecDeque<TrackId>>,
    capacity: usize,
    total_events: AtomicU64,
}

impl EventHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: DashMap::new(),
            capacity,
            total_events: AtomicU64::new(0),
        }
    }

    /// Record a play as the user's newest event
    pub fn record(&self, user_id: UserId, track_id: TrackId) {
        {
            let mut history = self
                .events
                .entry(user_id)
                .or_insert_with(|| VecDeque::with_capacity(self.capacity));

            history.push_back(track_id);
            while history.len() > self.capacity {
                history.pop_front();
            }
        }

        let total = self.total_events.fetch_add(1, Ordering::Relaxed) + 1;

        debug!(
            user_id = user_id,
            track_id = track_id,
            total_events = total,
            "Event recorded"
        );
    }

    /// Up to `k` most recent tracks for the user, newest first
    pub fn recent(&self, user_id: UserId, k: usize) -> Vec<TrackId> {
        self.events
            .get(&user_id)
            .map(|history| history.iter().rev().take(k).copied().collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> EventStats {
        EventStats {
            total_events: self.total_events.load(Ordering::Relaxed),
            unique_users: self.events.len() as u64,
        }
    }
}

impl Default for EventHistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS_PER_USER)
    }
}
