// Shared fixtures for the HTTP integration tests
#![allow(dead_code)]

use recsys_service::loader::OfflineTables;
use recsys_service::models::{OfflineEntry, PopularityEntry, SimilarityEdge};
use recsys_service::Config;

pub fn test_config() -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 8000,
        service_name: "recsys-service-test".to_string(),
        personal_recs_path: "unused.csv".to_string(),
        top_popular_path: "unused.csv".to_string(),
        similar_path: "unused.csv".to_string(),
        max_events_per_user: 3,
        online_seed_count: 5,
        collaborator_timeout_ms: 500,
        online_budget_ms: 1000,
        event_service_url: None,
        similarity_service_url: None,
        log_format: "text".to_string(),
    }
}

/// User 1 has a personal ranking; every other user falls back to popularity.
/// Track 10 is similar to 20 and 30; track 11 only to itself.
pub fn test_tables() -> OfflineTables {
    OfflineTables {
        personal: vec![
            OfflineEntry {
                user_id: 1,
                track_id: 102,
                rank: 2,
            },
            OfflineEntry {
                user_id: 1,
                track_id: 101,
                rank: 1,
            },
            OfflineEntry {
                user_id: 1,
                track_id: 30,
                rank: 3,
            },
        ],
        popular: vec![
            PopularityEntry {
                track_id: 901,
                rank: 1,
            },
            PopularityEntry {
                track_id: 902,
                rank: 2,
            },
            PopularityEntry {
                track_id: 903,
                rank: 3,
            },
        ],
        similar: vec![
            SimilarityEdge {
                track_id_1: 10,
                track_id_2: 20,
                score: 0.9,
            },
            SimilarityEdge {
                track_id_1: 10,
                track_id_2: 30,
                score: 0.7,
            },
            SimilarityEdge {
                track_id_1: 10,
                track_id_2: 10,
                score: 1.0,
            },
            SimilarityEdge {
                track_id_1: 11,
                track_id_2: 11,
                score: 1.0,
            },
        ],
    }
}
