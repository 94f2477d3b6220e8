pub mod config;
pub mod error;
pub mod handlers;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use handlers::{configure, AppState};
pub use services::{
    BlendingEngine, EventHistoryStore, OfflineRecommendationIndex, OnlineCandidateGenerator,
    Recommender, SimilarityIndex,
};
