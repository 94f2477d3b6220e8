pub mod blending;
pub mod events;
pub mod offline;
pub mod online;
pub mod orchestrator;
pub mod similarity;

pub use blending::BlendingEngine;
pub use events::EventHistoryStore;
pub use offline::OfflineRecommendationIndex;
pub use online::{OnlineCandidateGenerator, RemoteEventSource, RemoteSimilaritySource};
pub use orchestrator::Recommender;
pub use similarity::SimilarityIndex;
