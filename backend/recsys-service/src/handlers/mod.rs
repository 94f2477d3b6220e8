/// HTTP API
///
/// POST /add_event                - record a play
/// POST /get_events               - recent plays, newest first
/// POST /similar_tracks           - nearest neighbours of a track
/// POST /recommendations_offline  - personal ranking or popularity fallback
/// POST /recommendations_online   - candidates from recent plays
/// POST /recommendations          - blended online + offline
/// GET  /health, /stats, /metrics
use crate::config::Config;
use crate::error::{AppError, CollaboratorError, Result};
use crate::loader::OfflineTables;
use crate::metrics::{self, EVENTS_RECORDED_TOTAL};
use crate::models::{EventStats, OfflineStats, SimilarityStats, TrackId, UserId};
use crate::services::online::{EventSource, SimilaritySource};
use crate::services::{
    EventHistoryStore, OfflineRecommendationIndex, OnlineCandidateGenerator, Recommender,
    RemoteEventSource, RemoteSimilaritySource, SimilarityIndex,
};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const DEFAULT_EVENTS_K: usize = 5;
const DEFAULT_SIMILAR_K: usize = 10;
const DEFAULT_RECS_K: usize = 100;

/// Shared state handed to every handler
pub struct AppState {
    pub service_name: String,
    pub events: Arc<EventHistoryStore>,
    pub similarity: Arc<SimilarityIndex>,
    pub offline: Arc<OfflineRecommendationIndex>,
    pub recommender: Recommender,
}

impl AppState {
    /// Build the indexes from loaded tables and wire the online leg, either to
    /// the in-process stores or to remote instances when URLs are configured.
    pub fn build(
        config: &Config,
        tables: OfflineTables,
    ) -> std::result::Result<Self, CollaboratorError> {
        let events = Arc::new(EventHistoryStore::new(config.max_events_per_user));
        let similarity = Arc::new(SimilarityIndex::from_edges(tables.similar));
        let offline = Arc::new(OfflineRecommendationIndex::new(
            tables.personal,
            tables.popular,
        ));

        let event_source: Arc<dyn EventSource> = match &config.event_service_url {
            Some(url) => {
                info!(url = %url, "Online leg reads events from remote service");
                Arc::new(RemoteEventSource::new(url, config.collaborator_timeout())?)
            }
            None => events.clone(),
        };
        let similarity_source: Arc<dyn SimilaritySource> = match &config.similarity_service_url
        {
            Some(url) => {
                info!(url = %url, "Online leg reads similar tracks from remote service");
                Arc::new(RemoteSimilaritySource::new(
                    url,
                    config.collaborator_timeout(),
                )?)
            }
            None => similarity.clone(),
        };

        let online = Arc::new(
            OnlineCandidateGenerator::new(event_source, similarity_source)
                .with_seed_count(config.online_seed_count)
                .with_call_timeout(config.collaborator_timeout()),
        );
        let recommender = Recommender::new(offline.clone(), online)
            .with_online_budget(config.online_budget());

        Ok(Self {
            service_name: config.service_name.clone(),
            events,
            similarity,
            offline,
            recommender,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AddEventQuery {
    pub user_id: UserId,
    pub track_id: TrackId,
}

#[derive(Debug, Deserialize)]
pub struct GetEventsQuery {
    pub user_id: UserId,
    #[serde(default = "default_events_k")]
    pub k: usize,
}

#[derive(Debug, Deserialize)]
pub struct SimilarTracksQuery {
    pub track_id: TrackId,
    #[serde(default = "default_similar_k")]
    pub k: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub user_id: UserId,
    #[serde(default = "default_recs_k")]
    pub k: usize,
}

fn default_events_k() -> usize {
    DEFAULT_EVENTS_K
}

fn default_similar_k() -> usize {
    DEFAULT_SIMILAR_K
}

fn default_recs_k() -> usize {
    DEFAULT_RECS_K
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddEventResponse {
    pub status: String,
    pub user_id: UserId,
    pub track_id: TrackId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<TrackId>,
    pub count: usize,
}

/// Parallel lists, best match first
#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarTracksResponse {
    pub track_id_2: Vec<TrackId>,
    pub score: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecsResponse {
    pub recs: Vec<TrackId>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub events: EventStats,
    pub similarity: SimilarityStats,
    pub offline: OfflineStats,
}

/// Register routes and the 400 mapping for malformed query strings
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }))
    .route("/health", web::get().to(health_check))
    .route("/stats", web::get().to(stats))
    .route("/metrics", web::get().to(metrics_endpoint))
    .route("/add_event", web::post().to(add_event))
    .route("/get_events", web::post().to(get_events))
    .route("/similar_tracks", web::post().to(similar_tracks))
    .route(
        "/recommendations_offline",
        web::post().to(recommendations_offline),
    )
    .route(
        "/recommendations_online",
        web::post().to(recommendations_online),
    )
    .route("/recommendations", web::post().to(recommendations));
}

async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": state.service_name,
    }))
}

async fn stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(StatsResponse {
        events: state.events.stats(),
        similarity: state.similarity.stats(),
        offline: state.offline.stats(),
    })
}

async fn metrics_endpoint() -> Result<HttpResponse> {
    let body = metrics::render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

async fn add_event(
    state: web::Data<AppState>,
    query: web::Query<AddEventQuery>,
) -> HttpResponse {
    state.events.record(query.user_id, query.track_id);
    EVENTS_RECORDED_TOTAL.inc();

    HttpResponse::Ok().json(AddEventResponse {
        status: "success".to_string(),
        user_id: query.user_id,
        track_id: query.track_id,
    })
}

async fn get_events(
    state: web::Data<AppState>,
    query: web::Query<GetEventsQuery>,
) -> HttpResponse {
    let events = state.events.recent(query.user_id, query.k);
    let count = events.len();

    HttpResponse::Ok().json(EventsResponse { events, count })
}

async fn similar_tracks(
    state: web::Data<AppState>,
    query: web::Query<SimilarTracksQuery>,
) -> HttpResponse {
    let (track_id_2, score): (Vec<TrackId>, Vec<f64>) = state
        .similarity
        .similar(query.track_id, query.k)
        .into_iter()
        .map(|t| (t.track_id, t.score))
        .unzip();

    HttpResponse::Ok().json(SimilarTracksResponse { track_id_2, score })
}

async fn recommendations_offline(
    state: web::Data<AppState>,
    query: web::Query<RecommendationsQuery>,
) -> HttpResponse {
    let recs = state.recommender.offline(query.user_id, query.k).tracks;
    HttpResponse::Ok().json(RecsResponse { recs })
}

async fn recommendations_online(
    state: web::Data<AppState>,
    query: web::Query<RecommendationsQuery>,
) -> HttpResponse {
    let recs = state.recommender.online(query.user_id, query.k).await;
    HttpResponse::Ok().json(RecsResponse { recs })
}

async fn recommendations(
    state: web::Data<AppState>,
    query: web::Query<RecommendationsQuery>,
) -> HttpResponse {
    let recs = state.recommender.blended(query.user_id, query.k).await;
    HttpResponse::Ok().json(RecsResponse { recs })
}
