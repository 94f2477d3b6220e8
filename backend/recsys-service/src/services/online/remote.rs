// HTTP clients for an event-history or similarity collaborator running as a
// separate recsys-service instance. Both speak the same routes this service
// serves: POST /get_events and POST /similar_tracks with query parameters.

use super::{EventSource, SimilaritySource};
use crate::error::CollaboratorError;
use crate::models::{ScoredTrack, TrackId, UserId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const EVENTS_SERVICE: &str = "event-history";
const SIMILARITY_SERVICE: &str = "similarity";

#[derive(Debug, Deserialize)]
struct EventsPayload {
    events: Vec<TrackId>,
}

#[derive(Debug, Deserialize)]
struct SimilarPayload {
    #[serde(default)]
    track_id_2: Vec<TrackId>,
    #[serde(default)]
    score: Vec<f64>,
}

fn build_client(
    service: &'static str,
    timeout: Duration,
) -> Result<reqwest::Client, CollaboratorError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CollaboratorError::Request {
            service,
            message: e.to_string(),
        })
}

async fn post_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    service: &'static str,
    timeout: Duration,
    url: String,
    query: &[(&str, u64)],
) -> Result<T, CollaboratorError> {
    let response = client
        .post(url)
        .query(query)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            if e.is_timeout() {
                CollaboratorError::Timeout {
                    service,
                    after: timeout,
                }
            } else {
                CollaboratorError::Request {
                    service,
                    message: e.to_string(),
                }
            }
        })?;

    response
        .json::<T>()
        .await
        .map_err(|e| CollaboratorError::Malformed {
            service,
            message: e.to_string(),
        })
}

/// Event history served by another instance
pub struct RemoteEventSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteEventSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_client(EVENTS_SERVICE, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl EventSource for RemoteEventSource {
    async fn recent_events(
        &self,
        user_id: UserId,
        k: usize,
    ) -> Result<Vec<TrackId>, CollaboratorError> {
        let payload: EventsPayload = post_json(
            &self.client,
            EVENTS_SERVICE,
            self.timeout,
            format!("{}/get_events", self.base_url),
            &[("user_id", user_id), ("k", k as u64)],
        )
        .await?;

        Ok(payload.events)
    }
}

/// Similarity index served by another instance
pub struct RemoteSimilaritySource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteSimilaritySource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_client(SIMILARITY_SERVICE, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl SimilaritySource for RemoteSimilaritySource {
    async fn similar_tracks(
        &self,
        track_id: TrackId,
        k: usize,
    ) -> Result<Vec<ScoredTrack>, CollaboratorError> {
        let payload: SimilarPayload = post_json(
            &self.client,
            SIMILARITY_SERVICE,
            self.timeout,
            format!("{}/similar_tracks", self.base_url),
            &[("track_id", track_id), ("k", k as u64)],
        )
        .await?;

        if payload.track_id_2.len() != payload.score.len() {
            return Err(CollaboratorError::Malformed {
                service: SIMILARITY_SERVICE,
                message: format!(
                    "{} track ids but {} scores",
                    payload.track_id_2.len(),
                    payload.score.len()
                ),
            });
        }

        Ok(payload
            .track_id_2
            .into_iter()
            .zip(payload.score)
            .map(|(track_id, score)| ScoredTrack::new(track_id, score))
            .collect())
    }
}
