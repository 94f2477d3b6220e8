use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // HTTP server config
    pub http_host: String,
    pub http_port: u16,
    pub service_name: String,

    // Offline tables, loaded once at startup
    pub personal_recs_path: String,
    pub top_popular_path: String,
    pub similar_path: String,

    // Event history
    pub max_events_per_user: usize,

    // Online leg
    pub online_seed_count: usize,
    pub collaborator_timeout_ms: u64,
    pub online_budget_ms: u64,

    // Remote collaborators; the in-process stores are used when unset
    pub event_service_url: Option<String>,
    pub similarity_service_url: Option<String>,

    // Observability
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("http_host", "0.0.0.0")?
            .set_default("http_port", 8000)?
            .set_default("service_name", "recsys-service")?
            .set_default("personal_recs_path", "recsys/recommendations/recommendations.csv")?
            .set_default("top_popular_path", "recsys/recommendations/top_popular.csv")?
            .set_default("similar_path", "recsys/recommendations/similar.csv")?
            .set_default("max_events_per_user", 20)?
            .set_default("online_seed_count", 5)?
            .set_default("collaborator_timeout_ms", 2000)?
            .set_default("online_budget_ms", 2000)?
            .set_default("log_format", "text")?
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            return Err(anyhow!("HTTP port must be greater than 0"));
        }

        if self.max_events_per_user == 0 {
            return Err(anyhow!("max_events_per_user must be greater than 0"));
        }

        if self.online_seed_count == 0 {
            return Err(anyhow!("online_seed_count must be greater than 0"));
        }

        if self.collaborator_timeout_ms == 0 || self.online_budget_ms == 0 {
            return Err(anyhow!("Timeouts must be greater than 0"));
        }

        for path in [
            &self.personal_recs_path,
            &self.top_popular_path,
            &self.similar_path,
        ] {
            if path.is_empty() {
                return Err(anyhow!("Table paths must not be empty"));
            }
        }

        for url in [&self.event_service_url, &self.similarity_service_url]
            .into_iter()
            .flatten()
        {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("Collaborator URL must be http(s): {}", url));
            }
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(anyhow!("log_format must be 'text' or 'json'"));
        }

        Ok(())
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    pub fn online_budget(&self) -> Duration {
        Duration::from_millis(self.online_budget_ms)
    }
}
