use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use recsys_service::{configure, loader, AppState, Config};
use std::path::Path;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load config
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,recsys_service=debug".into());
    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "Starting {} on HTTP:{}",
        config.service_name, config.http_port
    );

    // Tables are required: refuse to serve with a missing index
    let tables = loader::load_tables(
        Path::new(&config.personal_recs_path),
        Path::new(&config.top_popular_path),
        Path::new(&config.similar_path),
    )
    .context("Failed to load offline tables")?;

    let state = web::Data::new(
        AppState::build(&config, tables).context("Failed to initialize online collaborators")?,
    );
    let server_state = state.clone();

    info!("HTTP server listening on {}:{}", config.http_host, config.http_port);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(server_state.clone())
            .configure(configure)
    })
    .bind((config.http_host.as_str(), config.http_port))
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    let offline = state.offline.stats();
    let events = state.events.stats();
    let similarity = state.similarity.stats();
    info!(
        personal = offline.personal,
        popular = offline.popular,
        total_events = events.total_events,
        unique_users = events.unique_users,
        similarity_requests = similarity.requests_count,
        "{} stopped",
        config.service_name
    );

    Ok(())
}
