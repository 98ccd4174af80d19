//! season-elo server entry point.
//!
//! Starts the Axum HTTP server and, when enabled, the periodic import job.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use season_elo::api;
use season_elo::app_state::AppState;
use season_elo::config::EngineConfig;
use season_elo::ingest::{ImportJob, JsonFileSource};
use season_elo::persistence::{LedgerStore, MemoryStore, PostgresStore};
use season_elo::service::RatingService;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = EngineConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        season = %config.current_season,
        "starting season-elo"
    );

    // Build persistence layer
    let store: Arc<dyn LedgerStore> = if config.persistence_enabled {
        let postgres = PostgresStore::connect(&config).await?;
        postgres.migrate().await?;
        tracing::info!("connected to postgres, migrations applied");
        Arc::new(postgres)
    } else {
        tracing::warn!("persistence disabled, using in-memory store");
        Arc::new(MemoryStore::new())
    };

    // Build service layer
    let rating_service = Arc::new(RatingService::new(store, config.engine_settings()));

    // Background import
    if config.import_enabled {
        match &config.import_source_path {
            Some(path) => {
                let source = Arc::new(JsonFileSource::new(path));
                let every = Duration::from_secs(config.import_interval_secs.max(1));
                let _import_task =
                    ImportJob::new(Arc::clone(&rating_service), source, every).spawn();
                tracing::info!(path = %path.display(), ?every, "import job scheduled");
            }
            None => tracing::warn!("IMPORT_ENABLED set without IMPORT_SOURCE_PATH, import skipped"),
        }
    }

    // Build application state
    let app_state = AppState { rating_service };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
