pub mod pages;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::sync::Mutex;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::ingest::IngestSettings;
use crate::reddit::SourceClient;
use crate::search::SearchEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub client: Arc<dyn SourceClient>,
    pub search: SearchEngine,
    /// Held while a refresh rewrites the store, so refreshes never overlap.
    pub refresh_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Build the state for `config`, with a `bm25` search engine.
    #[must_use]
    pub fn new(
        config: Config,
        db: Database,
        client: Arc<dyn SourceClient>,
        refresh_lock: Arc<Mutex<()>>,
    ) -> Self {
        let search = SearchEngine::new().with_candidate_limit(config.search_candidate_limit);
        Self {
            db,
            config: Arc::new(config),
            client,
            search,
            refresh_lock,
        }
    }

    pub(crate) fn ingest_settings(&self) -> IngestSettings {
        IngestSettings::from_config(&self.config)
    }
}

/// Start the web server.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn serve(state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.web_host, state.config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let app = create_app(state);

    info!(addr = %addr, "Starting HTTP web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
