use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subreddit_search::config::Config;
use subreddit_search::ingest::{ingest_all, refresh_loop, IngestSettings};
use subreddit_search::maintenance::prepare_store;
use subreddit_search::reddit::{RedditClient, SourceClient};
use subreddit_search::web::{self, AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting subreddit-search");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        sources = config.sources.len(),
        database = %config.database_path.display(),
        "Configuration loaded"
    );

    // Without a working API session there is nothing to ingest or show
    let client: Arc<dyn SourceClient> = Arc::new(
        RedditClient::connect(&config)
            .await
            .context("Failed to connect to the Reddit API")?,
    );

    let pool_size = u32::try_from(config.ingest_concurrency.saturating_add(2)).unwrap_or(u32::MAX);
    let (db, action) = prepare_store(&config.database_path, pool_size)
        .await
        .context("Failed to prepare store")?;

    let settings = IngestSettings::from_config(&config);
    if action.needs_ingest() {
        info!("Populating empty store");
        ingest_all(&db, Arc::clone(&client), &config.sources, settings).await;
    }

    let refresh_lock = Arc::new(Mutex::new(()));

    let refresh_handle = config.refresh_interval.map(|interval| {
        let db = db.clone();
        let client = Arc::clone(&client);
        let sources = config.sources.clone();
        let refresh_lock = Arc::clone(&refresh_lock);
        tokio::spawn(async move {
            refresh_loop(db, client, sources, settings, interval, refresh_lock).await;
        })
    });

    let state = AppState::new(config, db.clone(), client, refresh_lock);
    let web_handle = tokio::spawn(async move {
        if let Err(e) = web::serve(state).await {
            error!("Web server error: {e:#}");
        }
    });

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutting down...");

    web_handle.abort();
    if let Some(handle) = refresh_handle {
        handle.abort();
    }
    db.close().await;

    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,subreddit_search=debug"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
