mod fts;
mod models;
mod queries;
pub mod schema;

pub use fts::*;
pub use models::*;
pub use queries::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

/// Default pool size when the caller has no concurrency requirement.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Shape of the store file found on disk before it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No store file exists yet.
    Missing,
    /// A store file exists but predates the current format: it has no
    /// full-text index or its `posts` columns differ.
    Legacy,
    /// The store has its full-text index and can be resumed.
    Ready,
}

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: PathBuf,
}

impl Database {
    /// Open (creating if needed) the store and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the schema cannot be created.
    pub async fn new(path: &Path) -> Result<Self> {
        Self::connect(path, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Open the store with a pool large enough for `max_connections` concurrent users.
    ///
    /// Ingestion tasks each hold their own connection, so the pool must be
    /// sized above the ingestion concurrency.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the schema cannot be created.
    pub async fn connect(path: &Path, max_connections: u32) -> Result<Self> {
        let pool = open_pool(path, max_connections.max(1)).await?;
        schema::initialize(&pool)
            .await
            .context("Failed to initialize store schema")?;
        info!(path = %path.display(), "Store ready");

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    /// Classify the store file at `path` without creating it.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be opened as SQLite.
    pub async fn store_state(path: &Path) -> Result<StoreState> {
        if !path.exists() {
            return Ok(StoreState::Missing);
        }

        let options = SqliteConnectOptions::new().filename(path);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open store at {}", path.display()))?;

        let current = match fts_index_exists(&pool).await {
            Ok(true) => schema::posts_table_matches(&pool).await,
            other => other,
        };
        pool.close().await;

        if current? {
            Ok(StoreState::Ready)
        } else {
            Ok(StoreState::Legacy)
        }
    }

    /// Delete the store file and its WAL/SHM siblings.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be removed.
    pub async fn remove_files(path: &Path) -> Result<()> {
        for candidate in sidecar_paths(path) {
            match tokio::fs::remove_file(&candidate).await {
                Ok(()) => debug!(path = %candidate.display(), "Removed store file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to remove {}", candidate.display()));
                }
            }
        }
        Ok(())
    }

    /// Drop every table, index and trigger, then recreate the empty schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be dropped or recreated.
    pub async fn reset(&self) -> Result<()> {
        schema::drop_all(&self.pool).await?;
        schema::initialize(&self.pool).await?;
        info!(path = %self.path.display(), "Store reset to empty schema");
        Ok(())
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Path of the backing store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn open_pool(path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        // Ingestion tasks write concurrently; SQLite serializes them, so wait
        // for the write lock instead of failing with SQLITE_BUSY.
        .busy_timeout(Duration::from_secs(10));

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("Failed to connect to SQLite database")
}

fn sidecar_paths(path: &Path) -> [PathBuf; 3] {
    let with_suffix = |suffix: &str| {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    [path.to_path_buf(), with_suffix("-wal"), with_suffix("-shm")]
}
