//! Store lifecycle: startup preparation, full refresh and index repair.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::db::{fts_index_exists, rebuild_fts_index, schema, Database, StoreState};
use crate::ingest::{ingest_all, IngestSettings, SourceReport};
use crate::reddit::SourceClient;

/// What `prepare_store` had to do to produce a usable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupAction {
    /// The existing store was kept as is.
    Resume,
    /// No store existed; an empty one was created.
    FreshInit,
    /// A store without a full-text index was deleted and recreated.
    LegacyRebuild,
}

impl StartupAction {
    /// Whether the store is empty and should be populated right away.
    #[must_use]
    pub const fn needs_ingest(self) -> bool {
        matches!(self, Self::FreshInit | Self::LegacyRebuild)
    }
}

/// Open the store at `path`, creating or replacing it as needed.
///
/// # Errors
///
/// Returns an error if the store cannot be inspected, removed or opened.
pub async fn prepare_store(
    path: &std::path::Path,
    max_connections: u32,
) -> Result<(Database, StartupAction)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }

    let action = match Database::store_state(path).await? {
        StoreState::Ready => StartupAction::Resume,
        StoreState::Missing => StartupAction::FreshInit,
        StoreState::Legacy => {
            warn!(
                path = %path.display(),
                "Old database format detected, rebuilding"
            );
            Database::remove_files(path).await?;
            StartupAction::LegacyRebuild
        }
    };

    let db = Database::connect(path, max_connections).await?;
    info!(?action, "Store prepared");
    Ok((db, action))
}

/// Drop the whole store and re-ingest every source from scratch.
///
/// # Errors
///
/// Returns an error if the store cannot be reset; per-source ingestion
/// failures are reported in the returned list instead.
pub async fn full_refresh(
    db: &Database,
    client: Arc<dyn SourceClient>,
    sources: &[String],
    settings: IngestSettings,
) -> Result<Vec<SourceReport>> {
    info!("Full refresh: rebuilding store");
    db.reset().await.context("Failed to reset store")?;
    Ok(ingest_all(db, client, sources, settings).await)
}

/// Resynchronize the full-text index with the live `posts` table.
///
/// Post rows are never modified. A missing index is recreated first.
///
/// # Errors
///
/// Returns an error if the index cannot be created or rebuilt.
pub async fn rebuild_index(db: &Database) -> Result<()> {
    if !fts_index_exists(db.pool()).await? {
        warn!("Search index missing, recreating before rebuild");
        schema::initialize(db.pool()).await?;
    }
    rebuild_fts_index(db.pool()).await?;
    info!("Search index rebuilt");
    Ok(())
}
