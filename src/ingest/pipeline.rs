use std::sync::Arc;

use anyhow::Context;
use futures_util::StreamExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::db::{upsert_post, Database};
use crate::reddit::SourceClient;

/// Knobs shared by every per-source ingestion.
#[derive(Debug, Clone, Copy)]
pub struct IngestSettings {
    /// Newest posts to pull per source on each refresh.
    pub post_limit: usize,
    /// Sources ingested at the same time.
    pub concurrency: usize,
}

impl IngestSettings {
    #[must_use]
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            post_limit: config.post_limit,
            concurrency: config.ingest_concurrency,
        }
    }
}

/// What happened while ingesting one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    /// Posts written to the store.
    pub written: usize,
    /// Listing entries that could not be read.
    pub skipped: usize,
    /// Why the source stopped early, if it did.
    pub error: Option<String>,
}

impl SourceReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            written: 0,
            skipped: 0,
            error: None,
        }
    }

    /// Whether the source ran to the end of its window.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Pull up to `limit` newest posts of `source` and upsert each one.
///
/// Every write commits on its own, so posts stored before an abort stay.
/// Malformed entries are skipped; any failed request (5xx included),
/// connectivity, auth or storage failure stops this source and is recorded
/// in the report.
pub async fn ingest_source(
    db: &Database,
    client: &dyn SourceClient,
    source: &str,
    limit: usize,
) -> SourceReport {
    let mut report = SourceReport::new(source);

    let mut conn = match db
        .pool()
        .acquire()
        .await
        .context("Failed to acquire store connection")
    {
        Ok(conn) => conn,
        Err(e) => {
            report.error = Some(format!("{e:#}"));
            return report;
        }
    };

    let mut posts = client.newest_posts(source, limit);
    while let Some(item) = posts.next().await {
        match item {
            Ok(remote) => {
                let new_post = remote.into_new_post(source);
                if let Err(e) = upsert_post(&mut *conn, &new_post).await {
                    report.error = Some(format!("{e:#}"));
                    break;
                }
                report.written += 1;
            }
            Err(e) if e.is_transient() => {
                debug!(source, error = %e, "Skipping item after transient failure");
                report.skipped += 1;
            }
            Err(e) => {
                report.error = Some(e.to_string());
                break;
            }
        }
    }

    report
}

/// Ingest every source concurrently and wait for all of them.
///
/// At most `settings.concurrency` sources run at once. Reports come back in
/// completion order; a failed source never affects the others.
pub async fn ingest_all(
    db: &Database,
    client: Arc<dyn SourceClient>,
    sources: &[String],
    settings: IngestSettings,
) -> Vec<SourceReport> {
    let workers = settings.concurrency.clamp(1, sources.len().max(1));
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    info!(
        sources = sources.len(),
        workers,
        post_limit = settings.post_limit,
        "Starting ingestion"
    );

    for source in sources {
        let semaphore = Arc::clone(&semaphore);
        let client = Arc::clone(&client);
        let db = db.clone();
        let source = source.clone();
        let limit = settings.post_limit;

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            ingest_source(&db, client.as_ref(), &source, limit).await
        });
    }

    let mut reports = Vec::with_capacity(sources.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => {
                log_report(&report);
                reports.push(report);
            }
            Err(e) => error!("Ingestion task panicked: {e}"),
        }
    }

    let written: usize = reports.iter().map(|r| r.written).sum();
    info!(written, sources = reports.len(), "Ingestion finished");
    reports
}

fn log_report(report: &SourceReport) {
    match &report.error {
        None => info!(
            source = %report.source,
            written = report.written,
            skipped = report.skipped,
            "Source ingested"
        ),
        Some(e) => warn!(
            source = %report.source,
            written = report.written,
            skipped = report.skipped,
            error = %e,
            "Source ingestion aborted"
        ),
    }
}
