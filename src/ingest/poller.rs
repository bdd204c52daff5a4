use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::pipeline::{ingest_all, IngestSettings};
use crate::db::Database;
use crate::reddit::SourceClient;

/// Re-ingest every source on a fixed interval, forever.
///
/// Each round re-fetches the whole newest-posts window. The `refresh_lock`
/// is shared with the maintenance actions so a round never overlaps a full
/// refresh.
pub async fn refresh_loop(
    db: Database,
    client: Arc<dyn SourceClient>,
    sources: Vec<String>,
    settings: IngestSettings,
    interval: Duration,
    refresh_lock: Arc<Mutex<()>>,
) {
    info!(interval_secs = interval.as_secs(), "Periodic refresh enabled");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; startup already ingested.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let _guard = refresh_lock.lock().await;
        debug!("Periodic refresh starting");
        let reports = ingest_all(&db, Arc::clone(&client), &sources, settings).await;
        let failed = reports.iter().filter(|r| !r.is_complete()).count();
        info!(
            sources = reports.len(),
            failed,
            "Periodic refresh complete"
        );
    }
}
