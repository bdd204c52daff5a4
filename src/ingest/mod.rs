//! Pulling newest posts from every configured source into the store.

mod pipeline;
mod poller;

pub use pipeline::{ingest_all, ingest_source, IngestSettings, SourceReport};
pub use poller::refresh_loop;
