//! Access to the remote forum API.
//!
//! [`SourceClient`] is the seam the ingest pipeline and the web UI depend on;
//! [`RedditClient`] is the production implementation. Tests substitute
//! their own implementation.

mod client;
mod models;

pub use client::RedditClient;
pub use models::{Comment, RemotePost};

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use reqwest::StatusCode;
use thiserror::Error;

use crate::constants::REMOVED_COMMENT_BODIES;

/// Errors reported by a [`SourceClient`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// Credentials were rejected or the token could not be obtained.
    #[error("authentication failed ({status}): {message}")]
    Auth { status: StatusCode, message: String },
    /// The API could not be reached or the response could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API answered with a server-side (5xx) failure.
    #[error("server error {status} for {context}")]
    Server { status: StatusCode, context: String },
    /// The API refused the request for another reason (banned, private, missing).
    #[error("unexpected status {status} for {context}")]
    Status { status: StatusCode, context: String },
    /// A single listing entry could not be understood.
    #[error("malformed item: {0}")]
    Malformed(String),
    /// The client was configured with unusable settings.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl SourceError {
    /// Whether this failure only affects the current item.
    ///
    /// Only an unreadable listing entry is item-scoped. Every failed request,
    /// 5xx included, loses the rest of the source and aborts it.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Classify a non-success HTTP status.
    pub(crate) fn from_status(status: StatusCode, context: impl Into<String>) -> Self {
        let context = context.into();
        if status.is_server_error() {
            Self::Server { status, context }
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Auth {
                status,
                message: context,
            }
        } else {
            Self::Status { status, context }
        }
    }
}

/// A stream of newest posts; each item either a post or the reason it was lost.
pub type PostStream<'a> = BoxStream<'a, Result<RemotePost, SourceError>>;

/// Authenticated handle to the forum API.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Stream up to `limit` newest posts of `source`, newest first.
    ///
    /// A transient error item may be followed by further posts; a
    /// non-transient one ends the useful part of the stream.
    fn newest_posts<'a>(&'a self, source: &'a str, limit: usize) -> PostStream<'a>;

    /// Fetch up to `limit` top-level comments of a post, in the API's best order.
    ///
    /// # Errors
    ///
    /// Returns an error if the comments cannot be fetched.
    async fn top_comments(&self, post_id: &str, limit: usize) -> Result<Vec<Comment>, SourceError>;

    /// Verify the session is usable.
    ///
    /// # Errors
    ///
    /// Returns an error when the API is unreachable or rejects the credentials.
    async fn check_connection(&self) -> Result<(), SourceError>;
}

/// Outcome of fetching comments for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentsView {
    /// Comments were fetched; removed and deleted ones are already filtered out.
    Loaded(Vec<Comment>),
    /// The source could not provide comments right now.
    Unavailable(String),
}

/// Fetch the first `limit` top-level comments and drop removed/deleted ones.
///
/// Removal filtering happens after the limit is applied, so fewer than
/// `limit` comments may be shown.
pub async fn fetch_comments_view(
    client: &dyn SourceClient,
    post_id: &str,
    limit: usize,
) -> CommentsView {
    match client.top_comments(post_id, limit).await {
        Ok(comments) => CommentsView::Loaded(
            comments
                .into_iter()
                .take(limit)
                .filter(|c| !is_removed_body(&c.body))
                .collect(),
        ),
        Err(e) => {
            tracing::warn!(post_id, error = %e, "Comments unavailable");
            CommentsView::Unavailable(e.to_string())
        }
    }
}

/// Whether a comment body is a removal placeholder.
#[must_use]
pub fn is_removed_body(body: &str) -> bool {
    REMOVED_COMMENT_BODIES.contains(&body.trim())
}
