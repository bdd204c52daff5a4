//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::StatusCode;
use subreddit_search::db::Database;
use subreddit_search::reddit::{Comment, PostStream, RemotePost, SourceClient, SourceError};
use tempfile::TempDir;

pub async fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

pub fn remote_post(id: &str, title: &str, body: &str, score: i64) -> RemotePost {
    RemotePost {
        id: id.to_string(),
        title: title.to_string(),
        author: Some(format!("author_{id}")),
        score,
        url: format!("https://www.reddit.com/comments/{id}"),
        created_utc: 1_700_000_000,
        body: body.to_string(),
    }
}

pub fn comment(author: &str, score: i64, body: &str) -> Comment {
    Comment {
        author: Some(author.to_string()),
        score,
        body: body.to_string(),
    }
}

/// One scripted listing entry.
#[derive(Debug, Clone)]
pub enum FakeItem {
    Post(RemotePost),
    /// A failure that only loses this item.
    Transient,
    /// A failure that ends the source, reported with this status.
    Fatal(StatusCode),
}

impl FakeItem {
    fn into_result(self) -> Result<RemotePost, SourceError> {
        match self {
            Self::Post(post) => Ok(post),
            Self::Transient => Err(SourceError::Malformed("scripted failure".to_string())),
            Self::Fatal(status) => Err(SourceError::Status {
                status,
                context: "scripted".to_string(),
            }),
        }
    }
}

/// In-memory [`SourceClient`] with scripted listings and comments.
#[derive(Debug, Default)]
pub struct FakeSourceClient {
    listings: HashMap<String, Vec<FakeItem>>,
    comments: HashMap<String, Vec<Comment>>,
    disconnected: bool,
    comment_calls: AtomicUsize,
}

impl FakeSourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, source: &str, posts: Vec<RemotePost>) -> Self {
        self.listings.insert(
            source.to_string(),
            posts.into_iter().map(FakeItem::Post).collect(),
        );
        self
    }

    pub fn with_items(mut self, source: &str, items: Vec<FakeItem>) -> Self {
        self.listings.insert(source.to_string(), items);
        self
    }

    pub fn with_comments(mut self, post_id: &str, comments: Vec<Comment>) -> Self {
        self.comments.insert(post_id.to_string(), comments);
        self
    }

    /// Make every call behave like an unreachable API.
    pub fn disconnected(mut self) -> Self {
        self.disconnected = true;
        self
    }

    pub fn comment_calls(&self) -> usize {
        self.comment_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceClient for FakeSourceClient {
    fn newest_posts<'a>(&'a self, source: &'a str, limit: usize) -> PostStream<'a> {
        if self.disconnected {
            return stream::iter(vec![Err(SourceError::Auth {
                status: StatusCode::UNAUTHORIZED,
                message: "disconnected".to_string(),
            })])
            .boxed();
        }
        let items = self.listings.get(source).cloned().unwrap_or_default();
        stream::iter(items.into_iter().take(limit).map(FakeItem::into_result)).boxed()
    }

    async fn top_comments(&self, post_id: &str, limit: usize) -> Result<Vec<Comment>, SourceError> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        if self.disconnected {
            return Err(SourceError::Server {
                status: StatusCode::SERVICE_UNAVAILABLE,
                context: format!("/comments/{post_id}"),
            });
        }
        Ok(self
            .comments
            .get(post_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn check_connection(&self) -> Result<(), SourceError> {
        if self.disconnected {
            Err(SourceError::Auth {
                status: StatusCode::UNAUTHORIZED,
                message: "disconnected".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
