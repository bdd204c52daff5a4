use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::{match_rowids_by_bm25, MatchExpression};

/// Orders the rows matching an expression by text relevance.
///
/// Implementations return post rowids, most relevant first, at most `limit`
/// when one is given.
#[async_trait]
pub trait RelevanceRanker: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rank the corpus against `expression`.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the index cannot be queried.
    async fn rank(
        &self,
        pool: &SqlitePool,
        expression: &MatchExpression,
        limit: Option<usize>,
    ) -> Result<Vec<i64>, sqlx::Error>;
}

/// FTS5's built-in `bm25()` ranking over `posts_fts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25Ranker;

#[async_trait]
impl RelevanceRanker for Bm25Ranker {
    fn name(&self) -> &'static str {
        "bm25"
    }

    async fn rank(
        &self,
        pool: &SqlitePool,
        expression: &MatchExpression,
        limit: Option<usize>,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let limit = limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        match_rowids_by_bm25(pool, expression.as_str(), limit).await
    }
}
