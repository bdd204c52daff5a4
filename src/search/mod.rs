//! Keyword search over stored posts.
//!
//! The index decides which posts match. Every match is returned unless a
//! candidate limit is set, in which case the most relevant ones are kept.
//! The order shown to the user is by score; relevance only breaks ties
//! between equal scores.

mod ranker;

pub use ranker::{Bm25Ranker, RelevanceRanker};

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::db::{fts_index_exists, get_posts_matching, Database, MatchExpression, Post};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search index missing! Rebuild the index or refresh data.")]
    IndexMissing,
    #[error("search failed: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Runs searches against the store with a configurable ranker.
#[derive(Clone)]
pub struct SearchEngine {
    ranker: Arc<dyn RelevanceRanker>,
    candidate_limit: Option<usize>,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("ranker", &self.ranker.name())
            .field("candidate_limit", &self.candidate_limit)
            .finish()
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Engine using `bm25` ranking that returns every match.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ranker(Arc::new(Bm25Ranker))
    }

    #[must_use]
    pub fn with_ranker(ranker: Arc<dyn RelevanceRanker>) -> Self {
        Self {
            ranker,
            candidate_limit: None,
        }
    }

    /// Keep only the `limit` most relevant matches before sorting by score.
    #[must_use]
    pub fn with_candidate_limit(mut self, limit: Option<usize>) -> Self {
        self.candidate_limit = limit.map(|n| n.max(1));
        self
    }

    /// Find the posts containing every word of `query`, highest score first.
    ///
    /// A query with no words returns an empty list without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::IndexMissing`] when the store has no full-text
    /// index, and [`SearchError::Storage`] for any other database failure.
    pub async fn search(&self, db: &Database, query: &str) -> Result<Vec<Post>, SearchError> {
        let Some(expression) = MatchExpression::parse(query) else {
            return Ok(Vec::new());
        };

        if !fts_index_exists(db.pool()).await? {
            return Err(SearchError::IndexMissing);
        }

        let ranked = self
            .ranker
            .rank(db.pool(), &expression, self.candidate_limit)
            .await?;
        debug!(
            ranker = self.ranker.name(),
            expression = %expression,
            candidates = ranked.len(),
            "Ranked search candidates"
        );

        let rows = get_posts_matching(db.pool(), expression.as_str()).await?;
        Ok(order_by_score(&ranked, rows.into_iter().map(|r| (r.row_id, r.post))))
    }
}

/// Keep the rows present in `ranked` and sort them by score descending,
/// breaking ties by their position in `ranked`.
fn order_by_score(ranked: &[i64], rows: impl Iterator<Item = (i64, Post)>) -> Vec<Post> {
    let position: HashMap<i64, usize> = ranked
        .iter()
        .enumerate()
        .map(|(pos, row_id)| (*row_id, pos))
        .collect();

    let mut rows: Vec<(usize, Post)> = rows
        .filter_map(|(row_id, post)| position.get(&row_id).map(|pos| (*pos, post)))
        .collect();
    rows.sort_by(|(pos_a, a), (pos_b, b)| b.score.cmp(&a.score).then(pos_a.cmp(pos_b)));
    rows.into_iter().map(|(_, post)| post).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, score: i64) -> Post {
        Post {
            id: id.to_string(),
            title: id.to_string(),
            author: None,
            score,
            url: String::new(),
            created_utc: 0,
            body: String::new(),
            source_name: "SEO".to_string(),
            search_text: id.to_string(),
        }
    }

    #[test]
    fn test_order_by_score_ignores_relevance_rank() {
        let ranked = [1, 2, 3];
        let rows = vec![(1, post("a", 5)), (2, post("b", 50)), (3, post("c", -2))];
        let ids: Vec<_> = order_by_score(&ranked, rows.into_iter())
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn test_order_by_score_ties_follow_relevance() {
        let ranked = [7, 3, 9];
        let rows = vec![(9, post("last", 10)), (3, post("mid", 10)), (7, post("first", 10))];
        let ids: Vec<_> = order_by_score(&ranked, rows.into_iter())
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["first", "mid", "last"]);
    }

    #[test]
    fn test_order_by_score_drops_unranked_rows() {
        let ranked = [2];
        let rows = vec![(1, post("cut", 900)), (2, post("kept", 1))];
        let ids: Vec<_> = order_by_score(&ranked, rows.into_iter())
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["kept"]);
    }
}
