use anyhow::{Context, Result};
use sqlx::{SqliteExecutor, SqlitePool};

use super::models::{IndexedPost, NewPost, Post, SourceCount};

const POST_COLUMNS: &str =
    "id, title, author, score, url, created_utc, body, source_name, search_text";

// ========== Posts ==========

/// Insert a post, or overwrite every attribute of the existing row with the same id.
///
/// Updating in place keeps the rowid stable, so the update trigger replaces
/// the index entry instead of leaving a stale one behind.
pub async fn upsert_post<'c>(executor: impl SqliteExecutor<'c>, post: &NewPost) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO posts (id, title, author, score, url, created_utc, body, source_name, search_text)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            author = excluded.author,
            score = excluded.score,
            url = excluded.url,
            created_utc = excluded.created_utc,
            body = excluded.body,
            source_name = excluded.source_name,
            search_text = excluded.search_text
        ",
    )
    .bind(&post.id)
    .bind(&post.title)
    .bind(&post.author)
    .bind(post.score)
    .bind(&post.url)
    .bind(post.created_utc)
    .bind(&post.body)
    .bind(&post.source_name)
    .bind(post.search_text())
    .execute(executor)
    .await
    .with_context(|| format!("Failed to upsert post {}", post.id))?;

    Ok(())
}

/// Get a post by its source identifier.
pub async fn get_post(pool: &SqlitePool, id: &str) -> Result<Option<Post>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
    sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")
}

/// Delete a post by id. Returns whether a row was removed.
pub async fn delete_post(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;
    Ok(result.rows_affected() > 0)
}

/// Count all stored posts.
pub async fn count_posts(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;
    Ok(count)
}

/// Count stored posts per source, largest first.
pub async fn count_posts_by_source(pool: &SqlitePool) -> Result<Vec<SourceCount>> {
    sqlx::query_as(
        r"
        SELECT source_name, COUNT(*) AS post_count
        FROM posts
        GROUP BY source_name
        ORDER BY post_count DESC, source_name ASC
        ",
    )
    .fetch_all(pool)
    .await
    .context("Failed to count posts by source")
}

/// Fetch every post matching an FTS5 expression, in no particular order.
pub async fn get_posts_matching(
    pool: &SqlitePool,
    match_expression: &str,
) -> Result<Vec<IndexedPost>, sqlx::Error> {
    let sql = format!(
        r"
        SELECT rowid AS row_id, {POST_COLUMNS} FROM posts
        WHERE rowid IN (SELECT rowid FROM posts_fts WHERE posts_fts MATCH ?)
        "
    );
    sqlx::query_as(&sql)
        .bind(match_expression)
        .fetch_all(pool)
        .await
}

// ========== Full-text index ==========

/// Check whether the `posts_fts` shadow index exists.
pub async fn fts_index_exists(pool: &SqlitePool) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'posts_fts'",
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Rowids matching an FTS5 expression, best `bm25` rank first.
///
/// `None` returns every match.
pub async fn match_rowids_by_bm25(
    pool: &SqlitePool,
    match_expression: &str,
    limit: Option<i64>,
) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r"
        SELECT rowid FROM posts_fts
        WHERE posts_fts MATCH ?
        ORDER BY bm25(posts_fts)
        LIMIT ?
        ",
    )
    .bind(match_expression)
    // SQLite treats a negative LIMIT as unbounded.
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(row_id,)| row_id).collect())
}

/// Ask FTS5 to rebuild the shadow index from the live `posts` table.
pub async fn rebuild_fts_index(pool: &SqlitePool) -> Result<()> {
    sqlx::query("INSERT INTO posts_fts(posts_fts) VALUES ('rebuild')")
        .execute(pool)
        .await
        .context("Failed to rebuild full-text index")?;
    Ok(())
}

/// Run FTS5's integrity check against the content table.
///
/// Returns `false` when the index has drifted from `posts`.
pub async fn fts_index_is_consistent(pool: &SqlitePool) -> Result<bool> {
    let result = sqlx::query("INSERT INTO posts_fts(posts_fts, rank) VALUES ('integrity-check', 1)")
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(e)) if e.message().contains("malformed") => Ok(false),
        Err(e) => Err(e).context("Failed to run full-text integrity check"),
    }
}
