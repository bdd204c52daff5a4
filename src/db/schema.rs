//! Store schema: the `posts` table and its FTS5 shadow index.
//!
//! `posts_fts` is an external-content FTS5 table keyed to `posts.rowid`.
//! It holds no copy of the text, so it is only correct while the triggers
//! below mirror every insert, update and delete on `posts` into it.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

const CREATE_POSTS: &str = r"
    CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        author TEXT,
        score INTEGER NOT NULL DEFAULT 0,
        url TEXT NOT NULL,
        created_utc INTEGER NOT NULL,
        body TEXT NOT NULL DEFAULT '',
        source_name TEXT NOT NULL,
        search_text TEXT NOT NULL
    )
";

/// Columns of `posts`, in declaration order.
const POSTS_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "score",
    "url",
    "created_utc",
    "body",
    "source_name",
    "search_text",
];

const CREATE_POSTS_SOURCE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_posts_source_name ON posts(source_name)";

const CREATE_POSTS_FTS: &str = r"
    CREATE VIRTUAL TABLE IF NOT EXISTS posts_fts USING fts5(
        id UNINDEXED,
        title,
        body,
        source_name UNINDEXED,
        search_text,
        content='posts',
        content_rowid='rowid'
    )
";

const CREATE_INSERT_TRIGGER: &str = r"
    CREATE TRIGGER IF NOT EXISTS posts_fts_insert AFTER INSERT ON posts BEGIN
        INSERT INTO posts_fts(rowid, id, title, body, source_name, search_text)
        VALUES (new.rowid, new.id, new.title, new.body, new.source_name, new.search_text);
    END
";

const CREATE_DELETE_TRIGGER: &str = r"
    CREATE TRIGGER IF NOT EXISTS posts_fts_delete AFTER DELETE ON posts BEGIN
        INSERT INTO posts_fts(posts_fts, rowid, id, title, body, source_name, search_text)
        VALUES ('delete', old.rowid, old.id, old.title, old.body, old.source_name, old.search_text);
    END
";

// Upserts rewrite rows in place, so the index must follow updates too.
const CREATE_UPDATE_TRIGGER: &str = r"
    CREATE TRIGGER IF NOT EXISTS posts_fts_update AFTER UPDATE ON posts BEGIN
        INSERT INTO posts_fts(posts_fts, rowid, id, title, body, source_name, search_text)
        VALUES ('delete', old.rowid, old.id, old.title, old.body, old.source_name, old.search_text);
        INSERT INTO posts_fts(rowid, id, title, body, source_name, search_text)
        VALUES (new.rowid, new.id, new.title, new.body, new.source_name, new.search_text);
    END
";

const DROP_STATEMENTS: &[&str] = &[
    "DROP TRIGGER IF EXISTS posts_fts_insert",
    "DROP TRIGGER IF EXISTS posts_fts_delete",
    "DROP TRIGGER IF EXISTS posts_fts_update",
    "DROP TABLE IF EXISTS posts_fts",
    "DROP TABLE IF EXISTS posts",
];

/// Create the post table, its shadow index and the sync triggers if absent.
///
/// Safe to call on an initialized store.
///
/// # Errors
///
/// Returns an error if any DDL statement fails; nothing is committed then.
pub async fn initialize(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin schema transaction")?;

    for (name, ddl) in [
        ("posts", CREATE_POSTS),
        ("idx_posts_source_name", CREATE_POSTS_SOURCE_INDEX),
        ("posts_fts", CREATE_POSTS_FTS),
        ("posts_fts_insert", CREATE_INSERT_TRIGGER),
        ("posts_fts_delete", CREATE_DELETE_TRIGGER),
        ("posts_fts_update", CREATE_UPDATE_TRIGGER),
    ] {
        debug!(object = name, "Ensuring schema object");
        sqlx::query(ddl)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to create {name}"))?;
    }

    tx.commit()
        .await
        .context("Failed to commit schema transaction")?;
    Ok(())
}

/// Whether `posts` exists with exactly the columns this schema declares.
///
/// # Errors
///
/// Returns the storage error if the table info cannot be read.
pub async fn posts_table_matches(pool: &SqlitePool) -> Result<bool, sqlx::Error> {
    let columns: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM pragma_table_info('posts') ORDER BY cid")
            .fetch_all(pool)
            .await?;

    Ok(columns.iter().map(|(name,)| name.as_str()).eq(POSTS_COLUMNS.iter().copied()))
}

/// Drop the triggers, the shadow index and the post table.
///
/// # Errors
///
/// Returns an error if any drop fails; the store is left unchanged then.
pub async fn drop_all(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin drop transaction")?;

    for statement in DROP_STATEMENTS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to run `{statement}`"))?;
    }

    tx.commit().await.context("Failed to commit drop")?;
    Ok(())
}
