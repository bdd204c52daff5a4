//! Integration tests for startup preparation and maintenance actions.

mod common;

use std::sync::Arc;

use common::{remote_post, setup_db, FakeSourceClient};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use subreddit_search::db::{
    count_posts, fts_index_exists, fts_index_is_consistent, get_post, upsert_post, Database,
    StoreState,
};
use subreddit_search::ingest::IngestSettings;
use subreddit_search::maintenance::{full_refresh, prepare_store, rebuild_index, StartupAction};
use tempfile::TempDir;

const SETTINGS: IngestSettings = IngestSettings {
    post_limit: 50,
    concurrency: 2,
};

#[tokio::test]
async fn test_prepare_store_fresh_then_resume() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("posts.sqlite");

    let (db, action) = prepare_store(&path, 4).await.expect("Prepare failed");
    assert_eq!(action, StartupAction::FreshInit);
    assert!(action.needs_ingest());
    upsert_post(
        db.pool(),
        &remote_post("keep", "Kept across restarts", "", 1).into_new_post("SEO"),
    )
    .await
    .unwrap();
    db.close().await;

    let (db, action) = prepare_store(&path, 4).await.expect("Prepare failed");
    assert_eq!(action, StartupAction::Resume);
    assert!(!action.needs_ingest());
    assert!(get_post(db.pool(), "keep").await.unwrap().is_some());
}

#[tokio::test]
async fn test_prepare_store_rebuilds_legacy_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("posts.sqlite");

    // A store with posts but no full-text index.
    let db = Database::new(&path).await.unwrap();
    upsert_post(
        db.pool(),
        &remote_post("old", "From before the index", "", 1).into_new_post("SEO"),
    )
    .await
    .unwrap();
    for statement in [
        "DROP TRIGGER posts_fts_insert",
        "DROP TRIGGER posts_fts_delete",
        "DROP TRIGGER posts_fts_update",
        "DROP TABLE posts_fts",
    ] {
        sqlx::query(statement).execute(db.pool()).await.unwrap();
    }
    db.close().await;

    let (db, action) = prepare_store(&path, 4).await.expect("Prepare failed");

    assert_eq!(action, StartupAction::LegacyRebuild);
    assert!(action.needs_ingest());
    assert!(fts_index_exists(db.pool()).await.unwrap());
    assert_eq!(count_posts(db.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_prepare_store_rebuilds_store_with_other_columns() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("posts.sqlite");

    // Indexed, but keyed by `subreddit` instead of `source_name`.
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();
    for statement in [
        "CREATE TABLE posts (id TEXT PRIMARY KEY, title TEXT, subreddit TEXT, score INTEGER)",
        "CREATE VIRTUAL TABLE posts_fts USING fts5(title, content='posts', content_rowid='rowid')",
        "INSERT INTO posts VALUES ('old', 'Old title', 'SEO', 1)",
    ] {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;

    assert_eq!(
        Database::store_state(&path).await.unwrap(),
        StoreState::Legacy
    );
    let (db, action) = prepare_store(&path, 4).await.expect("Prepare failed");

    assert_eq!(action, StartupAction::LegacyRebuild);
    assert_eq!(count_posts(db.pool()).await.unwrap(), 0);
    upsert_post(
        db.pool(),
        &remote_post("new", "Fits the new layout", "", 1).into_new_post("SEO"),
    )
    .await
    .unwrap();
    assert!(fts_index_is_consistent(db.pool()).await.unwrap());
}

#[tokio::test]
async fn test_full_refresh_replaces_store_contents() {
    let (db, _temp_dir) = setup_db().await;
    upsert_post(
        db.pool(),
        &remote_post("stale", "No longer listed", "", 1).into_new_post("SEO"),
    )
    .await
    .unwrap();

    let client = FakeSourceClient::new()
        .with_posts("SEO", vec![remote_post("new1", "Fresh", "", 5)])
        .with_posts("bigseo", vec![remote_post("new2", "Also fresh", "", 6)]);
    let sources = vec!["SEO".to_string(), "bigseo".to_string()];

    let reports = full_refresh(&db, Arc::new(client), &sources, SETTINGS)
        .await
        .expect("Refresh failed");

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.is_complete()));
    assert!(get_post(db.pool(), "stale").await.unwrap().is_none());
    assert_eq!(count_posts(db.pool()).await.unwrap(), 2);
    assert!(fts_index_is_consistent(db.pool()).await.unwrap());
}

#[tokio::test]
async fn test_rebuild_index_recreates_missing_index() {
    let (db, _temp_dir) = setup_db().await;
    upsert_post(
        db.pool(),
        &remote_post("p1", "Crawl budget", "", 1).into_new_post("TechSEO"),
    )
    .await
    .unwrap();
    sqlx::query("DROP TABLE posts_fts")
        .execute(db.pool())
        .await
        .unwrap();

    rebuild_index(&db).await.expect("Rebuild failed");

    assert!(fts_index_exists(db.pool()).await.unwrap());
    assert_eq!(count_posts(db.pool()).await.unwrap(), 1);
    assert!(fts_index_is_consistent(db.pool()).await.unwrap());
}

#[tokio::test]
async fn test_rebuild_index_is_idempotent() {
    let (db, _temp_dir) = setup_db().await;
    upsert_post(
        db.pool(),
        &remote_post("p1", "Crawl budget", "", 1).into_new_post("TechSEO"),
    )
    .await
    .unwrap();

    rebuild_index(&db).await.unwrap();
    rebuild_index(&db).await.unwrap();

    assert_eq!(count_posts(db.pool()).await.unwrap(), 1);
    assert!(fts_index_is_consistent(db.pool()).await.unwrap());
}
