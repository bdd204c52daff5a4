//! Integration tests for the ingest pipeline.

mod common;

use std::sync::Arc;

use common::{remote_post, setup_db, FakeItem, FakeSourceClient};
use reqwest::StatusCode;
use serde_json::json;
use subreddit_search::config::Config;
use subreddit_search::db::{count_posts, count_posts_by_source, fts_index_is_consistent, get_post};
use subreddit_search::ingest::{ingest_all, ingest_source, IngestSettings};
use subreddit_search::reddit::RedditClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn numbered_posts(prefix: &str, count: usize) -> Vec<FakeItem> {
    (0..count)
        .map(|i| {
            FakeItem::Post(remote_post(
                &format!("{prefix}{i}"),
                &format!("post number {i}"),
                "body",
                i64::try_from(i).unwrap(),
            ))
        })
        .collect()
}

fn sources(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_ingest_source_stores_posts_under_source_name() {
    let (db, _temp_dir) = setup_db().await;
    let client = FakeSourceClient::new().with_posts(
        "SEO",
        vec![remote_post("abc", "Core update", "Rankings dropped", 12)],
    );

    let report = ingest_source(&db, &client, "SEO", 50).await;

    assert!(report.is_complete());
    assert_eq!(report.written, 1);
    let stored = get_post(db.pool(), "abc").await.unwrap().unwrap();
    assert_eq!(stored.source_name, "SEO");
    assert_eq!(stored.score, 12);
    assert_eq!(stored.search_text, "core update rankings dropped seo");
}

#[tokio::test]
async fn test_ingest_source_respects_limit() {
    let (db, _temp_dir) = setup_db().await;
    let client = FakeSourceClient::new().with_items("SEO", numbered_posts("p", 30));

    let report = ingest_source(&db, &client, "SEO", 10).await;

    assert_eq!(report.written, 10);
    assert_eq!(count_posts(db.pool()).await.unwrap(), 10);
}

#[tokio::test]
async fn test_fatal_failure_keeps_earlier_items_and_other_sources() {
    let (db, _temp_dir) = setup_db().await;

    let mut broken = numbered_posts("s", 9);
    broken.push(FakeItem::Fatal(StatusCode::FORBIDDEN));
    broken.extend(numbered_posts("late", 40));

    let client = FakeSourceClient::new()
        .with_items("SEO", broken)
        .with_items("bigseo", numbered_posts("b", 50));

    let reports = ingest_all(
        &db,
        Arc::new(client),
        &sources(&["SEO", "bigseo"]),
        IngestSettings {
            post_limit: 50,
            concurrency: 2,
        },
    )
    .await;

    assert_eq!(reports.len(), 2);
    let seo = reports.iter().find(|r| r.source == "SEO").unwrap();
    assert_eq!(seo.written, 9);
    assert!(!seo.is_complete());
    let big = reports.iter().find(|r| r.source == "bigseo").unwrap();
    assert_eq!(big.written, 50);
    assert!(big.is_complete());

    let counts = count_posts_by_source(db.pool()).await.unwrap();
    let count_of = |name: &str| {
        counts
            .iter()
            .find(|c| c.source_name == name)
            .map_or(0, |c| c.post_count)
    };
    assert_eq!(count_of("SEO"), 9);
    assert_eq!(count_of("bigseo"), 50);
    assert!(get_post(db.pool(), "late0").await.unwrap().is_none());
}

#[tokio::test]
async fn test_transient_failure_skips_only_that_item() {
    let (db, _temp_dir) = setup_db().await;
    let client = FakeSourceClient::new().with_items(
        "SEO",
        vec![
            FakeItem::Post(remote_post("x1", "first", "", 1)),
            FakeItem::Transient,
            FakeItem::Post(remote_post("x3", "third", "", 3)),
        ],
    );

    let report = ingest_source(&db, &client, "SEO", 50).await;

    assert!(report.is_complete());
    assert_eq!(report.written, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(count_posts(db.pool()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_reingest_is_idempotent_and_keeps_latest_attributes() {
    let (db, _temp_dir) = setup_db().await;
    let first = FakeSourceClient::new().with_posts("SEO", vec![remote_post("r1", "Title", "", 1)]);
    ingest_source(&db, &first, "SEO", 50).await;

    let second =
        FakeSourceClient::new().with_posts("SEO", vec![remote_post("r1", "Title", "edited", 42)]);
    ingest_source(&db, &second, "SEO", 50).await;

    assert_eq!(count_posts(db.pool()).await.unwrap(), 1);
    let stored = get_post(db.pool(), "r1").await.unwrap().unwrap();
    assert_eq!(stored.score, 42);
    assert_eq!(stored.body, "edited");
    assert!(fts_index_is_consistent(db.pool()).await.unwrap());
}

#[tokio::test]
async fn test_ingest_all_with_more_sources_than_workers() {
    let (db, _temp_dir) = setup_db().await;
    let names = ["SEO", "bigseo", "PPC", "TechSEO", "WebDev"];
    let mut client = FakeSourceClient::new();
    for name in names {
        client = client.with_items(name, numbered_posts(&format!("{name}_"), 5));
    }

    let reports = ingest_all(
        &db,
        Arc::new(client),
        &sources(&names),
        IngestSettings {
            post_limit: 50,
            concurrency: 2,
        },
    )
    .await;

    assert_eq!(reports.len(), names.len());
    assert!(reports.iter().all(|r| r.is_complete() && r.written == 5));
    assert_eq!(count_posts(db.pool()).await.unwrap(), 25);
}

#[tokio::test]
async fn test_unreachable_source_reports_error() {
    let (db, _temp_dir) = setup_db().await;
    let client = FakeSourceClient::new().disconnected();

    let report = ingest_source(&db, &client, "SEO", 50).await;

    assert!(!report.is_complete());
    assert_eq!(report.written, 0);
    assert!(report.error.unwrap().contains("authentication failed"));
}

#[tokio::test]
async fn test_server_error_on_listing_aborts_source() {
    let (db, _temp_dir) = setup_db().await;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "bearer",
            "expires_in": 86400,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/SEO/new"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = RedditClient::new(&Config {
        reddit_api_url: server.uri(),
        reddit_auth_url: format!("{}/api/v1/access_token", server.uri()),
        ..Config::for_testing()
    })
    .unwrap();

    let report = ingest_source(&db, &client, "SEO", 50).await;

    assert!(!report.is_complete());
    assert_eq!(report.written, 0);
    assert_eq!(report.skipped, 0);
    assert!(report.error.unwrap().contains("503"));
    assert_eq!(count_posts(db.pool()).await.unwrap(), 0);
}
