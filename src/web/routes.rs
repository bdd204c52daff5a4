use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::pages::{self, SearchPageParams, Sidebar};
use super::AppState;
use crate::db::{count_posts_by_source, fts_index_exists, Post, SourceCount};
use crate::ingest::SourceReport;
use crate::maintenance::{full_refresh, rebuild_index};
use crate::reddit::{fetch_comments_view, Comment, CommentsView};
use crate::search::SearchError;

static POST_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]{1,16}$").expect("valid post id regex"));

const EMPTY_QUERY_MESSAGE: &str = "Please enter at least one keyword to search for.";

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/search", get(search))
        .route("/posts/:id/comments", get(post_comments))
        .route("/admin/refresh", post(admin_refresh))
        .route("/admin/rebuild-index", post(admin_rebuild_index))
        .route("/healthz", get(health))
        .route("/api/search", get(api_search))
        .route("/api/posts/:id/comments", get(api_post_comments))
        .route("/api/status", get(api_status))
}

// ========== HTML Routes ==========

#[derive(Debug, Deserialize)]
pub struct HomeParams {
    notice: Option<String>,
}

async fn home(State(state): State<AppState>, Query(params): Query<HomeParams>) -> Response {
    let (counts, api_connected) = sidebar_data(&state).await;
    let html = pages::render_search_page(&SearchPageParams {
        query: None,
        posts: &[],
        error: None,
        notice: params.notice.as_deref().filter(|n| !n.is_empty()),
        sidebar: Sidebar {
            sources: &state.config.sources,
            counts: &counts,
            api_connected,
        },
    });
    Html(html.into_string()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = params.q.unwrap_or_default();
    let (counts, api_connected) = sidebar_data(&state).await;
    let sidebar = Sidebar {
        sources: &state.config.sources,
        counts: &counts,
        api_connected,
    };

    if query.trim().is_empty() {
        let html = pages::render_search_page(&SearchPageParams {
            query: None,
            posts: &[],
            error: Some(EMPTY_QUERY_MESSAGE),
            notice: None,
            sidebar,
        });
        return (StatusCode::BAD_REQUEST, Html(html.into_string())).into_response();
    }

    let (status, posts, error) = match state.search.search(&state.db, &query).await {
        Ok(posts) => (StatusCode::OK, posts, None),
        Err(e) => {
            tracing::error!(query = %query, "Search failed: {e}");
            (search_error_status(&e), Vec::new(), Some(e.to_string()))
        }
    };

    let html = pages::render_search_page(&SearchPageParams {
        query: Some(&query),
        posts: &posts,
        error: error.as_deref(),
        notice: None,
        sidebar,
    });
    (status, Html(html.into_string())).into_response()
}

async fn post_comments(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if !POST_ID.is_match(&id) {
        return (StatusCode::BAD_REQUEST, "Invalid post id").into_response();
    }

    let view = fetch_comments_view(state.client.as_ref(), &id, state.config.comment_limit).await;
    let html = pages::render_comments_fragment(&view);
    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(html.into_string()),
    )
        .into_response()
}

async fn admin_refresh(State(state): State<AppState>) -> Response {
    let Ok(_guard) = state.refresh_lock.try_lock() else {
        return redirect_with_notice("Another maintenance task is already running.");
    };

    match full_refresh(
        &state.db,
        state.client.clone(),
        &state.config.sources,
        state.ingest_settings(),
    )
    .await
    {
        Ok(reports) => redirect_with_notice(&refresh_summary(&reports)),
        Err(e) => {
            tracing::error!("Full refresh failed: {e:#}");
            redirect_with_notice("Full refresh failed, check the server logs.")
        }
    }
}

async fn admin_rebuild_index(State(state): State<AppState>) -> Response {
    let Ok(_guard) = state.refresh_lock.try_lock() else {
        return redirect_with_notice("Another maintenance task is already running.");
    };

    match rebuild_index(&state.db).await {
        Ok(()) => redirect_with_notice("Search index rebuilt."),
        Err(e) => {
            tracing::error!("Index rebuild failed: {e:#}");
            redirect_with_notice("Index rebuild failed, check the server logs.")
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

// ========== API Routes ==========

#[derive(Debug, Serialize)]
pub struct ApiError {
    error: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct ApiSearchResponse {
    query: String,
    count: usize,
    posts: Vec<Post>,
}

async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, EMPTY_QUERY_MESSAGE);
    }

    match state.search.search(&state.db, &query).await {
        Ok(posts) => Json(ApiSearchResponse {
            count: posts.len(),
            query,
            posts,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(query = %query, "Search failed: {e}");
            api_error(search_error_status(&e), e.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiCommentsResponse {
    post_id: String,
    available: bool,
    comments: Vec<Comment>,
}

async fn api_post_comments(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if !POST_ID.is_match(&id) {
        return api_error(StatusCode::BAD_REQUEST, "Invalid post id");
    }

    let view = fetch_comments_view(state.client.as_ref(), &id, state.config.comment_limit).await;
    let (available, comments) = match view {
        CommentsView::Loaded(comments) => (true, comments),
        CommentsView::Unavailable(_) => (false, Vec::new()),
    };
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(ApiCommentsResponse {
            post_id: id,
            available,
            comments,
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct ApiStatusResponse {
    api_connected: bool,
    index_present: bool,
    total_posts: i64,
    sources: Vec<ApiSourceStatus>,
}

#[derive(Debug, Serialize)]
pub struct ApiSourceStatus {
    name: String,
    posts: i64,
}

async fn api_status(State(state): State<AppState>) -> Response {
    let index_present = match fts_index_exists(state.db.pool()).await {
        Ok(present) => present,
        Err(e) => {
            tracing::error!("Failed to inspect search index: {e}");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };
    let (counts, api_connected) = sidebar_data(&state).await;

    let sources: Vec<ApiSourceStatus> = state
        .config
        .sources
        .iter()
        .map(|name| ApiSourceStatus {
            posts: counts
                .iter()
                .find(|c| &c.source_name == name)
                .map_or(0, |c| c.post_count),
            name: name.clone(),
        })
        .collect();

    Json(ApiStatusResponse {
        api_connected,
        index_present,
        total_posts: counts.iter().map(|c| c.post_count).sum(),
        sources,
    })
    .into_response()
}

// ========== Helpers ==========

/// Per-source counts and API reachability; failures degrade to empty/disconnected.
async fn sidebar_data(state: &AppState) -> (Vec<SourceCount>, bool) {
    let counts = match count_posts_by_source(state.db.pool()).await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!("Failed to count posts: {e:#}");
            Vec::new()
        }
    };

    let api_connected = match state.client.check_connection().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Reddit API check failed: {e}");
            false
        }
    };

    (counts, api_connected)
}

fn search_error_status(error: &SearchError) -> StatusCode {
    match error {
        SearchError::IndexMissing => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redirect_with_notice(notice: &str) -> Response {
    Redirect::to(&format!("/?notice={}", urlencoding::encode(notice))).into_response()
}

fn refresh_summary(reports: &[SourceReport]) -> String {
    let written: usize = reports.iter().map(|r| r.written).sum();
    let failed = reports.iter().filter(|r| !r.is_complete()).count();
    if failed == 0 {
        format!(
            "Full refresh complete: {written} posts from {} sources.",
            reports.len()
        )
    } else {
        format!(
            "Full refresh finished with errors: {written} posts stored, {failed} of {} sources failed.",
            reports.len()
        )
    }
}
