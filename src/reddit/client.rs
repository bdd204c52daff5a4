use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tokio::sync::RwLock;
use tracing::{debug, info, trace};

use super::models::{comments_from_listing, Listing, TokenResponse};
use super::{Comment, PostStream, RemotePost, SourceClient, SourceError};
use crate::config::Config;
use crate::constants::MAX_LISTING_PAGE;

/// Refresh the token this long before Reddit says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Reddit API client using the application-only OAuth grant.
///
/// Construct once at startup and share it; the access token is cached and
/// renewed on demand.
#[derive(Debug)]
pub struct RedditClient {
    http: reqwest::Client,
    api_url: String,
    auth_url: String,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<AccessToken>>,
}

impl RedditClient {
    /// Build a client from configuration. No request is made yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the user agent is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.reddit_user_agent).map_err(|e| {
            SourceError::Config(format!("invalid REDDIT_USER_AGENT header value: {e}"))
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: config.reddit_api_url.trim_end_matches('/').to_string(),
            auth_url: config.reddit_auth_url.clone(),
            client_id: config.reddit_client_id.clone(),
            client_secret: config.reddit_client_secret.clone(),
            token: RwLock::new(None),
        })
    }

    /// Build a client and authenticate immediately.
    ///
    /// # Errors
    ///
    /// Returns an error when the API is unreachable or rejects the credentials.
    pub async fn connect(config: &Config) -> Result<Self, SourceError> {
        let client = Self::new(config)?;
        client.access_token().await?;
        info!(api_url = %client.api_url, "Authenticated with Reddit API");
        Ok(client)
    }

    /// Return a cached access token, requesting a new one when stale.
    async fn access_token(&self) -> Result<String, SourceError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }

        let mut guard = self.token.write().await;
        // Another task may have refreshed while we waited for the write lock.
        if let Some(token) = guard.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting Reddit access token");
        let response = self
            .http
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Auth {
                status,
                message: format!("token request rejected: {}", body.trim()),
            });
        }

        let token: TokenResponse = response.json().await?;
        let value = token.access_token.clone();
        *guard = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }

    /// GET an API path and decode the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let token = self.access_token().await?;
        let url = format!("{}{path}", self.api_url);
        trace!(url = %url, "Reddit API request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::from_status(status, path));
        }

        Ok(response.json().await?)
    }

    async fn fetch_listing_page(
        &self,
        source: &str,
        page_size: usize,
        after: Option<&str>,
    ) -> Result<Listing, SourceError> {
        let mut query = vec![
            ("limit", page_size.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        self.get_json(&format!("/r/{source}/new"), &query).await
    }
}

#[async_trait]
impl SourceClient for RedditClient {
    fn newest_posts<'a>(&'a self, source: &'a str, limit: usize) -> PostStream<'a> {
        async_stream::stream! {
            let mut remaining = limit;
            let mut after: Option<String> = None;

            while remaining > 0 {
                let page_size = remaining.min(MAX_LISTING_PAGE);
                let listing = match self.fetch_listing_page(source, page_size, after.as_deref()).await {
                    Ok(listing) => listing,
                    Err(e) => {
                        // Without this page there is no cursor to continue from.
                        yield Err(e);
                        break;
                    }
                };

                let children = listing.data.children;
                if children.is_empty() {
                    break;
                }

                for thing in children {
                    if remaining == 0 {
                        break;
                    }
                    remaining -= 1;
                    yield RemotePost::try_from(thing);
                }

                match listing.data.after {
                    Some(next) => after = Some(next),
                    None => break,
                }
            }
        }
        .boxed()
    }

    async fn top_comments(&self, post_id: &str, limit: usize) -> Result<Vec<Comment>, SourceError> {
        let query = [
            ("depth", "1".to_string()),
            ("limit", limit.to_string()),
            ("sort", "confidence".to_string()),
            ("raw_json", "1".to_string()),
        ];
        let listings: Vec<Listing> = self
            .get_json(&format!("/comments/{post_id}"), &query)
            .await?;

        // The first listing is the submission itself; comments follow.
        let comments = listings
            .into_iter()
            .nth(1)
            .map(comments_from_listing)
            .unwrap_or_default();

        Ok(comments.into_iter().take(limit).collect())
    }

    async fn check_connection(&self) -> Result<(), SourceError> {
        self.access_token().await.map(|_| ())
    }
}
