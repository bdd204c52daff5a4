use std::path::PathBuf;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::constants::{DEFAULT_SOURCES, DEFAULT_USER_AGENT};

static SUBREDDIT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{2,21}$").expect("valid subreddit regex"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Reddit API
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub reddit_api_url: String,
    pub reddit_auth_url: String,

    // Database
    pub database_path: PathBuf,

    // Ingestion
    pub sources: Vec<String>,
    pub post_limit: usize,
    pub ingest_concurrency: usize,
    pub refresh_interval: Option<Duration>,

    // Search
    pub comment_limit: usize,
    /// Most relevant matches kept per search; `None` keeps every match.
    pub search_candidate_limit: Option<usize>,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let refresh_secs = parse_env_u64("REFRESH_INTERVAL_SECS", 0)?;
        let candidate_limit = parse_env_usize("SEARCH_CANDIDATE_LIMIT", 0)?;

        Ok(Self {
            // Reddit API
            reddit_client_id: required_env("REDDIT_CLIENT_ID")?,
            reddit_client_secret: required_env("REDDIT_CLIENT_SECRET")?,
            reddit_user_agent: env_or_default("REDDIT_USER_AGENT", DEFAULT_USER_AGENT),
            reddit_api_url: env_or_default("REDDIT_API_URL", "https://oauth.reddit.com"),
            reddit_auth_url: env_or_default(
                "REDDIT_AUTH_URL",
                "https://www.reddit.com/api/v1/access_token",
            ),

            // Database
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/posts.sqlite")),

            // Ingestion
            sources: optional_env("SOURCES").map_or_else(
                || DEFAULT_SOURCES.iter().map(ToString::to_string).collect(),
                |raw| parse_sources(&raw),
            ),
            post_limit: parse_env_usize("POST_LIMIT", 50)?,
            ingest_concurrency: parse_env_usize("INGEST_CONCURRENCY", default_concurrency())?,
            refresh_interval: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),

            // Search
            comment_limit: parse_env_usize("COMMENT_LIMIT", 3)?,
            search_candidate_limit: (candidate_limit > 0).then_some(candidate_limit),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
        })
    }

    /// Configuration pointing at placeholder endpoints, for tests.
    #[doc(hidden)]
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            reddit_client_id: "test-client".to_string(),
            reddit_client_secret: "test-secret".to_string(),
            reddit_user_agent: DEFAULT_USER_AGENT.to_string(),
            reddit_api_url: "http://127.0.0.1:9".to_string(),
            reddit_auth_url: "http://127.0.0.1:9/api/v1/access_token".to_string(),
            database_path: PathBuf::from("./data/test.sqlite"),
            sources: vec!["SEO".to_string(), "bigseo".to_string()],
            post_limit: 50,
            ingest_concurrency: 2,
            refresh_interval: None,
            comment_limit: 3,
            search_candidate_limit: None,
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reddit_client_id.is_empty() {
            return Err(invalid("REDDIT_CLIENT_ID", "cannot be empty"));
        }
        if self.reddit_client_secret.is_empty() {
            return Err(invalid("REDDIT_CLIENT_SECRET", "cannot be empty"));
        }
        if self.sources.is_empty() {
            return Err(invalid("SOURCES", "must list at least one subreddit"));
        }
        if let Some(bad) = self.sources.iter().find(|s| !SUBREDDIT_NAME.is_match(s)) {
            return Err(invalid(
                "SOURCES",
                &format!("'{bad}' is not a valid subreddit name"),
            ));
        }
        if self.post_limit == 0 {
            return Err(invalid("POST_LIMIT", "must be at least 1"));
        }
        if self.ingest_concurrency == 0 {
            return Err(invalid("INGEST_CONCURRENCY", "must be at least 1"));
        }
        url::Url::parse(&self.reddit_api_url)
            .map_err(|e| invalid("REDDIT_API_URL", &e.to_string()))?;
        url::Url::parse(&self.reddit_auth_url)
            .map_err(|e| invalid("REDDIT_AUTH_URL", &e.to_string()))?;
        Ok(())
    }
}

fn invalid(name: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.to_string(),
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

/// Split a comma separated source list, dropping blanks and an `r/` prefix.
fn parse_sources(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .map(|s| s.strip_prefix("r/").unwrap_or(s))
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
