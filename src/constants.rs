//! Shared constants used across the application.

/// Default user agent sent to the Reddit API when `REDDIT_USER_AGENT` is unset.
///
/// Reddit asks API clients to identify themselves with a descriptive agent;
/// generic library agents are aggressively rate limited.
pub const DEFAULT_USER_AGENT: &str = "subreddit-search/0.1";

/// Comment bodies Reddit substitutes for moderated or self-deleted comments.
pub const REMOVED_COMMENT_BODIES: &[&str] = &["[removed]", "[deleted]"];

/// Largest page Reddit returns for a single listing request.
pub const MAX_LISTING_PAGE: usize = 100;

/// Subreddits monitored when `SOURCES` is not configured.
pub const DEFAULT_SOURCES: &[&str] = &[
    "SEO",
    "bigseo",
    "SEOnews",
    "juststart",
    "TechSEO",
    "DigitalMarketing",
    "ContentMarketing",
    "Blogging",
    "Affiliatemarketing",
    "SocialMediaMarketing",
    "GoogleAnalytics",
    "PPC",
    "Wordpress",
    "WebDev",
];
