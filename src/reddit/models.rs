//! Reddit JSON wire types and their conversion into domain values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SourceError;
use crate::db::NewPost;

/// Access token returned by the OAuth endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_lifetime")]
    pub expires_in: u64,
}

const fn default_token_lifetime() -> u64 {
    3600
}

/// A Reddit listing envelope (`{"kind": "Listing", "data": {...}}`).
#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// One listing child. The payload stays untyped until it is converted so a
/// single odd entry does not fail the whole page.
#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct SubmissionData {
    id: String,
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    created_utc: f64,
    #[serde(default)]
    selftext: String,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    body: String,
}

/// A submission as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub score: i64,
    pub url: String,
    pub created_utc: i64,
    pub body: String,
}

impl RemotePost {
    /// Row to store for this post under the given source name.
    #[must_use]
    pub fn into_new_post(self, source_name: &str) -> NewPost {
        NewPost {
            id: self.id,
            title: self.title,
            author: self.author,
            score: self.score,
            url: self.url,
            created_utc: self.created_utc,
            body: self.body,
            source_name: source_name.to_string(),
        }
    }
}

/// A top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Option<String>,
    pub score: i64,
    pub body: String,
}

impl Comment {
    /// Author handle for display.
    #[must_use]
    pub fn author_display(&self) -> &str {
        self.author.as_deref().unwrap_or("Anonymous")
    }
}

impl TryFrom<Thing> for RemotePost {
    type Error = SourceError;

    fn try_from(thing: Thing) -> Result<Self, Self::Error> {
        if thing.kind != "t3" {
            return Err(SourceError::Malformed(format!(
                "expected a t3 submission, got {}",
                thing.kind
            )));
        }

        let id_hint = thing
            .data
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();
        let data: SubmissionData = serde_json::from_value(thing.data)
            .map_err(|e| SourceError::Malformed(format!("submission {id_hint}: {e}")))?;

        let url = data
            .url
            .filter(|u| !u.is_empty())
            .or_else(|| data.permalink.map(|p| format!("https://www.reddit.com{p}")))
            .unwrap_or_default();

        Ok(Self {
            id: data.id,
            title: data.title,
            author: normalize_author(data.author),
            score: data.score,
            url,
            created_utc: data.created_utc as i64,
            body: data.selftext,
        })
    }
}

/// Convert the comment listing of a `/comments/{id}` response, skipping
/// "load more" stubs and entries that are not comments.
pub(crate) fn comments_from_listing(listing: Listing) -> Vec<Comment> {
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t1")
        .filter_map(|thing| serde_json::from_value::<CommentData>(thing.data).ok())
        .map(|c| Comment {
            author: normalize_author(c.author),
            score: c.score,
            body: c.body,
        })
        .collect()
}

/// Deleted accounts are reported as the literal handle `[deleted]`.
fn normalize_author(author: Option<String>) -> Option<String> {
    author.filter(|a| !a.is_empty() && a != "[deleted]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thing(kind: &str, data: Value) -> Thing {
        Thing {
            kind: kind.to_string(),
            data,
        }
    }

    #[test]
    fn test_submission_conversion() {
        let post = RemotePost::try_from(thing(
            "t3",
            serde_json::json!({
                "id": "1abc",
                "title": "Keyword density tips",
                "author": "seo_fan",
                "score": 42,
                "url": "https://example.com/article",
                "permalink": "/r/SEO/comments/1abc/keyword_density_tips/",
                "created_utc": 1_700_000_000.0,
                "selftext": "Body text",
                "subreddit": "SEO"
            }),
        ))
        .unwrap();

        assert_eq!(post.id, "1abc");
        assert_eq!(post.author.as_deref(), Some("seo_fan"));
        assert_eq!(post.score, 42);
        assert_eq!(post.url, "https://example.com/article");
        assert_eq!(post.created_utc, 1_700_000_000);
        assert_eq!(post.body, "Body text");
    }

    #[test]
    fn test_submission_falls_back_to_permalink_and_anonymous() {
        let post = RemotePost::try_from(thing(
            "t3",
            serde_json::json!({
                "id": "1abd",
                "title": "Self post",
                "author": "[deleted]",
                "score": -3,
                "url": "",
                "permalink": "/r/SEO/comments/1abd/self_post/",
                "created_utc": 1_700_000_123.9
            }),
        ))
        .unwrap();

        assert_eq!(post.author, None);
        assert_eq!(post.score, -3);
        assert_eq!(post.url, "https://www.reddit.com/r/SEO/comments/1abd/self_post/");
        assert_eq!(post.created_utc, 1_700_000_123);
        assert_eq!(post.body, "");
    }

    #[test]
    fn test_malformed_submission() {
        let err = RemotePost::try_from(thing("t3", serde_json::json!({"id": "x1"}))).unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("x1"));

        let err = RemotePost::try_from(thing("t1", serde_json::json!({}))).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn test_comments_skip_more_stubs() {
        let listing: Listing = serde_json::from_value(serde_json::json!({
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    {"kind": "t1", "data": {"author": "a", "score": 5, "body": "first"}},
                    {"kind": "more", "data": {"count": 12, "children": ["x", "y"]}},
                    {"kind": "t1", "data": {"author": "[deleted]", "score": 1, "body": "[deleted]"}}
                ]
            }
        }))
        .unwrap();

        let comments = comments_from_listing(listing);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].body, "first");
        assert_eq!(comments[1].author, None);
        assert_eq!(comments[1].author_display(), "Anonymous");
    }

    #[test]
    fn test_into_new_post_sets_source() {
        let post = RemotePost {
            id: "a1".to_string(),
            title: "Title".to_string(),
            author: None,
            score: 1,
            url: "https://example.com".to_string(),
            created_utc: 0,
            body: String::new(),
        };
        let new_post = post.into_new_post("SEO");
        assert_eq!(new_post.source_name, "SEO");
        assert_eq!(new_post.search_text(), "title  seo");
    }
}
