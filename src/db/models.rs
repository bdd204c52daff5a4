use serde::{Deserialize, Serialize};

/// A subreddit submission as stored in the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub score: i64,
    pub url: String,
    pub created_utc: i64,
    pub body: String,
    pub source_name: String,
    pub search_text: String,
}

impl Post {
    /// Author handle for display; absent or deleted accounts show as anonymous.
    #[must_use]
    pub fn author_display(&self) -> &str {
        self.author.as_deref().unwrap_or("Anonymous")
    }

    /// Creation date formatted like `05 Mar 2024`, if the timestamp is valid.
    #[must_use]
    pub fn created_date(&self) -> Option<String> {
        chrono::DateTime::from_timestamp(self.created_utc, 0)
            .map(|dt| dt.format("%d %b %Y").to_string())
    }
}

/// A post row together with its physical rowid, as joined from the index.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IndexedPost {
    pub row_id: i64,
    #[sqlx(flatten)]
    pub post: Post,
}

/// Data for inserting or replacing a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub score: i64,
    pub url: String,
    pub created_utc: i64,
    pub body: String,
    pub source_name: String,
}

impl NewPost {
    /// Lowercased `title body source` surface that the index searches.
    #[must_use]
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.body, self.source_name).to_lowercase()
    }
}

/// Number of stored posts for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SourceCount {
    pub source_name: String,
    pub post_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post() -> NewPost {
        NewPost {
            id: "abc".to_string(),
            title: "Keyword Density Tips".to_string(),
            author: None,
            score: 3,
            url: "https://example.com".to_string(),
            created_utc: 1_700_000_000,
            body: "Is it STILL a thing?".to_string(),
            source_name: "SEO".to_string(),
        }
    }

    #[test]
    fn test_search_text_is_lowercase_concatenation() {
        assert_eq!(
            new_post().search_text(),
            "keyword density tips is it still a thing? seo"
        );
    }

    #[test]
    fn test_search_text_with_empty_body() {
        let post = NewPost {
            body: String::new(),
            ..new_post()
        };
        assert_eq!(post.search_text(), "keyword density tips  seo");
    }

    #[test]
    fn test_display_helpers() {
        let post = Post {
            id: "abc".to_string(),
            title: "t".to_string(),
            author: None,
            score: 0,
            url: String::new(),
            created_utc: 1_709_596_800,
            body: String::new(),
            source_name: "SEO".to_string(),
            search_text: String::new(),
        };
        assert_eq!(post.author_display(), "Anonymous");
        assert_eq!(post.created_date().as_deref(), Some("05 Mar 2024"));
    }
}
