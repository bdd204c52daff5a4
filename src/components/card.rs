//! Result cards and comment lists.

use maud::{html, Markup, Render};

use crate::db::Post;
use crate::reddit::{Comment, CommentsView};

/// Longest post body shown on a result card, in characters.
const BODY_PREVIEW_CHARS: usize = 1200;

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut truncated = text[..cut].trim_end().to_string();
            truncated.push_str("...");
            truncated
        }
    }
}

/// A search result with a placeholder that loads its comments lazily.
#[derive(Debug, Clone)]
pub struct PostCard<'a> {
    pub post: &'a Post,
}

impl<'a> PostCard<'a> {
    #[must_use]
    pub const fn new(post: &'a Post) -> Self {
        Self { post }
    }

    fn comments_url(&self) -> String {
        format!("/posts/{}/comments", urlencoding::encode(&self.post.id))
    }
}

impl Render for PostCard<'_> {
    fn render(&self) -> Markup {
        let post = self.post;
        let body = post.body.trim();

        html! {
            article class="post-card" id=(format!("post-{}", post.id)) {
                header {
                    div class="post-meta" {
                        span class="source-tag" { "r/" (post.source_name) }
                        span class="score" { "▲ " (post.score) }
                        @if let Some(date) = post.created_date() {
                            span { (date) }
                        }
                        span { "u/" (post.author_display()) }
                    }
                    h3 {
                        a href=(post.url) target="_blank" rel="noopener noreferrer" {
                            (post.title)
                        }
                    }
                }
                @if body.is_empty() {
                    p class="post-body empty" { "No body text." }
                } @else {
                    div class="post-body" { (truncate_text(body, BODY_PREVIEW_CHARS)) }
                }
                footer {
                    details open {
                        summary { "Top comments" }
                        div data-comments-url=(self.comments_url()) aria-busy="true" {
                            "Loading comments..."
                        }
                    }
                }
            }
        }
    }
}

/// Rendered outcome of a comment fetch.
#[derive(Debug, Clone)]
pub struct CommentList<'a> {
    pub view: &'a CommentsView,
}

impl<'a> CommentList<'a> {
    #[must_use]
    pub const fn new(view: &'a CommentsView) -> Self {
        Self { view }
    }
}

impl Render for CommentList<'_> {
    fn render(&self) -> Markup {
        html! {
            @match self.view {
                CommentsView::Loaded(comments) if comments.is_empty() => {
                    p { small { "No comments to show." } }
                }
                CommentsView::Loaded(comments) => {
                    @for comment in comments {
                        (CommentItem(comment))
                    }
                }
                CommentsView::Unavailable(_) => {
                    p { small { "Comments are unavailable right now." } }
                }
            }
        }
    }
}

struct CommentItem<'a>(&'a Comment);

impl Render for CommentItem<'_> {
    fn render(&self) -> Markup {
        let comment = self.0;
        html! {
            div class="comment" {
                div class="post-meta" {
                    strong { "u/" (comment.author_display()) }
                    span class="score" { "▲ " (comment.score) }
                }
                div class="comment-body" { (comment.body) }
            }
        }
    }
}

/// Empty state display when there are no results.
#[derive(Debug, Clone)]
pub struct EmptyState<'a> {
    pub message: &'a str,
}

impl<'a> EmptyState<'a> {
    #[must_use]
    pub const fn new(message: &'a str) -> Self {
        Self { message }
    }

    /// Create a "no results" empty state.
    #[must_use]
    pub const fn no_results() -> Self {
        Self {
            message: "No posts matched every keyword.",
        }
    }
}

impl Render for EmptyState<'_> {
    fn render(&self) -> Markup {
        html! {
            p { (self.message) }
        }
    }
}
