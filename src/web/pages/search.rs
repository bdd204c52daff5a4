//! Search page for the web UI.
//!
//! Serves both the landing page (no query) and the results page.

use maud::{html, Markup, Render};

use super::sidebar::Sidebar;
use crate::components::{Alert, BaseLayout, EmptyState, PostCard, SearchForm};
use crate::db::Post;

/// Parameters for rendering the search page.
#[derive(Debug)]
pub struct SearchPageParams<'a> {
    /// The search query string, if a search was performed.
    pub query: Option<&'a str>,
    /// Posts matching the search, highest score first.
    pub posts: &'a [Post],
    /// An error to show instead of results.
    pub error: Option<&'a str>,
    /// A one-off notice, e.g. the outcome of a maintenance action.
    pub notice: Option<&'a str>,
    pub sidebar: Sidebar<'a>,
}

/// Render the search page.
#[must_use]
pub fn render_search_page(params: &SearchPageParams<'_>) -> Markup {
    let title = params
        .query
        .map_or_else(|| "Search".to_string(), |q| format!("Search: {q}"));

    let content = html! {
        hgroup {
            h1 { "Search marketing subreddits" }
            p { "Every keyword must appear in the title, body or subreddit name." }
        }
        @if let Some(notice) = params.notice {
            (Alert::info(notice))
        }
        (SearchForm::new(params.query))

        @if let Some(error) = params.error {
            (Alert::error(error).with_title("Search failed"))
        } @else if let Some(query) = params.query {
            p {
                "Found " strong { (params.posts.len()) } " posts for "
                em { "\"" (query) "\"" }
            }
            @if params.posts.is_empty() {
                (EmptyState::no_results())
            } @else {
                @for post in params.posts {
                    (PostCard::new(post))
                }
            }
        }
    };

    BaseLayout::new(&title)
        .with_sidebar(params.sidebar.render())
        .render(content)
}
