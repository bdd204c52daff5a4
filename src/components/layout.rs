//! Base layout components for the web UI.
//!
//! This module provides the main page layout structure including
//! the HTML skeleton, navigation, and footer.

use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Styles for result cards and comments, layered on top of Pico.
const PAGE_STYLE: &str = r"
.page-grid { display: grid; grid-template-columns: minmax(0, 3fr) minmax(0, 1fr); gap: 2rem; }
@media (max-width: 900px) { .page-grid { grid-template-columns: 1fr; } }
.post-card { margin: 1.5rem 0; transition: transform 0.2s; }
.post-card:hover { transform: translateY(-3px); box-shadow: 0 4px 12px rgba(0,0,0,0.15); }
.post-meta { display: flex; align-items: center; gap: 0.75rem; flex-wrap: wrap; font-size: 0.9rem; opacity: 0.9; }
.post-meta .score { color: #FF4500; }
.source-tag { background: #FF4500; color: white; padding: 2px 12px; border-radius: 20px; font-size: 0.85rem; font-weight: 500; }
.post-body { white-space: pre-wrap; overflow-wrap: anywhere; }
.post-body.empty { opacity: 0.7; font-style: italic; }
.comment { margin: 1rem 0; padding: 0.75rem 1rem; border-radius: 8px; border-left: 4px solid #FF4500; background: var(--pico-card-sectioning-background-color); }
.comment-body { white-space: pre-wrap; overflow-wrap: anywhere; }
.api-status.connected { color: #2e7d32; }
.api-status.disconnected { color: #c62828; }
";

/// Fetches each result's comments once its card scrolls into view.
///
/// Containers carry `data-comments-url`; the fragment replaces their content.
const LAZY_COMMENTS_SCRIPT: &str = r"(function() {
    function load(el) {
        if (el.dataset.loaded) { return; }
        el.dataset.loaded = '1';
        fetch(el.dataset.commentsUrl, { cache: 'no-store' })
            .then(function (r) { return r.text(); })
            .then(function (html) { el.innerHTML = html; })
            .catch(function () { el.innerHTML = '<p><small>Comments unavailable.</small></p>'; });
    }
    var targets = document.querySelectorAll('[data-comments-url]');
    if (!('IntersectionObserver' in window)) { targets.forEach(load); return; }
    var observer = new IntersectionObserver(function (entries) {
        entries.forEach(function (entry) {
            if (entry.isIntersecting) { observer.unobserve(entry.target); load(entry.target); }
        });
    }, { rootMargin: '200px' });
    targets.forEach(function (el) { observer.observe(el); });
})();";

/// Base page layout builder.
///
/// # Example
///
/// ```ignore
/// use maud::html;
/// use crate::components::layout::BaseLayout;
///
/// let content = html! { h1 { "Hello World" } };
/// let page = BaseLayout::new("Search").render(content);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    sidebar: Option<Markup>,
}

impl<'a> BaseLayout<'a> {
    /// Create a new base layout with the given page title.
    #[must_use]
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            sidebar: None,
        }
    }

    /// Show `sidebar` next to the main content.
    #[must_use]
    pub fn with_sidebar(mut self, sidebar: Markup) -> Self {
        self.sidebar = Some(sidebar);
        self
    }

    /// Render the complete HTML page with the given content.
    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="color-scheme" content="light dark";
                    title { (self.title) " - Subreddit Search" }
                    link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";
                    style { (PreEscaped(PAGE_STYLE)) }
                }
                body {
                    (Self::render_header())
                    main class="container" {
                        @if let Some(sidebar) = &self.sidebar {
                            div class="page-grid" {
                                div { (content) }
                                aside { (sidebar) }
                            }
                        } @else {
                            (content)
                        }
                    }
                    (Self::render_footer())
                    script { (PreEscaped(LAZY_COMMENTS_SCRIPT)) }
                }
            }
        }
    }

    /// Render the page header with navigation.
    fn render_header() -> Markup {
        html! {
            header class="container" {
                nav {
                    ul {
                        li {
                            a href="/" {
                                strong { "Subreddit Search" }
                            }
                        }
                    }
                    ul {
                        li { a href="/" { "Search" } }
                        li { a href="/api/status" { "Status" } }
                    }
                }
            }
        }
    }

    /// Render the page footer.
    fn render_footer() -> Markup {
        html! {
            footer class="container" {
                small { "Posts and comments courtesy of the Reddit API." }
            }
        }
    }
}
