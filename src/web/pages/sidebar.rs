//! Sidebar with source list, API status and maintenance actions.

use maud::{html, Markup, Render};

use crate::components::ActionButton;
use crate::db::SourceCount;

/// Data shown in the sidebar of every full page.
#[derive(Debug, Clone)]
pub struct Sidebar<'a> {
    /// Configured sources, in configuration order.
    pub sources: &'a [String],
    /// Stored post counts per source; sources without posts are absent.
    pub counts: &'a [SourceCount],
    /// Whether the last connectivity check against the API succeeded.
    pub api_connected: bool,
}

impl Sidebar<'_> {
    fn count_for(&self, source: &str) -> i64 {
        self.counts
            .iter()
            .find(|c| c.source_name == source)
            .map_or(0, |c| c.post_count)
    }

    fn total(&self) -> i64 {
        self.counts.iter().map(|c| c.post_count).sum()
    }
}

impl Render for Sidebar<'_> {
    fn render(&self) -> Markup {
        let (status_class, status_text) = if self.api_connected {
            ("api-status connected", "Reddit API connected")
        } else {
            ("api-status disconnected", "Reddit API unreachable")
        };

        html! {
            section {
                h4 { "Sources" }
                ul {
                    @for source in self.sources {
                        li {
                            a href=(format!("https://www.reddit.com/r/{source}/new")) target="_blank" rel="noopener noreferrer" {
                                "r/" (source)
                            }
                            " "
                            small { "(" (self.count_for(source)) ")" }
                        }
                    }
                }
                p { small { (self.total()) " posts indexed" } }
            }
            section {
                h4 { "Status" }
                p class=(status_class) { (status_text) }
            }
            section {
                h4 { "Maintenance" }
                (ActionButton::new("/admin/rebuild-index", "Rebuild search index").secondary())
                (ActionButton::new("/admin/refresh", "Full refresh")
                    .confirm("Delete all stored posts and fetch them again?"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidebar_counts_and_status() {
        let sources = vec!["SEO".to_string(), "bigseo".to_string()];
        let counts = vec![SourceCount {
            source_name: "SEO".to_string(),
            post_count: 12,
        }];
        let html = Sidebar {
            sources: &sources,
            counts: &counts,
            api_connected: false,
        }
        .render()
        .into_string();

        assert!(html.contains("r/SEO"));
        assert!(html.contains("<small>(12)</small>"));
        assert!(html.contains("<small>(0)</small>"));
        assert!(html.contains("12 posts indexed"));
        assert!(html.contains("Reddit API unreachable"));
        assert!(html.contains("/admin/rebuild-index"));
        assert!(html.contains("/admin/refresh"));
    }
}
