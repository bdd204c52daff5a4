//! Maud-based page templates for the web UI.
//!
//! Each page module exports a render function that produces the complete HTML.

pub mod comments;
pub mod search;
pub mod sidebar;

pub use comments::render_comments_fragment;
pub use search::{render_search_page, SearchPageParams};
pub use sidebar::Sidebar;
