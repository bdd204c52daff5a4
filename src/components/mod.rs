//! Maud HTML template components for the web UI.
//!
//! - `layout`: Base page layout, navigation and the lazy comment loader
//! - `alert`: Notices and error messages
//! - `card`: Post result cards, comment lists and empty states
//! - `form`: Search box and maintenance buttons
//!
//! # Example
//!
//! ```ignore
//! use maud::{html, Markup};
//! use crate::components::{Alert, BaseLayout, SearchForm};
//!
//! fn my_page() -> Markup {
//!     let content = html! {
//!         (Alert::info("Index rebuilt."))
//!         (SearchForm::new(None))
//!     };
//!     BaseLayout::new("Search").render(content)
//! }
//! ```

pub mod alert;
pub mod card;
pub mod form;
pub mod layout;

pub use alert::{Alert, AlertVariant};
pub use card::{truncate_text, CommentList, EmptyState, PostCard};
pub use form::{ActionButton, Form, SearchForm};
pub use layout::BaseLayout;

/// Re-export maud for convenience
pub use maud::{html, Markup, PreEscaped, DOCTYPE};
