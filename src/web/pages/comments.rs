//! Comment fragment loaded into result cards after the page renders.

use maud::{Markup, Render};

use crate::components::CommentList;
use crate::reddit::CommentsView;

/// Render the comments of one post as a bare HTML fragment.
#[must_use]
pub fn render_comments_fragment(view: &CommentsView) -> Markup {
    CommentList::new(view).render()
}
