//! Form components: the search box and maintenance action buttons.

use maud::{html, Markup, Render};

/// Generic form wrapper.
#[derive(Debug, Clone)]
pub struct Form<'a> {
    /// Form action URL
    pub action: &'a str,
    /// HTTP method ("get" or "post")
    pub method: &'a str,
    /// Form content (inputs, buttons, etc.)
    pub content: Markup,
    /// Optional CSS class
    pub class: Option<&'a str>,
}

impl<'a> Form<'a> {
    /// Create a new form with the given action and method.
    #[must_use]
    pub fn new(action: &'a str, method: &'a str, content: Markup) -> Self {
        Self {
            action,
            method,
            content,
            class: None,
        }
    }

    /// Create a POST form.
    #[must_use]
    pub fn post(action: &'a str, content: Markup) -> Self {
        Self::new(action, "post", content)
    }

    /// Create a GET form.
    #[must_use]
    pub fn get(action: &'a str, content: Markup) -> Self {
        Self::new(action, "get", content)
    }

    /// Set the CSS class.
    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }
}

impl Render for Form<'_> {
    fn render(&self) -> Markup {
        html! {
            form action=(self.action) method=(self.method) class=[self.class] {
                (self.content)
            }
        }
    }
}

/// Keyword search box, pre-filled with the current query.
#[derive(Debug, Clone, Default)]
pub struct SearchForm<'a> {
    pub query: Option<&'a str>,
}

impl<'a> SearchForm<'a> {
    #[must_use]
    pub const fn new(query: Option<&'a str>) -> Self {
        Self { query }
    }
}

impl Render for SearchForm<'_> {
    fn render(&self) -> Markup {
        let content = html! {
            fieldset role="group" {
                input
                    type="search"
                    name="q"
                    value=[self.query]
                    placeholder="Keywords, e.g. keyword density tips"
                    aria-label="Search keywords"
                    required;
                button type="submit" { "Search" }
            }
        };
        Form::get("/search", content).class("search-form").render()
    }
}

/// A single-button POST form for a maintenance action.
#[derive(Debug, Clone)]
pub struct ActionButton<'a> {
    pub action: &'a str,
    pub label: &'a str,
    pub confirm: Option<&'a str>,
    pub secondary: bool,
}

impl<'a> ActionButton<'a> {
    #[must_use]
    pub const fn new(action: &'a str, label: &'a str) -> Self {
        Self {
            action,
            label,
            confirm: None,
            secondary: false,
        }
    }

    /// Ask the browser for confirmation before submitting.
    #[must_use]
    pub const fn confirm(mut self, message: &'a str) -> Self {
        self.confirm = Some(message);
        self
    }

    #[must_use]
    pub const fn secondary(mut self) -> Self {
        self.secondary = true;
        self
    }
}

impl Render for ActionButton<'_> {
    fn render(&self) -> Markup {
        let onclick = self
            .confirm
            .map(|message| format!("return confirm('{}')", message.replace('\'', "\\'")));
        let content = html! {
            button
                type="submit"
                class=[self.secondary.then_some("secondary")]
                onclick=[onclick]
            {
                (self.label)
            }
        };
        Form::post(self.action, content).render()
    }
}
