//! Building safe FTS5 match expressions from free-text search input.
//!
//! Every token is emitted as an FTS5 string literal, so characters such as
//! `-`, `*`, `:`, `(` or the words `OR`/`NOT`/`NEAR` are matched literally
//! instead of being interpreted as query operators.

use std::fmt;

/// A conjunctive FTS5 match expression: every token must appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchExpression {
    tokens: Vec<String>,
    expression: String,
}

impl MatchExpression {
    /// Normalize `query` and build the expression.
    ///
    /// Lowercases the input and splits on whitespace. Returns `None` when no
    /// tokens remain, which callers treat as an empty result.
    ///
    /// # Examples
    ///
    /// ```
    /// use subreddit_search::db::MatchExpression;
    ///
    /// let expr = MatchExpression::parse("Keyword  density").unwrap();
    /// assert_eq!(expr.as_str(), r#""keyword" AND "density""#);
    /// assert!(MatchExpression::parse("   ").is_none());
    /// ```
    #[must_use]
    pub fn parse(query: &str) -> Option<Self> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return None;
        }

        let expression = tokens
            .iter()
            .map(|t| quote_term(t))
            .collect::<Vec<_>>()
            .join(" AND ");

        Some(Self { tokens, expression })
    }

    /// The normalized tokens, in input order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The expression text to bind to `MATCH ?`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for MatchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Lowercase `query` and split it into non-empty whitespace separated tokens.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

/// Wrap a term as an FTS5 string literal, doubling embedded quotes.
fn quote_term(term: &str) -> String {
    format!("\"{}\"", term.replace('"', "\"\""))
}
