//! Syntax errors.

use std::fmt;

use thiserror::Error;

/// Where in a query a problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// Byte offset into the query text. Lexer errors carry this.
    Byte(usize),
    /// Index into the token stream. Parser errors carry this.
    Token(usize),
    /// The query ended before the expression was complete.
    End,
}

/// A syntax error in a query string.
///
/// Renders the query with a caret under the offending byte when the lexer found it, followed
/// by a hint for the usual mistakes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct QueryError {
    /// What went wrong.
    pub message: String,
    /// Where it went wrong.
    pub span: Span,
    /// The query text, once known.
    pub query: Option<String>,
}

impl QueryError {
    /// Creates an error without query text attached.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            query: None,
        }
    }

    /// Attaches the query text the error refers to.
    #[must_use]
    pub fn in_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    /// A short fix-it for common mistakes.
    pub fn hint(&self) -> Option<&'static str> {
        let message = self.message.as_str();
        if message.contains("unclosed quote") {
            Some("close the phrase with a matching \"")
        } else if message.contains("closing parenthesis") {
            Some("every ( needs a matching )")
        } else if message.contains("operator") {
            Some("AND, OR and NOT need an expression on both sides, e.g. 'brain AND cortex'")
        } else if message.contains("range") {
            Some("ranges are written as [min TO max] or {min TO max}")
        } else {
            None
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query syntax error: {}", self.message)?;
        if let Span::Token(index) = self.span {
            write!(f, " (token {index})")?;
        }

        if let Some(query) = &self.query {
            write!(f, "\n  {query}")?;
            if let Span::Byte(offset) = self.span {
                let pad = query.get(..offset).map_or(query.len(), |head| head.chars().count());
                write!(f, "\n  {:pad$}^", "")?;
            }
        }

        match self.hint() {
            Some(hint) => write!(f, "\nhint: {hint}"),
            None => Ok(()),
        }
    }
}
