//! Free-text query sanitizing and augmentation.
//!
//! [`Sanitizer::sanitize`] is total: any input produces a string the search engine accepts.
//! Queries the grammar rejects are returned with every reserved character escaped.

mod normalize;
mod rewrite;

use std::collections::BTreeMap;

use kgs_config::QueryTweakingConfig;
use kgs_query::{Expr, QueryError};
use tracing::{debug, trace};

pub use self::{
    normalize::{
        RESERVED_CHARS, capitalize_operators, escape_reserved, escape_unescaped, normalize,
    },
    rewrite::Augment,
};
use self::rewrite::{quoted_words, rewrite_terms};
use crate::terms::extract_terms;

/// Source of query ASTs.
pub trait QueryParser {
    /// Parses a normalized query. `Ok(None)` means the query is empty.
    fn parse(&self, query: &str) -> Result<Option<Expr>, QueryError>;
}

/// The boolean query grammar from `kgs-query`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuceneSyntax;

impl QueryParser for LuceneSyntax {
    fn parse(&self, query: &str) -> Result<Option<Expr>, QueryError> {
        kgs_query::parse(query)
    }
}

/// Normalizes free-text queries and injects wildcard/fuzzy alternatives.
#[derive(Debug, Clone)]
pub struct Sanitizer<P = LuceneSyntax> {
    /// Augmentation thresholds.
    config: QueryTweakingConfig,
    /// Grammar used to find the query's terms.
    parser: P,
}

impl Sanitizer {
    /// Creates a sanitizer using the built-in grammar.
    pub fn new(config: QueryTweakingConfig) -> Self {
        Self::with_parser(config, LuceneSyntax)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(QueryTweakingConfig::default())
    }
}

impl<P: QueryParser> Sanitizer<P> {
    /// Creates a sanitizer with a custom grammar.
    pub fn with_parser(config: QueryTweakingConfig, parser: P) -> Self {
        Self { config, parser }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &QueryTweakingConfig {
        &self.config
    }

    /// Sanitizes a raw query string.
    pub fn sanitize(&self, raw: &str) -> String {
        let normalized = capitalize_operators(&normalize(raw));

        match self.parser.parse(&normalized) {
            Ok(Some(expr)) => self.augment(normalized, &expr),
            Ok(None) => normalized,
            Err(error) => {
                debug!(
                    query = %normalized,
                    error = %error.message,
                    "query rejected by grammar, escaping"
                );
                escape_reserved(&normalized)
            }
        }
    }

    /// Applies escaping and augmentation to a query that parsed.
    fn augment(&self, mut query: String, expr: &Expr) -> String {
        let terms = extract_terms(expr);
        let total = terms.len();
        if total > self.config.max_terms_trigger {
            debug!(
                terms = total,
                trigger = self.config.max_terms_trigger,
                "too many terms, augmentation disabled"
            );
            return query;
        }

        let mut candidates = self.filter_terms(terms);

        // Terms with reserved characters are escaped in place and not augmented.
        candidates.retain(|term| {
            if !term.contains(RESERVED_CHARS) {
                return true;
            }
            let escaped = escape_unescaped(term);
            if escaped != *term {
                query = query.replace(term.as_str(), &escaped);
            }
            false
        });

        let quoted = quoted_words(&query);
        candidates.retain(|term| !quoted.contains(term));

        let mut plan = BTreeMap::new();
        for (idx, term) in candidates.iter().enumerate() {
            if plan.contains_key(term) {
                continue;
            }
            let len = term.chars().count();
            let wildcard = total == 1 || self.config.wildcard.applies(idx, len, total);
            let fuzzy = self.config.fuzzy.applies(idx, len, total);
            trace!(term = %term, idx, wildcard, fuzzy, "augmentation decision");
            if let Some(augment) = Augment::from_policies(wildcard, fuzzy) {
                plan.insert(term.clone(), augment);
            }
        }

        if plan.is_empty() {
            return query;
        }
        rewrite_terms(&query, &plan)
    }

    /// Drops excluded, dotted and too-short terms. A lone term is always kept.
    fn filter_terms(&self, terms: Vec<String>) -> Vec<String> {
        if terms.len() == 1 {
            return terms;
        }
        let min_chars = self
            .config
            .wildcard
            .min_chars
            .min(self.config.fuzzy.min_chars);
        terms
            .into_iter()
            .filter(|term| {
                !term.contains('.')
                    && !self.config.is_excluded(term)
                    && term.chars().count() >= min_chars
            })
            .collect()
    }
}
