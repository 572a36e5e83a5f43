//! Search query compiler.
//!
//! Turns a per-category field schema and the UI's [`SearchState`] into a [`QueryPayload`] for
//! the search engine:
//!
//! - [`Sanitizer`] repairs free-text queries and adds wildcard/fuzzy alternatives to plain terms
//! - [`flatten`] derives query fields, highlight fields and [`FacetDescriptor`]s from a [`Schema`]
//! - [`QueryCompiler`] assembles the query, post-filter, aggregations, sort and highlight blocks
//!
//! Every facet's aggregation is filtered by every *other* active facet, so bucket counts show
//! what selecting a value would yield given the rest of the selection.
//!
//! # Example
//!
//! ```
//! use kgs_compiler::{QueryCompiler, Sanitizer, Schema, SearchState, flatten};
//! use kgs_config::Config;
//! use serde_json::json;
//!
//! let config = Config::default();
//! let schema = Schema::from_value(&json!({
//!     "Dataset": {"fields": {"title": {"boost": 5}, "species": {"facet": "list"}}}
//! }));
//! let flat = flatten(&schema, &config.facets, &config.search.highlight_fields);
//! let compiler = QueryCompiler::new(flat, Sanitizer::new(config.tweaking), config.facets);
//!
//! let mut state = SearchState::for_schema(compiler.schema(), config.search.hits_per_page);
//! state.query_string = "brain".into();
//! let payload = compiler.compile(&state).to_json();
//! assert_eq!(payload["query"]["query_string"]["query"], "(brain* OR brain* OR brain~)");
//! ```

#![warn(missing_docs)]

mod aggs;
mod error;
mod facet;
mod filter;
mod flatten;
mod payload;
mod sanitize;
mod schema;
mod sort;
mod state;
mod terms;

pub use aggs::{COUNT_SUFFIX, NESTED_AGG, facet_aggregation};
pub use error::SchemaError;
pub use facet::{
    FacetDescriptor, FacetShape, FacetValue, Keyword, TYPE_FACET_FIELD, TYPE_FACET_ID,
};
pub use filter::{Filter, FilterSet, OwnFilter};
pub use flatten::{FlattenedSchema, QueryField, QueryFields, flatten};
pub use payload::{QueryCompiler, QueryPayload};
pub use sanitize::{
    Augment, LuceneSyntax, QueryParser, RESERVED_CHARS, Sanitizer, capitalize_operators,
    escape_reserved, escape_unescaped, normalize,
};
pub use schema::{FacetKind, FacetOrder, FieldMapping, Schema, TypeMapping};
pub use sort::{RELEVANCE_KEY, SortChoice, SortClause, SortOrder, SortSpec, sort_options};
pub use state::{DEFAULT_HITS_PER_PAGE, SearchState};
pub use terms::extract_terms;
