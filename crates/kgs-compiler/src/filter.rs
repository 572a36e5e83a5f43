//! Facet filters and their composition.
//!
//! Every active facet contributes an *own filter*. The post-filter merges all of them; the
//! aggregation of facet `K` merges all of them except `K`'s own, so `K`'s bucket counts ignore
//! `K`'s current selection.

use std::slice;

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::{
    facet::{FacetDescriptor, FacetShape},
    schema::FacetKind,
};

/// A filter clause in the engine's query DSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches every document.
    MatchAll,
    /// Exact keyword match.
    Term {
        /// Index field.
        field: String,
        /// Keyword.
        value: String,
    },
    /// Field presence.
    Exists {
        /// Index field.
        field: String,
    },
    /// Query against nested child documents.
    Nested {
        /// Nested document path.
        path: String,
        /// Query applied to each child document.
        query: Box<Self>,
    },
    /// At least one clause matches.
    Should(Vec<Self>),
    /// Every clause matches.
    Must(Vec<Self>),
}

impl Filter {
    /// Term filter helper.
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Combines clauses: several become a `must`, one is used as is, none matches all.
    pub fn merge(mut clauses: Vec<Self>) -> Self {
        match clauses.len() {
            0 => Self::MatchAll,
            1 => clauses.swap_remove(0),
            _ => Self::Must(clauses),
        }
    }

    /// Renders the clause as engine JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::MatchAll => json!({ "match_all": {} }),
            Self::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Self::Exists { field } => json!({ "exists": { "field": field } }),
            Self::Nested { path, query } => json!({
                "nested": {
                    "path": path,
                    "query": query.to_json(),
                }
            }),
            Self::Should(clauses) => json!({
                "bool": { "should": clauses.iter().map(Self::to_json).collect::<Vec<_>>() }
            }),
            Self::Must(clauses) => json!({
                "bool": { "must": clauses.iter().map(Self::to_json).collect::<Vec<_>>() }
            }),
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// What a facet contributes to a merged filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnFilter {
    /// A single clause.
    One(Filter),
    /// One clause per selected value, spread into the enclosing `must`.
    Each(Vec<Filter>),
}

impl OwnFilter {
    /// Builds the facet's own filter, or `None` when it has nothing selected.
    ///
    /// Exists facets always produce a filter; whether it applies is decided by
    /// [`FilterSet`].
    pub fn for_facet(facet: &FacetDescriptor) -> Option<Self> {
        let keywords = facet.value.as_ref().map_or(&[][..], |v| v.keywords());
        match facet.filter_type {
            FacetKind::Exists => Some(Self::One(Filter::Exists {
                field: facet.facet_key(),
            })),
            FacetKind::Type => keywords
                .first()
                .map(|value| Self::One(Filter::term(facet.facet_key(), value.as_str()))),
            FacetKind::List => {
                let mut clauses: Vec<Filter> = keywords
                    .iter()
                    .map(|value| keyword_filter(facet, value))
                    .collect();
                match clauses.len() {
                    0 => None,
                    1 => Some(Self::One(clauses.swap_remove(0))),
                    _ if facet.exclusive_selection => Some(Self::Each(clauses)),
                    _ => Some(Self::One(Filter::Should(clauses))),
                }
            }
        }
    }

    /// The clauses this filter adds to a merge.
    pub fn clauses(&self) -> &[Filter] {
        match self {
            Self::One(filter) => slice::from_ref(filter),
            Self::Each(filters) => filters,
        }
    }
}

/// Match on one selected keyword, wrapped for nested children.
fn keyword_filter(facet: &FacetDescriptor, value: &str) -> Filter {
    let term = Filter::term(facet.facet_key(), value);
    match &facet.shape {
        FacetShape::NestedChild { path, .. } => Filter::Nested {
            path: path.clone(),
            query: Box::new(term),
        },
        FacetShape::Flat | FacetShape::HierarchicalChild { .. } => term,
    }
}

/// One facet's contribution.
#[derive(Debug, Clone)]
struct FilterEntry {
    /// Facet id.
    id: String,
    /// Facet kind.
    kind: FacetKind,
    /// Whether the facet currently restricts results.
    active: bool,
    /// The facet's own filter.
    filter: OwnFilter,
}

/// Own filters of every facet in a search state.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    /// Entries in facet order.
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    /// Collects the own filters of `facets`.
    pub fn new<'a>(facets: impl IntoIterator<Item = &'a FacetDescriptor>) -> Self {
        let entries = facets
            .into_iter()
            .filter_map(|facet| {
                OwnFilter::for_facet(facet).map(|filter| FilterEntry {
                    id: facet.id.clone(),
                    kind: facet.filter_type,
                    active: facet.is_active(),
                    filter,
                })
            })
            .collect();
        Self { entries }
    }

    /// The filter restricting returned hits: every active facet.
    pub fn post_filter(&self) -> Filter {
        self.merged(None)
    }

    /// The aggregation filter of facet `id`: every other active facet.
    ///
    /// An exists facet keeps its own filter in its own aggregation, active or not.
    pub fn excluding(&self, id: &str) -> Filter {
        self.merged(Some(id))
    }

    /// Merges the entries selected for `key`.
    fn merged(&self, key: Option<&str>) -> Filter {
        let clauses = self
            .entries
            .iter()
            .filter(|entry| {
                let is_key = key == Some(entry.id.as_str());
                (entry.kind == FacetKind::Exists && is_key) || (entry.active && !is_key)
            })
            .flat_map(|entry| entry.filter.clauses().iter().cloned())
            .collect();
        Filter::merge(clauses)
    }
}
