//! Aggregation bodies per facet shape.

use serde_json::{Map, Value, json};

use crate::{
    facet::{FacetDescriptor, FacetShape},
    filter::Filter,
    schema::{FacetKind, FacetOrder},
};

/// Name of the nested wrapper aggregation for nested-child facets.
pub const NESTED_AGG: &str = "inner";

/// Suffix of the distinct-value count sibling of each terms aggregation.
pub const COUNT_SUFFIX: &str = "_count";

/// Builds the aggregation of `facet`, scoped by `filter`.
pub fn facet_aggregation(facet: &FacetDescriptor, filter: &Filter) -> Value {
    let mut body = Map::new();
    body.insert("filter".to_string(), filter.to_json());

    let key = facet.facet_key();
    let aggs = match (facet.filter_type, &facet.shape) {
        (FacetKind::Exists, _) => None,
        (FacetKind::Type, _) => Some(terms_pair(&key, facet.size, None)),
        (FacetKind::List, FacetShape::Flat) => {
            Some(terms_pair(&key, facet.size, Some(facet.filter_order)))
        }
        (FacetKind::List, FacetShape::NestedChild { path, .. }) => {
            let mut inner = Map::new();
            inner.insert(
                NESTED_AGG.to_string(),
                json!({
                    "nested": { "path": path },
                    "aggs": terms_pair(&key, facet.size, Some(facet.filter_order)),
                }),
            );
            Some(inner)
        }
        (FacetKind::List, FacetShape::HierarchicalChild { missing_term, .. }) => {
            Some(hierarchical_pair(facet, &key, missing_term))
        }
    };

    if let Some(aggs) = aggs {
        body.insert("aggs".to_string(), Value::Object(aggs));
    }
    Value::Object(body)
}

/// `{<key>: terms, <key>_count: cardinality}`.
fn terms_pair(key: &str, size: usize, order: Option<FacetOrder>) -> Map<String, Value> {
    let mut pair = Map::new();
    pair.insert(key.to_string(), json!({ "terms": terms(key, size, order) }));
    pair.insert(format!("{key}{COUNT_SUFFIX}"), cardinality(key));
    pair
}

/// Parent terms on the top-level field with the child pair under each bucket.
fn hierarchical_pair(
    facet: &FacetDescriptor,
    child_key: &str,
    missing: &str,
) -> Map<String, Value> {
    let parent_key = format!("{}.value.keyword", facet.name);
    let order = Some(facet.filter_order);

    let mut parent_terms = terms(&parent_key, facet.size, order);
    parent_terms.insert("missing".to_string(), Value::from(missing));

    let mut pair = Map::new();
    pair.insert(
        parent_key.clone(),
        json!({
            "terms": parent_terms,
            "aggs": terms_pair(child_key, facet.size, order),
        }),
    );
    pair.insert(format!("{parent_key}{COUNT_SUFFIX}"), cardinality(&parent_key));
    pair
}

/// Terms aggregation settings.
fn terms(field: &str, size: usize, order: Option<FacetOrder>) -> Map<String, Value> {
    let mut terms = Map::new();
    terms.insert("field".to_string(), Value::from(field));
    terms.insert("size".to_string(), Value::from(size));
    match order {
        Some(FacetOrder::ByValue) => {
            terms.insert("order".to_string(), json!({ "_key": "asc" }));
        }
        Some(FacetOrder::ByCount) => {
            terms.insert("order".to_string(), json!({ "_count": "desc" }));
        }
        None => {}
    }
    terms
}

/// Distinct-value count aggregation.
fn cardinality(field: &str) -> Value {
    json!({ "cardinality": { "field": field } })
}
