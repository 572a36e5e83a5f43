//! Search request assembly.

use std::iter;

use kgs_config::FacetSettings;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
    aggs::facet_aggregation,
    facet::FacetDescriptor,
    filter::{Filter, FilterSet},
    flatten::FlattenedSchema,
    sanitize::{LuceneSyntax, QueryParser, Sanitizer},
    schema::FacetKind,
    sort::SortClause,
    state::SearchState,
};

/// Request body for the search engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPayload {
    /// Free-text query, absent when the query string is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Restricts the returned hits.
    pub post_filter: Filter,
    /// Facet aggregations keyed by facet id.
    pub aggs: Map<String, Value>,
    /// Sort clauses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortClause>>,
    /// Highlight settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
    /// Offset of the first hit.
    pub from: usize,
    /// Page size.
    pub size: usize,
}

impl QueryPayload {
    /// The request body as JSON.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Turns search states into payloads against one schema.
///
/// Holds no per-request state; one compiler can serve any number of searches.
#[derive(Debug, Clone)]
pub struct QueryCompiler<P = LuceneSyntax> {
    /// Flattened field schema.
    schema: FlattenedSchema,
    /// Free-text query sanitizer.
    sanitizer: Sanitizer<P>,
    /// Bucket sizing for the category facet.
    facets: FacetSettings,
}

impl<P: QueryParser> QueryCompiler<P> {
    /// Creates a compiler.
    pub fn new(schema: FlattenedSchema, sanitizer: Sanitizer<P>, facets: FacetSettings) -> Self {
        Self {
            schema,
            sanitizer,
            facets,
        }
    }

    /// The flattened schema in use.
    pub fn schema(&self) -> &FlattenedSchema {
        &self.schema
    }

    /// Builds the request body for `state`.
    pub fn compile(&self, state: &SearchState) -> QueryPayload {
        let selected = state.selected();
        let type_facet = FacetDescriptor::type_facet(selected, self.facets.type_size);
        let facets: Vec<&FacetDescriptor> = state
            .facets
            .iter()
            .filter(|facet| facet.filter_type != FacetKind::Type)
            .chain(iter::once(&type_facet))
            .collect();

        let filters = FilterSet::new(facets.iter().copied());

        QueryPayload {
            query: self.query_clause(&state.query_string, selected),
            post_filter: filters.post_filter(),
            aggs: self.aggregations(&facets, &filters, selected),
            sort: state.sort.as_ref().map(|choice| choice.fields.clone()),
            highlight: self.highlight(selected),
            from: state.from,
            size: state.hits_per_page,
        }
    }

    /// The `query_string` clause, or `None` for an empty query.
    fn query_clause(&self, raw: &str, selected: Option<&str>) -> Option<Value> {
        let query = self.sanitizer.sanitize(raw);
        if query.is_empty() {
            return None;
        }

        let mut clause = json!({
            "query": query,
            "lenient": true,
            "analyze_wildcard": true,
        });
        let fields = self.schema.boosted_query_fields(selected);
        if !fields.is_empty() {
            clause["fields"] = json!(fields);
        }
        Some(json!({ "query_string": clause }))
    }

    /// One aggregation per facet of the selected category, plus the category facet.
    fn aggregations(
        &self,
        facets: &[&FacetDescriptor],
        filters: &FilterSet,
        selected: Option<&str>,
    ) -> Map<String, Value> {
        let mut aggs = Map::new();
        for facet in facets {
            let is_type = facet.filter_type == FacetKind::Type;
            if !is_type && selected != Some(facet.category.as_str()) {
                continue;
            }
            if !is_type && self.schema.facet(&facet.id).is_none() {
                debug!(facet = %facet.id, "facet not in schema, skipping aggregation");
                continue;
            }
            let filter = filters.excluding(&facet.id);
            aggs.insert(facet.id.clone(), facet_aggregation(facet, &filter));
        }
        aggs
    }

    /// Highlight block for the selected category.
    fn highlight(&self, selected: Option<&str>) -> Option<Value> {
        let fields: Map<String, Value> = self
            .schema
            .highlight_fields(selected)?
            .into_iter()
            .map(|field| (field, json!({})))
            .collect();
        Some(json!({ "fields": fields, "encoder": "html" }))
    }
}
