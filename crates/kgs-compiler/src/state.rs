//! Search state supplied by the UI.

use serde::{Deserialize, Serialize};

use crate::{facet::FacetDescriptor, flatten::FlattenedSchema, sort::SortChoice};

/// Default page size.
pub const DEFAULT_HITS_PER_PAGE: usize = 20;

/// What the user is currently searching for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchState {
    /// Raw free-text query.
    pub query_string: String,
    /// Selected category, if any.
    pub selected_type: Option<String>,
    /// Facets with their current selections.
    pub facets: Vec<FacetDescriptor>,
    /// Chosen sort, if any.
    pub sort: Option<SortChoice>,
    /// Offset of the first hit.
    pub from: usize,
    /// Page size.
    pub hits_per_page: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query_string: String::new(),
            selected_type: None,
            facets: Vec::new(),
            sort: None,
            from: 0,
            hits_per_page: DEFAULT_HITS_PER_PAGE,
        }
    }
}

impl SearchState {
    /// A fresh state holding every facet of the schema with nothing selected.
    pub fn for_schema(schema: &FlattenedSchema, hits_per_page: usize) -> Self {
        Self {
            facets: schema.all_facets(),
            hits_per_page,
            ..Self::default()
        }
    }

    /// The selected category, treating an empty name as none.
    pub fn selected(&self) -> Option<&str> {
        self.selected_type.as_deref().filter(|s| !s.is_empty())
    }

    /// Looks up a facet for mutation.
    pub fn facet_mut(&mut self, id: &str) -> Option<&mut FacetDescriptor> {
        self.facets.iter_mut().find(|facet| facet.id == id)
    }

    /// Moves to a 1-based result page. Page 0 is treated as page 1.
    pub fn set_page(&mut self, page: usize) {
        self.from = page.saturating_sub(1).saturating_mul(self.hits_per_page);
    }

    /// Clears every facet selection.
    pub fn reset_facets(&mut self) {
        for facet in &mut self.facets {
            facet.reset();
        }
    }
}
