//! Field-schema flattening.
//!
//! Turns the nested per-category schema into the flat lists the payload needs: boosted query
//! fields, highlight fields, and facet descriptors.

use std::collections::{BTreeMap, BTreeSet};

use kgs_config::FacetSettings;
use serde::Serialize;

use crate::{
    facet::{FacetDescriptor, FacetShape},
    schema::{FieldMapping, Schema},
};

/// A searchable field of one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryField {
    /// Query-time boost.
    pub boost: f64,
    /// Eligible for highlighting.
    pub highlight: bool,
}

/// Query fields keyed by `"<path>.value"`.
pub type QueryFields = BTreeMap<String, QueryField>;

/// Flat view of a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedSchema {
    /// Searchable fields per category.
    pub query_fields_by_type: BTreeMap<String, QueryFields>,
    /// Facet descriptors per category.
    pub facets_by_type: BTreeMap<String, Vec<FacetDescriptor>>,
}

/// Flattens the schema.
///
/// `highlight_allow` names the leaf paths eligible for highlighting.
pub fn flatten(
    schema: &Schema,
    facets: &FacetSettings,
    highlight_allow: &[String],
) -> FlattenedSchema {
    let allow: BTreeSet<&str> = highlight_allow.iter().map(String::as_str).collect();
    let mut flattened = FlattenedSchema::default();

    for (category, mapping) in schema.categories() {
        let mut query_fields = QueryFields::new();
        let mut descriptors = Vec::new();

        for (name, field) in &mapping.fields {
            collect_query_fields(&mut query_fields, name, field, &allow);
            collect_facets(&mut descriptors, category, name, field, facets);
        }

        flattened
            .query_fields_by_type
            .insert(category.to_string(), query_fields);
        flattened
            .facets_by_type
            .insert(category.to_string(), descriptors);
    }

    flattened
}

/// Adds a field and its searchable children.
fn collect_query_fields(
    out: &mut QueryFields,
    path: &str,
    field: &FieldMapping,
    allow: &BTreeSet<&str>,
) {
    if field.ignore_for_search {
        return;
    }

    let entry = out.entry(format!("{path}.value")).or_insert(QueryField {
        boost: 1.0,
        highlight: allow.contains(path),
    });
    if field.boost > entry.boost {
        entry.boost = field.boost;
    }

    for (child_name, child) in &field.children {
        collect_query_fields(out, &format!("{path}.children.{child_name}"), child, allow);
    }
}

/// Derives the facet descriptors of one field.
fn collect_facets(
    out: &mut Vec<FacetDescriptor>,
    category: &str,
    name: &str,
    field: &FieldMapping,
    settings: &FacetSettings,
) {
    if let Some(kind) = field.facet {
        let size = if field.is_filterable_facet {
            settings.all_size
        } else {
            settings.default_size
        };
        out.push(FacetDescriptor {
            id: format!("facet_{category}_{name}"),
            name: name.to_string(),
            category: category.to_string(),
            filter_type: kind,
            shape: FacetShape::Flat,
            filter_order: field.facet_order,
            exclusive_selection: field.facet_exclusive_selection,
            is_filterable: field.is_filterable_facet,
            size,
            default_size: size,
            label: field.label.clone(),
            field_type: field.field_type.clone(),
            value: None,
            keywords: Vec::new(),
        });
    }

    for (child_name, child) in &field.children {
        let Some(kind) = child.facet else {
            continue;
        };

        let (shape, label, size) = if child.is_hierarchical_facet {
            let missing_term = child
                .null_values_label
                .clone()
                .unwrap_or_else(|| settings.missing_term.clone());
            (
                FacetShape::HierarchicalChild {
                    child_name: child_name.clone(),
                    missing_term,
                },
                field.label.clone(),
                settings.all_size,
            )
        } else {
            let size = if child.is_filterable_facet {
                settings.all_size
            } else {
                settings.default_size
            };
            (
                FacetShape::NestedChild {
                    child_name: child_name.clone(),
                    path: format!("{name}.children"),
                },
                child.label.clone(),
                size,
            )
        };

        out.push(FacetDescriptor {
            id: format!("facet_{category}_{name}.children.{child_name}"),
            name: name.to_string(),
            category: category.to_string(),
            filter_type: kind,
            shape,
            filter_order: child.facet_order,
            exclusive_selection: field.facet_exclusive_selection,
            is_filterable: child.is_filterable_facet,
            size,
            default_size: size,
            label,
            field_type: child.field_type.clone(),
            value: None,
            keywords: Vec::new(),
        });
    }
}

impl FlattenedSchema {
    /// Query fields for the selection.
    ///
    /// All categories are unioned, keeping the highest boost per field. A selected category's
    /// own boosts then take precedence over the union.
    pub fn query_fields(&self, selected: Option<&str>) -> QueryFields {
        let mut merged = QueryFields::new();
        for fields in self.query_fields_by_type.values() {
            for (path, field) in fields {
                merged
                    .entry(path.clone())
                    .and_modify(|existing| {
                        if field.boost > existing.boost {
                            existing.boost = field.boost;
                        }
                    })
                    .or_insert(*field);
            }
        }

        if let Some(own) = selected.and_then(|s| self.query_fields_by_type.get(s)) {
            merged.extend(own.iter().map(|(path, field)| (path.clone(), *field)));
        }
        merged
    }

    /// Query fields in engine syntax, `"<path>.value^<boost>"`.
    pub fn boosted_query_fields(&self, selected: Option<&str>) -> Vec<String> {
        self.query_fields(selected)
            .iter()
            .map(|(path, field)| format!("{path}^{}", field.boost))
            .collect()
    }

    /// Highlightable fields of the selected category, or `None` if there are none.
    pub fn highlight_fields(&self, selected: Option<&str>) -> Option<Vec<String>> {
        let fields = self.query_fields_by_type.get(selected?)?;
        let highlight: Vec<String> = fields
            .iter()
            .filter(|(_, f)| f.highlight)
            .map(|(path, _)| path.clone())
            .collect();
        (!highlight.is_empty()).then_some(highlight)
    }

    /// Every facet of every category, in category order.
    pub fn all_facets(&self) -> Vec<FacetDescriptor> {
        self.facets_by_type.values().flatten().cloned().collect()
    }

    /// Looks up a facet descriptor by id.
    pub fn facet(&self, id: &str) -> Option<&FacetDescriptor> {
        self.facets_by_type
            .values()
            .flatten()
            .find(|facet| facet.id == id)
    }
}

#[cfg(test)]
mod tests {
    use kgs_config::SearchSettings;
    use serde_json::json;

    use super::*;
    use crate::schema::FacetKind;

    fn flattened(schema: serde_json::Value) -> FlattenedSchema {
        flatten(
            &Schema::from_value(&schema),
            &FacetSettings::default(),
            &SearchSettings::default().highlight_fields,
        )
    }

    fn sample() -> FlattenedSchema {
        flattened(json!({
            "Dataset": {
                "fields": {
                    "title": {"boost": 20},
                    "description": {},
                    "internal": {"ignoreForSearch": true, "facet": "exists"},
                    "species": {"facet": "list", "facetExclusiveSelection": false},
                    "methods": {
                        "isFilterableFacet": true,
                        "facet": "list",
                        "children": {
                            "name": {"facet": "list", "boost": 3},
                            "kind": {"facet": "list", "isHierarchicalFacet": true}
                        }
                    }
                }
            },
            "Model": {
                "fields": {
                    "title": {"boost": 5},
                    "version": {"boost": 4}
                }
            }
        }))
    }

    #[test]
    fn query_fields_skip_ignored_and_walk_children() {
        let flat = sample();
        let fields = &flat.query_fields_by_type["Dataset"];
        assert!(fields.contains_key("title.value"));
        assert!(!fields.contains_key("internal.value"));
        assert_eq!(fields["methods.children.name.value"].boost, 3.0);
        assert!(fields["title.value"].highlight);
        assert!(fields["description.value"].highlight);
        assert!(!fields["species.value"].highlight);
    }

    #[test]
    fn selected_category_boost_overrides_union() {
        let flat = sample();
        assert_eq!(flat.query_fields(None)["title.value"].boost, 20.0);
        assert_eq!(flat.query_fields(Some("Model"))["title.value"].boost, 5.0);
        assert!(flat.query_fields(Some("Model")).contains_key("species.value"));
    }

    #[test]
    fn boosted_field_syntax() {
        let flat = sample();
        let fields = flat.boosted_query_fields(Some("Model"));
        assert!(fields.contains(&"title.value^5".to_string()));
        assert!(fields.contains(&"version.value^4".to_string()));
        assert!(fields.contains(&"description.value^1".to_string()));
    }

    #[test]
    fn highlight_fields_only_for_selection() {
        let flat = sample();
        assert_eq!(flat.highlight_fields(None), None);
        assert_eq!(
            flat.highlight_fields(Some("Dataset")),
            Some(vec!["description.value".into(), "title.value".into()])
        );
        assert_eq!(flat.highlight_fields(Some("Unknown")), None);
    }

    #[test]
    fn highlight_fields_none_when_category_has_none() {
        let flat = flattened(json!({"Model": {"fields": {"version": {}}}}));
        assert_eq!(flat.highlight_fields(Some("Model")), None);
    }

    #[test]
    fn facets_for_all_shapes() {
        let flat = sample();
        let facets = &flat.facets_by_type["Dataset"];
        let ids: Vec<&str> = facets.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "facet_Dataset_internal",
                "facet_Dataset_methods",
                "facet_Dataset_methods.children.kind",
                "facet_Dataset_methods.children.name",
                "facet_Dataset_species",
            ]
        );

        let methods = flat.facet("facet_Dataset_methods").unwrap();
        assert_eq!(methods.size, 1_000_000);

        let kind = flat.facet("facet_Dataset_methods.children.kind").unwrap();
        assert_eq!(
            kind.shape,
            FacetShape::HierarchicalChild {
                child_name: "kind".into(),
                missing_term: "Others".into()
            }
        );
        assert_eq!(kind.size, 1_000_000);

        let name = flat.facet("facet_Dataset_methods.children.name").unwrap();
        assert_eq!(
            name.shape,
            FacetShape::NestedChild {
                child_name: "name".into(),
                path: "methods.children".into()
            }
        );
        assert_eq!(name.size, 10);

        let species = flat.facet("facet_Dataset_species").unwrap();
        assert_eq!(species.filter_type, FacetKind::List);
        assert!(!species.exclusive_selection);
        assert_eq!(species.size, 10);
    }

    #[test]
    fn child_facets_inherit_parent_exclusivity() {
        let flat = flattened(json!({
            "T": {"fields": {"p": {
                "facetExclusiveSelection": false,
                "children": {"c": {"facet": "list", "facetExclusiveSelection": true}}
            }}}
        }));
        assert!(!flat.facet("facet_T_p.children.c").unwrap().exclusive_selection);
    }

    #[test]
    fn hierarchical_child_uses_declared_missing_label() {
        let flat = flattened(json!({
            "T": {"fields": {"p": {"children": {"c": {
                "facet": "list",
                "isHierarchicalFacet": true,
                "nullValuesLabel": "Unknown"
            }}}}}
        }));
        let facet = flat.facet("facet_T_p.children.c").unwrap();
        assert!(matches!(
            &facet.shape,
            FacetShape::HierarchicalChild { missing_term, .. } if missing_term == "Unknown"
        ));
    }

    #[test]
    fn all_facets_spans_categories() {
        let flat = sample();
        assert_eq!(flat.all_facets().len(), 5);
        assert!(flat.facet("facet_Model_title").is_none());
    }
}
