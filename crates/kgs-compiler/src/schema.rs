//! Per-category field schema.
//!
//! The schema arrives as JSON maintained outside this crate, so parsing is lenient: a field
//! or child with the wrong shape is logged and skipped, and the rest of the schema still loads.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::SchemaError;

/// How a field takes part in faceting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    /// Multi-value keyword selection.
    List,
    /// Presence toggle.
    Exists,
    /// Category selector.
    Type,
}

/// Bucket ordering for list facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetOrder {
    /// Alphabetical by bucket key.
    ByValue,
    /// Most frequent first.
    #[default]
    ByCount,
}

/// One schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    /// Query-time boost.
    pub boost: f64,
    /// Excluded from the free-text query fields.
    pub ignore_for_search: bool,
    /// Facet kind, if the field is a facet.
    pub facet: Option<FacetKind>,
    /// Bucket ordering.
    pub facet_order: FacetOrder,
    /// `true` for AND semantics across selected values, `false` for OR.
    pub facet_exclusive_selection: bool,
    /// Child facet buckets nest under the parent's buckets.
    pub is_hierarchical_facet: bool,
    /// Facet shows every bucket rather than a first page.
    pub is_filterable_facet: bool,
    /// Label for the hierarchical "no child value" bucket.
    pub null_values_label: Option<String>,
    /// Offered as a sort option.
    pub sort: bool,
    /// Display label.
    pub label: Option<String>,
    /// Primitive type tag.
    pub field_type: Option<String>,
    /// One level of child fields.
    pub children: BTreeMap<String, Self>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            boost: 1.0,
            ignore_for_search: false,
            facet: None,
            facet_order: FacetOrder::default(),
            facet_exclusive_selection: true,
            is_hierarchical_facet: false,
            is_filterable_facet: false,
            null_values_label: None,
            sort: false,
            label: None,
            field_type: None,
            children: BTreeMap::new(),
        }
    }
}

/// Field shape as written in the schema JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawField {
    /// Query-time boost.
    boost: Option<f64>,
    /// Excluded from query fields.
    ignore_for_search: bool,
    /// Facet kind name.
    facet: Option<String>,
    /// Facet order name.
    facet_order: Option<String>,
    /// AND vs OR multi-select.
    facet_exclusive_selection: Option<bool>,
    /// Hierarchical child facet.
    is_hierarchical_facet: bool,
    /// Filterable facet.
    is_filterable_facet: bool,
    /// Missing-bucket label.
    null_values_label: Option<String>,
    /// Sortable field.
    sort: bool,
    /// Display label.
    #[serde(alias = "label")]
    value: Option<String>,
    /// Primitive type tag.
    #[serde(rename = "type")]
    field_type: Option<String>,
    /// Child fields, checked separately.
    children: Option<Value>,
}

/// Fields and selection hints for one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMapping {
    /// Position among categories, lowest first.
    pub order: Option<f64>,
    /// Preferred initial category.
    pub default_selection: bool,
    /// Fields by name.
    pub fields: BTreeMap<String, FieldMapping>,
}

/// Field schema keyed by category name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Categories by name.
    categories: BTreeMap<String, TypeMapping>,
}

impl Schema {
    /// Loads a schema from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path).map_err(|source| SchemaError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parses a schema from JSON text.
    pub fn from_json_str(contents: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(contents)?;
        Ok(Self::from_value(&value))
    }

    /// Builds a schema from a JSON value, skipping anything malformed.
    pub fn from_value(value: &Value) -> Self {
        let mut schema = Self::default();
        let Some(categories) = value.as_object() else {
            warn!("schema root is not an object, ignoring it");
            return schema;
        };

        for (name, definition) in categories {
            let Some(definition) = definition.as_object() else {
                warn!(category = %name, "category definition is not an object, skipping");
                continue;
            };
            schema.insert(name.clone(), parse_type(name, definition));
        }
        schema
    }

    /// Adds or replaces a category.
    pub fn insert(&mut self, name: impl Into<String>, mapping: TypeMapping) {
        self.categories.insert(name.into(), mapping);
    }

    /// Looks up a category.
    pub fn get(&self, category: &str) -> Option<&TypeMapping> {
        self.categories.get(category)
    }

    /// Iterates categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &TypeMapping)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the numeric order of every category that declares one.
    pub fn type_order(&self) -> BTreeMap<String, f64> {
        self.categories
            .iter()
            .filter_map(|(name, mapping)| mapping.order.map(|o| (name.clone(), o)))
            .collect()
    }

    /// Picks the category shown first.
    ///
    /// Only categories with an order are candidates. A category flagged as the default
    /// selection wins; otherwise the lowest order wins.
    pub fn default_selected_type(&self) -> Option<&str> {
        let mut selected: Option<(&str, f64)> = None;
        let mut flagged = false;

        for (name, mapping) in &self.categories {
            let Some(order) = mapping.order else {
                continue;
            };
            if mapping.default_selection {
                selected = Some((name, order));
                flagged = true;
            }
            if !flagged && selected.is_none_or(|(_, best)| order < best) {
                selected = Some((name, order));
            }
        }

        selected.map(|(name, _)| name)
    }
}

/// Parses one category definition.
fn parse_type(category: &str, definition: &Map<String, Value>) -> TypeMapping {
    let order = definition.get("order").and_then(|order| match order {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    let default_selection = definition
        .get("defaultSelection")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let fields = match definition.get("fields") {
        Some(Value::Object(fields)) => parse_fields(category, fields, true),
        None | Some(Value::Null) => BTreeMap::new(),
        Some(_) => {
            warn!(category, "category fields is not an object, skipping");
            BTreeMap::new()
        }
    };

    TypeMapping {
        order,
        default_selection,
        fields,
    }
}

/// Parses a map of fields. Children are only read at the top level.
fn parse_fields(
    context: &str,
    fields: &Map<String, Value>,
    with_children: bool,
) -> BTreeMap<String, FieldMapping> {
    let mut parsed = BTreeMap::new();

    for (name, value) in fields {
        let raw = match RawField::deserialize(value) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%context, field = %name, %error, "skipping malformed schema field");
                continue;
            }
        };
        let path = format!("{context}.{name}");

        let children = match &raw.children {
            Some(Value::Object(children)) if with_children => parse_fields(&path, children, false),
            None | Some(Value::Null) => BTreeMap::new(),
            Some(_) => {
                warn!(field = %path, "ignoring children that are not a single level object");
                BTreeMap::new()
            }
        };

        parsed.insert(name.clone(), convert_field(&path, raw, children));
    }

    parsed
}

/// Resolves the raw field into its typed form.
fn convert_field(
    path: &str,
    raw: RawField,
    children: BTreeMap<String, FieldMapping>,
) -> FieldMapping {
    let facet = match raw.facet.as_deref() {
        None | Some("") => None,
        Some("list") => Some(FacetKind::List),
        Some("exists") => Some(FacetKind::Exists),
        Some("type") => Some(FacetKind::Type),
        Some(other) => {
            warn!(field = %path, facet = other, "unknown facet kind, field is not a facet");
            None
        }
    };
    let facet_order = match raw.facet_order.as_deref() {
        Some("byvalue") => FacetOrder::ByValue,
        _ => FacetOrder::ByCount,
    };

    FieldMapping {
        boost: raw.boost.filter(|b| *b > 0.0).unwrap_or(1.0),
        ignore_for_search: raw.ignore_for_search,
        facet,
        facet_order,
        facet_exclusive_selection: raw.facet_exclusive_selection.unwrap_or(true),
        is_hierarchical_facet: raw.is_hierarchical_facet,
        is_filterable_facet: raw.is_filterable_facet,
        null_values_label: raw.null_values_label.filter(|l| !l.is_empty()),
        sort: raw.sort,
        label: raw.value,
        field_type: raw.field_type,
        children,
    }
}
