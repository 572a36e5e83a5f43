//! Facet descriptors derived from the schema.

use std::slice;

use serde::{Deserialize, Serialize};

use crate::schema::{FacetKind, FacetOrder};

/// Id of the synthetic category facet.
pub const TYPE_FACET_ID: &str = "facet_type";

/// Field holding the document category.
pub const TYPE_FACET_FIELD: &str = "type.value";

/// Physical layout of a facet's field in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FacetShape {
    /// A top-level field.
    Flat,
    /// A field inside a repeated child object, matched with a nested query.
    NestedChild {
        /// Child field name.
        child_name: String,
        /// Nested document path, `<name>.children`.
        path: String,
    },
    /// A child whose buckets only make sense inside the parent's buckets.
    HierarchicalChild {
        /// Child field name.
        child_name: String,
        /// Label of the parent bucket collecting documents without a parent value.
        missing_term: String,
    },
}

/// Current selection of a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    /// Exists toggle.
    Flag(bool),
    /// Single keyword, used by the category facet.
    Keyword(String),
    /// Selected list values.
    Keywords(Vec<String>),
}

impl FacetValue {
    /// Whether this value restricts results.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Flag(on) => *on,
            Self::Keyword(k) => !k.is_empty(),
            Self::Keywords(ks) => !ks.is_empty(),
        }
    }

    /// Selected keywords, if any.
    pub fn keywords(&self) -> &[String] {
        match self {
            Self::Flag(_) => &[],
            Self::Keyword(k) => slice::from_ref(k),
            Self::Keywords(ks) => ks,
        }
    }
}

/// A bucket returned by the last search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    /// Bucket key.
    pub value: String,
    /// Documents in the bucket.
    pub count: u64,
}

/// A facet as the search UI tracks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetDescriptor {
    /// Unique key, `facet_<category>_<field>` or `facet_<category>_<field>.children.<child>`.
    pub id: String,
    /// Top-level field name.
    pub name: String,
    /// Owning category.
    #[serde(rename = "type")]
    pub category: String,
    /// Facet kind.
    pub filter_type: FacetKind,
    /// Field layout.
    pub shape: FacetShape,
    /// Bucket ordering.
    #[serde(default)]
    pub filter_order: FacetOrder,
    /// AND semantics across selected values.
    #[serde(default = "default_true")]
    pub exclusive_selection: bool,
    /// Shows every bucket.
    #[serde(default)]
    pub is_filterable: bool,
    /// Current bucket cap.
    pub size: usize,
    /// Bucket cap restored on reset.
    pub default_size: usize,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Primitive type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Current selection.
    #[serde(default)]
    pub value: Option<FacetValue>,
    /// Buckets from the last search.
    #[serde(default)]
    pub keywords: Vec<Keyword>,
}

/// Serde default for `exclusive_selection`.
const fn default_true() -> bool {
    true
}

impl FacetDescriptor {
    /// Builds the category facet for the given selection.
    pub fn type_facet(selected: Option<&str>, size: usize) -> Self {
        Self {
            id: TYPE_FACET_ID.to_string(),
            name: TYPE_FACET_FIELD.to_string(),
            category: String::new(),
            filter_type: FacetKind::Type,
            shape: FacetShape::Flat,
            filter_order: FacetOrder::ByCount,
            exclusive_selection: true,
            is_filterable: false,
            size,
            default_size: size,
            label: None,
            field_type: None,
            value: selected.map(|s| FacetValue::Keyword(s.to_string())),
            keywords: Vec::new(),
        }
    }

    /// Whether the current value restricts results.
    pub fn is_active(&self) -> bool {
        self.value.as_ref().is_some_and(FacetValue::is_active)
    }

    /// Child field name for child facets.
    pub fn child_name(&self) -> Option<&str> {
        match &self.shape {
            FacetShape::Flat => None,
            FacetShape::NestedChild { child_name, .. }
            | FacetShape::HierarchicalChild { child_name, .. } => Some(child_name),
        }
    }

    /// Index field the facet filters on.
    pub fn facet_key(&self) -> String {
        if self.filter_type == FacetKind::Type {
            return self.name.clone();
        }
        match &self.shape {
            FacetShape::Flat => format!("{}.value.keyword", self.name),
            FacetShape::NestedChild { child_name, .. } => {
                format!("{}.children.{child_name}.value.keyword", self.name)
            }
            FacetShape::HierarchicalChild { child_name, .. } => {
                format!("{child_name}.value.keyword")
            }
        }
    }

    /// Adds list values, keeping the existing order and skipping duplicates.
    ///
    /// Returns `false` if the facet is not a list facet.
    pub fn select<I, S>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.filter_type != FacetKind::List {
            return false;
        }
        let mut current = self
            .value
            .take()
            .map(|v| v.keywords().to_vec())
            .unwrap_or_default();
        for value in values {
            let value = value.into();
            if !current.contains(&value) {
                current.push(value);
            }
        }
        self.value = Some(FacetValue::Keywords(current));
        true
    }

    /// Removes list values. The value is cleared once nothing is left.
    pub fn deselect(&mut self, values: &[&str]) {
        let Some(FacetValue::Keywords(current)) = &mut self.value else {
            return;
        };
        current.retain(|v| !values.contains(&v.as_str()));
        if current.is_empty() {
            self.value = None;
        }
    }

    /// Sets an exists toggle. Returns `false` if the facet is not an exists facet.
    pub fn set_exists(&mut self, on: bool) -> bool {
        if self.filter_type != FacetKind::Exists {
            return false;
        }
        self.value = Some(FacetValue::Flag(on));
        true
    }

    /// Clears the selection and restores the default bucket cap.
    pub fn reset(&mut self) {
        self.value = None;
        self.size = self.default_size;
    }

    /// Changes the bucket cap of a list facet.
    pub fn set_size(&mut self, size: usize) -> bool {
        if self.filter_type != FacetKind::List {
            return false;
        }
        self.size = size;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_facet() -> FacetDescriptor {
        FacetDescriptor {
            id: "facet_Dataset_species".into(),
            name: "species".into(),
            category: "Dataset".into(),
            filter_type: FacetKind::List,
            shape: FacetShape::Flat,
            filter_order: FacetOrder::ByCount,
            exclusive_selection: false,
            is_filterable: false,
            size: 10,
            default_size: 10,
            label: None,
            field_type: None,
            value: None,
            keywords: Vec::new(),
        }
    }

    #[test]
    fn facet_keys_per_shape() {
        let mut facet = list_facet();
        assert_eq!(facet.facet_key(), "species.value.keyword");

        facet.shape = FacetShape::NestedChild {
            child_name: "strain".into(),
            path: "species.children".into(),
        };
        assert_eq!(facet.facet_key(), "species.children.strain.value.keyword");

        facet.shape = FacetShape::HierarchicalChild {
            child_name: "strain".into(),
            missing_term: "Others".into(),
        };
        assert_eq!(facet.facet_key(), "strain.value.keyword");
        assert_eq!(facet.child_name(), Some("strain"));
    }

    #[test]
    fn type_facet_key_is_its_name() {
        let facet = FacetDescriptor::type_facet(Some("Dataset"), 50);
        assert_eq!(facet.facet_key(), TYPE_FACET_FIELD);
        assert!(facet.is_active());
        assert!(!FacetDescriptor::type_facet(None, 50).is_active());
    }

    #[test]
    fn select_keeps_order_without_duplicates() {
        let mut facet = list_facet();
        assert!(facet.select(["Rat", "Mouse"]));
        assert!(facet.select(["Rat", "Human"]));
        assert_eq!(
            facet.value,
            Some(FacetValue::Keywords(vec![
                "Rat".into(),
                "Mouse".into(),
                "Human".into()
            ]))
        );
    }

    #[test]
    fn deselect_clears_when_empty() {
        let mut facet = list_facet();
        facet.select(["Rat", "Mouse"]);
        facet.deselect(&["Rat"]);
        assert_eq!(facet.value, Some(FacetValue::Keywords(vec!["Mouse".into()])));
        facet.deselect(&["Mouse"]);
        assert_eq!(facet.value, None);
        assert!(!facet.is_active());
    }

    #[test]
    fn set_exists_only_on_exists_facets() {
        let mut facet = list_facet();
        assert!(!facet.set_exists(true));
        facet.filter_type = FacetKind::Exists;
        assert!(facet.set_exists(true));
        assert!(facet.is_active());
        facet.set_exists(false);
        assert!(!facet.is_active());
    }

    #[test]
    fn reset_restores_size() {
        let mut facet = list_facet();
        facet.select(["Rat"]);
        assert!(facet.set_size(40));
        facet.reset();
        assert_eq!(facet.size, 10);
        assert_eq!(facet.value, None);
    }

    #[test]
    fn descriptor_json_shape() {
        let mut facet = list_facet();
        facet.shape = FacetShape::NestedChild {
            child_name: "strain".into(),
            path: "species.children".into(),
        };
        facet.select(["Rat"]);
        let json = serde_json::to_value(&facet).unwrap();
        assert_eq!(json["type"], "Dataset");
        assert_eq!(json["filterType"], "list");
        assert_eq!(json["shape"]["kind"], "nestedChild");
        assert_eq!(json["shape"]["childName"], "strain");
        assert_eq!(json["value"], serde_json::json!(["Rat"]));

        let back: FacetDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, facet);
    }
}
