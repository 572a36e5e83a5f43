//! Sort choices offered to the user.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// Key of the default relevance choice.
pub const RELEVANCE_KEY: &str = "newestFirst";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Body of a sort clause as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Direction.
    pub order: SortOrder,
    /// Placement of documents without the field, e.g. `_last`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<String>,
}

/// One engine sort clause, serialized as `{"<field>": {"order": ..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, SortSpec>", into = "BTreeMap<String, SortSpec>")]
pub struct SortClause {
    /// Sort field.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
    /// Placement of documents without the field.
    pub missing: Option<String>,
}

impl SortClause {
    /// Clause without a missing rule.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
            missing: None,
        }
    }

    /// Puts documents without the field last.
    #[must_use]
    pub fn missing_last(mut self) -> Self {
        self.missing = Some("_last".to_string());
        self
    }
}

impl TryFrom<BTreeMap<String, SortSpec>> for SortClause {
    type Error = String;

    fn try_from(map: BTreeMap<String, SortSpec>) -> Result<Self, Self::Error> {
        let mut entries = map.into_iter();
        match (entries.next(), entries.next()) {
            (Some((field, spec)), None) => Ok(Self {
                field,
                order: spec.order,
                missing: spec.missing,
            }),
            _ => Err("a sort clause must name exactly one field".to_string()),
        }
    }
}

impl From<SortClause> for BTreeMap<String, SortSpec> {
    fn from(clause: SortClause) -> Self {
        Self::from([(
            clause.field,
            SortSpec {
                order: clause.order,
                missing: clause.missing,
            },
        )])
    }
}

/// A selectable sort option, pre-resolved to its clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortChoice {
    /// Option key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Clauses placed in the payload.
    pub fields: Vec<SortClause>,
    /// Value used in URLs.
    pub param: String,
    /// Selected when the user picked nothing.
    #[serde(default)]
    pub default_option: bool,
}

impl SortChoice {
    /// Score first, then newest release, undated documents last.
    pub fn relevance() -> Self {
        Self {
            key: RELEVANCE_KEY.to_string(),
            label: "Relevance".to_string(),
            fields: vec![
                SortClause::new("_score", SortOrder::Desc),
                SortClause::new("first_release.value", SortOrder::Desc).missing_last(),
            ],
            param: RELEVANCE_KEY.to_string(),
            default_option: true,
        }
    }

    /// Ascending on a field's keyword value.
    pub fn ascending(name: &str, label: Option<&str>) -> Self {
        let field = format!("{name}.value.keyword");
        let param = format!("{field}_asc");
        Self {
            key: param.clone(),
            label: label.unwrap_or(name).to_string(),
            fields: vec![SortClause::new(field, SortOrder::Asc)],
            param,
            default_option: false,
        }
    }

    /// Resolves a key or URL param. Unknown keys that name a field sort ascending on it.
    pub fn for_key(options: &[Self], key: &str) -> Self {
        options
            .iter()
            .find(|choice| choice.key == key || choice.param == key)
            .cloned()
            .unwrap_or_else(|| {
                let name = key.strip_suffix("_asc").unwrap_or(key);
                let name = name.strip_suffix(".value.keyword").unwrap_or(name);
                Self::ascending(name, None)
            })
    }
}

/// Relevance plus one ascending option per sortable field, de-duplicated by field name.
pub fn sort_options(schema: &Schema) -> Vec<SortChoice> {
    let mut seen = BTreeSet::new();
    let mut options = vec![SortChoice::relevance()];
    for (_, mapping) in schema.categories() {
        for (name, field) in &mapping.fields {
            if field.sort && seen.insert(name.as_str()) {
                options.push(SortChoice::ascending(name, field.label.as_deref()));
            }
        }
    }
    options
}
