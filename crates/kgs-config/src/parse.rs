//! `.kgs.toml` parsing.
//!
//! Every key is optional at this stage; a file only states what it overrides, and
//! [`merge_configs`](crate::merge_configs) fills the rest from lower-precedence files and
//! built-in defaults.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::ConfigError;

/// One `.kgs.toml` file, section by section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Stops discovery at this file; parent and global files are not read.
    pub root: Option<bool>,
    /// Query tweaking section.
    pub tweaking: Option<RawTweaking>,
    /// Facet sizing section.
    pub facets: Option<RawFacetSettings>,
    /// Search payload section.
    pub search: Option<RawSearchSettings>,
}

/// Raw query tweaking settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTweaking {
    /// Above this many extracted terms, augmentation is turned off.
    pub max_terms_trigger: Option<usize>,
    /// Terms never augmented. Accepts a single string or an array.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub excluded_terms: Option<Vec<String>>,
    /// Wildcard augmentation policy.
    pub wildcard: Option<RawTermPolicy>,
    /// Fuzzy augmentation policy.
    pub fuzzy: Option<RawTermPolicy>,
}

/// Raw per-policy limits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTermPolicy {
    /// `-1` for all terms, `0` for none, `n` for the first `n`.
    pub max_terms: Option<i32>,
    /// Minimum term length for the policy to apply.
    pub min_chars: Option<usize>,
}

/// Raw facet settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFacetSettings {
    /// Bucket cap for ordinary list facets.
    pub default_size: Option<usize>,
    /// Bucket cap for filterable and hierarchical facets.
    pub all_size: Option<usize>,
    /// Bucket cap for the category facet.
    pub type_size: Option<usize>,
    /// Default label for the hierarchical "no child value" bucket.
    pub missing_term: Option<String>,
}

/// Raw search payload settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Hits per result page.
    pub hits_per_page: Option<usize>,
    /// Leaf field names eligible for highlighting.
    pub highlight_fields: Option<Vec<String>>,
}

/// Reads and parses one config file.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses TOML text; `path` only labels errors.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether the file sets `root = true`. Unreadable or invalid files count as not root; they
/// fail later when loaded.
pub fn is_root_config(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|contents| toml::from_str::<RawConfig>(&contents).ok())
        .is_some_and(|config| config.root == Some(true))
}
