//! Configuration system for kgs.
//!
//! kgs reads TOML files named `.kgs.toml`. Configuration is resolved by walking up the
//! directory tree from the current working directory, collecting any `.kgs.toml` files found,
//! then loading `~/.kgs.toml` as the global config with lowest precedence.
//!
//! The resolved [`Config`] is plain data. Consumers receive the pieces they need, such as
//! [`QueryTweakingConfig`], as constructor arguments.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawFacetSettings, RawSearchSettings, RawTermPolicy, RawTweaking,
    parse_config_file, parse_config_str,
};
use serde::{Deserialize, Serialize};

/// Words that never receive wildcard or fuzzy alternatives.
pub const DEFAULT_EXCLUDED_TERMS: &[&str] = &[
    "a", "above", "all", "an", "are", "as", "any", "because", "below", "besides", "but", "by",
    "eg", "either", "for", "hence", "how", "which", "where", "who", "ie", "in", "instead", "is",
    "none", "of", "one", "other", "over", "same", "that", "the", "then", "thereby", "therefore",
    "this", "though", "thus", "to", "under", "until", "when", "why",
];

/// Leaf field names whose values are highlighted in results.
pub const DEFAULT_HIGHLIGHT_FIELDS: &[&str] = &[
    "title",
    "description",
    "contributors",
    "owners",
    "component",
    "created_at",
    "releasedate",
    "activities",
];

/// Top-level merged configuration for kgs.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Free-text query augmentation settings.
    pub tweaking: QueryTweakingConfig,
    /// Facet bucket sizing.
    pub facets: FacetSettings,
    /// Payload-level search settings.
    pub search: SearchSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.kgs.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                Ok(ParsedConfig {
                    path: path.clone(),
                    config: parse_config_file(path)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// Serializes the effective settings in the same layout as a `.kgs.toml` file.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            tweaking: &self.tweaking,
            facets: &self.facets,
            search: &self.search,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Limits for one augmentation policy (wildcard or fuzzy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TermPolicy {
    /// `-1` applies to every term, `0` to none, `n` to the first `n` terms.
    pub max_terms: i32,
    /// Terms shorter than this are left alone.
    pub min_chars: usize,
}

impl TermPolicy {
    /// Creates a policy.
    pub const fn new(max_terms: i32, min_chars: usize) -> Self {
        Self {
            max_terms,
            min_chars,
        }
    }

    /// Returns how many leading terms this policy may touch out of `total` extracted terms.
    pub fn limit(&self, total: usize) -> usize {
        match usize::try_from(self.max_terms) {
            Ok(max) if max <= total => max,
            _ => total,
        }
    }

    /// Whether the term at ordinal `idx` with `len` characters qualifies.
    pub fn applies(&self, idx: usize, len: usize, total: usize) -> bool {
        idx < self.limit(total) && len >= self.min_chars
    }
}

/// Read-only tuning for free-text query augmentation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueryTweakingConfig {
    /// Above this many extracted terms, augmentation is turned off entirely.
    pub max_terms_trigger: usize,
    /// Lowercase terms never augmented.
    pub excluded_terms: BTreeSet<String>,
    /// Prefix-match policy (`term*`).
    pub wildcard: TermPolicy,
    /// Fuzzy-match policy (`term~`).
    pub fuzzy: TermPolicy,
}

impl Default for QueryTweakingConfig {
    fn default() -> Self {
        Self {
            max_terms_trigger: 4,
            excluded_terms: DEFAULT_EXCLUDED_TERMS
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            wildcard: TermPolicy::new(2, 3),
            fuzzy: TermPolicy::new(3, 4),
        }
    }
}

impl QueryTweakingConfig {
    /// Whether `term` is on the excluded list.
    pub fn is_excluded(&self, term: &str) -> bool {
        self.excluded_terms.contains(term)
    }
}

/// Facet bucket sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FacetSettings {
    /// Bucket cap for ordinary list facets.
    pub default_size: usize,
    /// Bucket cap for filterable and hierarchical facets.
    pub all_size: usize,
    /// Bucket cap for the category facet.
    pub type_size: usize,
    /// Default label for the hierarchical "no child value" bucket.
    pub missing_term: String,
}

impl Default for FacetSettings {
    fn default() -> Self {
        Self {
            default_size: 10,
            all_size: 1_000_000,
            type_size: 50,
            missing_term: String::from("Others"),
        }
    }
}

/// Payload-level search settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchSettings {
    /// Hits per result page.
    pub hits_per_page: usize,
    /// Leaf field names eligible for highlighting.
    pub highlight_fields: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            hits_per_page: 20,
            highlight_fields: DEFAULT_HIGHLIGHT_FIELDS
                .iter()
                .map(|f| (*f).to_string())
                .collect(),
        }
    }
}

/// Borrowed view of the settings for TOML output.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Query tweaking settings.
    tweaking: &'a QueryTweakingConfig,
    /// Facet sizing.
    facets: &'a FacetSettings,
    /// Search settings.
    search: &'a SearchSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweaking_defaults() {
        let tweaking = QueryTweakingConfig::default();
        assert_eq!(tweaking.max_terms_trigger, 4);
        assert_eq!(tweaking.excluded_terms.len(), 43);
        assert!(tweaking.is_excluded("the"));
        assert!(!tweaking.is_excluded("brain"));
        assert_eq!(tweaking.wildcard, TermPolicy::new(2, 3));
        assert_eq!(tweaking.fuzzy, TermPolicy::new(3, 4));
    }

    #[test]
    fn test_policy_limit() {
        assert_eq!(TermPolicy::new(-1, 3).limit(7), 7);
        assert_eq!(TermPolicy::new(0, 3).limit(7), 0);
        assert_eq!(TermPolicy::new(2, 3).limit(7), 2);
        assert_eq!(TermPolicy::new(5, 3).limit(2), 2);
    }

    #[test]
    fn test_policy_applies() {
        let policy = TermPolicy::new(2, 4);
        assert!(policy.applies(0, 5, 3));
        assert!(policy.applies(1, 4, 3));
        assert!(!policy.applies(2, 9, 3));
        assert!(!policy.applies(0, 3, 3));
    }

    #[test]
    fn test_facet_defaults() {
        let facets = FacetSettings::default();
        assert_eq!(facets.default_size, 10);
        assert_eq!(facets.all_size, 1_000_000);
        assert_eq!(facets.type_size, 50);
        assert_eq!(facets.missing_term, "Others");
    }

    #[test]
    fn test_search_defaults() {
        let search = SearchSettings::default();
        assert_eq!(search.hits_per_page, 20);
        assert_eq!(search.highlight_fields.len(), 8);
        assert!(search.highlight_fields.iter().any(|f| f == "releasedate"));
    }

    #[test]
    fn test_settings_to_toml_round_trips() {
        let toml = Config::default().settings_to_toml().unwrap();
        assert!(toml.contains("[tweaking]"));
        assert!(toml.contains("[tweaking.wildcard]"));
        assert!(toml.contains("[facets]"));
        assert!(toml.contains("missing_term = \"Others\""));

        let raw = parse_config_str(&toml, Path::new("effective.toml")).unwrap();
        let merged = merge_configs(&[ParsedConfig {
            path: PathBuf::from("/effective.toml"),
            config: raw,
        }]);
        assert_eq!(merged.tweaking, QueryTweakingConfig::default());
        assert_eq!(merged.facets, FacetSettings::default());
        assert_eq!(merged.search, SearchSettings::default());
    }
}
