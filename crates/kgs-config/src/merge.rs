//! Configuration merging.
//!
//! Folds several `RawConfig` files into one resolved `Config`.

use std::path::{Path, PathBuf};

use crate::{
    Config, FacetSettings, QueryTweakingConfig, SearchSettings, TermPolicy,
    parse::{RawConfig, RawFacetSettings, RawSearchSettings, RawTermPolicy, RawTweaking},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges configuration files into a single resolved `Config`.
///
/// Configs are given highest precedence first. Each scalar takes the first defined value;
/// list values such as `excluded_terms` are replaced wholesale, never concatenated.
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    let mut config = Config::default();

    // Lowest precedence first so closer files overwrite.
    for parsed in configs.iter().rev() {
        let raw = &parsed.config;
        if let Some(tweaking) = &raw.tweaking {
            apply_tweaking(&mut config.tweaking, tweaking);
        }
        if let Some(facets) = &raw.facets {
            apply_facets(&mut config.facets, facets);
        }
        if let Some(search) = &raw.search {
            apply_search(&mut config.search, search);
        }
    }

    config.config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);

    config
}

/// Applies the tweaking section of one file.
fn apply_tweaking(result: &mut QueryTweakingConfig, raw: &RawTweaking) {
    if let Some(v) = raw.max_terms_trigger {
        result.max_terms_trigger = v;
    }
    if let Some(terms) = &raw.excluded_terms {
        result.excluded_terms = terms.iter().map(|t| t.to_lowercase()).collect();
    }
    if let Some(policy) = &raw.wildcard {
        apply_policy(&mut result.wildcard, policy);
    }
    if let Some(policy) = &raw.fuzzy {
        apply_policy(&mut result.fuzzy, policy);
    }
}

/// Applies one `[tweaking.*]` policy table.
fn apply_policy(result: &mut TermPolicy, raw: &RawTermPolicy) {
    if let Some(v) = raw.max_terms {
        result.max_terms = v;
    }
    if let Some(v) = raw.min_chars {
        result.min_chars = v;
    }
}

/// Applies the facets section of one file.
fn apply_facets(result: &mut FacetSettings, raw: &RawFacetSettings) {
    if let Some(v) = raw.default_size {
        result.default_size = v;
    }
    if let Some(v) = raw.all_size {
        result.all_size = v;
    }
    if let Some(v) = raw.type_size {
        result.type_size = v;
    }
    if let Some(v) = &raw.missing_term {
        result.missing_term.clone_from(v);
    }
}

/// Applies the search section of one file.
fn apply_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(v) = raw.hits_per_page {
        result.hits_per_page = v;
    }
    if let Some(v) = &raw.highlight_fields {
        result.highlight_fields.clone_from(v);
    }
}
