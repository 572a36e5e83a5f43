//! Integration tests for kgs-config.
//!
//! Exercises the full loading pipeline: discovery -> parse -> merge.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use kgs_config::{CONFIG_FILENAME, Config, ConfigError, is_global_config};

/// Temporary directory tree for a single test.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Writes a `.kgs.toml` into `rel_dir` and returns its path.
    fn write_config(&self, rel_dir: &str, content: &str) -> PathBuf {
        let path = self.create_dir(rel_dir).join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_without_files_uses_defaults() {
    let env = TestEnv::new();
    // Pin the walk to the temp dir so a real ~/.kgs.toml cannot leak in.
    env.write_config(".", "root = true\n");

    let config = Config::load(env.path()).unwrap();
    assert_eq!(config.tweaking.max_terms_trigger, 4);
    assert_eq!(config.facets.missing_term, "Others");
    assert_eq!(config.search.hits_per_page, 20);
}

#[test]
fn test_load_nested_precedence() {
    let env = TestEnv::new();
    env.write_config(
        ".",
        r#"
root = true

[tweaking]
max_terms_trigger = 8
excluded_terms = ["data"]

[tweaking.fuzzy]
max_terms = -1

[facets]
type_size = 20
"#,
    );
    env.write_config(
        "ui",
        r#"
[tweaking]
max_terms_trigger = 3

[facets]
missing_term = "Unspecified"
"#,
    );
    let cwd = env.create_dir("ui/src");

    let config = Config::load(&cwd).unwrap();
    assert_eq!(config.tweaking.max_terms_trigger, 3);
    assert!(config.tweaking.is_excluded("data"));
    assert!(!config.tweaking.is_excluded("the"));
    assert_eq!(config.tweaking.fuzzy.max_terms, -1);
    assert_eq!(config.tweaking.fuzzy.min_chars, 4);
    assert_eq!(config.facets.type_size, 20);
    assert_eq!(config.facets.missing_term, "Unspecified");
    assert_eq!(
        config.config_root.as_deref(),
        Some(env.path().join("ui").as_path())
    );
}

#[test]
fn test_load_reports_bad_toml_with_path() {
    let env = TestEnv::new();
    let path = env.write_config(".", "root = true\n[facets\n");

    let err = Config::load(env.path()).unwrap_err();
    match err {
        ConfigError::ParseToml { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_from_files_missing_file() {
    let env = TestEnv::new();
    let missing = env.path().join("nope").join(CONFIG_FILENAME);

    let err = Config::load_from_files(&[missing]).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_load_from_files_empty_list() {
    let config = Config::load_from_files(&[]).unwrap();
    assert!(config.config_root.is_none());
    assert_eq!(config.facets.default_size, 10);
}

#[test]
fn test_discovered_files_exclude_global_under_root() {
    let env = TestEnv::new();
    let root = env.write_config(".", "root = true\n");
    let cwd = env.create_dir("deep/er");

    let files = kgs_config::discover_config_files(&cwd);
    assert_eq!(files, vec![root]);
    assert!(files.iter().all(|f| !is_global_config(f)));
}

#[test]
fn test_effective_toml_reflects_overrides() {
    let env = TestEnv::new();
    env.write_config(
        ".",
        "root = true\n[search]\nhits_per_page = 7\nhighlight_fields = \"title\"\n",
    );
    let result = Config::load(env.path());
    // highlight_fields is a plain list, a bare string is rejected
    assert!(result.is_err());

    env.write_config(
        ".",
        "root = true\n[search]\nhits_per_page = 7\nhighlight_fields = [\"title\"]\n",
    );
    let toml = Config::load(env.path())
        .unwrap()
        .settings_to_toml()
        .unwrap();
    assert!(toml.contains("hits_per_page = 7"));
    assert!(toml.contains("\"title\""));
    assert!(!toml.contains("\"description\""));
}
