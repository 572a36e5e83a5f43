//! CLI integration tests for kgs commands.
//!
//! These tests check exit codes and the JSON/text the commands produce, with HOME isolated so a
//! developer's `~/.kgs.toml` never leaks in.

#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to run `kgs` inside `dir` with HOME isolated to it.
fn kgs_in(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("kgs").unwrap();
    cmd.env("HOME", dir).env_remove("KGS_LOG").current_dir(dir);
    cmd
}

/// Strips ANSI escape sequences from a string.
fn strip_ansi(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            output.push(ch);
        }
    }
    output
}

/// Writes a small two-category schema and returns its file name.
fn write_schema(dir: &Path) -> &'static str {
    let schema = json!({
        "Dataset": {
            "order": 1,
            "fields": {
                "title": {"boost": 10, "sort": true, "value": "Title"},
                "species": {"facet": "list", "facetExclusiveSelection": false},
                "hasImages": {"facet": "exists"}
            }
        },
        "Model": {
            "order": 2,
            "fields": {"language": {"facet": "list"}}
        }
    });
    fs::write(dir.join("schema.json"), schema.to_string()).unwrap();
    "schema.json"
}

/// Runs `kgs payload` and parses its stdout.
fn compile_payload(dir: &Path, args: &[&str]) -> Value {
    let output = kgs_in(dir)
        .args(["payload", "--schema", "schema.json"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

mod sanitize {
    use super::*;

    #[test]
    fn augments_single_term() {
        let dir = temp_dir();
        kgs_in(dir.path())
            .args(["sanitize", "brain"])
            .assert()
            .success()
            .stdout("(brain* OR brain* OR brain~)\n");
    }

    #[test]
    fn prints_one_line_per_query() {
        let dir = temp_dir();
        kgs_in(dir.path())
            .args(["sanitize", "the of", "brain (cortex"])
            .assert()
            .success()
            .stdout("the of\nbrain \\(cortex\n");
    }

    #[test]
    fn honours_local_config() {
        let dir = temp_dir();
        let home = temp_dir();
        fs::write(
            dir.path().join(".kgs.toml"),
            "[tweaking]\nmax_terms_trigger = 0\n",
        )
        .unwrap();

        let mut cmd = kgs_in(dir.path());
        cmd.env("HOME", home.path())
            .args(["sanitize", "Brain"])
            .assert()
            .success()
            .stdout("brain\n");
    }

    #[test]
    fn fuzzy_only_config() {
        let dir = temp_dir();
        let home = temp_dir();
        fs::write(
            dir.path().join(".kgs.toml"),
            "[tweaking.wildcard]\nmax_terms = 0\n[tweaking.fuzzy]\nmax_terms = -1\n",
        )
        .unwrap();

        let mut cmd = kgs_in(dir.path());
        cmd.env("HOME", home.path())
            .args(["sanitize", "brain cortex"])
            .assert()
            .success()
            .stdout("brain~ cortex~\n");
    }

    #[test]
    fn requires_a_query() {
        let dir = temp_dir();
        kgs_in(dir.path()).arg("sanitize").assert().failure();
    }
}

mod parse {
    use super::*;

    #[test]
    fn shows_tree_and_terms() {
        let dir = temp_dir();
        let output = kgs_in(dir.path())
            .args(["parse", "brain and title:cortex^2"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        assert!(stdout.contains("Normalized: brain AND title:cortex^2"));
        assert!(stdout.contains("Term(\"brain\")"));
        assert!(stdout.contains("title:Term(\"cortex\") boost=2"));
        let terms = stdout.split("Augmentable terms:").nth(1).unwrap();
        assert!(terms.contains("brain"));
        assert!(!terms.contains("cortex"));
    }

    #[test]
    fn reports_syntax_errors() {
        let dir = temp_dir();
        kgs_in(dir.path())
            .args(["parse", "brain AND"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("dangling operator"));
    }

    #[test]
    fn empty_query_is_not_an_error() {
        let dir = temp_dir();
        kgs_in(dir.path())
            .args(["parse", "  "])
            .assert()
            .success()
            .stdout(predicate::str::contains("empty query"));
    }
}

mod facets {
    use super::*;

    #[test]
    fn lists_facets_as_json() {
        let dir = temp_dir();
        let schema = write_schema(dir.path());
        let output = kgs_in(dir.path())
            .args(["facets", "--schema", schema, "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        let ids: Vec<&str> = json["facets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec!["facet_Dataset_hasImages", "facet_Dataset_species", "facet_Model_language"]
        );
        assert_eq!(json["defaultType"], "Dataset");
        assert_eq!(json["sortOptions"][1]["param"], "title.value.keyword_asc");
    }

    #[test]
    fn filters_by_category() {
        let dir = temp_dir();
        let schema = write_schema(dir.path());
        let output = kgs_in(dir.path())
            .args(["facets", "--schema", schema, "--type", "Model"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        assert!(stdout.contains("facet_Model_language"));
        assert!(!stdout.contains("facet_Dataset_species"));
        assert!(stdout.contains("Default category: Dataset"));
    }

    #[test]
    fn unknown_category_fails() {
        let dir = temp_dir();
        let schema = write_schema(dir.path());
        kgs_in(dir.path())
            .args(["facets", "--schema", schema, "--type", "Nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown category"));
    }

    #[test]
    fn missing_schema_fails() {
        let dir = temp_dir();
        kgs_in(dir.path())
            .args(["facets", "--schema", "missing.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read schema file"));
    }
}

mod payload {
    use super::*;

    #[test]
    fn default_state_is_match_all_with_type_aggregation() {
        let dir = temp_dir();
        write_schema(dir.path());
        let json = compile_payload(dir.path(), &[]);
        assert!(json.get("query").is_none());
        assert_eq!(json["post_filter"], json!({"match_all": {}}));
        assert_eq!(json["size"], 20);
        assert!(json["aggs"]["facet_type"].is_object());
    }

    #[test]
    fn selections_query_and_sort() {
        let dir = temp_dir();
        write_schema(dir.path());
        let json = compile_payload(
            dir.path(),
            &[
                "--query",
                "brain",
                "--type",
                "Dataset",
                "--select",
                "facet_Dataset_species=Rat",
                "--select",
                "facet_Dataset_species=Mouse",
                "--sort",
                "title.value.keyword_asc",
                "--page",
                "2",
            ],
        );

        assert_eq!(
            json["query"]["query_string"]["query"],
            "(brain* OR brain* OR brain~)"
        );
        let must = json["post_filter"]["bool"]["must"].as_array().unwrap();
        assert!(must.contains(&json!({"bool": {"should": [
            {"term": {"species.value.keyword": "Rat"}},
            {"term": {"species.value.keyword": "Mouse"}}
        ]}})));
        assert!(must.contains(&json!({"term": {"type.value": "Dataset"}})));
        assert_eq!(
            json["aggs"]["facet_Dataset_species"]["filter"],
            json!({"term": {"type.value": "Dataset"}})
        );
        assert_eq!(json["sort"], json!([{"title.value.keyword": {"order": "asc"}}]));
        assert_eq!(json["from"], 20);
        assert_eq!(
            json["highlight"],
            json!({"fields": {"title.value": {}}, "encoder": "html"})
        );
    }

    #[test]
    fn exists_selection() {
        let dir = temp_dir();
        write_schema(dir.path());
        let json = compile_payload(
            dir.path(),
            &["--type", "Dataset", "--select", "facet_Dataset_hasImages=true"],
        );
        let must = json["post_filter"]["bool"]["must"].as_array().unwrap();
        assert!(must.contains(&json!({"exists": {"field": "hasImages.value.keyword"}})));
    }

    #[test]
    fn reads_state_file() {
        let dir = temp_dir();
        write_schema(dir.path());
        fs::write(
            dir.path().join("state.json"),
            json!({"queryString": "the", "selectedType": "Model", "hitsPerPage": 5}).to_string(),
        )
        .unwrap();
        let json = compile_payload(dir.path(), &["--state", "state.json"]);
        assert_eq!(json["query"]["query_string"]["query"], "the*");
        assert_eq!(json["size"], 5);
        assert!(json["aggs"]["facet_Model_language"].is_object());
    }

    #[test]
    fn bad_selection_fails() {
        let dir = temp_dir();
        write_schema(dir.path());
        kgs_in(dir.path())
            .args(["payload", "--schema", "schema.json", "--select", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("FACET_ID=VALUE"));

        kgs_in(dir.path())
            .args(["payload", "--schema", "schema.json", "--select", "facet_x=1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown facet: facet_x"));
    }

    #[test]
    fn raw_output_is_single_line() {
        let dir = temp_dir();
        write_schema(dir.path());
        kgs_in(dir.path())
            .args(["payload", "--schema", "schema.json", "--raw"])
            .assert()
            .success()
            .stdout(predicate::str::is_match(r"^\{.*\}\n$").unwrap());
    }
}

mod config {
    use super::*;

    #[test]
    fn prints_defaults() {
        let dir = temp_dir();
        kgs_in(dir.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("max_terms_trigger = 4"))
            .stdout(predicate::str::contains("missing_term = \"Others\""));
    }

    #[test]
    fn reflects_local_overrides() {
        let dir = temp_dir();
        let home = temp_dir();
        fs::write(dir.path().join(".kgs.toml"), "[facets]\ntype_size = 25\n").unwrap();
        let mut cmd = kgs_in(dir.path());
        cmd.env("HOME", home.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("type_size = 25"));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = temp_dir();
        fs::write(dir.path().join(".kgs.toml"), "[tweaking\n").unwrap();
        kgs_in(dir.path())
            .arg("config")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }
}
