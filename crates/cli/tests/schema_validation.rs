//! Validates `tycat run --output json` against schema/report-schema.json.

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::Path;

fn validator() -> jsonschema::Validator {
    let schema_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/report-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = cargo_bin_cmd!("tycat")
        .current_dir(Path::new(env!("CARGO_MANIFEST_DIR")).join("../.."))
        .args(["--output", "json", "run"])
        .args(args)
        .output()
        .unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn full_report_matches_schema() {
    let validator = validator();
    let report = run_json(&[]);
    let errors: Vec<String> = validator
        .iter_errors(&report)
        .map(|e| format!("{}", e))
        .collect();
    assert!(errors.is_empty(), "schema violations:\n{}", errors.join("\n"));
}

#[test]
fn schema_rejects_unknown_status() {
    let validator = validator();
    let mut report = run_json(&["--only", "enum"]);
    report["entries"][0]["status"] = serde_json::json!("maybe");
    assert!(!validator.is_valid(&report));
}
