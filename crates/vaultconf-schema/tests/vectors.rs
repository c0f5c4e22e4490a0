//! Integration tests: run the document vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: record kind, direction, input, and optional catalog and mode
//! - expect.json: `{"ok": <output>}` or `{"error": {"kind", "path"}}`
//!
//! Expand inputs are trees and outputs are wire JSON; flatten goes the
//! other way.

use serde_json::{Value, json};
use std::path::PathBuf;
use vaultconf_kernel::{TransformError, record_from_json, record_to_json};
use vaultconf_schema::{
    DocumentContext, RecordKind, ResolveMode, RightsCatalog, expand_document, flatten_document,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(path: &PathBuf) -> Value {
    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn error_kind(err: &TransformError) -> &'static str {
    match err {
        TransformError::Shape { .. } => "shape",
        TransformError::Validation { .. } => "validation",
        TransformError::Decode { .. } => "decode",
    }
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case = read_json(&dir.join("case.json"));
    let expected = read_json(&dir.join("expect.json"));

    let kind: RecordKind = case["kind"]
        .as_str()
        .expect("missing kind field")
        .parse()
        .unwrap_or_else(|e| panic!("bad kind in {name}: {e}"));
    let catalog: RightsCatalog = case
        .get("catalog")
        .map(|raw| serde_json::from_value(raw.clone()).expect("catalog must be a string map"))
        .unwrap_or_default();
    let mode: ResolveMode = case
        .get("mode")
        .map(|raw| serde_json::from_value(raw.clone()).expect("mode must be strict or lenient"))
        .unwrap_or_default();
    let context = DocumentContext::new(&catalog).with_mode(mode);

    let input = case["input"].clone();
    let result = match case["direction"].as_str() {
        Some("expand") => {
            let tree = record_from_json(input).expect("expand input must be an object");
            expand_document(kind, &tree, &context)
        }
        Some("flatten") => {
            flatten_document(kind, input, &context).map(|tree| record_to_json(&tree))
        }
        other => panic!("unknown direction {other:?} in {name}"),
    };

    let got = match result {
        Ok(output) => json!({ "ok": output }),
        Err(err) => json!({
            "error": { "kind": error_kind(&err), "path": err.path().to_string() }
        }),
    };

    assert_eq!(
        got,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&got).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn group_mapping_pairs() {
    run_fixture("group_mapping_pairs");
}

#[test]
fn group_mapping_flat_map() {
    run_fixture("group_mapping_flat_map");
}

#[test]
fn group_mapping_conflict() {
    run_fixture("group_mapping_conflict");
}

#[test]
fn challenge_rule_promotion() {
    run_fixture("challenge_rule_promotion");
}

#[test]
fn challenge_rule_out_of_domain() {
    run_fixture("challenge_rule_out_of_domain");
}

#[test]
fn challenge_rule_unsupported_condition() {
    run_fixture("challenge_rule_unsupported_condition");
}

#[test]
fn permissions_strict_unknown_right() {
    run_fixture("permissions_strict_unknown_right");
}

#[test]
fn permissions_lenient_drops_unknown() {
    run_fixture("permissions_lenient_drops_unknown");
}

#[test]
fn approvers_empty_encoding() {
    run_fixture("approvers_empty_encoding");
}

#[test]
fn approvers_missing_backup() {
    run_fixture("approvers_missing_backup");
}

#[test]
fn approvers_malformed_encoding() {
    run_fixture("approvers_malformed_encoding");
}

#[test]
fn settings_nested_country_code() {
    run_fixture("settings_nested_country_code");
}

#[test]
fn settings_two_blocks() {
    run_fixture("settings_two_blocks");
}

#[test]
fn policy_expand() {
    run_fixture("policy_expand");
}

#[test]
fn command_parameter_missing_type() {
    run_fixture("command_parameter_missing_type");
}
