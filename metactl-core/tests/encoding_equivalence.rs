//! The same document saved as `metadata.yaml` or `metadata.json` must decode
//! to an identical in-memory value.
//!
//! Each `#[case]` writes into its own temp directory; no shared state.

use assert_fs::prelude::*;
use assert_fs::TempDir;
use metactl_core::{format, MetadataDocument, MetadataFormat};
use predicates::prelude::*;
use rstest::rstest;
use serde_json::json;

fn load_from(file_name: &str, contents: &str) -> MetadataDocument {
    let dir = TempDir::new().unwrap();
    dir.child(file_name).write_str(contents).unwrap();
    format::load(dir.path()).expect("load").document
}

#[rstest]
#[case::empty_tables("tables: []\n", r#"{"tables": []}"#)]
#[case::nested(
    "version: 2\ntables:\n  - table:\n      schema: public\n      name: users\n    object_relationships: []\n",
    r#"{"version": 2, "tables": [{"table": {"schema": "public", "name": "users"}, "object_relationships": []}]}"#
)]
#[case::scalars(
    "flag: true\nratio: 0.5\ncount: -3\nnothing: null\nlabel: \"42\"\n",
    r#"{"flag": true, "ratio": 0.5, "count": -3, "nothing": null, "label": "42"}"#
)]
#[case::unicode(
    "name: \"пользователь-api\"\nnote: \"日本語・한국어\"\n",
    r#"{"name": "пользователь-api", "note": "日本語・한국어"}"#
)]
#[case::top_level_array("- a\n- b\n", r#"["a", "b"]"#)]
#[case::merge_keys(
    "defaults: &defaults\n  schema: public\n  is_enum: false\ntables:\n  - <<: *defaults\n    name: users\n  - <<: *defaults\n    name: roles\n    is_enum: true\n",
    r#"{"defaults": {"schema": "public", "is_enum": false}, "tables": [{"schema": "public", "is_enum": false, "name": "users"}, {"schema": "public", "is_enum": true, "name": "roles"}]}"#
)]
fn yaml_and_json_decode_identically(#[case] yaml: &str, #[case] json_text: &str) {
    let from_yaml = load_from("metadata.yaml", yaml);
    let from_json = load_from("metadata.json", json_text);
    assert_eq!(from_yaml, from_json);
}

#[test]
fn json_is_valid_yaml_input() {
    let doc = load_from("metadata.yaml", r#"{"tables": []}"#);
    assert_eq!(doc.as_value(), &json!({"tables": []}));
}

#[test]
fn canonical_text_reloads_to_same_document() {
    let original = MetadataDocument::from(json!({
        "version": 2,
        "tables": [{"table": {"schema": "public", "name": "users"}}],
        "remote_schemas": []
    }));
    let text = original.to_canonical_string().unwrap();

    let dir = TempDir::new().unwrap();
    let target = dir.child(MetadataFormat::CANONICAL.file_name());
    target.write_str(&text).unwrap();
    target.assert(predicate::str::contains("\"remote_schemas\": []"));

    let reloaded = format::load(dir.path()).unwrap();
    assert_eq!(reloaded.format, MetadataFormat::Json);
    assert_eq!(reloaded.document, original);
}

#[test]
fn malformed_yaml_reports_yaml_decode_error() {
    let dir = TempDir::new().unwrap();
    dir.child("metadata.yaml").write_str("tables: [\n").unwrap();
    // A valid JSON sibling is not a fallback for a broken YAML file.
    dir.child("metadata.json").write_str("{}").unwrap();

    let err = format::load(dir.path()).unwrap_err();
    match err {
        metactl_core::FormatError::Decode { format, path, .. } => {
            assert_eq!(format, MetadataFormat::Yaml);
            assert!(path.ends_with("metadata.yaml"));
        }
        other => panic!("expected Decode, got {other:?}"),
    }
}
