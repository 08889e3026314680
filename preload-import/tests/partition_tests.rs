use pretty_assertions::assert_eq;
use preload_import::partition::partition;
use preload_import::{parse_relation_key, ImportBatch, ImportError, RelationSpec, DEFAULT_JOIN_PREFIX};
use serde_json::json;

fn batch(value: serde_json::Value) -> ImportBatch {
    ImportBatch::from_json_slice(value.to_string().as_bytes()).unwrap()
}

// ── Partitioning ─────────────────────────────────────────────────

#[test]
fn splits_entities_from_relations() {
    let input = batch(json!({
        "Player": [{"_id": "p1"}],
        "Team": [],
        "_Join:friends:Player:Player": [{"owningId": "p1", "relatedId": "p2"}],
    }));
    let parts = partition(input, DEFAULT_JOIN_PREFIX);

    let entity_names: Vec<&str> = parts.entities.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(entity_names, vec!["Player", "Team"]);
    assert_eq!(parts.relations.len(), 1);
    assert_eq!(parts.relations[0].0, "_Join:friends:Player:Player");
    assert_eq!(parts.relations[0].1.len(), 1);
}

#[test]
fn malformed_relation_names_are_still_relations() {
    let parts = partition(batch(json!({"_Join:bad": []})), DEFAULT_JOIN_PREFIX);
    assert!(parts.entities.is_empty());
    assert_eq!(parts.relations.len(), 1);
}

#[test]
fn custom_prefix() {
    let parts = partition(
        batch(json!({"_Join:a:B:C": [], "@link:a:B:C": []})),
        "@link",
    );
    assert_eq!(parts.entities.len(), 1);
    assert_eq!(parts.entities[0].0, "_Join:a:B:C");
    assert_eq!(parts.relations[0].0, "@link:a:B:C");
}

#[test]
fn empty_batch_partitions_to_nothing() {
    let parts = partition(ImportBatch::new(), DEFAULT_JOIN_PREFIX);
    assert!(parts.entities.is_empty());
    assert!(parts.relations.is_empty());
}

// ── Batch assembly ───────────────────────────────────────────────

#[test]
fn inserting_an_existing_name_appends() {
    let mut b = ImportBatch::new();
    b.insert("Player", vec![json!({"_id": "p1"})]);
    b.insert("Player", vec![json!({"_id": "p2"})]);
    assert_eq!(b.len(), 1);
    assert_eq!(b.get("Player").unwrap().len(), 2);
}

#[test]
fn combined_export_must_map_names_to_lists() {
    assert!(ImportBatch::from_json_slice(br#"{"Player": {"_id": "p1"}}"#).is_err());
    assert!(ImportBatch::from_json_slice(br#"[{"_id": "p1"}]"#).is_err());
    assert!(ImportBatch::from_json_slice(br#"{"Player": [{"_id": "p1"}"#).is_err());
}

// ── Relation names ───────────────────────────────────────────────

#[test]
fn parses_four_segments() {
    let spec = parse_relation_key("_Join:friends:Player:Team").unwrap();
    assert_eq!(
        spec,
        RelationSpec {
            join_prefix: "_Join".into(),
            relation_key: "friends".into(),
            owner_class: "Player".into(),
            target_class: "Team".into(),
        }
    );
    assert_eq!(spec.to_string(), "_Join:friends:Player:Team");
    assert!(spec.references("Team"));
    assert!(!spec.references("Coach"));
}

#[test]
fn display_uses_the_parsed_prefix() {
    let spec = RelationSpec::parse("@link:friends:Player:Player", "@link").unwrap();
    assert_eq!(spec.join_prefix, "@link");
    assert_eq!(spec.to_string(), "@link:friends:Player:Player");
}

#[test]
fn rejects_wrong_segment_counts() {
    for name in ["_Join:bad", "_Join:a:B", "_Join:a:B:C:D", "_Join"] {
        let err = parse_relation_key(name).unwrap_err();
        assert!(
            matches!(&err, ImportError::InvalidRelationKey(n) if n == name),
            "{name}: {err}"
        );
    }
}

#[test]
fn rejects_empty_segments_and_foreign_prefix() {
    assert!(parse_relation_key("_Join::Player:Player").is_err());
    assert!(parse_relation_key("_Join:friends::Player").is_err());
    assert!(parse_relation_key("_Join:friends:Player:").is_err());
    assert!(parse_relation_key("_JoinX:friends:Player:Player").is_err());
}

#[test]
fn invalid_name_error_explains_shape() {
    let msg = parse_relation_key("_Join:bad").unwrap_err().to_string();
    assert!(msg.contains("_Join:bad"));
    assert!(msg.contains("<relationKey>"));
}
