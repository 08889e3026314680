use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use preload_import::decode::{decode_acl, decode_attribute, parse_date, EnvelopeType};
use preload_import::{decode_record, DecodeError};
use preload_types::{AccessFlags, AttributeValue, FileRef, GeoPoint, ObjectRef, ObjectState};
use proptest::prelude::*;
use serde_json::json;

// ── Identity & timestamps ────────────────────────────────────────

#[test]
fn decodes_identity_and_plain_attributes() {
    let e = decode_record("Player", &json!({"_id": "p1", "name": "Ann", "score": 12})).unwrap();
    assert_eq!(e.class_name, "Player");
    assert_eq!(e.object_id, "p1");
    assert_eq!(e.get_str("name"), Some("Ann"));
    assert_eq!(e.get("score"), Some(&AttributeValue::Json(json!(12))));
    assert_eq!(e.attributes.len(), 2);
}

#[test]
fn decoded_entities_look_fetched() {
    let e = decode_record("Player", &json!({"_id": "p1"})).unwrap();
    assert_eq!(e.state, ObjectState::fetched());
}

#[test]
fn reserved_keys_are_not_attributes() {
    let e = decode_record(
        "Player",
        &json!({
            "_id": "p1",
            "_created_at": "2015-11-23T10:00:00.000Z",
            "_updated_at": "2015-12-01T08:30:15Z",
        }),
    )
    .unwrap();
    assert!(e.attributes.is_empty());
    assert_eq!(e.created_at, Some(Utc.with_ymd_and_hms(2015, 11, 23, 10, 0, 0).unwrap()));
    assert_eq!(e.updated_at, Some(Utc.with_ymd_and_hms(2015, 12, 1, 8, 30, 15).unwrap()));
}

#[test]
fn rest_export_spellings_are_accepted() {
    let e = decode_record(
        "Player",
        &json!({"objectId": "p9", "createdAt": "2016-01-02T03:04:05Z", "name": "Zed"}),
    )
    .unwrap();
    assert_eq!(e.object_id, "p9");
    assert!(e.created_at.is_some());
    assert!(e.get("objectId").is_none());
    assert!(e.get("createdAt").is_none());
}

#[test]
fn underscore_id_wins_over_object_id() {
    let e = decode_record("Player", &json!({"_id": "a", "objectId": "b"})).unwrap();
    assert_eq!(e.object_id, "a");
}

#[test]
fn unparsable_dates_are_absent_not_fatal() {
    let e = decode_record(
        "Player",
        &json!({"_id": "p1", "_created_at": "yesterday", "_updated_at": 42}),
    )
    .unwrap();
    assert_eq!(e.created_at, None);
    assert_eq!(e.updated_at, None);
}

#[test]
fn missing_id_is_fatal() {
    assert_eq!(
        decode_record("Player", &json!({"name": "Ann"})).unwrap_err(),
        DecodeError::MissingObjectId
    );
    assert_eq!(
        decode_record("Player", &json!({"_id": ""})).unwrap_err(),
        DecodeError::MissingObjectId
    );
    assert_eq!(
        decode_record("Player", &json!({"_id": 7})).unwrap_err(),
        DecodeError::MissingObjectId
    );
}

#[test]
fn non_object_record_is_fatal() {
    assert_eq!(
        decode_record("Player", &json!(["p1"])).unwrap_err(),
        DecodeError::NotAnObject
    );
}

// ── Pointer shorthand ────────────────────────────────────────────

#[test]
fn pointer_shorthand_strips_prefix() {
    let e = decode_record("Player", &json!({"_id": "p1", "_p_team": "Team$t1"})).unwrap();
    assert_eq!(e.get_pointer("team"), Some(&ObjectRef::new("Team", "t1")));
    assert!(e.get("_p_team").is_none());
}

#[test]
fn malformed_shorthand_drops_only_that_attribute() {
    let e = decode_record(
        "Player",
        &json!({"_id": "p1", "_p_team": "Team", "_p_coach": 5, "name": "Ann"}),
    )
    .unwrap();
    assert!(e.get("team").is_none());
    assert!(e.get("_p_team").is_none());
    assert!(e.get("coach").is_none());
    assert_eq!(e.get_str("name"), Some("Ann"));
}

// ── Envelopes ────────────────────────────────────────────────────

#[test]
fn pointer_envelope_with_and_without_id() {
    let (_, v) = decode_attribute(
        "team",
        &json!({"__type": "Pointer", "className": "Team", "_id": "t1"}),
    )
    .unwrap();
    assert_eq!(v, AttributeValue::Pointer(ObjectRef::new("Team", "t1")));

    let (_, v) = decode_attribute(
        "team",
        &json!({"__type": "Pointer", "className": "Team", "objectId": "t2"}),
    )
    .unwrap();
    assert_eq!(v, AttributeValue::Pointer(ObjectRef::new("Team", "t2")));

    let (_, v) = decode_attribute("team", &json!({"__type": "Pointer", "className": "Team"})).unwrap();
    assert_eq!(v, AttributeValue::Pointer(ObjectRef::without_id("Team")));
}

#[test]
fn pointer_envelope_without_class_is_omitted() {
    assert!(decode_attribute("team", &json!({"__type": "Pointer", "_id": "t1"})).is_none());
}

#[test]
fn date_envelope() {
    let (_, v) = decode_attribute(
        "birthday",
        &json!({"__type": "Date", "iso": "1990-05-17T00:00:00.000Z"}),
    )
    .unwrap();
    assert_eq!(v, AttributeValue::Date(Utc.with_ymd_and_hms(1990, 5, 17, 0, 0, 0).unwrap()));
    assert!(decode_attribute("birthday", &json!({"__type": "Date"})).is_none());
    assert!(decode_attribute("birthday", &json!({"__type": "Date", "iso": "never"})).is_none());
}

#[test]
fn bytes_envelope_ignores_whitespace() {
    let (_, v) = decode_attribute("blob", &json!({"__type": "Bytes", "base64": "aGVs\nbG8="})).unwrap();
    assert_eq!(v, AttributeValue::Bytes(b"hello".to_vec()));
    assert!(decode_attribute("blob", &json!({"__type": "Bytes"})).is_none());
}

#[test]
fn bytes_envelope_ignores_characters_outside_the_alphabet() {
    let (_, v) = decode_attribute("blob", &json!({"__type": "Bytes", "base64": "aGV*s-bG\t8=!"})).unwrap();
    assert_eq!(v, AttributeValue::Bytes(b"hello".to_vec()));

    let (_, v) = decode_attribute("blob", &json!({"__type": "Bytes", "base64": "%%%"})).unwrap();
    assert_eq!(v, AttributeValue::Bytes(Vec::new()));
}

#[test]
fn bytes_envelope_with_bad_length_is_omitted() {
    assert!(decode_attribute("blob", &json!({"__type": "Bytes", "base64": "aGVsbG8"})).is_none());
}

#[test]
fn file_envelope_needs_url_and_name() {
    let (_, v) = decode_attribute(
        "avatar",
        &json!({"__type": "File", "name": "a.png", "url": "http://files/a.png"}),
    )
    .unwrap();
    assert_eq!(
        v,
        AttributeValue::File(FileRef {
            name: "a.png".into(),
            url: "http://files/a.png".into()
        })
    );
    assert!(decode_attribute("avatar", &json!({"__type": "File", "name": "a.png"})).is_none());
}

#[test]
fn geo_point_envelope_needs_numbers() {
    let (_, v) = decode_attribute(
        "home",
        &json!({"__type": "GeoPoint", "latitude": 45.5, "longitude": -73}),
    )
    .unwrap();
    assert_eq!(v, AttributeValue::GeoPoint(GeoPoint::new(45.5, -73.0)));
    assert!(
        decode_attribute("home", &json!({"__type": "GeoPoint", "latitude": "north", "longitude": 1}))
            .is_none()
    );
}

#[test]
fn unknown_envelope_is_omitted() {
    let e = decode_record(
        "Player",
        &json!({"_id": "p1", "shape": {"__type": "Polygon", "coordinates": []}}),
    )
    .unwrap();
    assert!(e.get("shape").is_none());
}

#[test]
fn envelope_tags_are_a_closed_set() {
    assert_eq!(EnvelopeType::from_tag("GeoPoint"), Some(EnvelopeType::GeoPoint));
    assert_eq!(EnvelopeType::from_tag("Relation"), None);
    assert_eq!(EnvelopeType::from_tag("pointer"), None);
}

#[test]
fn nested_maps_and_lists_are_verbatim() {
    let e = decode_record(
        "Player",
        &json!({"_id": "p1", "stats": {"goals": 3}, "tags": ["a", "b"]}),
    )
    .unwrap();
    assert_eq!(e.get("stats"), Some(&AttributeValue::Json(json!({"goals": 3}))));
    assert_eq!(e.get("tags"), Some(&AttributeValue::Json(json!(["a", "b"]))));
}

// ── ACL ──────────────────────────────────────────────────────────

#[test]
fn acl_principals_are_classified() {
    let e = decode_record(
        "Player",
        &json!({
            "_id": "p1",
            "_acl": {
                "*": {"read": true},
                "role:admin": {"read": true, "write": true},
                "u1": {"write": true}
            }
        }),
    )
    .unwrap();
    let acl = e.acl().unwrap();
    assert_eq!(acl.public_access(), AccessFlags::new(true, false));
    assert_eq!(acl.role_access("admin"), AccessFlags::new(true, true));
    assert_eq!(acl.user_access("u1"), AccessFlags::new(false, true));
    assert_eq!(acl.user_access("u2"), AccessFlags::new(false, false));
}

#[test]
fn acl_non_boolean_flags_deny() {
    let acl = decode_acl(
        json!({"u1": {"read": "yes", "write": 1}})
            .as_object()
            .unwrap(),
    );
    assert_eq!(acl.user_access("u1"), AccessFlags::default());
}

// ── Dates ────────────────────────────────────────────────────────

#[test]
fn parse_date_accepts_offsets_and_naive_times() {
    let expected = Utc.with_ymd_and_hms(2020, 2, 29, 12, 0, 0).unwrap();
    assert_eq!(parse_date(&json!("2020-02-29T14:00:00+02:00")), Some(expected));
    assert_eq!(parse_date(&json!("2020-02-29T12:00:00")), Some(expected));
    assert_eq!(parse_date(&json!("2020-02-29")), None);
    assert_eq!(parse_date(&json!(null)), None);
}

#[test]
fn parse_date_accepts_offsets_without_colon() {
    let expected = Utc.with_ymd_and_hms(2015, 11, 23, 10, 0, 0).unwrap();
    assert_eq!(parse_date(&json!("2015-11-23T10:00:00.000+0000")), Some(expected));
    assert_eq!(parse_date(&json!("2015-11-23T12:00:00+0200")), Some(expected));
}

#[test]
fn parse_date_accepts_times_without_seconds() {
    let expected = Utc.with_ymd_and_hms(2015, 11, 23, 10, 0, 0).unwrap();
    assert_eq!(parse_date(&json!("2015-11-23T10:00Z")), Some(expected));
    assert_eq!(parse_date(&json!("2015-11-23T11:00+01:00")), Some(expected));
    assert_eq!(parse_date(&json!("2015-11-23T11:00+0100")), Some(expected));
    assert_eq!(parse_date(&json!("2015-11-23T10:00")), Some(expected));
}

#[test]
fn record_timestamps_accept_compact_iso_forms() {
    let e = decode_record(
        "Player",
        &json!({
            "_id": "p1",
            "_created_at": "2015-11-23T10:00:00.000+0000",
            "_updated_at": "2015-11-23T10:00Z",
        }),
    )
    .unwrap();
    let expected = Utc.with_ymd_and_hms(2015, 11, 23, 10, 0, 0).unwrap();
    assert_eq!(e.created_at, Some(expected));
    assert_eq!(e.updated_at, Some(expected));
}

proptest! {
    /// A Date envelope decodes back to the instant it encodes, to the second.
    #[test]
    fn date_envelope_round_trips(secs in 0i64..4_102_444_800) {
        let t = Utc.timestamp_opt(secs, 0).unwrap();
        let envelope = json!({"__type": "Date", "iso": t.to_rfc3339()});
        let (_, v) = decode_attribute("at", &envelope).unwrap();
        prop_assert_eq!(v, AttributeValue::Date(t));
    }
}
