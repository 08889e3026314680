//! Value decoder: exported JSON record -> [`Entity`].
//!
//! Decoding is two-pass. Reserved identity and timestamp keys are pulled out
//! into typed fields first, then every remaining attribute is decoded on its
//! own. A bad attribute is dropped; only a record that is not an object or
//! has no identity fails as a whole.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, NaiveDateTime, Utc};
use preload_types::{
    AccessFlags, Acl, AttributeValue, Entity, FileRef, GeoPoint, ObjectRef, Principal,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::DecodeError;

/// Key prefix of the `Class$objectId` pointer shorthand.
pub const POINTER_PREFIX: &str = "_p_";

pub use preload_types::ACL_KEY;

/// Key that tags a nested object as a typed envelope.
pub const TYPE_KEY: &str = "__type";

// Reserved keys, database-dump spelling first.
const ID_KEYS: [&str; 2] = ["_id", "objectId"];
const CREATED_AT_KEYS: [&str; 2] = ["_created_at", "createdAt"];
const UPDATED_AT_KEYS: [&str; 2] = ["_updated_at", "updatedAt"];

// ISO-8601 shapes tried after RFC 3339.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// The closed set of `__type` envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeType {
    Pointer,
    Date,
    Bytes,
    File,
    GeoPoint,
}

impl EnvelopeType {
    /// Maps a `__type` tag to its envelope, `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Pointer" => Some(Self::Pointer),
            "Date" => Some(Self::Date),
            "Bytes" => Some(Self::Bytes),
            "File" => Some(Self::File),
            "GeoPoint" => Some(Self::GeoPoint),
            _ => None,
        }
    }

    /// Decodes the envelope's fields. `None` when a required field is
    /// missing or malformed.
    pub fn decode(self, fields: &Map<String, Value>) -> Option<AttributeValue> {
        match self {
            Self::Pointer => decode_pointer(fields),
            Self::Date => decode_date(fields),
            Self::Bytes => decode_bytes(fields),
            Self::File => decode_file(fields),
            Self::GeoPoint => decode_geo_point(fields),
        }
    }
}

/// Decodes one exported record of `class_name`.
pub fn decode_record(class_name: &str, record: &Value) -> Result<Entity, DecodeError> {
    let fields = record.as_object().ok_or(DecodeError::NotAnObject)?;

    // Pass 1: reserved keys.
    let object_id = first_str(fields, &ID_KEYS).ok_or(DecodeError::MissingObjectId)?;
    let mut entity = Entity::new(class_name, object_id);
    entity.created_at = first_value(fields, &CREATED_AT_KEYS).and_then(parse_date);
    entity.updated_at = first_value(fields, &UPDATED_AT_KEYS).and_then(parse_date);

    // Pass 2: everything else.
    let remaining = fields.iter().filter(|(key, _)| !is_reserved(key));
    for (key, value) in remaining {
        if let Some((name, decoded)) = decode_attribute(key, value) {
            entity.attributes.insert(name, decoded);
        }
    }

    Ok(entity)
}

/// Decodes one attribute, returning the stored key and value, or `None` if
/// the attribute is dropped.
pub fn decode_attribute(key: &str, value: &Value) -> Option<(String, AttributeValue)> {
    if let Some(name) = key.strip_prefix(POINTER_PREFIX) {
        return match value.as_str().map(ObjectRef::parse_shorthand) {
            Some(Ok(pointer)) => Some((name.to_string(), AttributeValue::Pointer(pointer))),
            Some(Err(e)) => {
                warn!("Dropping attribute {key}: {e}");
                None
            }
            None => {
                warn!("Dropping attribute {key}: pointer shorthand is not a string");
                None
            }
        };
    }

    if let Some(fields) = value.as_object() {
        if let Some(tag) = fields.get(TYPE_KEY).and_then(Value::as_str) {
            let decoded = EnvelopeType::from_tag(tag).and_then(|t| t.decode(fields));
            if decoded.is_none() {
                debug!("Omitting attribute {key}: unusable {tag} envelope");
            }
            return decoded.map(|v| (key.to_string(), v));
        }
        if key == ACL_KEY {
            return Some((key.to_string(), AttributeValue::Acl(decode_acl(fields))));
        }
    }

    Some((key.to_string(), AttributeValue::Json(value.clone())))
}

/// Decodes an ACL map of `principal -> {read, write}`.
///
/// Flags that are absent or not `true` deny access.
pub fn decode_acl(fields: &Map<String, Value>) -> Acl {
    let mut acl = Acl::new();
    for (key, grant) in fields {
        let flag = |name: &str| grant.get(name).and_then(Value::as_bool) == Some(true);
        acl.set_access(Principal::from_key(key), AccessFlags::new(flag("read"), flag("write")));
    }
    acl
}

/// Parses an ISO-8601 timestamp. Anything unparsable is treated as absent.
///
/// Accepts `Z` or numeric offsets with or without a colon, and times with or
/// without seconds. Timestamps without an offset are taken as UTC.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let zoned = s
        .strip_suffix('Z')
        .or_else(|| s.strip_suffix('z'))
        .map(|local| format!("{local}+0000"));
    let with_offset = zoned.as_deref().unwrap_or(s);
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(with_offset, format).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .map(|naive| naive.and_utc())
        })
}

fn decode_pointer(fields: &Map<String, Value>) -> Option<AttributeValue> {
    let class_name = fields.get("className")?.as_str()?;
    let pointer = match first_str(fields, &ID_KEYS) {
        Some(id) => ObjectRef::new(class_name, id),
        None => ObjectRef::without_id(class_name),
    };
    Some(AttributeValue::Pointer(pointer))
}

fn decode_date(fields: &Map<String, Value>) -> Option<AttributeValue> {
    fields.get("iso").and_then(parse_date).map(AttributeValue::Date)
}

/// Characters outside the base64 alphabet (line breaks, stray punctuation)
/// are ignored before decoding.
fn decode_bytes(fields: &Map<String, Value>) -> Option<AttributeValue> {
    let encoded: String = fields
        .get("base64")?
        .as_str()?
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '+' | '/' | '='))
        .collect();
    STANDARD.decode(encoded).ok().map(AttributeValue::Bytes)
}

fn decode_file(fields: &Map<String, Value>) -> Option<AttributeValue> {
    let url = fields.get("url")?.as_str()?;
    let name = fields.get("name")?.as_str()?;
    Some(AttributeValue::File(FileRef {
        name: name.to_string(),
        url: url.to_string(),
    }))
}

fn decode_geo_point(fields: &Map<String, Value>) -> Option<AttributeValue> {
    let latitude = fields.get("latitude")?.as_f64()?;
    let longitude = fields.get("longitude")?.as_f64()?;
    Some(AttributeValue::GeoPoint(GeoPoint::new(latitude, longitude)))
}

fn is_reserved(key: &str) -> bool {
    ID_KEYS.contains(&key) || CREATED_AT_KEYS.contains(&key) || UPDATED_AT_KEYS.contains(&key)
}

fn first_value<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| fields.get(*k))
}

fn first_str<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| fields.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}
