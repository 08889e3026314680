use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Acl, ObjectRef};

/// A reference to a hosted file.
///
/// Only the name and location are imported; file contents are never fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub url: String,
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// The native value held by one attribute of an [`crate::Entity`].
///
/// `Json` carries scalars, lists and plain nested maps verbatim. Every other
/// variant is the decoded form of a typed envelope, pointer shorthand or ACL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Json(serde_json::Value),
    Pointer(ObjectRef),
    Date(DateTime<Utc>),
    Bytes(Vec<u8>),
    File(FileRef),
    GeoPoint(GeoPoint),
    Acl(Acl),
}

impl AttributeValue {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string if this is a verbatim JSON string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(|v| v.as_str())
    }

    pub fn as_pointer(&self) -> Option<&ObjectRef> {
        match self {
            Self::Pointer(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_geo_point(&self) -> Option<GeoPoint> {
        match self {
            Self::GeoPoint(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_acl(&self) -> Option<&Acl> {
        match self {
            Self::Acl(a) => Some(a),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<ObjectRef> for AttributeValue {
    fn from(value: ObjectRef) -> Self {
        Self::Pointer(value)
    }
}

impl From<Acl> for AttributeValue {
    fn from(value: Acl) -> Self {
        Self::Acl(value)
    }
}
