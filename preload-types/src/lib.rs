//! Native value model for preload.
//!
//! This crate defines the storage-agnostic types that decoded records are made of:
//! - [`ObjectRef`]: a reference to an object by class and (optional) identity
//! - [`AttributeValue`]: every native value an attribute can hold, including
//!   the decoded forms of the `__type` envelopes
//! - [`Acl`]: per-object access control (public, role and user grants)
//! - [`Entity`]: one decoded record, ready to be handed to a store
//!
//! Decoding from the exported wire format lives in `preload-import`; storage
//! lives in `preload-store`.

mod acl;
mod entity;
mod object_ref;
mod value;

pub use acl::{AccessFlags, Acl, Principal};
pub use entity::{Entity, ObjectState, ACL_KEY};
pub use object_ref::ObjectRef;
pub use value::{AttributeValue, FileRef, GeoPoint};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid pointer shorthand: {0:?}")]
    InvalidPointer(String),

    #[error("object reference to {0} has no object id")]
    MissingObjectId(String),
}
