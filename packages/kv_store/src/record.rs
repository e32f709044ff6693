//! Persisted record encoding with dual stored-shape tolerance.
//!
//! New records are written as a keyed record `{ id, object }`. Reads also
//! accept a bare `MediaObject` encoding left behind by an earlier layout, so
//! both shapes normalize to a bare object. Anything else is treated as
//! absent, never as a failure.

use mediastore_store::{Key, MediaObject, StoreError};
use serde::{Deserialize, Serialize};

use crate::redb_store::BACKEND;

/// The current on-disk shape: the object wrapped with its own key.
#[derive(Serialize, Deserialize)]
struct KeyedRecord {
    id: String,
    object: MediaObject,
}

/// Encode `object` in the keyed-record shape.
pub(crate) fn encode(key: &Key, object: &MediaObject) -> Result<Vec<u8>, StoreError> {
    let record = KeyedRecord {
        id: key.as_str().to_string(),
        object: object.clone(),
    };
    bincode::serialize(&record).map_err(|e| StoreError::substrate(BACKEND, "encode", e))
}

/// Decode a stored value, tolerating both shapes.
///
/// Returns `None` for a record that decodes as neither shape, or whose
/// embedded id does not match the requested key. Both cases are logged;
/// shape-check failures read as absent by design of the contract.
pub(crate) fn decode(key: &Key, bytes: &[u8]) -> Option<MediaObject> {
    if let Ok(record) = bincode::deserialize::<KeyedRecord>(bytes) {
        if record.id == key.as_str() {
            return Some(record.object);
        }
    }
    if let Ok(object) = bincode::deserialize::<MediaObject>(bytes) {
        return Some(object);
    }
    log::warn!(
        "discarding malformed record for key '{}' ({} bytes); treating as absent",
        key,
        bytes.len()
    );
    None
}
