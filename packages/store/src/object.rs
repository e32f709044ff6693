//! The stored object: a binary payload with its metadata.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable-at-rest binary payload with associated metadata.
///
/// Mirrors the file-like value the calling application hands over: the raw
/// bytes, a MIME content type, and a last-modified timestamp. The size is
/// the payload length; it is not stored separately.
///
/// Metadata fidelity is substrate-dependent: the database substrate persists
/// the whole object verbatim, while the directory substrate persists only
/// the payload and reconstructs metadata from the filesystem entry on read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaObject {
    /// MIME content type, e.g. `image/png`.
    pub content_type: String,
    /// Last-modified timestamp.
    pub modified: DateTime<Utc>,
    /// The payload bytes.
    pub data: Bytes,
}

impl MediaObject {
    /// Create an object stamped with the current time.
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            modified: Utc::now(),
            data: data.into(),
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
