//! Object records and the snapshots handed out across the lock boundary.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::multipart::MultipartUpload;

/// An object as stored inside a bucket.
///
/// While a multipart upload is open, `data` and `etag` are `None` and `size`
/// is zero; they are filled in on completion.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Object key, unique within its bucket.
    pub key: String,
    /// Payload length in bytes.
    pub size: u64,
    /// Etag assigned by the last successful put or merge.
    pub etag: Option<String>,
    /// The payload.
    pub data: Option<Bytes>,
    /// Object tags.
    pub tags: BTreeMap<String, String>,
    /// When the payload was last written.
    pub last_modified: DateTime<Utc>,
    /// Multipart bookkeeping, present once an upload was initiated on this key.
    pub multipart: Option<MultipartUpload>,
}

impl StoredObject {
    /// Create a regular object from a direct put.
    #[must_use]
    pub fn new(key: impl Into<String>, etag: String, data: Bytes) -> Self {
        Self {
            key: key.into(),
            size: data.len() as u64,
            etag: Some(etag),
            data: Some(data),
            tags: BTreeMap::new(),
            last_modified: Utc::now(),
            multipart: None,
        }
    }

    /// Create the placeholder record for a freshly opened multipart upload.
    #[must_use]
    pub fn new_multipart(key: impl Into<String>, upload_id: String) -> Self {
        Self {
            key: key.into(),
            size: 0,
            etag: None,
            data: None,
            tags: BTreeMap::new(),
            last_modified: Utc::now(),
            multipart: Some(MultipartUpload::new(upload_id)),
        }
    }

    /// Whether a multipart upload was ever initiated on this record.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.multipart.is_some()
    }

    /// The upload ID bound to this record, if any.
    #[must_use]
    pub fn upload_id(&self) -> Option<&str> {
        self.multipart.as_ref().map(|u| u.upload_id.as_str())
    }

    /// Whether the payload is defined (direct put or completed upload).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.data.is_some()
    }

    /// Copy the externally visible fields.
    #[must_use]
    pub fn snapshot(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            key: self.key.clone(),
            size: self.size,
            etag: self.etag.clone(),
            data: self.data.clone(),
            tags: self.tags.clone(),
            last_modified: self.last_modified,
            is_multipart: self.is_multipart(),
            upload_id: self.upload_id().map(ToOwned::to_owned),
        }
    }

    /// Listing entry for a readable object; `None` while an upload is open.
    #[must_use]
    pub fn summary(&self) -> Option<ObjectSummary> {
        let etag = self.etag.clone()?;
        self.is_complete().then(|| ObjectSummary {
            key: self.key.clone(),
            size: self.size,
            etag,
            last_modified: self.last_modified,
        })
    }
}

/// An immutable copy of an object, detached from the registry lock.
///
/// Cloning the payload only bumps a reference count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSnapshot {
    /// Object key.
    pub key: String,
    /// Payload length in bytes.
    pub size: u64,
    /// Etag, `None` while a multipart upload is open.
    pub etag: Option<String>,
    /// Payload, `None` while a multipart upload is open.
    pub data: Option<Bytes>,
    /// Object tags.
    pub tags: BTreeMap<String, String>,
    /// When the payload was last written.
    pub last_modified: DateTime<Utc>,
    /// Whether the object was created through a multipart upload.
    pub is_multipart: bool,
    /// The multipart upload ID bound to the object.
    pub upload_id: Option<String>,
}

impl ObjectSnapshot {
    /// Whether the payload is defined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.data.is_some()
    }
}

/// A listing entry for a readable object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Payload length in bytes.
    pub size: u64,
    /// Current etag.
    pub etag: String,
    /// When the payload was last written.
    pub last_modified: DateTime<Utc>,
}
