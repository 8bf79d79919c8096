//! A bucket and the object registry it owns.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{StorageError, StorageResult};

use super::object::{ObjectSummary, StoredObject};

/// A bucket: metadata plus its objects keyed by name.
#[derive(Debug, Clone)]
pub struct Bucket {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created. Never changes.
    pub created: DateTime<Utc>,
    /// Opaque policy document, empty by default.
    pub policy: String,
    /// Object registry.
    pub objects: BTreeMap<String, StoredObject>,
}

/// A `(name, created)` listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub created: DateTime<Utc>,
}

impl Bucket {
    /// Create an empty bucket stamped with the current time.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            created: Utc::now(),
            policy: String::new(),
            objects: BTreeMap::new(),
        }
    }

    /// Whether the bucket holds no object records (open uploads count).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Listing entry for this bucket.
    #[must_use]
    pub fn summary(&self) -> BucketSummary {
        BucketSummary {
            name: self.name.clone(),
            created: self.created,
        }
    }

    /// Look up an object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoSuchKey`] if the key is absent.
    pub fn get_object(&self, key: &str) -> StorageResult<&StoredObject> {
        self.objects.get(key).ok_or_else(|| self.no_such_key(key))
    }

    /// Look up an object for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoSuchKey`] if the key is absent.
    pub fn get_object_mut(&mut self, key: &str) -> StorageResult<&mut StoredObject> {
        let err = self.no_such_key(key);
        self.objects.get_mut(key).ok_or(err)
    }

    /// Store a fresh object, discarding any previous record (multipart or not).
    pub fn put_object(&mut self, key: &str, etag: String, data: Bytes) {
        self.objects
            .insert(key.to_owned(), StoredObject::new(key, etag, data));
    }

    /// Remove an object together with any in-flight upload state.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoSuchKey`] if the key is absent.
    pub fn delete_object(&mut self, key: &str) -> StorageResult<StoredObject> {
        self.objects.remove(key).ok_or_else(|| self.no_such_key(key))
    }

    /// Readable objects whose key starts with `prefix`, in key order.
    #[must_use]
    pub fn list_objects(&self, prefix: &str) -> Vec<ObjectSummary> {
        self.objects
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter_map(|(_, obj)| obj.summary())
            .collect()
    }

    fn no_such_key(&self, key: &str) -> StorageError {
        StorageError::NoSuchKey {
            bucket: self.name.clone(),
            key: key.to_owned(),
        }
    }
}
