//! The bucket registry: every bucket and, transitively, every object.
//!
//! The registry itself is not synchronized. [`crate::engine::StorageEngine`]
//! wraps it in a single reader/writer lock.

use std::collections::BTreeMap;

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

use super::bucket::{Bucket, BucketSummary};
use super::multipart::CompletedPart;
use super::object::{ObjectSnapshot, ObjectSummary};

/// All buckets keyed by name.
#[derive(Debug, Default)]
pub struct BucketRegistry {
    buckets: BTreeMap<String, Bucket>,
}

impl BucketRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- buckets ----

    /// Whether a bucket with this exact name exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// All buckets, ordered by name.
    #[must_use]
    pub fn list(&self) -> Vec<BucketSummary> {
        self.buckets.values().map(Bucket::summary).collect()
    }

    /// Insert an empty bucket. Returns `false` without touching anything if
    /// the name is taken.
    pub fn create(&mut self, name: &str) -> bool {
        if self.buckets.contains_key(name) {
            return false;
        }
        self.buckets
            .insert(name.to_owned(), Bucket::new(name.to_owned()));
        info!(bucket = %name, "bucket created");
        true
    }

    /// Remove a bucket and everything in it.
    ///
    /// A missing bucket is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketNotEmpty`] if the bucket holds objects and
    /// `force` is false.
    pub fn delete(&mut self, name: &str, force: bool) -> StorageResult<()> {
        let Some(bucket) = self.buckets.get(name) else {
            debug!(bucket = %name, "delete of missing bucket ignored");
            return Ok(());
        };
        if !force && !bucket.is_empty() {
            return Err(StorageError::BucketNotEmpty {
                bucket: name.to_owned(),
            });
        }
        if let Some(removed) = self.buckets.remove(name) {
            info!(bucket = %name, objects = removed.objects.len(), force, "bucket deleted");
        }
        Ok(())
    }

    /// Overwrite a bucket's policy. Returns `false` if the bucket is absent.
    pub fn set_policy(&mut self, name: &str, policy: String) -> bool {
        match self.buckets.get_mut(name) {
            Some(bucket) => {
                bucket.policy = policy;
                true
            }
            None => false,
        }
    }

    /// A bucket's policy, `None` if the bucket is absent.
    #[must_use]
    pub fn get_policy(&self, name: &str) -> Option<String> {
        self.buckets.get(name).map(|b| b.policy.clone())
    }

    fn bucket(&self, name: &str) -> StorageResult<&Bucket> {
        self.buckets
            .get(name)
            .ok_or_else(|| StorageError::NoSuchBucket {
                bucket: name.to_owned(),
            })
    }

    fn bucket_mut(&mut self, name: &str) -> StorageResult<&mut Bucket> {
        self.buckets
            .get_mut(name)
            .ok_or_else(|| StorageError::NoSuchBucket {
                bucket: name.to_owned(),
            })
    }

    // ---- objects ----

    /// Copy out an object.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`] or [`StorageError::NoSuchKey`].
    pub fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectSnapshot> {
        self.bucket(bucket)?
            .get_object(key)
            .map(super::object::StoredObject::snapshot)
    }

    /// Store an object, replacing any previous record and its tags.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`].
    pub fn put_object(
        &mut self,
        bucket: &str,
        key: &str,
        etag: String,
        data: Bytes,
    ) -> StorageResult<()> {
        self.bucket_mut(bucket)?.put_object(key, etag, data);
        Ok(())
    }

    /// Remove an object including any in-flight parts.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`] or [`StorageError::NoSuchKey`].
    pub fn delete_object(&mut self, bucket: &str, key: &str) -> StorageResult<()> {
        self.bucket_mut(bucket)?.delete_object(key).map(|_| ())
    }

    /// Replace an object's tag set wholesale.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`] or [`StorageError::NoSuchKey`].
    pub fn set_tags(
        &mut self,
        bucket: &str,
        key: &str,
        tags: BTreeMap<String, String>,
    ) -> StorageResult<()> {
        self.bucket_mut(bucket)?.get_object_mut(key)?.tags = tags;
        Ok(())
    }

    /// An object's tags.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`] or [`StorageError::NoSuchKey`].
    pub fn get_tags(&self, bucket: &str, key: &str) -> StorageResult<BTreeMap<String, String>> {
        Ok(self.bucket(bucket)?.get_object(key)?.tags.clone())
    }

    /// Readable objects in a bucket whose key starts with `prefix`.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`].
    pub fn list_objects(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectSummary>> {
        Ok(self.bucket(bucket)?.list_objects(prefix))
    }

    // ---- multipart ----

    /// Open an upload on `key`.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`].
    pub fn create_upload(&mut self, bucket: &str, key: &str, upload_id: String) -> StorageResult<()> {
        self.bucket_mut(bucket)?.create_upload(key, upload_id);
        Ok(())
    }

    /// Store one part of an open upload.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`] or [`StorageError::NoSuchUpload`].
    pub fn upload_part(
        &mut self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        etag: String,
        data: Bytes,
    ) -> StorageResult<()> {
        self.bucket_mut(bucket)?
            .upload_part(key, upload_id, part_number, etag, data)
    }

    /// Merge the listed parts into the object.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`] plus anything from [`Bucket::complete_upload`].
    pub fn complete_upload(
        &mut self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
        final_etag: String,
    ) -> StorageResult<String> {
        self.bucket_mut(bucket)?
            .complete_upload(key, upload_id, parts, final_etag)
    }

    /// Drop an open upload.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoSuchBucket`] or [`StorageError::NoSuchUpload`].
    pub fn abort_upload(&mut self, bucket: &str, key: &str, upload_id: &str) -> StorageResult<()> {
        self.bucket_mut(bucket)?.abort_upload(key, upload_id)
    }
}
