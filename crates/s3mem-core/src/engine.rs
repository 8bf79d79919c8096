//! The storage engine facade.
//!
//! [`StorageEngine`] owns the [`BucketRegistry`] behind one
//! [`parking_lot::RwLock`]. Read-only operations share the lock; every
//! mutation holds it exclusively for its whole duration, so each call is
//! atomic and all calls form a single total order. Nothing that crosses the
//! lock boundary is a live reference: objects come back as
//! [`ObjectSnapshot`]s.
//!
//! The engine is an explicit value. Share it with `Arc<StorageEngine>`.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::{Credentials, S3MemConfig};
use crate::error::StorageResult;
use crate::state::{
    BucketRegistry, BucketSummary, CompletedPart, ObjectSnapshot, ObjectSummary,
};
use crate::utils::{generate_etag, generate_upload_id};
use crate::validation::{
    validate_bucket_name, validate_object_path, validate_part_number, validate_tags,
};

/// Thread-safe in-memory bucket and object store.
#[derive(Debug)]
pub struct StorageEngine {
    credentials: Credentials,
    registry: RwLock<BucketRegistry>,
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new(Credentials::default())
    }
}

impl StorageEngine {
    /// Create an empty engine holding the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            registry: RwLock::new(BucketRegistry::new()),
        }
    }

    /// Create an empty engine from configuration.
    #[must_use]
    pub fn from_config(config: &S3MemConfig) -> Self {
        Self::new(config.credentials())
    }

    /// The static credential pair. Not validated by the engine.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // -----------------------------------------------------------------------
    // Buckets
    // -----------------------------------------------------------------------

    /// Whether the bucket exists.
    #[must_use]
    pub fn bucket_exists(&self, name: &str) -> bool {
        self.registry.read().exists(name)
    }

    /// All buckets, sorted by name.
    #[must_use]
    pub fn list_buckets(&self) -> Vec<BucketSummary> {
        self.registry.read().list()
    }

    /// Create a bucket.
    ///
    /// Returns `Ok(false)` if the name is already taken; the existing bucket is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidRequest`](crate::StorageError::InvalidRequest)
    /// for an empty name.
    pub fn create_bucket(&self, name: &str) -> StorageResult<bool> {
        validate_bucket_name(name)?;
        Ok(self.registry.write().create(name))
    }

    /// Delete a bucket. Deleting a missing bucket succeeds.
    ///
    /// # Errors
    ///
    /// [`StorageError::BucketNotEmpty`](crate::StorageError::BucketNotEmpty)
    /// if the bucket holds objects and `force` is false.
    pub fn delete_bucket(&self, name: &str, force: bool) -> StorageResult<()> {
        validate_bucket_name(name)?;
        self.registry.write().delete(name, force)
    }

    /// Overwrite a bucket policy. Returns `Ok(false)` if the bucket is absent.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for an empty name.
    pub fn set_bucket_policy(&self, name: &str, policy: impl Into<String>) -> StorageResult<bool> {
        validate_bucket_name(name)?;
        let updated = self.registry.write().set_policy(name, policy.into());
        if updated {
            debug!(bucket = %name, "bucket policy updated");
        }
        Ok(updated)
    }

    /// A bucket's policy, `None` if the bucket is absent.
    #[must_use]
    pub fn get_bucket_policy(&self, name: &str) -> Option<String> {
        self.registry.read().get_policy(name)
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// Copy out an object.
    ///
    /// Objects with an open multipart upload are returned too, with no payload.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` or `NoSuchKey`.
    pub fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectSnapshot> {
        validate_object_path(bucket, key)?;
        self.registry.read().get_object(bucket, key)
    }

    /// Store an object under a caller-supplied etag, replacing any existing
    /// record (including an open upload) and resetting its tags.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for empty names, `NoSuchBucket` if the bucket is absent.
    pub fn put_object(
        &self,
        bucket: &str,
        key: &str,
        etag: impl Into<String>,
        data: Bytes,
    ) -> StorageResult<()> {
        validate_object_path(bucket, key)?;
        let size = data.len();
        self.registry
            .write()
            .put_object(bucket, key, etag.into(), data)?;
        debug!(bucket = %bucket, key = %key, size, "object stored");
        Ok(())
    }

    /// Remove an object and any in-flight parts.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` or `NoSuchKey`.
    pub fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        validate_object_path(bucket, key)?;
        self.registry.write().delete_object(bucket, key)?;
        debug!(bucket = %bucket, key = %key, "object deleted");
        Ok(())
    }

    /// Replace an object's tag set.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` if the tag set breaks the tagging limits (see
    /// [`validate_tags`]), `NoSuchBucket` or `NoSuchKey`.
    pub fn put_object_tagging(
        &self,
        bucket: &str,
        key: &str,
        tags: Vec<(String, String)>,
    ) -> StorageResult<()> {
        validate_object_path(bucket, key)?;
        validate_tags(&tags)?;
        let count = tags.len();
        self.registry
            .write()
            .set_tags(bucket, key, tags.into_iter().collect())?;
        debug!(bucket = %bucket, key = %key, count, "object tags replaced");
        Ok(())
    }

    /// Clear an object's tag set.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` or `NoSuchKey`.
    pub fn delete_object_tagging(&self, bucket: &str, key: &str) -> StorageResult<()> {
        validate_object_path(bucket, key)?;
        self.registry.write().set_tags(bucket, key, BTreeMap::new())
    }

    /// An object's tags.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` or `NoSuchKey`.
    pub fn get_object_tagging(
        &self,
        bucket: &str,
        key: &str,
    ) -> StorageResult<BTreeMap<String, String>> {
        validate_object_path(bucket, key)?;
        self.registry.read().get_tags(bucket, key)
    }

    /// Readable objects whose key starts with `prefix`, sorted by key.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`.
    pub fn list_objects(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectSummary>> {
        validate_bucket_name(bucket)?;
        self.registry.read().list_objects(bucket, prefix)
    }

    // -----------------------------------------------------------------------
    // Multipart uploads
    // -----------------------------------------------------------------------

    /// Open a multipart upload and return its ID.
    ///
    /// An existing object with the same key is replaced.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for empty names, `NoSuchBucket` if the bucket is absent.
    pub fn create_multipart_upload(&self, bucket: &str, key: &str) -> StorageResult<String> {
        validate_object_path(bucket, key)?;
        let upload_id = generate_upload_id();
        self.registry
            .write()
            .create_upload(bucket, key, upload_id.clone())?;
        info!(bucket = %bucket, key = %key, upload_id = %upload_id, "multipart upload initiated");
        Ok(upload_id)
    }

    /// Store one part and return its etag.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for a part number outside `1..=10000`, `NoSuchBucket`,
    /// or `NoSuchUpload` if the object has no open upload.
    pub fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        data: Bytes,
    ) -> StorageResult<String> {
        validate_object_path(bucket, key)?;
        validate_part_number(part_number)?;
        let etag = generate_etag();
        let size = data.len();
        self.registry
            .write()
            .upload_part(bucket, key, upload_id, part_number, etag.clone(), data)?;
        debug!(bucket = %bucket, key = %key, part_number, size, "part stored");
        Ok(etag)
    }

    /// Merge the listed parts and return the object's final etag.
    ///
    /// Either every check passes and the object becomes readable, or nothing
    /// changes. Repeating a successful completion returns the same etag.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket`, `NoSuchKey`, `NoSuchUpload`, `InvalidPart`,
    /// `EtagMismatch`, or `InvalidRequest` for an empty or repeated part list.
    pub fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> StorageResult<String> {
        validate_object_path(bucket, key)?;
        let etag = self.registry.write().complete_upload(
            bucket,
            key,
            upload_id,
            parts,
            generate_etag(),
        )?;
        info!(bucket = %bucket, key = %key, upload_id = %upload_id, parts = parts.len(), "multipart upload completed");
        Ok(etag)
    }

    /// Abort an open upload, removing the object record.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` or `NoSuchUpload`.
    pub fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> StorageResult<()> {
        validate_object_path(bucket, key)?;
        self.registry.write().abort_upload(bucket, key, upload_id)?;
        info!(bucket = %bucket, key = %key, upload_id = %upload_id, "multipart upload aborted");
        Ok(())
    }
}
