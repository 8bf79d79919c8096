//! Multipart upload state and the merge coordinator.
//!
//! A [`MultipartUpload`] is attached to the [`StoredObject`] it will produce.
//! Its lifecycle is `Absent -> Open -> Completed`; an open upload can also be
//! aborted, which removes the object record altogether. The coordinator
//! methods live on [`Bucket`] because every step reads or replaces entries in
//! the bucket's object map.

use std::collections::{BTreeMap, BTreeSet};

use bytes::{Bytes, BytesMut};
use chrono::Utc;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

use super::bucket::Bucket;
use super::object::StoredObject;

/// Lifecycle status of a multipart upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    /// Parts may still be uploaded; the object has no readable payload.
    Open,
    /// Parts were merged into the object's payload.
    Completed,
}

/// A single uploaded part.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// The part number (1-based).
    pub part_number: u32,
    /// The etag assigned when the part was stored.
    pub etag: String,
    /// The part payload.
    pub data: Bytes,
}

impl UploadPart {
    /// Create a part.
    #[must_use]
    pub fn new(part_number: u32, etag: String, data: Bytes) -> Self {
        Self {
            part_number,
            etag,
            data,
        }
    }
}

/// A `{part number, etag}` pair supplied when completing an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// The part number to include.
    pub part_number: u32,
    /// The etag the caller received for that part.
    pub etag: String,
}

impl CompletedPart {
    /// Create a completed-part reference.
    #[must_use]
    pub fn new(part_number: u32, etag: impl Into<String>) -> Self {
        Self {
            part_number,
            etag: etag.into(),
        }
    }
}

/// Upload bookkeeping bound to one object.
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    /// Session token handed out at initiation.
    pub upload_id: String,
    /// Current lifecycle status.
    pub status: UploadStatus,
    /// Parts uploaded so far, keyed by part number. Retained after completion.
    pub parts: BTreeMap<u32, UploadPart>,
    /// The etag assigned on completion.
    pub final_etag: Option<String>,
}

impl MultipartUpload {
    /// Create an open upload with no parts.
    #[must_use]
    pub fn new(upload_id: String) -> Self {
        Self {
            upload_id,
            status: UploadStatus::Open,
            parts: BTreeMap::new(),
            final_etag: None,
        }
    }

    /// Whether parts can still be uploaded.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == UploadStatus::Open
    }

    /// Insert or replace a part.
    pub fn put_part(&mut self, part: UploadPart) {
        self.parts.insert(part.part_number, part);
    }

    /// Get a part by its number.
    #[must_use]
    pub fn get_part(&self, part_number: u32) -> Option<&UploadPart> {
        self.parts.get(&part_number)
    }

    /// Concatenate the requested parts in ascending part-number order.
    ///
    /// Nothing is mutated; a failure leaves the upload exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidRequest`] for an empty list or a repeated number.
    /// - [`StorageError::InvalidPart`] if a number was never uploaded.
    /// - [`StorageError::EtagMismatch`] if a supplied etag differs from the stored one.
    pub fn merge(&self, requested: &[CompletedPart]) -> StorageResult<Bytes> {
        if requested.is_empty() {
            return Err(StorageError::invalid_request(
                "You must specify at least one part",
            ));
        }

        let mut sorted: Vec<&CompletedPart> = requested.iter().collect();
        sorted.sort_by_key(|p| p.part_number);

        let mut seen = BTreeSet::new();
        let mut total = 0usize;
        for wanted in &sorted {
            if !seen.insert(wanted.part_number) {
                return Err(StorageError::invalid_request(format!(
                    "Part number {} was listed more than once",
                    wanted.part_number
                )));
            }
            let stored = self
                .get_part(wanted.part_number)
                .ok_or(StorageError::InvalidPart {
                    part_number: wanted.part_number,
                })?;
            if strip_quotes(&stored.etag) != strip_quotes(&wanted.etag) {
                return Err(StorageError::EtagMismatch {
                    part_number: wanted.part_number,
                    expected: stored.etag.clone(),
                    actual: wanted.etag.clone(),
                });
            }
            total += stored.data.len();
        }

        let mut merged = BytesMut::with_capacity(total);
        for wanted in sorted {
            if let Some(part) = self.get_part(wanted.part_number) {
                merged.extend_from_slice(&part.data);
            }
        }
        Ok(merged.freeze())
    }
}

/// Etags travel quoted on the wire; compare them without the quotes.
fn strip_quotes(etag: &str) -> &str {
    etag.trim_matches('"')
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

impl Bucket {
    /// Open a new upload on `key`, replacing any object of that name.
    pub fn create_upload(&mut self, key: &str, upload_id: String) {
        let replaced = self
            .objects
            .insert(key.to_owned(), StoredObject::new_multipart(key, upload_id));
        if replaced.is_some() {
            debug!(bucket = %self.name, key, "multipart upload replaced existing object");
        }
    }

    /// Store one part of an open upload, overwriting any part with the same number.
    ///
    /// The supplied upload ID is not compared with the object's own.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoSuchUpload`] if `key` has no open upload.
    pub fn upload_part(
        &mut self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        etag: String,
        data: Bytes,
    ) -> StorageResult<()> {
        let upload = self
            .objects
            .get_mut(key)
            .and_then(|obj| obj.multipart.as_mut())
            .filter(|upload| upload.is_open())
            .ok_or_else(|| StorageError::NoSuchUpload {
                upload_id: upload_id.to_owned(),
            })?;

        if upload.upload_id != upload_id {
            debug!(
                bucket = %self.name,
                key,
                expected = %upload.upload_id,
                supplied = upload_id,
                "part uploaded with a foreign upload id"
            );
        }

        upload.put_part(UploadPart::new(part_number, etag, data));
        Ok(())
    }

    /// Merge the listed parts into the object's payload.
    ///
    /// Completing an already completed upload with the same ID returns the
    /// stored etag without merging again.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NoSuchKey`] if the object is absent.
    /// - [`StorageError::NoSuchUpload`] if `upload_id` is not the object's upload.
    /// - Any error from [`MultipartUpload::merge`].
    pub fn complete_upload(
        &mut self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
        final_etag: String,
    ) -> StorageResult<String> {
        let bucket_name = self.name.clone();
        let obj = self
            .objects
            .get_mut(key)
            .ok_or_else(|| StorageError::NoSuchKey {
                bucket: bucket_name,
                key: key.to_owned(),
            })?;

        let upload = obj
            .multipart
            .as_mut()
            .filter(|upload| upload.upload_id == upload_id)
            .ok_or_else(|| StorageError::NoSuchUpload {
                upload_id: upload_id.to_owned(),
            })?;

        if let (UploadStatus::Completed, Some(etag)) = (upload.status, &upload.final_etag) {
            return Ok(etag.clone());
        }

        let data = upload.merge(parts)?;
        upload.status = UploadStatus::Completed;
        upload.final_etag = Some(final_etag.clone());

        obj.size = data.len() as u64;
        obj.data = Some(data);
        obj.etag = Some(final_etag.clone());
        obj.last_modified = Utc::now();

        Ok(final_etag)
    }

    /// Drop an open upload and its object record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoSuchUpload`] unless `key` holds an open upload
    /// with this ID.
    pub fn abort_upload(&mut self, key: &str, upload_id: &str) -> StorageResult<()> {
        let is_open_match = self
            .objects
            .get(key)
            .and_then(|obj| obj.multipart.as_ref())
            .is_some_and(|upload| upload.is_open() && upload.upload_id == upload_id);

        if !is_open_match {
            return Err(StorageError::NoSuchUpload {
                upload_id: upload_id.to_owned(),
            });
        }

        self.objects.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
