//! Plain data types for the XML documents s3mem reads and writes.

use chrono::{DateTime, Utc};

/// Bucket owner shown in `ListAllMyBucketsResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    /// Owner ID.
    pub id: String,
    /// Owner display name.
    pub display_name: String,
}

/// One `<Bucket>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEntry {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAllMyBucketsResult {
    /// Account owner.
    pub owner: Owner,
    /// All buckets.
    pub buckets: Vec<BucketEntry>,
}

/// One `<Contents>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Object key.
    pub key: String,
    /// When the payload was last written.
    pub last_modified: DateTime<Utc>,
    /// Object etag, unquoted.
    pub etag: String,
    /// Payload size in bytes.
    pub size: u64,
}

/// Body of `GET /{bucket}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBucketResult {
    /// Bucket name.
    pub name: String,
    /// Prefix filter applied.
    pub prefix: String,
    /// Number of keys returned.
    pub key_count: usize,
    /// Maximum number of keys.
    pub max_keys: usize,
    /// Whether more keys exist.
    pub is_truncated: bool,
    /// Matching objects.
    pub contents: Vec<ObjectEntry>,
}

/// Body of `POST /{bucket}/{key}?uploads`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateMultipartUploadResult {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// The new upload ID.
    pub upload_id: String,
}

/// Body of `POST /{bucket}/{key}?uploadId=...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteMultipartUploadResult {
    /// Object location.
    pub location: String,
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Final object etag, unquoted.
    pub etag: String,
}

/// A key/value tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// A `<Tagging>` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tagging {
    /// The tags.
    pub tag_set: Vec<Tag>,
}

/// A `<Part>` entry in a completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedPart {
    /// Part number.
    pub part_number: Option<u32>,
    /// Part etag as sent by the client, possibly quoted.
    pub etag: Option<String>,
}

/// A `<CompleteMultipartUpload>` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteMultipartUpload {
    /// Parts in request order.
    pub parts: Vec<CompletedPart>,
}
