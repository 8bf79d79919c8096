//! In-memory state: the registry, buckets, objects, and multipart uploads.

pub mod bucket;
pub mod multipart;
pub mod object;
pub mod registry;

pub use bucket::{Bucket, BucketSummary};
pub use multipart::{CompletedPart, MultipartUpload, UploadPart, UploadStatus};
pub use object::{ObjectSnapshot, ObjectSummary, StoredObject};
pub use registry::BucketRegistry;
