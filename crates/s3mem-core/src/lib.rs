//! In-memory S3-compatible storage engine.
//!
//! This crate holds all state for an s3mem server: a registry of buckets, the
//! objects inside them, object tags, bucket policies, and multipart uploads.
//! Nothing is persisted; state lives for the lifetime of the process.
//!
//! # Architecture
//!
//! ```text
//! StorageEngine (one RwLock, validation, id generation)
//!        |
//!        v
//! BucketRegistry (name -> Bucket)
//!        |
//!        v
//!     Bucket (name -> StoredObject, multipart coordinator)
//!        |
//!        v
//!  StoredObject (payload, tags, MultipartUpload)
//! ```
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use s3mem_core::StorageEngine;
//!
//! let engine = StorageEngine::default();
//! assert!(engine.create_bucket("photos").unwrap());
//! engine
//!     .put_object("photos", "cat.jpg", "etag-1", Bytes::from_static(b"meow"))
//!     .unwrap();
//!
//! let obj = engine.get_object("photos", "cat.jpg").unwrap();
//! assert_eq!(obj.size, 4);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod utils;
pub mod validation;

pub use config::{Credentials, S3MemConfig};
pub use engine::StorageEngine;
pub use error::{StorageError, StorageResult};
pub use state::{BucketSummary, CompletedPart, ObjectSnapshot, ObjectSummary};
