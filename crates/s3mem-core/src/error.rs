//! Storage engine error types.
//!
//! Defines [`StorageError`], the protocol-agnostic error enum returned by every
//! [`StorageEngine`](crate::StorageEngine) operation. The HTTP layer maps each
//! variant to an S3 error code and status; the core never deals with wire
//! formats.
//!
//! # Usage
//!
//! ```
//! use s3mem_core::error::StorageError;
//!
//! let err = StorageError::NoSuchBucket {
//!     bucket: "my-bucket".to_owned(),
//! };
//! assert_eq!(err.to_string(), "The specified bucket does not exist: my-bucket");
//! ```

/// Storage engine error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    // -----------------------------------------------------------------------
    // Bucket errors
    // -----------------------------------------------------------------------
    /// The specified bucket does not exist.
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// A bucket with the same name already exists.
    #[error("The requested bucket name is not available: {bucket}")]
    BucketAlreadyExists {
        /// The bucket name that already exists.
        bucket: String,
    },

    /// The bucket is not empty and the delete was not forced.
    #[error("The bucket you tried to delete is not empty: {bucket}")]
    BucketNotEmpty {
        /// The bucket name that is not empty.
        bucket: String,
    },

    // -----------------------------------------------------------------------
    // Object errors
    // -----------------------------------------------------------------------
    /// The specified key does not exist.
    #[error("The specified key does not exist: {bucket}/{key}")]
    NoSuchKey {
        /// The bucket that was searched.
        bucket: String,
        /// The key that was not found.
        key: String,
    },

    // -----------------------------------------------------------------------
    // Multipart upload errors
    // -----------------------------------------------------------------------
    /// The upload ID does not match an open (or completed) upload on the key.
    #[error("The specified upload does not exist: {upload_id}")]
    NoSuchUpload {
        /// The upload ID supplied by the caller.
        upload_id: String,
    },

    /// A part referenced on completion was never uploaded.
    #[error("One or more of the specified parts could not be found: part {part_number}")]
    InvalidPart {
        /// The missing part number.
        part_number: u32,
    },

    /// The etag supplied for a part does not match the stored part.
    #[error("The etag of part {part_number} does not match: expected {expected}, got {actual}")]
    EtagMismatch {
        /// The part number whose etag differs.
        part_number: u32,
        /// The etag stored when the part was uploaded.
        expected: String,
        /// The etag supplied on completion.
        actual: String,
    },

    // -----------------------------------------------------------------------
    // Validation errors
    // -----------------------------------------------------------------------
    /// The arguments are structurally invalid.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },
}

impl StorageError {
    /// Shorthand for an [`StorageError::InvalidRequest`] with the given message.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Convenience result type for storage engine operations.
pub type StorageResult<T> = Result<T, StorageError>;
