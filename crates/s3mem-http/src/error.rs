//! S3 wire errors.
//!
//! [`S3Error`] carries everything the `<Error>` document needs. Storage errors
//! convert into it through `From`, which is where each engine failure gets its
//! S3 code and HTTP status.

use std::fmt;

use s3mem_core::StorageError;
use s3mem_xml::XmlError;

/// S3 error codes produced by s3mem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3ErrorCode {
    /// Create on a bucket name that already exists.
    BucketAlreadyOwnedByYou,
    /// Non-forced delete of a bucket that still holds objects.
    BucketNotEmpty,
    /// Unexpected server-side failure.
    InternalError,
    /// A completion referenced a missing part or a part with the wrong etag.
    InvalidPart,
    /// Malformed arguments, headers, or bodies.
    InvalidRequest,
    /// A request body could not be parsed as XML.
    MalformedXML,
    /// The method is not supported on the resource.
    MethodNotAllowed,
    /// The bucket does not exist.
    NoSuchBucket,
    /// The object does not exist or is not yet readable.
    NoSuchKey,
    /// The multipart upload does not exist.
    NoSuchUpload,
}

impl S3ErrorCode {
    /// Returns the error code as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BucketAlreadyOwnedByYou => "BucketAlreadyOwnedByYou",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::InternalError => "InternalError",
            Self::InvalidPart => "InvalidPart",
            Self::InvalidRequest => "InvalidRequest",
            Self::MalformedXML => "MalformedXML",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchKey => "NoSuchKey",
            Self::NoSuchUpload => "NoSuchUpload",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::InvalidPart | Self::InvalidRequest | Self::MalformedXML => {
                http::StatusCode::BAD_REQUEST
            }
            Self::NoSuchBucket | Self::NoSuchKey | Self::NoSuchUpload => {
                http::StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::BucketAlreadyOwnedByYou | Self::BucketNotEmpty => http::StatusCode::CONFLICT,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the default message for this error.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BucketAlreadyOwnedByYou => {
                "Your previous request to create the named bucket succeeded and you already own it."
            }
            Self::BucketNotEmpty => "The bucket you tried to delete is not empty",
            Self::InternalError => "We encountered an internal error, please try again.",
            Self::InvalidPart => "One or more of the specified parts could not be found.",
            Self::InvalidRequest => "Invalid Request",
            Self::MalformedXML => "The XML you provided was not well-formed",
            Self::MethodNotAllowed => "The specified method is not allowed against this resource.",
            Self::NoSuchBucket => "The specified bucket does not exist",
            Self::NoSuchKey => "The specified key does not exist.",
            Self::NoSuchUpload => "The specified multipart upload does not exist.",
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("S3Error({code}): {message}")]
pub struct S3Error {
    /// The error code.
    pub code: S3ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// Bucket the request addressed.
    pub bucket: Option<String>,
    /// Object key the request addressed.
    pub key: Option<String>,
    /// Request path.
    pub resource: Option<String>,
}

impl S3Error {
    /// Create an error with the code's default message.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        Self::with_message(code, code.default_message())
    }

    /// Create an error with a custom message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status_code: code.status_code(),
            bucket: None,
            key: None,
            resource: None,
        }
    }

    /// Set the bucket name, unless one is already set.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket.get_or_insert_with(|| bucket.into());
        self
    }

    /// Set the object key, unless one is already set.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key.get_or_insert_with(|| key.into());
        self
    }

    /// Set the request path.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Shorthand for an `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InvalidRequest, message)
    }

    /// Shorthand for an `InternalError`.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InternalError, message)
    }

    /// Shorthand for a `MethodNotAllowed` error.
    #[must_use]
    pub fn method_not_allowed(method: &str) -> Self {
        Self::with_message(
            S3ErrorCode::MethodNotAllowed,
            format!("The specified method is not allowed against this resource: {method}"),
        )
    }
}

impl From<StorageError> for S3Error {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::NoSuchBucket { bucket } => {
                Self::with_message(S3ErrorCode::NoSuchBucket, message).with_bucket(bucket)
            }
            StorageError::BucketAlreadyExists { bucket } => {
                Self::new(S3ErrorCode::BucketAlreadyOwnedByYou).with_bucket(bucket)
            }
            StorageError::BucketNotEmpty { bucket } => {
                Self::new(S3ErrorCode::BucketNotEmpty).with_bucket(bucket)
            }
            StorageError::NoSuchKey { bucket, key } => Self::new(S3ErrorCode::NoSuchKey)
                .with_bucket(bucket)
                .with_key(key),
            StorageError::NoSuchUpload { .. } => {
                Self::with_message(S3ErrorCode::NoSuchUpload, message)
            }
            StorageError::InvalidPart { .. } | StorageError::EtagMismatch { .. } => {
                Self::with_message(S3ErrorCode::InvalidPart, message)
            }
            StorageError::InvalidRequest { message } => {
                Self::with_message(S3ErrorCode::InvalidRequest, message)
            }
        }
    }
}

impl From<XmlError> for S3Error {
    fn from(err: XmlError) -> Self {
        Self::with_message(S3ErrorCode::MalformedXML, err.to_string())
    }
}
