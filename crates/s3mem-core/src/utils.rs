//! Opaque identifier generation.
//!
//! Etags, upload IDs, and request IDs are random UUID v4 tokens. They carry no
//! content hash; uniqueness under concurrent generation is all callers rely on.

use uuid::Uuid;

/// Generate a fresh etag for an object or part.
///
/// # Examples
///
/// ```
/// use s3mem_core::utils::generate_etag;
///
/// let etag = generate_etag();
/// assert_eq!(etag.len(), 32);
/// assert!(etag.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn generate_etag() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generate a random upload ID for multipart uploads.
///
/// Produces a 64-character hex string.
///
/// # Examples
///
/// ```
/// use s3mem_core::utils::generate_upload_id;
///
/// let id = generate_upload_id();
/// assert_eq!(id.len(), 64);
/// assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn generate_upload_id() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Generate a unique request ID (UUID v4 without dashes).
#[must_use]
pub fn generate_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}
