//! Structural argument checks applied by the engine before taking any lock.

use std::collections::BTreeSet;

use crate::error::{StorageError, StorageResult};

/// Lowest valid multipart part number.
pub const MIN_PART_NUMBER: u32 = 1;

/// Highest valid multipart part number.
pub const MAX_PART_NUMBER: u32 = 10_000;

/// Most tags one object may carry.
pub const MAX_TAGS: usize = 10;

/// Longest tag key, in characters.
pub const MAX_TAG_KEY_LEN: usize = 128;

/// Longest tag value, in characters.
pub const MAX_TAG_VALUE_LEN: usize = 256;

/// Reject empty bucket names.
///
/// Naming rules beyond non-emptiness are not enforced: bucket names are opaque,
/// case-sensitive keys.
///
/// # Examples
///
/// ```
/// use s3mem_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("Photos").is_ok());
/// assert!(validate_bucket_name("").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::invalid_request("Bucket name must not be empty"));
    }
    Ok(())
}

/// Reject empty object keys.
pub fn validate_object_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_request("Object key must not be empty"));
    }
    Ok(())
}

/// Reject an empty bucket name or object key.
pub fn validate_object_path(bucket: &str, key: &str) -> StorageResult<()> {
    validate_bucket_name(bucket)?;
    validate_object_key(key)
}

/// Check that a part number lies in `1..=10000`.
pub fn validate_part_number(part_number: u32) -> StorageResult<()> {
    if !(MIN_PART_NUMBER..=MAX_PART_NUMBER).contains(&part_number) {
        return Err(StorageError::invalid_request(format!(
            "Part number must be an integer between {MIN_PART_NUMBER} and {MAX_PART_NUMBER}, got {part_number}"
        )));
    }
    Ok(())
}

/// Validate a tag key: 1-128 characters.
pub fn validate_tag_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_request("Tag key must not be empty"));
    }
    let len = key.chars().count();
    if len > MAX_TAG_KEY_LEN {
        return Err(StorageError::invalid_request(format!(
            "Tag key must not exceed {MAX_TAG_KEY_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate a tag value: 0-256 characters.
pub fn validate_tag_value(value: &str) -> StorageResult<()> {
    let len = value.chars().count();
    if len > MAX_TAG_VALUE_LEN {
        return Err(StorageError::invalid_request(format!(
            "Tag value must not exceed {MAX_TAG_VALUE_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate a whole tag set.
///
/// Rules:
/// - at most 10 tags
/// - each key 1-128 characters and unique within the set
/// - each value 0-256 characters
///
/// # Examples
///
/// ```
/// use s3mem_core::validation::validate_tags;
///
/// let tags = vec![
///     ("env".to_owned(), "prod".to_owned()),
///     ("team".to_owned(), "storage".to_owned()),
/// ];
/// assert!(validate_tags(&tags).is_ok());
///
/// let repeated = vec![("env".to_owned(), "a".to_owned()), ("env".to_owned(), "b".to_owned())];
/// assert!(validate_tags(&repeated).is_err());
/// ```
pub fn validate_tags(tags: &[(String, String)]) -> StorageResult<()> {
    if tags.len() > MAX_TAGS {
        return Err(StorageError::invalid_request(format!(
            "Object tags cannot be greater than {MAX_TAGS}, got {}",
            tags.len()
        )));
    }

    let mut seen = BTreeSet::new();
    for (key, value) in tags {
        validate_tag_key(key)?;
        validate_tag_value(value)?;
        if !seen.insert(key.as_str()) {
            return Err(StorageError::invalid_request(format!(
                "Duplicate tag key '{key}'"
            )));
        }
    }
    Ok(())
}
