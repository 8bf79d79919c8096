//! S3 request routing: path-style addressing and operation identification.
//!
//! A request maps to an [`S3Operation`] from:
//!
//! - the HTTP method,
//! - whether the path names a bucket (`/{bucket}`) or an object (`/{bucket}/{key...}`),
//! - sub-resource query flags (`location`, `policy`, `tagging`, `uploads`,
//!   `uploadId`, `partNumber`, `retention`, `legal-hold`).
//!
//! Only path-style addressing is supported; the `Host` header is ignored.

use std::fmt;

use http::Method;
use percent_encoding::percent_decode_str;

use crate::error::{S3Error, S3ErrorCode};

/// Every S3 operation the server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Operation {
    /// `GET /`
    ListBuckets,
    /// `HEAD /{bucket}`
    HeadBucket,
    /// `PUT /{bucket}`
    CreateBucket,
    /// `DELETE /{bucket}`
    DeleteBucket,
    /// `GET /{bucket}`
    ListObjects,
    /// `GET /{bucket}?location`
    GetBucketLocation,
    /// `GET /{bucket}?policy`
    GetBucketPolicy,
    /// `PUT /{bucket}?policy`
    PutBucketPolicy,
    /// `DELETE /{bucket}?policy`
    DeleteBucketPolicy,
    /// `HEAD /{bucket}/{key}`
    HeadObject,
    /// `GET /{bucket}/{key}`
    GetObject,
    /// `PUT /{bucket}/{key}`
    PutObject,
    /// `DELETE /{bucket}/{key}`
    DeleteObject,
    /// `GET /{bucket}/{key}?tagging`
    GetObjectTagging,
    /// `PUT /{bucket}/{key}?tagging`
    PutObjectTagging,
    /// `DELETE /{bucket}/{key}?tagging`
    DeleteObjectTagging,
    /// `PUT /{bucket}/{key}?retention`
    PutObjectRetention,
    /// `PUT /{bucket}/{key}?legal-hold`
    PutObjectLegalHold,
    /// `POST /{bucket}/{key}?uploads`
    CreateMultipartUpload,
    /// `PUT /{bucket}/{key}?partNumber=N&uploadId=ID`
    UploadPart,
    /// `POST /{bucket}/{key}?uploadId=ID`
    CompleteMultipartUpload,
    /// `DELETE /{bucket}/{key}?uploadId=ID`
    AbortMultipartUpload,
}

impl S3Operation {
    /// The S3 API name of this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListBuckets => "ListBuckets",
            Self::HeadBucket => "HeadBucket",
            Self::CreateBucket => "CreateBucket",
            Self::DeleteBucket => "DeleteBucket",
            Self::ListObjects => "ListObjects",
            Self::GetBucketLocation => "GetBucketLocation",
            Self::GetBucketPolicy => "GetBucketPolicy",
            Self::PutBucketPolicy => "PutBucketPolicy",
            Self::DeleteBucketPolicy => "DeleteBucketPolicy",
            Self::HeadObject => "HeadObject",
            Self::GetObject => "GetObject",
            Self::PutObject => "PutObject",
            Self::DeleteObject => "DeleteObject",
            Self::GetObjectTagging => "GetObjectTagging",
            Self::PutObjectTagging => "PutObjectTagging",
            Self::DeleteObjectTagging => "DeleteObjectTagging",
            Self::PutObjectRetention => "PutObjectRetention",
            Self::PutObjectLegalHold => "PutObjectLegalHold",
            Self::CreateMultipartUpload => "CreateMultipartUpload",
            Self::UploadPart => "UploadPart",
            Self::CompleteMultipartUpload => "CompleteMultipartUpload",
            Self::AbortMultipartUpload => "AbortMultipartUpload",
        }
    }
}

impl fmt::Display for S3Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of routing an HTTP request to an S3 operation.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    /// The resolved bucket name, if any.
    pub bucket: Option<String>,
    /// The resolved object key, if any.
    pub key: Option<String>,
    /// The identified S3 operation.
    pub operation: S3Operation,
    /// Parsed query parameters from the request URI.
    pub query_params: Vec<(String, String)>,
}

impl RoutingContext {
    /// The bucket name, or `InvalidRequest` if the path had none.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when no bucket was routed.
    pub fn bucket(&self) -> Result<&str, S3Error> {
        self.bucket
            .as_deref()
            .ok_or_else(|| S3Error::invalid_request("Missing bucket name"))
    }

    /// The object key, or `InvalidRequest` if the path had none.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when no key was routed.
    pub fn key(&self) -> Result<&str, S3Error> {
        self.key
            .as_deref()
            .ok_or_else(|| S3Error::invalid_request("Missing object key"))
    }

    /// Value of a query parameter; flags without `=` yield `""`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        query_value(&self.query_params, name)
    }
}

/// Resolve an HTTP request to its routing context.
///
/// # Errors
///
/// Returns `MethodNotAllowed` for methods the resource does not support.
pub fn resolve<B>(req: &http::Request<B>) -> Result<RoutingContext, S3Error> {
    route(req.method(), req.uri())
}

/// Resolve a method and URI to a routing context.
///
/// # Errors
///
/// Returns `MethodNotAllowed` for methods the resource does not support and
/// `InvalidRequest` for a part upload missing `partNumber` or `uploadId`.
pub fn route(method: &Method, uri: &http::Uri) -> Result<RoutingContext, S3Error> {
    let query_params = parse_query_params(uri.query().unwrap_or(""));
    let (bucket, key) = parse_path(uri.path());

    let operation = identify_operation(method, bucket.is_some(), key.is_some(), &query_params)?;

    Ok(RoutingContext {
        bucket,
        key,
        operation,
        query_params,
    })
}

/// Parse the URI path into an optional bucket and optional key.
///
/// Path format: `/{bucket}` or `/{bucket}/{key...}`
fn parse_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    match trimmed.split_once('/') {
        Some((bucket, key_raw)) => {
            let key = (!key_raw.is_empty()).then(|| decode_uri_component(key_raw));
            (Some(decode_uri_component(bucket)), key)
        }
        None => (Some(decode_uri_component(trimmed)), None),
    }
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into key-value pairs.
fn parse_query_params(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_uri_component(k), decode_uri_component(v)),
            None => (decode_uri_component(pair), String::new()),
        })
        .collect()
}

fn query_has_key(params: &[(String, String)], key: &str) -> bool {
    params.iter().any(|(k, _)| k == key)
}

fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn identify_operation(
    method: &Method,
    has_bucket: bool,
    has_key: bool,
    params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    match (has_bucket, has_key) {
        (false, _) if *method == Method::GET => Ok(S3Operation::ListBuckets),
        (false, _) => Err(S3Error::with_message(
            S3ErrorCode::MethodNotAllowed,
            "Only GET is allowed at the service level",
        )),
        (true, false) => identify_bucket_operation(method, params),
        (true, true) => identify_object_operation(method, params),
    }
}

/// Identify a bucket-level operation (bucket present, no key).
fn identify_bucket_operation(
    method: &Method,
    params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    let policy = query_has_key(params, "policy");
    match *method {
        Method::HEAD => Ok(S3Operation::HeadBucket),
        Method::GET if query_has_key(params, "location") => Ok(S3Operation::GetBucketLocation),
        Method::GET if policy => Ok(S3Operation::GetBucketPolicy),
        Method::GET => Ok(S3Operation::ListObjects),
        Method::PUT if policy => Ok(S3Operation::PutBucketPolicy),
        Method::PUT => Ok(S3Operation::CreateBucket),
        Method::DELETE if policy => Ok(S3Operation::DeleteBucketPolicy),
        Method::DELETE => Ok(S3Operation::DeleteBucket),
        _ => Err(S3Error::method_not_allowed(method.as_str())),
    }
}

/// Identify an object-level operation (bucket + key present).
fn identify_object_operation(
    method: &Method,
    params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    let tagging = query_has_key(params, "tagging");
    let upload_id = query_has_key(params, "uploadId");
    match *method {
        Method::HEAD => Ok(S3Operation::HeadObject),
        Method::GET if tagging => Ok(S3Operation::GetObjectTagging),
        Method::GET => Ok(S3Operation::GetObject),
        Method::PUT if tagging => Ok(S3Operation::PutObjectTagging),
        Method::PUT if query_has_key(params, "retention") => Ok(S3Operation::PutObjectRetention),
        Method::PUT if query_has_key(params, "legal-hold") => Ok(S3Operation::PutObjectLegalHold),
        Method::PUT => match (upload_id, query_has_key(params, "partNumber")) {
            (true, true) => Ok(S3Operation::UploadPart),
            (false, false) => Ok(S3Operation::PutObject),
            (false, true) => Err(S3Error::invalid_request(
                "partNumber requires an uploadId",
            )),
            (true, false) => Err(S3Error::invalid_request(
                "uploadId requires a partNumber",
            )),
        },
        Method::DELETE if tagging => Ok(S3Operation::DeleteObjectTagging),
        Method::DELETE if upload_id => Ok(S3Operation::AbortMultipartUpload),
        Method::DELETE => Ok(S3Operation::DeleteObject),
        Method::POST if query_has_key(params, "uploads") => Ok(S3Operation::CreateMultipartUpload),
        Method::POST if upload_id => Ok(S3Operation::CompleteMultipartUpload),
        _ => Err(S3Error::method_not_allowed(method.as_str())),
    }
}
