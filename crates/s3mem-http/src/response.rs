//! HTTP response construction.
//!
//! Success responses come in three shapes: XML documents, raw payloads, and
//! header-only replies. Errors become an `<Error>` document with the status from
//! [`S3Error::status_code`].

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, HeaderValue, LAST_MODIFIED};
use s3mem_xml::{ErrorDocument, S3Serialize, error_to_xml, to_xml};

use crate::body::S3ResponseBody;
use crate::error::S3Error;

const XML_CONTENT_TYPE: &str = "application/xml";

/// Build a response from a builder, converting build errors to `S3Error`.
fn build_response(
    builder: http::response::Builder,
    body: S3ResponseBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    builder
        .body(body)
        .map_err(|e| S3Error::internal_error(format!("failed to build HTTP response: {e}")))
}

/// A `200 OK` carrying an XML document with the given root element.
///
/// # Errors
///
/// Returns `InternalError` if serialization fails.
pub fn xml_response<T: S3Serialize>(
    root: &str,
    value: &T,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let xml = to_xml(root, value)
        .map_err(|e| S3Error::internal_error(format!("failed to serialize {root}: {e}")))?;
    raw_xml_response(xml)
}

/// A `200 OK` carrying pre-serialized XML.
///
/// # Errors
///
/// Returns `InternalError` if the response cannot be built.
pub fn raw_xml_response(xml: Vec<u8>) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(CONTENT_TYPE, XML_CONTENT_TYPE);
    build_response(builder, S3ResponseBody::from_bytes(xml))
}

/// A header-only response with the given status.
///
/// # Errors
///
/// Returns `InternalError` if the response cannot be built.
pub fn empty_response(
    status: http::StatusCode,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    build_response(
        http::Response::builder().status(status),
        S3ResponseBody::empty(),
    )
}

/// A `200 OK` whose only payload is an `ETag` header.
///
/// # Errors
///
/// Returns `InternalError` if the etag is not a valid header value.
pub fn etag_response(etag: &str) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(ETAG, etag_header(etag)?);
    build_response(builder, S3ResponseBody::empty())
}

/// Object metadata headers for `GetObject` and `HeadObject`.
///
/// # Errors
///
/// Returns `InternalError` if a header value is invalid.
pub fn object_response(
    etag: Option<&str>,
    size: u64,
    last_modified: &DateTime<Utc>,
    data: Option<Bytes>,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let mut builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, size)
        .header(LAST_MODIFIED, http_date(last_modified));
    if let Some(etag) = etag {
        builder = builder.header(ETAG, etag_header(etag)?);
    }
    let body = data.map_or_else(S3ResponseBody::empty, S3ResponseBody::from_bytes);
    build_response(builder, body)
}

/// Format a timestamp as an RFC 7231 HTTP date.
#[must_use]
pub fn http_date(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub(crate) fn etag_header(etag: &str) -> Result<HeaderValue, S3Error> {
    HeaderValue::from_str(&format!("\"{etag}\""))
        .map_err(|e| S3Error::internal_error(format!("invalid etag header: {e}")))
}

// ---------------------------------------------------------------------------
// S3Error to HTTP response
// ---------------------------------------------------------------------------

/// Convert an `S3Error` into an HTTP error response with an XML body.
#[must_use]
pub fn error_to_response(
    err: &S3Error,
    request_id: &str,
    region: &str,
) -> http::Response<S3ResponseBody> {
    let doc = ErrorDocument {
        code: err.code.as_str().to_owned(),
        message: err.message.clone(),
        key: err.key.clone().unwrap_or_default(),
        bucket_name: err.bucket.clone().unwrap_or_default(),
        resource: err.resource.clone().unwrap_or_default(),
        region: region.to_owned(),
        request_id: request_id.to_owned(),
        host_id: request_id.to_owned(),
    };

    let mut response = http::Response::new(S3ResponseBody::from_bytes(error_to_xml(&doc)));
    *response.status_mut() = err.status_code;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
    response
}
