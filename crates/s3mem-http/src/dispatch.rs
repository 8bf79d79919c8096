//! S3 operation dispatch.
//!
//! [`dispatch_operation`] takes a routed request and runs it against the
//! [`StorageEngine`]. Each handler pulls what it needs from the routing
//! context, headers, and body, calls one engine operation, and shapes the
//! response. Errors bubble up as [`S3Error`] and are rendered by the service.

use bytes::Bytes;
use s3mem_core::StorageEngine;
use s3mem_core::state::CompletedPart;
use s3mem_core::utils::generate_etag;
use s3mem_xml::types::{
    BucketEntry, CompleteMultipartUpload, CompleteMultipartUploadResult,
    InitiateMultipartUploadResult, ListAllMyBucketsResult, ListBucketResult, ObjectEntry, Owner,
    Tag, Tagging,
};
use s3mem_xml::{from_xml, location_to_xml};
use tracing::debug;

use crate::body::S3ResponseBody;
use crate::codec::{decode_aws_chunked, is_aws_chunked};
use crate::error::{S3Error, S3ErrorCode};
use crate::response::{
    empty_response, etag_header, etag_response, object_response, raw_xml_response, xml_response,
};
use crate::router::{RoutingContext, S3Operation};

/// Header carrying the force flag for `DeleteBucket`.
pub const FORCE_DELETE_HEADER: &str = "x-minio-force-delete";

/// Region that is reported as an empty `LocationConstraint`.
const DEFAULT_REGION: &str = "us-east-1";

/// Listing page size reported in `ListBucketResult`.
const MAX_KEYS: usize = 1000;

type S3Response = Result<http::Response<S3ResponseBody>, S3Error>;

/// Run a routed request against the engine.
///
/// # Errors
///
/// Returns the `S3Error` produced by routing checks, body parsing, or the
/// engine.
pub fn dispatch_operation(
    engine: &StorageEngine,
    region: &str,
    parts: &http::request::Parts,
    body: Bytes,
    ctx: &RoutingContext,
) -> S3Response {
    debug!(operation = %ctx.operation, bucket = ?ctx.bucket, key = ?ctx.key, "dispatching S3 operation");

    match ctx.operation {
        S3Operation::ListBuckets => list_buckets(engine),
        S3Operation::HeadBucket => head_bucket(engine, ctx),
        S3Operation::CreateBucket => create_bucket(engine, ctx),
        S3Operation::DeleteBucket => delete_bucket(engine, parts, ctx),
        S3Operation::ListObjects => list_objects(engine, ctx),
        S3Operation::GetBucketLocation => get_bucket_location(engine, region, ctx),
        S3Operation::GetBucketPolicy => get_bucket_policy(engine, ctx),
        S3Operation::PutBucketPolicy => {
            put_bucket_policy(engine, ctx, &String::from_utf8_lossy(&body))
        }
        S3Operation::DeleteBucketPolicy => put_bucket_policy(engine, ctx, ""),
        S3Operation::HeadObject => read_object(engine, ctx, false),
        S3Operation::GetObject => read_object(engine, ctx, true),
        S3Operation::PutObject => put_object(engine, ctx, payload(parts, body)?),
        S3Operation::DeleteObject => {
            engine.delete_object(ctx.bucket()?, ctx.key()?)?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        S3Operation::GetObjectTagging => get_object_tagging(engine, ctx),
        S3Operation::PutObjectTagging => put_object_tagging(engine, ctx, &body),
        S3Operation::DeleteObjectTagging => {
            engine.delete_object_tagging(ctx.bucket()?, ctx.key()?)?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
        S3Operation::PutObjectRetention | S3Operation::PutObjectLegalHold => {
            // Object lock settings are accepted and discarded.
            debug!(operation = %ctx.operation, "object lock setting ignored");
            empty_response(http::StatusCode::OK)
        }
        S3Operation::CreateMultipartUpload => create_multipart_upload(engine, ctx),
        S3Operation::UploadPart => upload_part(engine, ctx, payload(parts, body)?),
        S3Operation::CompleteMultipartUpload => complete_multipart_upload(engine, ctx, &body),
        S3Operation::AbortMultipartUpload => {
            engine.abort_multipart_upload(ctx.bucket()?, ctx.key()?, upload_id(ctx)?)?;
            empty_response(http::StatusCode::NO_CONTENT)
        }
    }
}

/// The object payload with any `aws-chunked` framing removed.
fn payload(parts: &http::request::Parts, body: Bytes) -> Result<Bytes, S3Error> {
    if is_aws_chunked(parts) {
        decode_aws_chunked(&body)
    } else {
        Ok(body)
    }
}

fn upload_id(ctx: &RoutingContext) -> Result<&str, S3Error> {
    ctx.query("uploadId")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| S3Error::invalid_request("Missing uploadId"))
}

fn no_such_bucket(bucket: &str) -> S3Error {
    S3Error::new(S3ErrorCode::NoSuchBucket).with_bucket(bucket)
}

/// Parse the boolean spellings MinIO accepts for `x-minio-force-delete`.
fn parse_bool(value: &str) -> Result<bool, S3Error> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(S3Error::invalid_request(format!(
            "invalid boolean value \"{value}\" for {FORCE_DELETE_HEADER}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

fn list_buckets(engine: &StorageEngine) -> S3Response {
    let access_key = &engine.credentials().access_key;
    let result = ListAllMyBucketsResult {
        owner: Owner {
            id: access_key.clone(),
            display_name: access_key.clone(),
        },
        buckets: engine
            .list_buckets()
            .into_iter()
            .map(|b| BucketEntry {
                name: b.name,
                creation_date: b.created,
            })
            .collect(),
    };
    xml_response("ListAllMyBucketsResult", &result)
}

fn head_bucket(engine: &StorageEngine, ctx: &RoutingContext) -> S3Response {
    let bucket = ctx.bucket()?;
    if engine.bucket_exists(bucket) {
        empty_response(http::StatusCode::OK)
    } else {
        Err(no_such_bucket(bucket))
    }
}

fn create_bucket(engine: &StorageEngine, ctx: &RoutingContext) -> S3Response {
    let bucket = ctx.bucket()?;
    if !engine.create_bucket(bucket)? {
        return Err(S3Error::new(S3ErrorCode::BucketAlreadyOwnedByYou).with_bucket(bucket));
    }
    let mut response = empty_response(http::StatusCode::OK)?;
    if let Ok(location) = http::HeaderValue::from_str(&format!("/{bucket}")) {
        response
            .headers_mut()
            .insert(http::header::LOCATION, location);
    }
    Ok(response)
}

fn delete_bucket(
    engine: &StorageEngine,
    parts: &http::request::Parts,
    ctx: &RoutingContext,
) -> S3Response {
    let bucket = ctx.bucket()?;
    let force = match parts.headers.get(FORCE_DELETE_HEADER) {
        Some(value) => parse_bool(
            value
                .to_str()
                .map_err(|e| S3Error::invalid_request(e.to_string()))?,
        )?,
        None => false,
    };
    engine.delete_bucket(bucket, force)?;
    empty_response(http::StatusCode::NO_CONTENT)
}

fn list_objects(engine: &StorageEngine, ctx: &RoutingContext) -> S3Response {
    let bucket = ctx.bucket()?;
    let prefix = ctx.query("prefix").unwrap_or_default();
    let contents: Vec<ObjectEntry> = engine
        .list_objects(bucket, prefix)?
        .into_iter()
        .map(|o| ObjectEntry {
            key: o.key,
            last_modified: o.last_modified,
            etag: o.etag,
            size: o.size,
        })
        .collect();

    let result = ListBucketResult {
        name: bucket.to_owned(),
        prefix: prefix.to_owned(),
        key_count: contents.len(),
        max_keys: contents.len().max(MAX_KEYS),
        is_truncated: false,
        contents,
    };
    xml_response("ListBucketResult", &result)
}

fn get_bucket_location(engine: &StorageEngine, region: &str, ctx: &RoutingContext) -> S3Response {
    let bucket = ctx.bucket()?;
    if !engine.bucket_exists(bucket) {
        return Err(no_such_bucket(bucket));
    }
    let location = if region == DEFAULT_REGION { "" } else { region };
    let xml = location_to_xml(location)
        .map_err(|e| S3Error::internal_error(format!("failed to serialize location: {e}")))?;
    raw_xml_response(xml)
}

fn get_bucket_policy(engine: &StorageEngine, ctx: &RoutingContext) -> S3Response {
    let bucket = ctx.bucket()?;
    let policy = engine
        .get_bucket_policy(bucket)
        .ok_or_else(|| no_such_bucket(bucket))?;
    let mut response = http::Response::new(S3ResponseBody::from_bytes(policy));
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

fn put_bucket_policy(engine: &StorageEngine, ctx: &RoutingContext, policy: &str) -> S3Response {
    let bucket = ctx.bucket()?;
    if !engine.set_bucket_policy(bucket, policy)? {
        return Err(no_such_bucket(bucket));
    }
    empty_response(http::StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

fn read_object(engine: &StorageEngine, ctx: &RoutingContext, with_body: bool) -> S3Response {
    let (bucket, key) = (ctx.bucket()?, ctx.key()?);
    let object = engine.get_object(bucket, key)?;
    if !object.is_complete() {
        // Open multipart uploads are not readable yet.
        return Err(S3Error::new(S3ErrorCode::NoSuchKey)
            .with_bucket(bucket)
            .with_key(key));
    }

    let data = if with_body { object.data } else { None };
    object_response(
        object.etag.as_deref(),
        object.size,
        &object.last_modified,
        data,
    )
}

fn put_object(engine: &StorageEngine, ctx: &RoutingContext, data: Bytes) -> S3Response {
    let etag = generate_etag();
    engine.put_object(ctx.bucket()?, ctx.key()?, etag.as_str(), data)?;
    etag_response(&etag)
}

fn get_object_tagging(engine: &StorageEngine, ctx: &RoutingContext) -> S3Response {
    let tags = engine.get_object_tagging(ctx.bucket()?, ctx.key()?)?;
    let tagging = Tagging {
        tag_set: tags
            .into_iter()
            .map(|(key, value)| Tag { key, value })
            .collect(),
    };
    xml_response("Tagging", &tagging)
}

fn put_object_tagging(engine: &StorageEngine, ctx: &RoutingContext, body: &[u8]) -> S3Response {
    let (bucket, key) = (ctx.bucket()?, ctx.key()?);
    let tagging: Tagging = from_xml(body)?;
    let tags = tagging
        .tag_set
        .into_iter()
        .map(|t| (t.key, t.value))
        .collect();
    engine.put_object_tagging(bucket, key, tags)?;
    empty_response(http::StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Multipart uploads
// ---------------------------------------------------------------------------

fn create_multipart_upload(engine: &StorageEngine, ctx: &RoutingContext) -> S3Response {
    let (bucket, key) = (ctx.bucket()?, ctx.key()?);
    let upload_id = engine.create_multipart_upload(bucket, key)?;
    let result = InitiateMultipartUploadResult {
        bucket: bucket.to_owned(),
        key: key.to_owned(),
        upload_id,
    };
    xml_response("InitiateMultipartUploadResult", &result)
}

fn upload_part(engine: &StorageEngine, ctx: &RoutingContext, data: Bytes) -> S3Response {
    let (bucket, key) = (ctx.bucket()?, ctx.key()?);
    let raw = ctx.query("partNumber").unwrap_or_default();
    let part_number = raw
        .parse::<u32>()
        .map_err(|_| S3Error::invalid_request(format!("Invalid partNumber '{raw}'")))?;

    let etag = engine.upload_part(bucket, key, upload_id(ctx)?, part_number, data)?;
    etag_response(&etag)
}

fn complete_multipart_upload(
    engine: &StorageEngine,
    ctx: &RoutingContext,
    body: &[u8],
) -> S3Response {
    let (bucket, key) = (ctx.bucket()?, ctx.key()?);
    let request: CompleteMultipartUpload = from_xml(body)?;
    let parts = request
        .parts
        .into_iter()
        .map(|p| match (p.part_number, p.etag) {
            (Some(number), Some(etag)) => Ok(CompletedPart::new(number, etag)),
            _ => Err(S3Error::new(S3ErrorCode::InvalidPart)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let etag = engine.complete_multipart_upload(bucket, key, upload_id(ctx)?, &parts)?;

    let result = CompleteMultipartUploadResult {
        location: format!("/{bucket}/{key}"),
        bucket: bucket.to_owned(),
        key: key.to_owned(),
        etag: etag.clone(),
    };
    let mut response = xml_response("CompleteMultipartUploadResult", &result)?;
    response
        .headers_mut()
        .insert(http::header::ETAG, etag_header(&etag)?);
    Ok(response)
}
