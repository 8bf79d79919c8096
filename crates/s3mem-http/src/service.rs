//! The S3 HTTP service implementing hyper's `Service` trait.
//!
//! [`S3HttpService`] runs each request through the same pipeline:
//!
//! 1. Health check interception (`GET /health`, `GET /minio/health/live`)
//! 2. Routing via [`route`](crate::router::route)
//! 3. Request body collection
//! 4. Dispatch to the [`StorageEngine`]
//! 5. Error rendering and common response headers

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::header::HeaderValue;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use s3mem_core::StorageEngine;
use s3mem_core::utils::generate_request_id;
use tracing::{debug, error, warn};

use crate::body::S3ResponseBody;
use crate::dispatch::dispatch_operation;
use crate::error::S3Error;
use crate::response::error_to_response;
use crate::router::route;

/// Value of the `Server` response header.
const SERVER_NAME: &str = "s3mem";

/// Configuration for the S3 HTTP service.
#[derive(Debug, Clone)]
pub struct S3HttpConfig {
    /// Region reported by `GetBucketLocation` and error documents.
    pub region: String,
}

impl Default for S3HttpConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_owned(),
        }
    }
}

/// The S3 HTTP service.
///
/// Cloning is cheap: the engine and configuration are shared.
#[derive(Debug, Clone)]
pub struct S3HttpService {
    engine: Arc<StorageEngine>,
    config: Arc<S3HttpConfig>,
}

impl S3HttpService {
    /// Create a service over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<StorageEngine>, config: S3HttpConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }

    /// The engine this service dispatches to.
    #[must_use]
    pub fn engine(&self) -> &Arc<StorageEngine> {
        &self.engine
    }
}

impl Service<http::Request<Incoming>> for S3HttpService {
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let engine = Arc::clone(&self.engine);
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let request_id = generate_request_id();
            let (parts, incoming) = req.into_parts();

            let body = match incoming.collect().await {
                Ok(collected) => Ok(collected.to_bytes()),
                Err(err) => {
                    error!(error = %err, request_id, "failed to collect request body");
                    Err(S3Error::internal_error("Failed to read request body"))
                }
            };

            let response = handle_request(&engine, &config, &parts, body, &request_id);
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Run one request through the S3 pipeline.
///
/// Never fails: errors are rendered as `<Error>` documents. Responses to
/// `HEAD` requests never carry a body.
pub fn handle_request(
    engine: &StorageEngine,
    config: &S3HttpConfig,
    parts: &http::request::Parts,
    body: Result<Bytes, S3Error>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let method = &parts.method;
    let path = parts.uri.path();
    debug!(%method, uri = %parts.uri, request_id, "processing S3 request");

    if is_health_check(method, path) {
        return health_check_response();
    }

    let result = route(method, &parts.uri).and_then(|ctx| {
        debug!(
            operation = %ctx.operation,
            bucket = ?ctx.bucket,
            key = ?ctx.key,
            request_id,
            "routed S3 request"
        );
        dispatch_operation(engine, &config.region, parts, body?, &ctx).map_err(|err| {
            let err = match &ctx.bucket {
                Some(bucket) => err.with_bucket(bucket.as_str()),
                None => err,
            };
            match &ctx.key {
                Some(key) => err.with_key(key.as_str()),
                None => err,
            }
        })
    });

    let mut response = match result {
        Ok(response) => response,
        Err(err) => {
            let err = err.with_resource(path);
            if err.status_code.is_server_error() {
                error!(%method, path, code = %err.code, message = %err.message, request_id, "S3 request failed");
            } else {
                warn!(%method, path, code = %err.code, message = %err.message, request_id, "S3 request rejected");
            }
            error_to_response(&err, request_id, &config.region)
        }
    };

    if *method == http::Method::HEAD {
        *response.body_mut() = S3ResponseBody::empty();
    }
    response
}

/// Check if the request is a health check request.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/health" || path == "/minio/health/live")
}

/// Produce a health check response.
fn health_check_response() -> http::Response<S3ResponseBody> {
    let mut response = http::Response::new(S3ResponseBody::from_bytes(
        r#"{"status":"running","service":"s3"}"#,
    ));
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Add common response headers to every S3 response.
fn add_common_headers(
    mut response: http::Response<S3ResponseBody>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv.clone());
        headers.insert("x-amz-id-2", hv);
    }
    headers.insert(http::header::SERVER, HeaderValue::from_static(SERVER_NAME));

    response
}
