//! End-to-end tests for the s3mem server.
//!
//! Each test starts its own in-process server on a free port and drives it
//! with the AWS SDK for Rust using path-style addressing. Nothing external
//! needs to be running:
//!
//! ```text
//! cargo test -p s3mem-integration
//! ```

use std::sync::{Arc, Once};

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use s3mem_core::{S3MemConfig, StorageEngine};
use s3mem_http::S3Server;

mod test_bucket;
mod test_concurrency;
mod test_multipart;
mod test_object;
mod test_tagging;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Create an S3 client pointing at `endpoint`, signing with the server's
/// configured credentials and region.
#[must_use]
pub fn s3_client(endpoint: &str, config: &S3MemConfig) -> aws_sdk_s3::Client {
    let creds = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "s3mem-integration",
    );

    let sdk_config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(creds)
        .endpoint_url(endpoint)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(sdk_config)
}

/// A running server plus clients pointed at it.
#[derive(Debug)]
pub struct TestServer {
    server: S3Server,
    base_url: String,
    /// The engine behind the server, for assertions that bypass HTTP.
    pub engine: Arc<StorageEngine>,
    /// SDK client.
    pub s3: aws_sdk_s3::Client,
    /// Plain HTTP client for requests the SDK cannot express.
    pub http: reqwest::Client,
}

impl TestServer {
    /// Start a server with the default configuration on a free port.
    pub async fn start() -> Self {
        Self::start_with(S3MemConfig::builder().listen("127.0.0.1:0".to_owned()).build()).await
    }

    /// Start a server with a custom configuration.
    pub async fn start_with(config: S3MemConfig) -> Self {
        init_tracing();

        let engine = Arc::new(StorageEngine::from_config(&config));
        let server = S3Server::start(&config, Arc::clone(&engine))
            .await
            .expect("start server");
        let base_url = format!("http://{}", server.local_addr());
        let s3 = s3_client(&base_url, &config);

        Self {
            server,
            base_url,
            engine,
            s3,
            http: reqwest::Client::new(),
        }
    }

    /// Absolute URL for a path such as `/bucket/key?retention`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Create a uniquely named bucket and return its name.
    pub async fn create_test_bucket(&self, prefix: &str) -> String {
        let bucket = test_bucket_name(prefix);
        self.s3
            .create_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("create bucket");
        bucket
    }

    /// Store an object and return its etag as sent by the server.
    pub async fn put_object(&self, bucket: &str, key: &str, data: &'static [u8]) -> String {
        let resp = self
            .s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from_static(data))
            .send()
            .await
            .expect("put object");
        resp.e_tag().expect("put etag").to_owned()
    }

    /// Read an object's full body.
    pub async fn get_bytes(&self, bucket: &str, key: &str) -> Vec<u8> {
        let resp = self
            .s3
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .expect("get object");
        resp.body
            .collect()
            .await
            .expect("read body")
            .into_bytes()
            .to_vec()
    }

    /// Stop the server.
    pub async fn shutdown(self) {
        self.server.shutdown().await;
    }
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}
