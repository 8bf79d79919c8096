//! Server configuration.
//!
//! Provides [`S3MemConfig`] for configuring the s3mem server and the
//! [`Credentials`] pair carried by the storage engine. Values are loaded from
//! environment variables with MinIO-style defaults.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default access key, matching MinIO's out-of-the-box credentials.
const DEFAULT_ACCESS_KEY: &str = "minioadmin";

/// Default secret key, matching MinIO's out-of-the-box credentials.
const DEFAULT_SECRET_KEY: &str = "minioadmin";

/// Static access/secret pair held by the engine.
///
/// The pair is opaque to the core: requests are never checked against it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
}

impl Credentials {
    /// Create a credential pair.
    #[must_use]
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_KEY, DEFAULT_SECRET_KEY)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

/// s3mem server configuration.
///
/// # Examples
///
/// ```
/// use s3mem_core::config::S3MemConfig;
///
/// let config = S3MemConfig::default();
/// assert_eq!(config.listen, "127.0.0.1:9000");
/// assert_eq!(config.region, "us-east-1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct S3MemConfig {
    /// Bind address for the HTTP listener. Port `0` picks a free port.
    #[builder(default = String::from("127.0.0.1:9000"))]
    pub listen: String,

    /// Access key reported by the engine.
    #[builder(default = String::from(DEFAULT_ACCESS_KEY))]
    pub access_key: String,

    /// Secret key reported by the engine.
    #[builder(default = String::from(DEFAULT_SECRET_KEY))]
    pub secret_key: String,

    /// Region returned by `GetBucketLocation` and error documents.
    #[builder(default = String::from("us-east-1"))]
    pub region: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for S3MemConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl S3MemConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `S3MEM_LISTEN` | `127.0.0.1:9000` |
    /// | `S3MEM_ACCESS_KEY` | `minioadmin` |
    /// | `S3MEM_SECRET_KEY` | `minioadmin` |
    /// | `S3MEM_REGION` | `us-east-1` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("S3MEM_LISTEN") {
            config.listen = v;
        }
        if let Ok(v) = std::env::var("S3MEM_ACCESS_KEY") {
            config.access_key = v;
        }
        if let Ok(v) = std::env::var("S3MEM_SECRET_KEY") {
            config.secret_key = v;
        }
        if let Ok(v) = std::env::var("S3MEM_REGION") {
            config.region = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// The credential pair described by this configuration.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.access_key.clone(), self.secret_key.clone())
    }
}
