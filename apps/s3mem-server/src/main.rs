//! s3mem server - an in-memory S3-compatible endpoint.
//!
//! Everything lives in process memory and is gone when the process exits.
//!
//! # Usage
//!
//! ```text
//! S3MEM_LISTEN=0.0.0.0:9000 s3mem-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `S3MEM_LISTEN` | `127.0.0.1:9000` | Bind address |
//! | `S3MEM_ACCESS_KEY` | `minioadmin` | Access key reported by the engine |
//! | `S3MEM_SECRET_KEY` | `minioadmin` | Secret key held by the engine |
//! | `S3MEM_REGION` | `us-east-1` | Region for `GetBucketLocation` and errors |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::sync::Arc;

use anyhow::{Context, Result};
use s3mem_core::{S3MemConfig, StorageEngine};
use s3mem_http::S3Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        build_filter(log_level)?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

fn build_filter(log_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(log_level).with_context(|| format!("invalid log level filter: {log_level}"))
}

/// Probe the health endpoint of a running server.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = S3MemConfig::from_env();

    // Handle --health-check flag for container health checks.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    info!(
        listen = %config.listen,
        region = %config.region,
        access_key = %config.access_key,
        version = VERSION,
        "starting s3mem server",
    );

    let engine = Arc::new(StorageEngine::from_config(&config));
    let server = S3Server::start(&config, engine)
        .await
        .with_context(|| format!("failed to start server on {}", config.listen))?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("received shutdown signal, draining connections");

    server.shutdown().await;
    info!("server stopped");
    Ok(())
}
