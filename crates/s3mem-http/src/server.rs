//! Server lifecycle: bind, accept loop, graceful shutdown.
//!
//! [`S3Server::start`] binds the listener and spawns the accept loop onto the
//! current tokio runtime. The returned [`S3Server`] handle reports the bound
//! address and stops the loop on [`S3Server::shutdown`], giving in-flight
//! connections up to [`DRAIN_TIMEOUT`] to finish.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use s3mem_core::{S3MemConfig, StorageEngine};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::service::{S3HttpConfig, S3HttpService};

/// How long shutdown waits for open connections.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be parsed.
    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// The parse failure.
        source: std::net::AddrParseError,
    },

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that was requested.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Handle to a running server.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also stops
/// the accept loop.
#[derive(Debug)]
pub struct S3Server {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl S3Server {
    /// Bind `config.listen` and start serving `engine`.
    ///
    /// Must be called from within a tokio runtime. A port of `0` binds a free
    /// port; [`local_addr`](Self::local_addr) reports which.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the address is invalid or cannot be bound.
    pub async fn start(
        config: &S3MemConfig,
        engine: Arc<StorageEngine>,
    ) -> Result<Self, ServerError> {
        let addr: SocketAddr = config
            .listen
            .parse()
            .map_err(|source| ServerError::InvalidAddress {
                addr: config.listen.clone(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let service = S3HttpService::new(
            engine,
            S3HttpConfig {
                region: config.region.clone(),
            },
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(serve(listener, service, shutdown_rx));

        info!(addr = %local_addr, region = %config.region, "listening for connections");
        Ok(Self {
            local_addr,
            shutdown_tx,
            task,
        })
    }

    /// The address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and drain the open ones.
    pub async fn shutdown(self) {
        // The loop may already have exited; nothing left to signal then.
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            error!(error = %e, "server task failed");
        }
    }
}

/// Run the accept loop until the shutdown signal fires.
async fn serve(
    listener: TcpListener,
    service: S3HttpService,
    mut shutdown: oneshot::Receiver<()>,
) {
    let graceful = GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let conn = http.serve_connection(TokioIo::new(stream), service.clone());
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            _ = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    drop(listener);
    if tokio::time::timeout(DRAIN_TIMEOUT, graceful.shutdown())
        .await
        .is_err()
    {
        warn!(timeout = ?DRAIN_TIMEOUT, "connections still open after drain timeout");
    } else {
        info!("all connections drained");
    }
}
