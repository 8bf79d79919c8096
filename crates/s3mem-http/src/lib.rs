//! S3 HTTP layer for s3mem: routing, dispatch, responses, and the hyper server.
//!
//! - **Routing** ([`router`]): maps method, path, and query flags to an
//!   [`S3Operation`](router::S3Operation). Path-style addressing only.
//! - **Dispatch** ([`dispatch`]): runs one operation against the
//!   [`StorageEngine`](s3mem_core::StorageEngine).
//! - **Responses** ([`response`]): XML documents, object payloads, and the
//!   `<Error>` envelope.
//! - **Service** ([`service`]): the hyper `Service` tying it together.
//! - **Server** ([`server`]): bind, accept loop, graceful shutdown.
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> S3HttpService (hyper Service)
//!     -> Health check interception
//!     -> router::route (operation identification)
//!     -> Body collection (+ aws-chunked decoding)
//!     -> dispatch_operation (StorageEngine)
//!     -> Common response headers (x-amz-request-id, Server)
//!   <- HTTP Response
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use s3mem_core::{S3MemConfig, StorageEngine};
//! use s3mem_http::S3Server;
//!
//! # async fn run() -> Result<(), s3mem_http::server::ServerError> {
//! let config = S3MemConfig::default();
//! let engine = Arc::new(StorageEngine::from_config(&config));
//! let server = S3Server::start(&config, engine).await?;
//! println!("listening on {}", server.local_addr());
//! server.shutdown().await;
//! # Ok(())
//! # }
//! ```

// S3Error carries owned strings for the error document; boxing it in every
// Result would only add indirection.
#![allow(clippy::result_large_err)]

pub mod body;
pub mod codec;
pub mod dispatch;
pub mod error;
pub mod response;
pub mod router;
pub mod server;
pub mod service;

pub use body::S3ResponseBody;
pub use error::{S3Error, S3ErrorCode};
pub use router::{RoutingContext, S3Operation};
pub use server::{S3Server, ServerError};
pub use service::{S3HttpConfig, S3HttpService};
