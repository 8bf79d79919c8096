//! Response body for the S3 service.
//!
//! Objects already live in memory, so every body is a single buffered frame.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::Full;

/// A fully buffered response body. Header-only replies carry zero bytes.
#[derive(Debug)]
pub struct S3ResponseBody(Full<Bytes>);

impl S3ResponseBody {
    /// A body holding `data`: XML documents, JSON, or an object payload.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self(Full::new(data.into()))
    }

    /// A zero-length body.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }
}

impl Default for S3ResponseBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl Body for S3ResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        Pin::new(&mut self.get_mut().0).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.0.size_hint()
    }
}
