//! `aws-chunked` payload decoding.
//!
//! SDK clients that sign in streaming mode wrap `PUT` bodies in chunk framing:
//!
//! ```text
//! <hex-size>;chunk-signature=<sig>\r\n
//! <data>\r\n
//! 0;chunk-signature=<sig>\r\n
//! \r\n
//! ```
//!
//! The server strips the framing and stores only the payload. Signatures are
//! not checked.

use bytes::{Bytes, BytesMut};

use crate::error::S3Error;

/// Whether the request body uses `aws-chunked` framing.
///
/// True when `Content-Encoding` mentions `aws-chunked` or when
/// `x-amz-content-sha256` carries a `STREAMING-` marker.
#[must_use]
pub fn is_aws_chunked(parts: &http::request::Parts) -> bool {
    header_str(parts, http::header::CONTENT_ENCODING.as_str())
        .is_some_and(|ce| ce.contains("aws-chunked"))
        || header_str(parts, "x-amz-content-sha256")
            .is_some_and(|sha| sha.starts_with("STREAMING-"))
}

fn header_str<'a>(parts: &'a http::request::Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Decode an `aws-chunked` body into the raw payload.
///
/// # Errors
///
/// Returns `InvalidRequest` if a size line is missing or not hex, or if chunk
/// data is truncated.
pub fn decode_aws_chunked(body: &[u8]) -> Result<Bytes, S3Error> {
    let mut output = BytesMut::with_capacity(body.len());
    let mut pos = 0;

    loop {
        let line_end = find_crlf(body, pos)
            .ok_or_else(|| malformed("missing chunk size line"))?;
        let size_line = &body[pos..line_end];

        // <hex-size>[;chunk-signature=<sig>]
        let hex_part = size_line
            .iter()
            .position(|&b| b == b';')
            .map_or(size_line, |semi| &size_line[..semi]);

        let hex_str =
            std::str::from_utf8(hex_part).map_err(|_| malformed("invalid chunk size encoding"))?;
        let chunk_size = usize::from_str_radix(hex_str.trim(), 16)
            .map_err(|_| malformed(&format!("invalid chunk size '{hex_str}'")))?;

        pos = line_end + 2;
        if chunk_size == 0 {
            break;
        }

        let data_end = pos
            .checked_add(chunk_size)
            .filter(|&end| end <= body.len())
            .ok_or_else(|| malformed("chunk data truncated"))?;
        output.extend_from_slice(&body[pos..data_end]);
        pos = data_end;

        if body.get(pos..pos + 2) != Some(b"\r\n".as_slice()) {
            return Err(malformed("missing CRLF after chunk data"));
        }
        pos += 2;
    }

    Ok(output.freeze())
}

fn malformed(detail: &str) -> S3Error {
    S3Error::invalid_request(format!("Malformed aws-chunked body: {detail}"))
}

/// Position of the next `\r\n` at or after `start`.
fn find_crlf(data: &[u8], start: usize) -> Option<usize> {
    data.get(start..)?
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|offset| start + offset)
}
