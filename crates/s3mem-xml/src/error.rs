//! XML error type and the S3 `<Error>` document.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// Errors raised while reading or writing XML.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// The document ended early or had an unexpected shape.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// A text value could not be parsed.
    #[error("failed to parse value: {0}")]
    ParseError(String),
}

/// Fields of an S3 `<Error>` response.
///
/// `Key`, `BucketName` and `Region` are omitted when empty. `Resource`,
/// `RequestId` and `HostId` are always written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDocument {
    /// S3 error code, e.g. `NoSuchBucket`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Object key the request addressed.
    pub key: String,
    /// Bucket the request addressed.
    pub bucket_name: String,
    /// Request path.
    pub resource: String,
    /// Server region.
    pub region: String,
    /// Request ID, echoed in the `x-amz-request-id` header.
    pub request_id: String,
    /// Host ID.
    pub host_id: String,
}

/// Format an S3 error as XML.
///
/// S3 errors are a flat `<Error>` element without an outer wrapper.
///
/// # Example output
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Error>
///   <Code>NoSuchBucket</Code>
///   <Message>The specified bucket does not exist</Message>
///   <BucketName>mybucket</BucketName>
///   <Resource>/mybucket</Resource>
///   <RequestId>4442587FB7D0A2F9</RequestId>
///   <HostId></HostId>
/// </Error>
/// ```
#[must_use]
pub fn error_to_xml(doc: &ErrorDocument) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    // Writing to Vec<u8> cannot fail short of a logic error.
    if let Err(e) = write_error_xml(&mut buf, doc) {
        tracing::error!(error = %e, "failed to serialize S3 error XML");
        buf.clear();
    }
    buf
}

fn write_error_xml(buf: &mut Vec<u8>, doc: &ErrorDocument) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer.create_element("Error").write_inner_content(|w| {
        w.create_element("Code")
            .write_text_content(BytesText::new(&doc.code))?;
        w.create_element("Message")
            .write_text_content(BytesText::new(&doc.message))?;
        for (tag, value) in [("Key", &doc.key), ("BucketName", &doc.bucket_name)] {
            if !value.is_empty() {
                w.create_element(tag)
                    .write_text_content(BytesText::new(value))?;
            }
        }
        w.create_element("Resource")
            .write_text_content(BytesText::new(&doc.resource))?;
        if !doc.region.is_empty() {
            w.create_element("Region")
                .write_text_content(BytesText::new(&doc.region))?;
        }
        w.create_element("RequestId")
            .write_text_content(BytesText::new(&doc.request_id))?;
        w.create_element("HostId")
            .write_text_content(BytesText::new(&doc.host_id))?;
        Ok(())
    })?;

    Ok(())
}
