//! S3 XML documents for s3mem.
//!
//! This crate converts between the handful of XML documents the s3mem server
//! speaks and plain Rust structs. It has no knowledge of the storage engine.
//!
//! # Key components
//!
//! - [`S3Serialize`] and [`to_xml`] for response bodies
//! - [`S3Deserialize`] and [`from_xml`] for request bodies
//! - [`error_to_xml`] for the flat `<Error>` document
//!
//! # S3 XML conventions
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Timestamps: ISO 8601 with milliseconds (`2006-02-03T16:45:09.000Z`)
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

pub mod deserialize;
pub mod error;
pub mod serialize;
pub mod types;

pub use deserialize::{S3Deserialize, from_xml};
pub use error::{ErrorDocument, XmlError, error_to_xml};
pub use serialize::{S3_NAMESPACE, S3Serialize, location_to_xml, to_xml};
