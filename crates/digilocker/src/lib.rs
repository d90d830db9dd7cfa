//! DigiLocker Pull-URI wire/boundary support.
//!
//! This crate provides **wire models** and **format/translation helpers** for the XML exchange
//! by which DigiLocker pulls a document on behalf of a citizen:
//! - `PullURIRequest` (inbound, decoded)
//! - `PullURIResponse` (outbound, encoded; decodable for consumers and tests)
//! - the `<certificate>` envelope carried base64-encoded in `DataContent`
//!
//! This crate focuses on:
//! - strict serialisation/deserialisation of the fixed schema
//! - translation between domain structs and wire structs
//! - base64 handling of the content fields
//!
//! It knows nothing about registries, rendering or HTTP.

pub mod envelope;
pub mod pull_request;
pub mod pull_response;

pub use envelope::CertificateEnvelope;
pub use pull_request::{DocFormat, PullUriRequest, RequestDocDetails};
pub use pull_response::{PullUriResponse, ResponseDocDetails, ResponseStatus};

/// Namespace bound to the `ns2` prefix on DigiLocker documents.
pub const DIGILOCKER_NS2: &str = "http://tempuri.org/";

/// Errors returned by the `digilocker` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum DigilockerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("failed to serialise XML: {0}")]
    Serialization(String),

    #[error("invalid base64 in {field}: {source}")]
    InvalidBase64 {
        field: &'static str,
        source: base64::DecodeError,
    },

    #[error("invalid certificate envelope: {0}")]
    InvalidEnvelope(String),
}

/// Type alias for Results that can fail with a [`DigilockerError`].
pub type DigilockerResult<T> = Result<T, DigilockerError>;

/// Deserialise a wire struct from XML text, reporting the failing path on schema mismatch.
pub(crate) fn from_xml<'de, T>(xml_text: &'de str, what: &str) -> DigilockerResult<T>
where
    T: serde::Deserialize<'de>,
{
    let mut deserializer = quick_xml::de::Deserializer::from_str(xml_text);

    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(DigilockerError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}
