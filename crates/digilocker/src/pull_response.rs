//! `PullURIResponse` wire model and translation helpers.
//!
//! Content fields are raw bytes on the domain type and base64 on the wire; translation happens
//! here and nowhere else.

use crate::{DigilockerError, DigilockerResult, DIGILOCKER_NS2};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Outcome reported in the `Status` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseStatus {
    /// `"1"`: a document was found and at least one artifact is attached.
    Success,
    /// `"0"`: no document could be produced for the request.
    Failure,
}

impl ResponseStatus {
    pub fn as_wire(self) -> &'static str {
        match self {
            ResponseStatus::Success => "1",
            ResponseStatus::Failure => "0",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(ResponseStatus::Success),
            "0" => Some(ResponseStatus::Failure),
            _ => None,
        }
    }
}

/// The `DocDetails` block of a response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseDocDetails {
    pub doc_type: String,
    pub digilocker_id: String,
    pub uid: Option<String>,
    pub full_name: String,
    pub dob: String,
    pub udf1: Option<String>,
    pub udf2: Option<String>,
    /// Stable locator of the issued document.
    pub uri: Option<String>,
    /// Rendered PDF bytes.
    pub doc_content: Option<Vec<u8>>,
    /// Certificate envelope bytes.
    pub data_content: Option<Vec<u8>>,
}

/// A Pull-URI response, ready for encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullUriResponse {
    pub status: ResponseStatus,
    /// Echo of the request's `ts`.
    pub ts: String,
    /// Echo of the request's `txn`.
    pub txn: String,
    pub doc_details: ResponseDocDetails,
}

impl PullUriResponse {
    /// Render the response as an XML document (declaration included).
    ///
    /// # Errors
    ///
    /// Returns [`DigilockerError::Serialization`] if serialisation fails.
    pub fn render(&self) -> DigilockerResult<String> {
        let d = &self.doc_details;
        let wire = PullUriResponseWire {
            ns2: Some(DIGILOCKER_NS2.to_string()),
            response_status: ResponseStatusWire {
                status: self.status.as_wire().to_string(),
                ts: self.ts.clone(),
                txn: self.txn.clone(),
            },
            doc_details: ResponseDocDetailsWire {
                doc_type: d.doc_type.clone(),
                digilocker_id: d.digilocker_id.clone(),
                uid: d.uid.clone(),
                full_name: d.full_name.clone(),
                dob: d.dob.clone(),
                udf1: d.udf1.clone(),
                udf2: d.udf2.clone(),
                uri: d.uri.clone(),
                doc_content: d
                    .doc_content
                    .as_ref()
                    .map(|bytes| general_purpose::STANDARD.encode(bytes)),
                data_content: d
                    .data_content
                    .as_ref()
                    .map(|bytes| general_purpose::STANDARD.encode(bytes)),
            },
        };

        let body = quick_xml::se::to_string(&wire)
            .map_err(|e| DigilockerError::Serialization(format!("PullURIResponse: {e}")))?;
        Ok(format!("{XML_DECLARATION}{body}"))
    }

    /// Parse a `PullURIResponse` from XML text, decoding base64 content fields.
    ///
    /// # Errors
    ///
    /// Returns [`DigilockerError`] if:
    /// - the XML does not match the response schema,
    /// - `Status` is not `"0"` or `"1"`,
    /// - `DocContent` or `DataContent` is not valid base64.
    pub fn parse(xml_text: &str) -> DigilockerResult<Self> {
        let wire: PullUriResponseWire = crate::from_xml(xml_text, "PullURIResponse")?;

        let status = ResponseStatus::from_wire(&wire.response_status.status).ok_or_else(|| {
            DigilockerError::InvalidInput(format!(
                "unknown response status '{}'",
                wire.response_status.status
            ))
        })?;

        let d = wire.doc_details;
        Ok(Self {
            status,
            ts: wire.response_status.ts,
            txn: wire.response_status.txn,
            doc_details: ResponseDocDetails {
                doc_type: d.doc_type,
                digilocker_id: d.digilocker_id,
                uid: non_empty(d.uid),
                full_name: d.full_name,
                dob: d.dob,
                udf1: non_empty(d.udf1),
                udf2: non_empty(d.udf2),
                uri: non_empty(d.uri),
                doc_content: decode_content(d.doc_content, "DocContent")?,
                data_content: decode_content(d.data_content, "DataContent")?,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn decode_content(value: Option<String>, field: &'static str) -> DigilockerResult<Option<Vec<u8>>> {
    match non_empty(value) {
        None => Ok(None),
        Some(text) => general_purpose::STANDARD
            .decode(text.trim())
            .map(Some)
            .map_err(|source| DigilockerError::InvalidBase64 { field, source }),
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename = "PullURIResponse")]
struct PullUriResponseWire {
    #[serde(rename = "@xmlns:ns2", default, skip_serializing_if = "Option::is_none")]
    ns2: Option<String>,

    #[serde(rename = "ResponseStatus")]
    response_status: ResponseStatusWire,

    #[serde(rename = "DocDetails")]
    doc_details: ResponseDocDetailsWire,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
struct ResponseStatusWire {
    #[serde(rename = "@Status")]
    status: String,

    #[serde(rename = "@ts")]
    ts: String,

    #[serde(rename = "@txn")]
    txn: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
struct ResponseDocDetailsWire {
    #[serde(rename = "DocType", default)]
    doc_type: String,

    #[serde(rename = "DigiLockerId", default)]
    digilocker_id: String,

    #[serde(rename = "UID", default, skip_serializing_if = "Option::is_none")]
    uid: Option<String>,

    #[serde(rename = "FullName", default)]
    full_name: String,

    #[serde(rename = "DOB", default)]
    dob: String,

    #[serde(rename = "UDF1", default, skip_serializing_if = "Option::is_none")]
    udf1: Option<String>,

    #[serde(rename = "UDF2", default, skip_serializing_if = "Option::is_none")]
    udf2: Option<String>,

    #[serde(rename = "URI", default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,

    #[serde(rename = "DocContent", default, skip_serializing_if = "Option::is_none")]
    doc_content: Option<String>,

    #[serde(rename = "DataContent", default, skip_serializing_if = "Option::is_none")]
    data_content: Option<String>,
}
