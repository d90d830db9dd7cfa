//! `PullURIRequest` wire model and translation helpers.
//!
//! DigiLocker sends one of these per pull. The root element carries the correlation attributes
//! (`ts`, `txn`), the calling organisation and the requested output format; the nested
//! `DocDetails` block carries the citizen's identity attributes and organisation-defined fields.
//!
//! ```xml
//! <PullURIRequest xmlns:ns2="http://tempuri.org/" ver="1.0" ts="2021-01-20T10:00:00+05:30"
//!     txn="TXN-1" orgId="in.gov.example" format="both">
//!   <DocDetails>
//!     <DocType>VACER</DocType>
//!     <DigiLockerId>123e4567</DigiLockerId>
//!     <UID>123456789012</UID>
//!     <FullName>Asha Rao</FullName>
//!     <DOB>10-05-1990</DOB>
//!     <UDF1>9876543210</UDF1>
//!   </DocDetails>
//! </PullURIRequest>
//! ```

use crate::{DigilockerError, DigilockerResult, DIGILOCKER_NS2};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Output format requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocFormat {
    /// Rendered PDF only (`DocContent`).
    Pdf,
    /// Certificate envelope only (`DataContent`).
    Xml,
    /// Both artifacts.
    Both,
}

impl DocFormat {
    /// Convert to the wire attribute value.
    pub fn as_wire(self) -> &'static str {
        match self {
            DocFormat::Pdf => "pdf",
            DocFormat::Xml => "xml",
            DocFormat::Both => "both",
        }
    }

    /// Parse from the wire attribute value.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim() {
            "pdf" => Some(DocFormat::Pdf),
            "xml" => Some(DocFormat::Xml),
            "both" => Some(DocFormat::Both),
            _ => None,
        }
    }

    /// Whether a rendered PDF was requested.
    pub fn wants_pdf(self) -> bool {
        matches!(self, DocFormat::Pdf | DocFormat::Both)
    }

    /// Whether the raw certificate envelope was requested.
    pub fn wants_xml(self) -> bool {
        matches!(self, DocFormat::Xml | DocFormat::Both)
    }
}

/// Identity attributes carried in the request's `DocDetails` block.
///
/// Absent elements decode as empty strings, matching how DigiLocker omits unused fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestDocDetails {
    pub doc_type: String,
    pub digilocker_id: String,
    /// National identity number.
    pub uid: String,
    pub full_name: String,
    /// Date of birth as sent by DigiLocker (usually `DD-MM-YYYY`).
    pub dob: String,
    pub photo: String,
    /// Organisation-defined field 1; carries the citizen's registered phone number.
    pub udf1: String,
    pub udf2: String,
    pub udf3: String,
    pub udfn: String,
}

/// A decoded, immutable Pull-URI request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullUriRequest {
    pub ver: Option<String>,
    /// Request timestamp; echoed verbatim in the response.
    pub ts: String,
    /// Transaction id; echoed verbatim in the response.
    pub txn: String,
    pub org_id: String,
    pub format: DocFormat,
    pub doc_details: RequestDocDetails,
}

impl PullUriRequest {
    /// Parse a `PullURIRequest` from XML text.
    ///
    /// # Errors
    ///
    /// Returns [`DigilockerError`] if:
    /// - the text is not well-formed XML,
    /// - a required attribute (`ts`, `txn`, `orgId`, `format`) or the `DocDetails` block is
    ///   missing,
    /// - `format` is not one of `pdf`, `xml`, `both`.
    pub fn parse(xml_text: &str) -> DigilockerResult<Self> {
        let wire: PullUriRequestWire = crate::from_xml(xml_text, "PullURIRequest")?;

        let format = DocFormat::from_wire(&wire.format).ok_or_else(|| {
            DigilockerError::InvalidInput(format!(
                "unsupported format '{}', expected pdf, xml or both",
                wire.format
            ))
        })?;

        let d = wire.doc_details;
        Ok(Self {
            ver: wire.ver,
            ts: wire.ts,
            txn: wire.txn,
            org_id: wire.org_id,
            format,
            doc_details: RequestDocDetails {
                doc_type: d.doc_type,
                digilocker_id: d.digilocker_id,
                uid: d.uid,
                full_name: d.full_name,
                dob: d.dob,
                photo: d.photo,
                udf1: d.udf1,
                udf2: d.udf2,
                udf3: d.udf3,
                udfn: d.udfn,
            },
        })
    }

    /// Render the request as XML text.
    ///
    /// Used by operator tooling to build signed test requests.
    ///
    /// # Errors
    ///
    /// Returns [`DigilockerError::Serialization`] if serialisation fails.
    pub fn render(&self) -> DigilockerResult<String> {
        let d = &self.doc_details;
        let wire = PullUriRequestWire {
            ns2: Some(DIGILOCKER_NS2.to_string()),
            ver: self.ver.clone(),
            ts: self.ts.clone(),
            txn: self.txn.clone(),
            org_id: self.org_id.clone(),
            format: self.format.as_wire().to_string(),
            doc_details: RequestDocDetailsWire {
                doc_type: d.doc_type.clone(),
                digilocker_id: d.digilocker_id.clone(),
                uid: d.uid.clone(),
                full_name: d.full_name.clone(),
                dob: d.dob.clone(),
                photo: d.photo.clone(),
                udf1: d.udf1.clone(),
                udf2: d.udf2.clone(),
                udf3: d.udf3.clone(),
                udfn: d.udfn.clone(),
            },
        };

        quick_xml::se::to_string(&wire)
            .map_err(|e| DigilockerError::Serialization(format!("PullURIRequest: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename = "PullURIRequest")]
struct PullUriRequestWire {
    #[serde(rename = "@xmlns:ns2", default, skip_serializing_if = "Option::is_none")]
    ns2: Option<String>,

    #[serde(rename = "@ver", default, skip_serializing_if = "Option::is_none")]
    ver: Option<String>,

    #[serde(rename = "@ts")]
    ts: String,

    #[serde(rename = "@txn")]
    txn: String,

    #[serde(rename = "@orgId")]
    org_id: String,

    #[serde(rename = "@format")]
    format: String,

    #[serde(rename = "DocDetails")]
    doc_details: RequestDocDetailsWire,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
struct RequestDocDetailsWire {
    #[serde(rename = "DocType", default)]
    doc_type: String,

    #[serde(rename = "DigiLockerId", default)]
    digilocker_id: String,

    #[serde(rename = "UID", default)]
    uid: String,

    #[serde(rename = "FullName", default)]
    full_name: String,

    #[serde(rename = "DOB", default)]
    dob: String,

    #[serde(rename = "Photo", default)]
    photo: String,

    #[serde(rename = "UDF1", default)]
    udf1: String,

    #[serde(rename = "UDF2", default)]
    udf2: String,

    #[serde(rename = "UDF3", default)]
    udf3: String,

    #[serde(rename = "UDFn", default)]
    udfn: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<PullURIRequest xmlns:ns2="http://tempuri.org/" ver="1.0" ts="2021-01-20T10:00:00+05:30" txn="TXN-42" orgId="in.gov.example" format="both">
  <DocDetails>
    <DocType>VACER</DocType>
    <DigiLockerId>123e4567</DigiLockerId>
    <UID>123456789012</UID>
    <FullName>Asha Rao</FullName>
    <DOB>10-05-1990</DOB>
    <UDF1>9876543210</UDF1>
  </DocDetails>
</PullURIRequest>"#;

    #[test]
    fn parses_sample_request() {
        let request = PullUriRequest::parse(SAMPLE).expect("parse request");

        assert_eq!(request.ver.as_deref(), Some("1.0"));
        assert_eq!(request.ts, "2021-01-20T10:00:00+05:30");
        assert_eq!(request.txn, "TXN-42");
        assert_eq!(request.org_id, "in.gov.example");
        assert_eq!(request.format, DocFormat::Both);
        assert_eq!(request.doc_details.full_name, "Asha Rao");
        assert_eq!(request.doc_details.dob, "10-05-1990");
        assert_eq!(request.doc_details.uid, "123456789012");
        assert_eq!(request.doc_details.udf1, "9876543210");
        assert_eq!(request.doc_details.udf2, "");
        assert_eq!(request.doc_details.photo, "");
    }

    #[test]
    fn render_then_parse_preserves_request() {
        let request = PullUriRequest::parse(SAMPLE).expect("parse request");
        let xml = request.render().expect("render request");
        assert!(xml.starts_with("<PullURIRequest"));
        let reparsed = PullUriRequest::parse(&xml).expect("reparse request");
        assert_eq!(request, reparsed);
    }

    #[test]
    fn rejects_missing_txn() {
        let input = r#"<PullURIRequest ts="1" orgId="org" format="pdf"><DocDetails/></PullURIRequest>"#;

        let err = PullUriRequest::parse(input).expect_err("should reject missing txn");
        match err {
            DigilockerError::Translation(msg) => assert!(msg.contains("txn"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        let input = r#"<PullURIRequest ts="1" txn="2" orgId="org" format="docx"><DocDetails/></PullURIRequest>"#;

        let err = PullUriRequest::parse(input).expect_err("should reject docx");
        match err {
            DigilockerError::InvalidInput(msg) => assert!(msg.contains("docx")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_xml() {
        let err = PullUriRequest::parse("<PullURIRequest ts=\"1\"").expect_err("malformed");
        assert!(matches!(err, DigilockerError::Translation(_)));
    }

    #[test]
    fn format_flags() {
        assert!(DocFormat::Pdf.wants_pdf() && !DocFormat::Pdf.wants_xml());
        assert!(DocFormat::Xml.wants_xml() && !DocFormat::Xml.wants_pdf());
        assert!(DocFormat::Both.wants_pdf() && DocFormat::Both.wants_xml());
        assert_eq!(DocFormat::from_wire(" xml "), Some(DocFormat::Xml));
        assert_eq!(DocFormat::from_wire("PDF"), None);
    }
}
