//! The `<certificate>` envelope carried in `DataContent`.
//!
//! The signed credential JSON is placed verbatim in a CDATA section so that consumers can recover
//! it byte-for-byte:
//!
//! ```xml
//! <certificate id="CERT-1"><![CDATA[{"@context":[...],...}]]></certificate>
//! ```

use crate::{DigilockerError, DigilockerResult};
use quick_xml::events::Event;
use quick_xml::Reader;

const ROOT: &[u8] = b"certificate";

/// A certificate id with its raw signed payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateEnvelope {
    pub id: String,
    pub payload: String,
}

impl CertificateEnvelope {
    /// Build the envelope text for `id` and `payload`.
    ///
    /// A payload containing `]]>` is split across adjacent CDATA sections, which
    /// [`CertificateEnvelope::unwrap`] joins back together.
    pub fn wrap(id: &str, payload: &str) -> String {
        let id = quick_xml::escape::escape(id);
        let body = payload.replace("]]>", "]]]]><![CDATA[>");
        format!("<certificate id=\"{id}\"><![CDATA[{body}]]></certificate>")
    }

    /// Recover the id and payload from envelope text.
    ///
    /// # Errors
    ///
    /// Returns [`DigilockerError::InvalidEnvelope`] if the text is not well-formed, the root is
    /// not `certificate`, or the `id` attribute is missing.
    pub fn unwrap(text: &str) -> DigilockerResult<Self> {
        let mut reader = Reader::from_str(text);
        let mut id: Option<String> = None;
        let mut payload = String::new();
        let mut closed = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| DigilockerError::InvalidEnvelope(e.to_string()))?;

            match event {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Start(start) if id.is_none() => {
                    if start.name().as_ref() != ROOT {
                        return Err(DigilockerError::InvalidEnvelope(format!(
                            "unexpected root element '{}'",
                            String::from_utf8_lossy(start.name().as_ref())
                        )));
                    }
                    let attr = start
                        .try_get_attribute("id")
                        .map_err(|e| DigilockerError::InvalidEnvelope(e.to_string()))?
                        .ok_or_else(|| {
                            DigilockerError::InvalidEnvelope("missing id attribute".into())
                        })?;
                    let value = attr
                        .unescape_value()
                        .map_err(|e| DigilockerError::InvalidEnvelope(e.to_string()))?;
                    id = Some(value.into_owned());
                }
                Event::CData(cdata) if id.is_some() && !closed => {
                    let bytes = cdata.into_inner();
                    let chunk = std::str::from_utf8(&bytes)
                        .map_err(|e| DigilockerError::InvalidEnvelope(e.to_string()))?;
                    payload.push_str(chunk);
                }
                Event::Text(text) if id.is_some() && !closed => {
                    let chunk = text
                        .unescape()
                        .map_err(|e| DigilockerError::InvalidEnvelope(e.to_string()))?;
                    if !chunk.trim().is_empty() {
                        payload.push_str(&chunk);
                    }
                }
                Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
                Event::End(end) if id.is_some() && end.name().as_ref() == ROOT => {
                    closed = true;
                }
                Event::Eof => break,
                other => {
                    return Err(DigilockerError::InvalidEnvelope(format!(
                        "unexpected content: {other:?}"
                    )))
                }
            }
        }

        match (id, closed) {
            (Some(id), true) => Ok(Self { id, payload }),
            (None, _) => Err(DigilockerError::InvalidEnvelope(
                "missing certificate element".into(),
            )),
            (Some(_), false) => Err(DigilockerError::InvalidEnvelope(
                "unterminated certificate element".into(),
            )),
        }
    }
}
