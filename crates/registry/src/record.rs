//! Typed projection of registry certificate records.

use crate::{RegistryError, RegistryResult};
use serde_json::{Map, Value};

/// The fields of a registry certificate record that this service relies on.
///
/// Other record fields (`osid`, `name`, `mobile`, ...) are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateRecord {
    pub certificate_id: String,
    /// The signed credential, stored by the registry as JSON text.
    pub certificate: String,
}

impl CertificateRecord {
    /// Project a raw registry record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SchemaMismatch`] if `certificateId` or `certificate` is missing,
    /// empty or not a string.
    pub fn from_json(record: &Map<String, Value>) -> RegistryResult<Self> {
        Ok(Self {
            certificate_id: required_str(record, "certificateId")?,
            certificate: required_str(record, "certificate")?,
        })
    }
}

fn required_str(record: &Map<String, Value>, field: &str) -> RegistryResult<String> {
    match record.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(RegistryError::SchemaMismatch(format!(
            "field '{field}' is empty"
        ))),
        Some(other) => Err(RegistryError::SchemaMismatch(format!(
            "field '{field}' must be a string, found {}",
            json_kind(other)
        ))),
        None => Err(RegistryError::SchemaMismatch(format!(
            "missing field '{field}'"
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
