//! Typed view of a signed vaccination credential.
//!
//! The registry stores the signed credential as JSON text. This module parses that text into a
//! strict typed projection used for display. The original text is kept untouched elsewhere (it is
//! what gets signed, embedded in the QR code and returned in `DataContent`).

use crate::{CoreError, CoreResult};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A W3C-style verifiable credential attesting one or more vaccinations.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationCertificate {
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    pub credential_subject: CredentialSubject,
    pub issuer: String,
    pub issuance_date: String,
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub non_transferable: Option<serde_json::Value>,
    pub proof: Proof,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    #[serde(rename = "type", default)]
    pub subject_type: String,
    /// Identity the subject presented, e.g. `did:in.gov.uidai.aadhaar:123456789012`.
    pub id: String,
    pub name: String,
    pub gender: String,
    /// Absent or `null` when the issuer did not record an age.
    #[serde(default)]
    pub age: Option<AgeValue>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub nationality: String,
}

/// Issuers write age either as a JSON number or as a string.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AgeValue {
    Number(serde_json::Number),
    Text(String),
}

impl AgeValue {
    pub fn as_text(&self) -> String {
        match self {
            AgeValue::Number(n) => n.to_string(),
            AgeValue::Text(s) => s.clone(),
        }
    }
}

/// One vaccination event.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub feedback_url: String,
    #[serde(default)]
    pub info_url: String,
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    pub batch: String,
    pub vaccine: String,
    #[serde(default)]
    pub manufacturer: String,
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub effective_start: String,
    #[serde(default)]
    pub effective_until: String,
    pub verifier: Verifier,
    pub facility: Facility,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Verifier {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Facility {
    pub name: String,
    #[serde(default)]
    pub address: FacilityAddress,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FacilityAddress {
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub street_address2: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address_region: String,
    #[serde(default)]
    pub address_country: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub verification_method: String,
    #[serde(default)]
    pub proof_purpose: String,
    #[serde(default)]
    pub jws: String,
}

impl VaccinationCertificate {
    /// Parse signed credential JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CredentialSchema`] naming the failing path if a required field is
    /// missing or mistyped, or if the credential carries no evidence entries.
    pub fn parse(json_text: &str) -> CoreResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let credential: Self = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            CoreError::CredentialSchema(format!("schema mismatch at {path}: {source}"))
        })?;

        if credential.evidence.is_empty() {
            return Err(CoreError::CredentialSchema(
                "credential has no evidence entries".into(),
            ));
        }

        Ok(credential)
    }

    /// Issuance instant, if `issuanceDate` is RFC 3339.
    pub fn issued_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.issuance_date.trim()).ok()
    }

    /// The most recent evidence entry by `date`; ties keep document order.
    pub fn latest_evidence(&self) -> Option<&Evidence> {
        self.evidence.iter().fold(None, |best: Option<&Evidence>, entry| match best {
            Some(current) if current.date >= entry.date => Some(current),
            _ => Some(entry),
        })
    }
}
