use crate::config::CoreConfig;
use crate::credential::VaccinationCertificate;
use crate::CoreResult;

/// A resolved credential: the signed document as stored, its locator, and its typed projection.
///
/// Only the resolver constructs bundles, after the payload has parsed successfully.
#[derive(Clone, Debug)]
pub struct CredentialBundle {
    certificate_id: String,
    uri: String,
    signed_payload: String,
    credential: VaccinationCertificate,
}

impl CredentialBundle {
    pub(crate) fn new(
        certificate_id: String,
        uri: String,
        signed_payload: String,
        credential: VaccinationCertificate,
    ) -> Self {
        Self {
            certificate_id,
            uri,
            signed_payload,
            credential,
        }
    }

    /// Build a bundle from a signed credential held outside the registry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::CredentialSchema`] if `signed_payload` is not a vaccination credential.
    pub fn from_signed_payload(
        config: &CoreConfig,
        certificate_id: &str,
        signed_payload: String,
    ) -> CoreResult<Self> {
        let credential = VaccinationCertificate::parse(&signed_payload)?;
        Ok(Self::new(
            certificate_id.to_string(),
            config.certificate_uri(certificate_id),
            signed_payload,
            credential,
        ))
    }

    pub fn certificate_id(&self) -> &str {
        &self.certificate_id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The credential JSON exactly as the registry returned it.
    pub fn signed_payload(&self) -> &str {
        &self.signed_payload
    }

    pub fn credential(&self) -> &VaccinationCertificate {
        &self.credential
    }
}
