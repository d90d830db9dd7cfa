//! Credential resolution against the registry.
//!
//! Looks up candidate certificate records and picks one by an explicit policy: the credential
//! with the most recent `issuanceDate` wins, credentials with an unparseable issuance date rank
//! last, and ties keep registry order.

use crate::bundle::CredentialBundle;
use crate::config::CoreConfig;
use crate::constants::{FIELD_MOBILE, FIELD_NAME, FIELD_PRE_ENROLLMENT_CODE};
use crate::credential::VaccinationCertificate;
use crate::{CoreError, CoreResult};
use certlocker_registry::{CertificateRecord, CertificateRegistry, RegistryFilter};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct CredentialResolver {
    registry: Arc<dyn CertificateRegistry>,
    config: Arc<CoreConfig>,
}

impl CredentialResolver {
    pub fn new(registry: Arc<dyn CertificateRegistry>, config: Arc<CoreConfig>) -> Self {
        Self { registry, config }
    }

    /// Resolve by the citizen's full name and registered phone number.
    ///
    /// Blank inputs resolve to [`CoreError::NotFound`] without querying the registry.
    pub async fn by_identity(&self, full_name: &str, phone: &str) -> CoreResult<CredentialBundle> {
        if full_name.trim().is_empty() || phone.trim().is_empty() {
            tracing::info!("identity lookup skipped: name or phone is blank");
            return Err(CoreError::NotFound);
        }

        let filter = RegistryFilter::new()
            .eq(FIELD_NAME, full_name)
            .eq(FIELD_MOBILE, phone);
        self.resolve(&filter).await
    }

    /// Resolve by the enrollment code issued at registration.
    pub async fn by_enrollment_code(&self, code: &str) -> CoreResult<CredentialBundle> {
        if code.trim().is_empty() {
            return Err(CoreError::NotFound);
        }

        let filter = RegistryFilter::new().eq(FIELD_PRE_ENROLLMENT_CODE, code);
        self.resolve(&filter).await
    }

    async fn resolve(&self, filter: &RegistryFilter) -> CoreResult<CredentialBundle> {
        let timeout = self.config.registry_timeout();
        let records = search_within(self.registry.as_ref(), filter, timeout).await?;

        if records.is_empty() {
            tracing::info!("no certificate records matched");
            return Err(CoreError::NotFound);
        }

        tracing::debug!(candidates = records.len(), "selecting certificate");
        select_most_recent(records, &self.config)
    }
}

async fn search_within(
    registry: &dyn CertificateRegistry,
    filter: &RegistryFilter,
    timeout: Duration,
) -> CoreResult<Vec<CertificateRecord>> {
    match tokio::time::timeout(timeout, registry.search_certificates(filter)).await {
        Err(_) => Err(CoreError::RegistryTimeout(timeout)),
        Ok(Err(e)) if e.is_timeout() => Err(CoreError::RegistryTimeout(timeout)),
        Ok(Err(e)) => Err(CoreError::Registry(e)),
        Ok(Ok(records)) => Ok(records),
    }
}

fn select_most_recent(
    records: Vec<CertificateRecord>,
    config: &CoreConfig,
) -> CoreResult<CredentialBundle> {
    let mut best: Option<CredentialBundle> = None;

    for record in records {
        let credential = VaccinationCertificate::parse(&record.certificate).map_err(|e| {
            tracing::warn!(certificate_id = %record.certificate_id, error = %e, "registry certificate failed to parse");
            e
        })?;

        let candidate = CredentialBundle::new(
            record.certificate_id.clone(),
            config.certificate_uri(&record.certificate_id),
            record.certificate,
            credential,
        );

        best = match best {
            Some(current)
                if current.credential().issued_at() >= candidate.credential().issued_at() =>
            {
                Some(current)
            }
            _ => Some(candidate),
        };
    }

    best.ok_or(CoreError::NotFound)
}
