//! Pull-URI request handling: resolution, artifact production and response assembly.

use crate::bundle::CredentialBundle;
use crate::config::CoreConfig;
use crate::formatting::display_fields;
use crate::resolver::CredentialResolver;
use crate::{CoreError, CoreResult};
use certlocker_registry::CertificateRegistry;
use certlocker_render::DocumentRenderer;
use digilocker::{
    CertificateEnvelope, PullUriRequest, PullUriResponse, ResponseDocDetails, ResponseStatus,
};
use std::sync::Arc;

/// Answers DigiLocker pulls and direct certificate downloads.
#[derive(Clone)]
pub struct PullService {
    config: Arc<CoreConfig>,
    resolver: CredentialResolver,
    renderer: Arc<dyn DocumentRenderer>,
}

impl PullService {
    pub fn new(
        config: Arc<CoreConfig>,
        registry: Arc<dyn CertificateRegistry>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            resolver: CredentialResolver::new(registry, config.clone()),
            config,
            renderer,
        }
    }

    /// Build the response to a decoded Pull-URI request.
    ///
    /// Resolution failures of any kind yield a failure-status response rather than an error.
    /// A failed render drops `DocContent` but keeps any other artifact.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoContent`] when a credential was found but no requested artifact
    /// could be produced.
    pub async fn respond(&self, request: &PullUriRequest) -> CoreResult<PullUriResponse> {
        let details = &request.doc_details;
        let mut response = PullUriResponse {
            status: ResponseStatus::Failure,
            ts: request.ts.clone(),
            txn: request.txn.clone(),
            doc_details: ResponseDocDetails {
                doc_type: self.config.doc_type().to_string(),
                digilocker_id: details.digilocker_id.clone(),
                full_name: details.full_name.clone(),
                dob: details.dob.clone(),
                ..ResponseDocDetails::default()
            },
        };

        let bundle = match self
            .resolver
            .by_identity(&details.full_name, &details.udf1)
            .await
        {
            Ok(bundle) => bundle,
            Err(CoreError::NotFound) => {
                tracing::info!(txn = %request.txn, "no credential for pull request");
                return Ok(response);
            }
            Err(e) => {
                tracing::warn!(txn = %request.txn, error = %e, "credential resolution failed");
                return Ok(response);
            }
        };

        if request.format.wants_pdf() {
            match self.render_pdf(&bundle, &details.dob).await {
                Ok(pdf) => response.doc_details.doc_content = Some(pdf),
                Err(e) => tracing::error!(
                    txn = %request.txn,
                    certificate_id = %bundle.certificate_id(),
                    error = %e,
                    "failed to render certificate PDF"
                ),
            }
        }

        if request.format.wants_xml() {
            let envelope =
                CertificateEnvelope::wrap(bundle.certificate_id(), bundle.signed_payload());
            response.doc_details.data_content = Some(envelope.into_bytes());
        }

        if response.doc_details.doc_content.is_none() && response.doc_details.data_content.is_none()
        {
            return Err(CoreError::NoContent {
                certificate_id: bundle.certificate_id().to_string(),
            });
        }

        tracing::info!(
            txn = %request.txn,
            certificate_id = %bundle.certificate_id(),
            format = request.format.as_wire(),
            "pull request answered"
        );
        response.status = ResponseStatus::Success;
        response.doc_details.uri = Some(bundle.uri().to_string());
        Ok(response)
    }

    /// Render the certificate PDF for an enrollment code.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] when no credential matches, registry and schema errors as
    /// resolved, and [`CoreError::Render`] if rendering fails.
    pub async fn certificate_pdf(&self, pre_enrollment_code: &str) -> CoreResult<Vec<u8>> {
        let bundle = self.resolver.by_enrollment_code(pre_enrollment_code).await?;
        self.render_pdf(&bundle, "").await
    }

    async fn render_pdf(&self, bundle: &CredentialBundle, request_dob: &str) -> CoreResult<Vec<u8>> {
        let today = chrono::Utc::now().date_naive();
        let fields = display_fields(bundle, request_dob, today);
        let raw_credential = bundle.signed_payload().to_string();
        let renderer = Arc::clone(&self.renderer);

        let rendered = tokio::task::spawn_blocking(move || renderer.render(&fields, &raw_credential))
            .await
            .map_err(|e| CoreError::Task(e.to_string()))?;

        Ok(rendered?)
    }
}
