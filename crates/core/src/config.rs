//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables.

use crate::constants::{CERTIFICATE_TEMPLATE_PATH, DEFAULT_REGISTRY_TIMEOUT_SECS};
use crate::validation::validate_certificate_uri_base;
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    doc_type: String,
    certificate_uri_base: String,
    registry_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// A trailing `/` on `certificate_uri_base` is dropped.
    pub fn new(
        doc_type: String,
        certificate_uri_base: String,
        registry_timeout: Duration,
    ) -> CoreResult<Self> {
        if doc_type.trim().is_empty() {
            return Err(CoreError::InvalidInput("doc_type cannot be empty".into()));
        }

        validate_certificate_uri_base(&certificate_uri_base)?;

        if registry_timeout.is_zero() {
            return Err(CoreError::InvalidInput(
                "registry_timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            doc_type: doc_type.trim().to_string(),
            certificate_uri_base: certificate_uri_base.trim_end_matches('/').to_string(),
            registry_timeout,
        })
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn certificate_uri_base(&self) -> &str {
        &self.certificate_uri_base
    }

    pub fn registry_timeout(&self) -> Duration {
        self.registry_timeout
    }

    /// Locator URI for a certificate id.
    pub fn certificate_uri(&self, certificate_id: &str) -> String {
        format!("{}/{}", self.certificate_uri_base, certificate_id)
    }
}

/// Resolve the certificate template PDF without reading environment variables.
///
/// If `override_path` is provided, it must be an existing file. Otherwise this searches for
/// `assets/certificate-template.pdf` relative to the current working directory and then walks up
/// from `CARGO_MANIFEST_DIR`.
pub fn resolve_certificate_template(override_path: Option<PathBuf>) -> CoreResult<PathBuf> {
    if let Some(template) = override_path {
        if template.is_file() {
            return Ok(template);
        }
        return Err(CoreError::InvalidInput(format!(
            "CERTIFICATE_TEMPLATE_PDF override is not a file: {}",
            template.display()
        )));
    }

    let cwd_relative = PathBuf::from(CERTIFICATE_TEMPLATE_PATH);
    if cwd_relative.is_file() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(CERTIFICATE_TEMPLATE_PATH);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(CoreError::InvalidInput(format!(
        "could not locate {CERTIFICATE_TEMPLATE_PATH}"
    )))
}

/// Parse the registry timeout from an optional string value (whole seconds).
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn registry_timeout_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let secs = match value {
        None => DEFAULT_REGISTRY_TIMEOUT_SECS,
        Some(v) => v.parse::<u64>().map_err(|e| {
            CoreError::InvalidInput(format!("REGISTRY_TIMEOUT_SECS '{v}' is not a number: {e}"))
        })?,
    };

    if secs == 0 {
        return Err(CoreError::InvalidInput(
            "REGISTRY_TIMEOUT_SECS must be at least 1".into(),
        ));
    }

    Ok(Duration::from_secs(secs))
}
