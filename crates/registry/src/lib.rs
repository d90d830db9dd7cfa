//! # Certificate registry client
//!
//! Typed access to the credential registry that holds issued vaccination certificates.
//!
//! The registry speaks a small JSON search protocol:
//!
//! ```text
//! POST {base_url}/search
//! {"id":"open-saber.registry.search","ver":"1.0",
//!  "request":{"entityType":["VaccinationCertificate"],"filters":{"name":{"eq":"Asha Rao"}}}}
//! ```
//!
//! This crate owns the transport and the projection of loosely-typed registry records into
//! [`CertificateRecord`]. Selection policy between candidates belongs to the caller.

pub mod client;
pub mod record;

pub use client::{HttpRegistryClient, RegistryConfig};
pub use record::CertificateRecord;

use serde::Serialize;
use std::collections::BTreeMap;

/// Entity type under which vaccination certificates are stored.
pub const VACCINATION_CERTIFICATE_ENTITY: &str = "VaccinationCertificate";

/// Errors from registry calls.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// HTTP transport error (connection refused, timeout, TLS).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Registry returned a non-2xx status.
    #[error("registry {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body was not the expected JSON envelope.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Registry answered but reported a non-successful search.
    #[error("registry {endpoint} rejected search ({status}): {message}")]
    Rejected {
        endpoint: String,
        status: String,
        message: String,
    },
    /// A record lacked a required field or had the wrong shape.
    #[error("registry record schema mismatch: {0}")]
    SchemaMismatch(String),
    /// Client configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RegistryError {
    /// Whether the failure was the HTTP client's own timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RegistryError::Http { source, .. } if source.is_timeout())
    }
}

/// Type alias for Results that can fail with a [`RegistryError`].
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Equality filter over record fields, serialised as `{"field":{"eq":"value"}}`.
///
/// Clauses are combined with AND by the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegistryFilter(BTreeMap<String, EqClause>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EqClause {
    eq: String,
}

impl RegistryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality clause, replacing any previous clause on the same field.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(
            field.into(),
            EqClause {
                eq: value.into(),
            },
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read access to issued certificates.
///
/// Implemented over HTTP by [`HttpRegistryClient`]; tests substitute in-memory fakes.
#[async_trait::async_trait]
pub trait CertificateRegistry: Send + Sync {
    /// Return every certificate record matching `filter`, in registry order.
    async fn search_certificates(
        &self,
        filter: &RegistryFilter,
    ) -> RegistryResult<Vec<CertificateRecord>>;
}
