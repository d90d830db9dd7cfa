//! HTTP error mapping.
//!
//! Bodies are short plain-text diagnostics; details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use certlocker_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid request signature (401).
    #[error("unauthorized")]
    Unauthorized,
    /// No credential matches (404).
    #[error("not found: {0}")]
    NotFound(&'static str),
    /// Registry failed, timed out or returned unusable data (502).
    #[error("upstream error: {0}")]
    Upstream(&'static str),
    /// Anything else (500).
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::NotFound(msg) | Self::Upstream(msg) | Self::Internal(msg) => msg,
        }
    }
}

/// Invalid signature settings supplied at startup.
#[derive(Debug, thiserror::Error)]
pub enum SignatureConfigError {
    #[error("invalid signature header name: {0:?}")]
    InvalidHeader(String),
    #[error("signature key must not be empty")]
    EmptyKey,
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound => Self::NotFound("Certificate not found"),
            CoreError::Registry(e) => {
                tracing::error!(error = %e, "registry error");
                Self::Upstream("Registry error")
            }
            CoreError::RegistryTimeout(after) => {
                tracing::error!(?after, "registry timed out");
                Self::Upstream("Registry timed out")
            }
            CoreError::CredentialSchema(e) => {
                tracing::error!(error = %e, "registry returned an unusable credential");
                Self::Upstream("Registry returned an invalid certificate")
            }
            CoreError::Protocol(e) => {
                tracing::error!(error = %e, "pull request could not be decoded or encoded");
                Self::Internal("Invalid Pull URI message")
            }
            other => {
                tracing::error!(error = %other, "request failed");
                Self::Internal("Internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}
