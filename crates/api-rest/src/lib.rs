//! # API REST
//!
//! HTTP surface for certlocker.
//!
//! Routes:
//! - `POST /pullUriRequest`: DigiLocker Pull-URI request, HMAC-signed XML in, XML out
//! - `GET /certificatePDF/:preEnrollmentCode`: direct certificate download
//! - `GET /health`
//! - `GET /api-docs/openapi.json`
//!
//! The router is built here so the workspace binary and the router tests share one definition.

pub mod error;

pub use error::{ApiError, SignatureConfigError};

use api_shared::{verify_request_signature, HealthRes, HealthService};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderName},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use certlocker_core::{CoreError, PullService};
use digilocker::PullUriRequest;
use std::fmt;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Largest Pull-URI request body accepted.
pub const MAX_PULL_REQUEST_BYTES: usize = 64 * 1024;

/// Where to find the request signature and the key to check it with.
#[derive(Clone)]
pub struct SignatureConfig {
    header: HeaderName,
    key: Arc<[u8]>,
}

impl SignatureConfig {
    /// # Errors
    ///
    /// Returns an error if `header` is not a valid header name or `key` is empty.
    pub fn new(header: &str, key: Vec<u8>) -> Result<Self, SignatureConfigError> {
        let header = HeaderName::from_bytes(header.trim().to_ascii_lowercase().as_bytes())
            .map_err(|_| SignatureConfigError::InvalidHeader(header.to_string()))?;
        if key.is_empty() {
            return Err(SignatureConfigError::EmptyKey);
        }
        Ok(Self {
            header,
            key: key.into(),
        })
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl fmt::Debug for SignatureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureConfig")
            .field("header", &self.header)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pull: PullService,
    signature: SignatureConfig,
}

impl AppState {
    pub fn new(pull: PullService, signature: SignatureConfig) -> Self {
        Self { pull, signature }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, pull_uri_request, certificate_pdf),
    components(schemas(HealthRes))
)]
pub struct ApiDoc;

/// Build the application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/pullUriRequest",
            post(pull_uri_request).layer(DefaultBodyLimit::max(MAX_PULL_REQUEST_BYTES)),
        )
        .route("/certificatePDF/:preEnrollmentCode", get(certificate_pdf))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by load balancers and monitoring.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/pullUriRequest",
    request_body(content = String, content_type = "application/xml", description = "PullURIRequest document"),
    params(
        ("x-digilocker-hmac" = String, Header, description = "Base64 HMAC-SHA256 of the raw body")
    ),
    responses(
        (status = 200, description = "PullURIResponse document; Status 0 when no credential matched", body = String, content_type = "application/xml"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 500, description = "Malformed request or no content could be produced")
    )
)]
/// Answer a DigiLocker Pull-URI request.
///
/// The signature covers the exact raw body bytes, so the body is taken as `Bytes` and only
/// decoded after it has been verified.
///
/// # Errors
/// Returns `401 Unauthorized` if the signature header is missing or does not match, and
/// `500 Internal Server Error` if:
/// - the body is not a well-formed Pull-URI request,
/// - a credential was found but no requested artifact could be produced, or
/// - the response cannot be encoded.
#[axum::debug_handler]
async fn pull_uri_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let provided = headers
        .get(state.signature.header())
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !verify_request_signature(&body, provided, &state.signature.key) {
        tracing::warn!(
            header = %state.signature.header(),
            has_signature = !provided.is_empty(),
            "rejected pull request with invalid signature"
        );
        return Err(ApiError::Unauthorized);
    }

    let text = std::str::from_utf8(&body).map_err(|e| {
        tracing::error!(error = %e, "pull request body is not UTF-8");
        ApiError::Internal("Invalid request body")
    })?;
    let request = PullUriRequest::parse(text).map_err(CoreError::from)?;
    tracing::info!(
        txn = %request.txn,
        org_id = %request.org_id,
        format = request.format.as_wire(),
        "pull request received"
    );

    let response = state.pull.respond(&request).await?;
    let xml = response.render().map_err(CoreError::from)?;

    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}

#[utoipa::path(
    get,
    path = "/certificatePDF/{preEnrollmentCode}",
    params(
        ("preEnrollmentCode" = String, Path, description = "Pre-enrollment code of the vaccinee")
    ),
    responses(
        (status = 200, description = "Certificate PDF", body = String, content_type = "application/pdf"),
        (status = 404, description = "No certificate for this code"),
        (status = 502, description = "Registry unavailable or returned unusable data"),
        (status = 500, description = "Rendering failed")
    )
)]
/// Download the certificate PDF for a pre-enrollment code.
#[axum::debug_handler]
async fn certificate_pdf(
    State(state): State<AppState>,
    Path(pre_enrollment_code): Path<String>,
) -> Result<Response, ApiError> {
    let pdf = state.pull.certificate_pdf(&pre_enrollment_code).await?;
    tracing::info!(bytes = pdf.len(), "certificate PDF served");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"certificate.pdf\"",
            ),
        ],
        pdf,
    )
        .into_response())
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
