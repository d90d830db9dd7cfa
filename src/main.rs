use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, SignatureConfig, router};
use api_shared::DEFAULT_SIGNATURE_HEADER;
use certlocker_core::config::{registry_timeout_from_env_value, resolve_certificate_template};
use certlocker_core::constants::{DEFAULT_CERTIFICATE_URI_BASE, DEFAULT_DOC_TYPE};
use certlocker_core::{CoreConfig, PullService};
use certlocker_registry::client::{HttpRegistryClient, RegistryConfig};
use certlocker_render::assets::RenderAssets;
use certlocker_render::pdf::PdfRenderer;

/// Main entry point for the certlocker service
///
/// Loads configuration and render assets once, then serves the DigiLocker Pull-URI endpoint and
/// the certificate download endpoint until interrupted.
///
/// # Environment Variables
/// - `CERTLOCKER_REST_ADDR`: listen address (default: "0.0.0.0:8003")
/// - `DIGILOCKER_HMAC_KEY`: pre-shared key for request signatures (required)
/// - `DIGILOCKER_AUTH_HEADER`: signature header name (default: "x-digilocker-hmac")
/// - `DIGILOCKER_DOC_TYPE`: `DocType` echoed in responses (default: "VACER")
/// - `CERTIFICATE_URI_BASE`: base of certificate locator URIs
/// - `REGISTRY_URL`: registry base URL (default: "http://localhost:8081")
/// - `REGISTRY_TIMEOUT_SECS`: registry timeout in seconds (default: 10)
/// - `CERTIFICATE_TEMPLATE_PDF`: template PDF override
/// - `CERTIFICATE_FONT_TTF`: TrueType font for certificate text (default: built-in Helvetica)
///
/// # Errors
/// Returns an error if configuration is missing or invalid, the render assets cannot be loaded,
/// or the listener cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("certlocker_run=info".parse()?)
                .add_directive("certlocker_core=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CERTLOCKER_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8003".into());

    let hmac_key = std::env::var("DIGILOCKER_HMAC_KEY")
        .map_err(|_| anyhow::anyhow!("DIGILOCKER_HMAC_KEY must be set"))?;
    let auth_header = std::env::var("DIGILOCKER_AUTH_HEADER")
        .unwrap_or_else(|_| DEFAULT_SIGNATURE_HEADER.into());
    let signature = SignatureConfig::new(&auth_header, hmac_key.into_bytes())?;

    let registry_timeout =
        registry_timeout_from_env_value(std::env::var("REGISTRY_TIMEOUT_SECS").ok())?;
    let cfg = Arc::new(CoreConfig::new(
        std::env::var("DIGILOCKER_DOC_TYPE").unwrap_or_else(|_| DEFAULT_DOC_TYPE.into()),
        std::env::var("CERTIFICATE_URI_BASE")
            .unwrap_or_else(|_| DEFAULT_CERTIFICATE_URI_BASE.into()),
        registry_timeout,
    )?);

    let registry_url =
        std::env::var("REGISTRY_URL").unwrap_or_else(|_| "http://localhost:8081".into());
    let registry = HttpRegistryClient::new(
        RegistryConfig::new(registry_url.clone()).with_timeout_secs(registry_timeout.as_secs()),
    )?;

    let template = resolve_certificate_template(
        std::env::var("CERTIFICATE_TEMPLATE_PDF").ok().map(PathBuf::from),
    )?;
    let font = std::env::var("CERTIFICATE_FONT_TTF").ok().map(PathBuf::from);
    let assets = Arc::new(RenderAssets::load(&template, font.as_deref())?);

    let pull = PullService::new(
        cfg,
        Arc::new(registry),
        Arc::new(PdfRenderer::new(assets)),
    );
    let app = router(AppState::new(pull, signature));

    tracing::info!(%addr, %registry_url, header = %auth_header, "++ Starting certlocker");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("certlocker stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
