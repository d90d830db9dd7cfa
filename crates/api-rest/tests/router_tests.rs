//! Router-level tests driving the full middleware stack with in-memory collaborators.

use api_rest::{router, AppState, SignatureConfig, MAX_PULL_REQUEST_BYTES};
use api_shared::sign_request_body;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use certlocker_core::{CoreConfig, PullService};
use certlocker_registry::{
    CertificateRecord, CertificateRegistry, RegistryError, RegistryFilter, RegistryResult,
};
use certlocker_render::{DisplayFields, DocumentRenderer, RenderError, RenderResult};
use digilocker::{PullUriResponse, ResponseStatus};
use http_body_util::BodyExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const KEY: &[u8] = b"router-test-key";
const HEADER: &str = "x-digilocker-hmac";
const PDF: &[u8] = b"%PDF-1.5 router test";

enum Outcome {
    Records(Vec<CertificateRecord>),
    Unavailable,
}

struct StubRegistry {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl StubRegistry {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CertificateRegistry for StubRegistry {
    async fn search_certificates(
        &self,
        _filter: &RegistryFilter,
    ) -> RegistryResult<Vec<CertificateRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Records(records) => Ok(records.clone()),
            Outcome::Unavailable => Err(RegistryError::ApiError {
                endpoint: "http://registry/search".into(),
                status: 503,
                body: "down".into(),
            }),
        }
    }
}

struct StubRenderer {
    fail: bool,
}

impl DocumentRenderer for StubRenderer {
    fn render(&self, _fields: &DisplayFields, _raw_credential: &str) -> RenderResult<Vec<u8>> {
        if self.fail {
            return Err(RenderError::Pdf("broken template".into()));
        }
        Ok(PDF.to_vec())
    }
}

fn credential_json() -> String {
    serde_json::json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiableCredential", "ProofOfVaccinationCredential"],
        "credentialSubject": {
            "type": "Person",
            "id": "did:in.gov.uidai.aadhaar:123456789012",
            "name": "Asha Rao",
            "gender": "Female",
            "age": "34",
            "nationality": "Indian"
        },
        "issuer": "https://cowin.gov.in/",
        "issuanceDate": "2021-01-20T10:00:00Z",
        "evidence": [{
            "id": "https://cowin.gov.in/vaccine/ENR-1",
            "type": ["Vaccination"],
            "batch": "4121Z005",
            "vaccine": "COVISHIELD",
            "manufacturer": "Serum Institute of India",
            "date": "2021-01-20T09:30:00+05:30",
            "verifier": {"name": "Dr. Kumar"},
            "facility": {
                "name": "PHC Hebbal",
                "address": {
                    "streetAddress": "1 Main Road",
                    "district": "Bengaluru Urban",
                    "addressRegion": "Karnataka"
                }
            }
        }],
        "proof": {"type": "RsaSignature2018", "jws": "sig"}
    })
    .to_string()
}

fn one_record() -> Outcome {
    Outcome::Records(vec![CertificateRecord {
        certificate_id: "CERT-1".into(),
        certificate: credential_json(),
    }])
}

fn app(registry: Arc<StubRegistry>, renderer_fails: bool) -> Router {
    let config = Arc::new(
        CoreConfig::new(
            "VACER".into(),
            "https://moh.india.gov/vc".into(),
            Duration::from_secs(2),
        )
        .expect("CoreConfig::new should succeed"),
    );
    let renderer = Arc::new(StubRenderer {
        fail: renderer_fails,
    });
    let pull = PullService::new(config, registry, renderer);
    let signature =
        SignatureConfig::new(HEADER, KEY.to_vec()).expect("SignatureConfig::new should succeed");
    router(AppState::new(pull, signature))
}

fn pull_body(format: &str) -> String {
    format!(
        r#"<PullURIRequest ver="1.0" ts="2021-01-20T10:00:00+05:30" txn="TXN-7" orgId="in.gov.example" format="{format}"><DocDetails><DocType>VACER</DocType><DigiLockerId>123e4567</DigiLockerId><UID>123456789012</UID><FullName>Asha Rao</FullName><DOB>10-05-1990</DOB><UDF1>9876543210</UDF1></DocDetails></PullURIRequest>"#
    )
}

fn signed_pull(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/pullUriRequest")
        .header(header::CONTENT_TYPE, "application/xml")
        .header(HEADER, sign_request_body(body.as_bytes(), KEY))
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn test_missing_signature_is_unauthorized_without_registry_call() {
    let registry = StubRegistry::new(one_record());
    let request = Request::builder()
        .method("POST")
        .uri("/pullUriRequest")
        .body(Body::from(pull_body("xml")))
        .expect("build request");

    let response = app(registry.clone(), false)
        .oneshot(request)
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_bytes(response).await, b"Unauthorized");
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn test_tampered_body_is_unauthorized() {
    let registry = StubRegistry::new(one_record());
    let body = pull_body("xml");
    let request = Request::builder()
        .method("POST")
        .uri("/pullUriRequest")
        .header(HEADER, sign_request_body(body.as_bytes(), KEY))
        .body(Body::from(body.replace("Asha", "Usha")))
        .expect("build request");

    let response = app(registry.clone(), false)
        .oneshot(request)
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn test_signed_pull_returns_xml_response() {
    let registry = StubRegistry::new(one_record());
    let response = app(registry.clone(), false)
        .oneshot(signed_pull(&pull_body("both")))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml"
    );

    let xml = String::from_utf8(body_bytes(response).await).expect("utf-8 body");
    let decoded = PullUriResponse::parse(&xml).expect("parse response");
    assert_eq!(decoded.status, ResponseStatus::Success);
    assert_eq!(decoded.txn, "TXN-7");
    assert_eq!(decoded.doc_details.doc_content.as_deref(), Some(PDF));
    assert!(decoded.doc_details.data_content.is_some());
    assert_eq!(
        decoded.doc_details.uri.as_deref(),
        Some("https://moh.india.gov/vc/CERT-1")
    );
    assert_eq!(registry.calls(), 1);
}

#[tokio::test]
async fn test_unknown_vaccinee_gets_failure_status() {
    let registry = StubRegistry::new(Outcome::Records(Vec::new()));
    let response = app(registry, false)
        .oneshot(signed_pull(&pull_body("xml")))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::OK);
    let xml = String::from_utf8(body_bytes(response).await).expect("utf-8 body");
    let decoded = PullUriResponse::parse(&xml).expect("parse response");
    assert_eq!(decoded.status, ResponseStatus::Failure);
    assert!(decoded.doc_details.uri.is_none());
}

#[tokio::test]
async fn test_malformed_signed_body_is_server_error() {
    let registry = StubRegistry::new(one_record());
    let response = app(registry.clone(), false)
        .oneshot(signed_pull("<PullURIRequest"))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn test_pdf_only_with_failing_renderer_is_server_error() {
    let registry = StubRegistry::new(one_record());
    let response = app(registry, true)
        .oneshot(signed_pull(&pull_body("pdf")))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let registry = StubRegistry::new(one_record());
    let body = "x".repeat(MAX_PULL_REQUEST_BYTES + 1);
    let response = app(registry.clone(), false)
        .oneshot(signed_pull(&body))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(registry.calls(), 0);
}

fn pdf_request(code: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/certificatePDF/{code}"))
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn test_certificate_pdf_served_as_attachment() {
    let response = app(StubRegistry::new(one_record()), false)
        .oneshot(pdf_request("ENR-1"))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"certificate.pdf\""
    );
    assert_eq!(body_bytes(response).await, PDF);
}

#[tokio::test]
async fn test_certificate_pdf_not_found() {
    let response = app(StubRegistry::new(Outcome::Records(Vec::new())), false)
        .oneshot(pdf_request("ENR-404"))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_certificate_pdf_registry_failure_is_bad_gateway() {
    let response = app(StubRegistry::new(Outcome::Unavailable), false)
        .oneshot(pdf_request("ENR-1"))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_certificate_pdf_render_failure_is_server_error() {
    let response = app(StubRegistry::new(one_record()), true)
        .oneshot(pdf_request("ENR-1"))
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = app(StubRegistry::new(one_record()), false);

    let health = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("oneshot");
    assert_eq!(health.status(), StatusCode::OK);
    let json: serde_json::Value =
        serde_json::from_slice(&body_bytes(health).await).expect("health json");
    assert_eq!(json["ok"], serde_json::json!(true));

    let docs = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("oneshot");
    assert_eq!(docs.status(), StatusCode::OK);
    let json: serde_json::Value =
        serde_json::from_slice(&body_bytes(docs).await).expect("openapi json");
    assert!(json["paths"]["/pullUriRequest"].is_object());
}
