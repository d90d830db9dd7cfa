//! HTTP client for the registry search endpoint.

use crate::record::CertificateRecord;
use crate::{
    CertificateRegistry, RegistryError, RegistryFilter, RegistryResult,
    VACCINATION_CERTIFICATE_ENTITY,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

const SEARCH_API_ID: &str = "open-saber.registry.search";
const SEARCH_API_VERSION: &str = "1.0";
const SEARCH_SUCCESS: &str = "SUCCESSFUL";

/// Configuration for the registry HTTP client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the registry (e.g. `http://registry:8081`).
    pub base_url: String,
    /// Request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl RegistryConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 10,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Registry client over HTTP.
///
/// Wraps a pooled `reqwest::Client`; share it via `Arc` across tasks.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: reqwest::Client,
    search_url: String,
}

impl HttpRegistryClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Config`] if the base URL is empty, is not http(s), the timeout is
    /// zero, or the HTTP client cannot be built.
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(RegistryError::Config("registry base URL cannot be empty".into()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RegistryError::Config(format!(
                "registry base URL must use http or https: {base_url}"
            )));
        }
        if config.timeout_secs == 0 {
            return Err(RegistryError::Config(
                "registry timeout must be at least one second".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RegistryError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_url: format!("{base_url}/search"),
        })
    }

    /// Run a search for `entity_type` records matching `filter`.
    ///
    /// Returns the raw records under `result.<entity_type>`; a missing entry means no matches.
    pub async fn query(
        &self,
        entity_type: &str,
        filter: &RegistryFilter,
    ) -> RegistryResult<Vec<Map<String, Value>>> {
        let endpoint = self.search_url.as_str();
        let body = SearchRequest {
            id: SEARCH_API_ID,
            ver: SEARCH_API_VERSION,
            request: SearchBody {
                entity_type: [entity_type],
                filters: filter,
            },
        };

        tracing::debug!(entity_type, "registry search");

        let resp = self
            .client
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|source| RegistryError::Http {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RegistryError::ApiError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse =
            resp.json()
                .await
                .map_err(|source| RegistryError::Deserialization {
                    endpoint: endpoint.to_string(),
                    source,
                })?;

        if parsed.params.status != SEARCH_SUCCESS {
            tracing::warn!(status = %parsed.params.status, "registry search not successful");
            return Err(RegistryError::Rejected {
                endpoint: endpoint.to_string(),
                status: parsed.params.status,
                message: parsed.params.errmsg.unwrap_or_default(),
            });
        }

        let mut result = parsed.result.unwrap_or_default();
        match result.remove(entity_type) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(map) => Ok(map),
                    _ => Err(RegistryError::SchemaMismatch(format!(
                        "result.{entity_type}[{index}] is not an object"
                    ))),
                })
                .collect(),
            Some(_) => Err(RegistryError::SchemaMismatch(format!(
                "result.{entity_type} is not an array"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl CertificateRegistry for HttpRegistryClient {
    async fn search_certificates(
        &self,
        filter: &RegistryFilter,
    ) -> RegistryResult<Vec<CertificateRecord>> {
        let records = self.query(VACCINATION_CERTIFICATE_ENTITY, filter).await?;
        tracing::debug!(count = records.len(), "registry returned certificate records");
        records.iter().map(CertificateRecord::from_json).collect()
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    id: &'static str,
    ver: &'static str,
    request: SearchBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    entity_type: [&'a str; 1],
    filters: &'a RegistryFilter,
}

#[derive(Deserialize)]
struct SearchResponse {
    params: ResponseParams,
    /// Absent or `null` on rejected searches.
    #[serde(default)]
    result: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct ResponseParams {
    status: String,
    #[serde(default)]
    errmsg: Option<String>,
}
