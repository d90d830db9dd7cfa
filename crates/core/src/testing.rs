//! In-memory collaborators for unit tests.

use crate::config::CoreConfig;
use certlocker_registry::{
    CertificateRecord, CertificateRegistry, RegistryError, RegistryFilter, RegistryResult,
};
use certlocker_render::{DisplayFields, DocumentRenderer, RenderError, RenderResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn test_config() -> Arc<CoreConfig> {
    Arc::new(
        CoreConfig::new(
            "VACER".into(),
            "https://moh.india.gov/vc".into(),
            Duration::from_millis(200),
        )
        .expect("CoreConfig::new should succeed"),
    )
}

pub(crate) fn record(certificate_id: &str, certificate: &str) -> CertificateRecord {
    CertificateRecord {
        certificate_id: certificate_id.into(),
        certificate: certificate.into(),
    }
}

pub(crate) struct FakeRegistry {
    records: Vec<CertificateRecord>,
    error: Option<fn() -> RegistryError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_filter: Mutex<Option<RegistryFilter>>,
}

impl FakeRegistry {
    pub(crate) fn with_records(records: Vec<CertificateRecord>) -> Self {
        Self {
            records,
            error: None,
            delay: None,
            calls: AtomicUsize::new(0),
            last_filter: Mutex::new(None),
        }
    }

    pub(crate) fn failing(error: fn() -> RegistryError) -> Self {
        Self {
            error: Some(error),
            ..Self::with_records(Vec::new())
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_filter(&self) -> Option<RegistryFilter> {
        self.last_filter.lock().expect("filter lock").clone()
    }
}

#[async_trait::async_trait]
impl CertificateRegistry for FakeRegistry {
    async fn search_certificates(
        &self,
        filter: &RegistryFilter,
    ) -> RegistryResult<Vec<CertificateRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock().expect("filter lock") = Some(filter.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.error {
            Some(make_error) => Err(make_error()),
            None => Ok(self.records.clone()),
        }
    }
}

/// Renderer that records calls and returns a fixed document.
#[derive(Default)]
pub(crate) struct CountingRenderer {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingRenderer {
    pub(crate) const OUTPUT: &'static [u8] = b"%PDF-1.5 test document";

    pub(crate) fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentRenderer for CountingRenderer {
    fn render(&self, fields: &DisplayFields, _raw_credential: &str) -> RenderResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!fields.rows()[0].is_empty(), "name slot should be filled");
        if self.fail {
            return Err(RenderError::QrEncoding("data too long".into()));
        }
        Ok(Self::OUTPUT.to_vec())
    }
}
