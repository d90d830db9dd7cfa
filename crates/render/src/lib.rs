//! # Certificate document rendering
//!
//! Composes a printable vaccination certificate: a PDF template page as background, formatted
//! display fields at fixed positions, and a QR code of the raw signed credential.
//!
//! Assets (template PDF, optional TrueType font) are loaded once via [`RenderAssets::load`] and
//! shared read-only. Rendering is synchronous and CPU-bound; async callers should run it on a
//! blocking thread.

pub mod assets;
mod font;
pub mod layout;
pub mod pdf;
mod qr;

pub use assets::RenderAssets;
pub use pdf::PdfRenderer;

use layout::FIELD_COUNT;

/// Errors returned by the rendering crate.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("certificate template unusable: {0}")]
    TemplateAsset(String),

    #[error("certificate font unusable: {0}")]
    FontAsset(String),

    #[error("failed to encode QR code: {0}")]
    QrEncoding(String),

    #[error("failed to compose PDF: {0}")]
    Pdf(String),
}

/// Type alias for Results that can fail with a [`RenderError`].
pub type RenderResult<T> = Result<T, RenderError>;

/// The formatted strings placed into the template's fixed slots, in slot order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayFields {
    rows: [String; FIELD_COUNT],
}

impl DisplayFields {
    pub fn new(rows: [String; FIELD_COUNT]) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn row(&self, slot: usize) -> Option<&str> {
        self.rows.get(slot).map(String::as_str)
    }
}

/// Produces a printable document for a credential.
pub trait DocumentRenderer: Send + Sync {
    /// Render `fields` and a QR code of `raw_credential` into document bytes.
    fn render(&self, fields: &DisplayFields, raw_credential: &str) -> RenderResult<Vec<u8>>;
}
