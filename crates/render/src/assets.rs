//! Rendering assets, loaded and validated once at startup.

use crate::font::{CertificateFont, EmbeddedFont};
use crate::{RenderError, RenderResult};
use lopdf::Document;
use std::path::Path;

/// The certificate template and font, shared read-only by every render.
#[derive(Clone, Debug)]
pub struct RenderAssets {
    template: Document,
    font: CertificateFont,
}

impl RenderAssets {
    /// Load the template PDF and, if given, a TrueType font.
    ///
    /// Without a font path the standard Helvetica face is used.
    ///
    /// # Errors
    ///
    /// - [`RenderError::TemplateAsset`] if the template cannot be read, is not a PDF, or has no
    ///   pages.
    /// - [`RenderError::FontAsset`] if the font cannot be read or parsed.
    pub fn load(template_path: &Path, font_path: Option<&Path>) -> RenderResult<Self> {
        let template_bytes = std::fs::read(template_path).map_err(|e| {
            RenderError::TemplateAsset(format!("{}: {e}", template_path.display()))
        })?;

        let font_bytes = font_path
            .map(|path| {
                std::fs::read(path)
                    .map_err(|e| RenderError::FontAsset(format!("{}: {e}", path.display())))
            })
            .transpose()?;

        let assets = Self::from_bytes(&template_bytes, font_bytes)?;
        tracing::info!(
            template = %template_path.display(),
            font = assets.font_name(),
            "certificate render assets loaded"
        );
        Ok(assets)
    }

    /// Build assets from in-memory bytes.
    pub fn from_bytes(template_pdf: &[u8], font_ttf: Option<Vec<u8>>) -> RenderResult<Self> {
        let template = Document::load_mem(template_pdf)
            .map_err(|e| RenderError::TemplateAsset(format!("not a readable PDF: {e}")))?;

        if template.get_pages().is_empty() {
            return Err(RenderError::TemplateAsset("template has no pages".into()));
        }

        let font = match font_ttf {
            Some(bytes) => CertificateFont::TrueType(EmbeddedFont::parse(bytes)?),
            None => CertificateFont::Helvetica,
        };

        Ok(Self { template, font })
    }

    /// PostScript name of the font used for display fields.
    pub fn font_name(&self) -> &str {
        match &self.font {
            CertificateFont::Helvetica => "Helvetica",
            CertificateFont::TrueType(embedded) => embedded.base_font(),
        }
    }

    pub(crate) fn template(&self) -> &Document {
        &self.template
    }

    pub(crate) fn font(&self) -> &CertificateFont {
        &self.font
    }
}
