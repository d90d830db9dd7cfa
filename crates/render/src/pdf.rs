//! PDF composition over the certificate template.
//!
//! The first template page is kept as background. Its original content is bracketed by `q`/`Q`
//! so that any graphics state it leaves behind cannot leak into the overlay, which then draws the
//! display fields and the QR image.

use crate::assets::RenderAssets;
use crate::font::{encode_win_ansi, name};
use crate::layout::{
    field_baseline, qr_origin, FIELD_X, FONT_SIZE, PAGE_HEIGHT, PAGE_WIDTH, QR_SIZE,
};
use crate::qr::{self, QrRaster};
use crate::{DisplayFields, DocumentRenderer, RenderError, RenderResult};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::sync::Arc;

const FONT_RESOURCE: &str = "FCert";
const QR_RESOURCE: &str = "ImQr";
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Renders certificates onto the shared template with `lopdf`.
#[derive(Clone, Debug)]
pub struct PdfRenderer {
    assets: Arc<RenderAssets>,
}

impl PdfRenderer {
    pub fn new(assets: Arc<RenderAssets>) -> Self {
        Self { assets }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, fields: &DisplayFields, raw_credential: &str) -> RenderResult<Vec<u8>> {
        let qr = qr::encode(raw_credential)?;

        let mut doc = self.assets.template().clone();
        let page_id = keep_first_page(&mut doc)?;

        let font_id = self.assets.font().add_to(&mut doc);
        let image_id = doc.add_object(qr_image(&qr));
        install_resources(&mut doc, page_id, font_id, image_id)?;

        let overlay = overlay_content(fields)?;
        wrap_contents(&mut doc, page_id, overlay)?;

        let page = doc.get_dictionary_mut(page_id).map_err(pdf_err)?;
        page.set(
            "MediaBox",
            Object::Array(vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)]),
        );

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| RenderError::Pdf(format!("failed to write PDF: {e}")))?;

        tracing::debug!(bytes = out.len(), qr_modules = qr.side, "certificate PDF rendered");
        Ok(out)
    }
}

fn pdf_err(e: lopdf::Error) -> RenderError {
    RenderError::Pdf(e.to_string())
}

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

fn keep_first_page(doc: &mut Document) -> RenderResult<ObjectId> {
    let pages = doc.get_pages();
    let extra: Vec<u32> = pages.keys().copied().filter(|n| *n != 1).collect();
    let first = pages
        .get(&1)
        .copied()
        .ok_or_else(|| RenderError::TemplateAsset("template has no first page".into()))?;

    if !extra.is_empty() {
        doc.delete_pages(&extra);
    }
    Ok(first)
}

fn qr_image(qr: &QrRaster) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", name("XObject"));
    dict.set("Subtype", name("Image"));
    dict.set("Width", Object::Integer(qr.side as i64));
    dict.set("Height", Object::Integer(qr.side as i64));
    dict.set("ColorSpace", name("DeviceGray"));
    dict.set("BitsPerComponent", Object::Integer(8));
    // Keep module edges sharp when scaled up.
    dict.set("Interpolate", Object::Boolean(false));
    Stream::new(dict, qr.pixels.clone())
}

fn resolve_dict(doc: &Document, object: &Object) -> RenderResult<Dictionary> {
    match object {
        Object::Dictionary(dict) => Ok(dict.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).cloned().map_err(pdf_err),
        _ => Err(RenderError::Pdf("expected a dictionary".into())),
    }
}

/// Resources for `page_id`, following inheritance up the page tree.
fn page_resources(doc: &Document, page_id: ObjectId) -> RenderResult<Dictionary> {
    let mut node_id = page_id;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).map_err(pdf_err)?;
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dict(doc, resources);
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node_id = parent,
            Err(_) => return Ok(Dictionary::new()),
        }
    }
    Err(RenderError::Pdf("page tree too deep".into()))
}

fn install_resources(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    image_id: ObjectId,
) -> RenderResult<()> {
    let mut resources = page_resources(doc, page_id)?;

    let mut fonts = match resources.get(b"Font") {
        Ok(object) => resolve_dict(doc, object)?,
        Err(_) => Dictionary::new(),
    };
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));

    let mut xobjects = match resources.get(b"XObject") {
        Ok(object) => resolve_dict(doc, object)?,
        Err(_) => Dictionary::new(),
    };
    xobjects.set(QR_RESOURCE, Object::Reference(image_id));

    resources.set("Font", Object::Dictionary(fonts));
    resources.set("XObject", Object::Dictionary(xobjects));

    doc.get_dictionary_mut(page_id)
        .map_err(pdf_err)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

fn overlay_content(fields: &DisplayFields) -> RenderResult<Vec<u8>> {
    let mut operations = vec![
        Operation::new("Q", vec![]),
        Operation::new("g", vec![Object::Integer(0)]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![name(FONT_RESOURCE), real(FONT_SIZE)]),
    ];

    for (slot, row) in fields.rows().iter().enumerate() {
        if row.trim().is_empty() {
            continue;
        }
        operations.push(Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                real(FIELD_X),
                real(field_baseline(slot)),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(row), StringFormat::Literal)],
        ));
    }
    operations.push(Operation::new("ET", vec![]));

    let (qr_x, qr_y) = qr_origin();
    operations.extend([
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(QR_SIZE),
                Object::Integer(0),
                Object::Integer(0),
                real(QR_SIZE),
                real(qr_x),
                real(qr_y),
            ],
        ),
        Operation::new("Do", vec![name(QR_RESOURCE)]),
        Operation::new("Q", vec![]),
    ]);

    Content { operations }.encode().map_err(pdf_err)
}

fn wrap_contents(doc: &mut Document, page_id: ObjectId, overlay: Vec<u8>) -> RenderResult<()> {
    let current = doc
        .get_dictionary(page_id)
        .map_err(pdf_err)?
        .get(b"Contents")
        .ok()
        .cloned();

    let mut original = match current {
        None => Vec::new(),
        Some(Object::Array(items)) => items,
        Some(Object::Reference(id)) => match doc.get_object(id).map_err(pdf_err)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(id)],
        },
        Some(_) => return Err(RenderError::Pdf("page contents must be streams".into())),
    };

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(original.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.append(&mut original);
    contents.push(Object::Reference(overlay_id));

    doc.get_dictionary_mut(page_id)
        .map_err(pdf_err)?
        .set("Contents", Object::Array(contents));
    Ok(())
}
