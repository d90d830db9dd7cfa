//! Font selection and embedding.
//!
//! Text is written as single-byte WinAnsi strings. Without a configured font the standard
//! Helvetica face is referenced by name; a TrueType file is embedded whole via `FontFile2`.

use crate::{RenderError, RenderResult};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;
const FALLBACK_FONT_NAME: &str = "CertificateFont";

#[derive(Clone, Debug)]
pub(crate) enum CertificateFont {
    Helvetica,
    TrueType(EmbeddedFont),
}

/// Metrics extracted once from a TrueType file, scaled to 1000 units per em.
#[derive(Clone, Debug)]
pub(crate) struct EmbeddedFont {
    base_font: String,
    data: Vec<u8>,
    widths: Vec<i64>,
    bbox: [i64; 4],
    ascent: i64,
    descent: i64,
    cap_height: i64,
}

impl EmbeddedFont {
    pub(crate) fn parse(data: Vec<u8>) -> RenderResult<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| RenderError::FontAsset(e.to_string()))?;

        let units = i64::from(face.units_per_em());
        if units == 0 {
            return Err(RenderError::FontAsset("font reports zero units per em".into()));
        }
        let scale = |v: i64| v * 1000 / units;

        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                face.glyph_index(char::from(code))
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| scale(i64::from(advance)))
                    .unwrap_or(0)
            })
            .collect();

        let bbox = face.global_bounding_box();
        let ascent = scale(i64::from(face.ascender()));
        let descent = scale(i64::from(face.descender()));
        let cap_height = face
            .capital_height()
            .map(|h| scale(i64::from(h)))
            .unwrap_or(ascent);
        let base_font = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .map(|name| name.chars().filter(|c| c.is_ascii_graphic()).collect::<String>())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_FONT_NAME.to_string());

        Ok(Self {
            widths,
            bbox: [
                scale(i64::from(bbox.x_min)),
                scale(i64::from(bbox.y_min)),
                scale(i64::from(bbox.x_max)),
                scale(i64::from(bbox.y_max)),
            ],
            ascent,
            descent,
            cap_height,
            base_font,
            data,
        })
    }

    pub(crate) fn base_font(&self) -> &str {
        &self.base_font
    }
}

impl CertificateFont {
    /// Add the font's objects to `doc`, returning the font dictionary's id.
    pub(crate) fn add_to(&self, doc: &mut Document) -> ObjectId {
        match self {
            CertificateFont::Helvetica => {
                let mut font = Dictionary::new();
                font.set("Type", name("Font"));
                font.set("Subtype", name("Type1"));
                font.set("BaseFont", name("Helvetica"));
                font.set("Encoding", name("WinAnsiEncoding"));
                doc.add_object(font)
            }
            CertificateFont::TrueType(embedded) => {
                let mut file_dict = Dictionary::new();
                file_dict.set("Length1", Object::Integer(embedded.data.len() as i64));
                let file_id = doc.add_object(Stream::new(file_dict, embedded.data.clone()));

                let mut descriptor = Dictionary::new();
                descriptor.set("Type", name("FontDescriptor"));
                descriptor.set("FontName", name(&embedded.base_font));
                // Nonsymbolic: glyphs come from the standard Latin character set.
                descriptor.set("Flags", Object::Integer(32));
                descriptor.set(
                    "FontBBox",
                    Object::Array(embedded.bbox.iter().map(|v| Object::Integer(*v)).collect()),
                );
                descriptor.set("ItalicAngle", Object::Integer(0));
                descriptor.set("Ascent", Object::Integer(embedded.ascent));
                descriptor.set("Descent", Object::Integer(embedded.descent));
                descriptor.set("CapHeight", Object::Integer(embedded.cap_height));
                descriptor.set("StemV", Object::Integer(80));
                descriptor.set("FontFile2", Object::Reference(file_id));
                let descriptor_id = doc.add_object(descriptor);

                let mut font = Dictionary::new();
                font.set("Type", name("Font"));
                font.set("Subtype", name("TrueType"));
                font.set("BaseFont", name(&embedded.base_font));
                font.set("FirstChar", Object::Integer(i64::from(FIRST_CHAR)));
                font.set("LastChar", Object::Integer(i64::from(LAST_CHAR)));
                font.set(
                    "Widths",
                    Object::Array(embedded.widths.iter().map(|w| Object::Integer(*w)).collect()),
                );
                font.set("FontDescriptor", Object::Reference(descriptor_id));
                font.set("Encoding", name("WinAnsiEncoding"));
                doc.add_object(font)
            }
        }
    }
}

/// Encode text as single-byte WinAnsi, replacing unsupported characters with `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

pub(crate) fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}
