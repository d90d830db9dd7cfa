use crate::layout::QR_QUIET_ZONE;
use crate::{RenderError, RenderResult};
use qrcode::{Color, EcLevel, QrCode};

const DARK: u8 = 0x00;
const LIGHT: u8 = 0xFF;

/// An 8-bit grayscale raster of a QR symbol, one pixel per module.
#[derive(Debug)]
pub(crate) struct QrRaster {
    pub side: usize,
    pub pixels: Vec<u8>,
}

/// Encode `data` at error-correction level M and rasterise it with a quiet zone.
pub(crate) fn encode(data: &str) -> RenderResult<QrRaster> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| RenderError::QrEncoding(e.to_string()))?;

    let width = code.width();
    let side = width + 2 * QR_QUIET_ZONE;
    let mut pixels = vec![LIGHT; side * side];

    for (index, color) in code.to_colors().into_iter().enumerate() {
        if color == Color::Dark {
            let row = index / width + QR_QUIET_ZONE;
            let col = index % width + QR_QUIET_ZONE;
            pixels[row * side + col] = DARK;
        }
    }

    Ok(QrRaster { side, pixels })
}
