//! Fixed page geometry, in PDF points with offsets measured from the top of the page.

/// A4 width.
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height.
pub const PAGE_HEIGHT: f32 = 841.89;

/// Number of display slots on the certificate.
pub const FIELD_COUNT: usize = 13;

pub const FIELD_X: f32 = 280.0;
pub const FIELD_TOP: f32 = 361.0;
pub const FIELD_ROW_HEIGHT: f32 = 22.0;
pub const FONT_SIZE: f32 = 10.0;

pub const QR_X: f32 = 400.0;
pub const QR_TOP: f32 = 30.0;
pub const QR_SIZE: f32 = 160.0;
/// Light modules around the symbol, per the QR standard.
pub const QR_QUIET_ZONE: usize = 4;

/// Baseline of field `slot`, in PDF user space (origin bottom-left).
pub fn field_baseline(slot: usize) -> f32 {
    PAGE_HEIGHT - (FIELD_TOP + FIELD_ROW_HEIGHT * slot as f32) - FONT_SIZE
}

/// Lower-left corner of the QR image, in PDF user space.
pub fn qr_origin() -> (f32, f32) {
    (QR_X, PAGE_HEIGHT - QR_TOP - QR_SIZE)
}
