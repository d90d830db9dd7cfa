//! Input validation utilities.
//!
//! This module contains functions for validating configuration values before they are embedded
//! into documents returned to DigiLocker.

use crate::{CoreError, CoreResult};

/// Validates that a URI base is safe to prefix onto certificate ids.
///
/// The base is embedded into the locator returned to DigiLocker: `{base}/{certificate_id}`.
/// This function applies guardrails against malformed or injected values:
/// - Rejects empty or whitespace-only strings
/// - Bounds the length
/// - Requires an ASCII `http` or `https` URI with a host
/// - Rejects whitespace, quotes and angle brackets
///
/// # Errors
///
/// Returns a `CoreError::InvalidInput` if the base is invalid.
pub fn validate_certificate_uri_base(base: &str) -> CoreResult<()> {
    const MAX_URI_BASE_LEN: usize = 2_048;

    if base.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            "certificate URI base cannot be empty".into(),
        ));
    }

    if base.len() > MAX_URI_BASE_LEN {
        return Err(CoreError::InvalidInput(format!(
            "certificate URI base exceeds maximum length of {} characters",
            MAX_URI_BASE_LEN
        )));
    }

    if !base.is_ascii() {
        return Err(CoreError::InvalidInput(
            "certificate URI base must contain only ASCII characters".into(),
        ));
    }

    if base
        .bytes()
        .any(|b| b.is_ascii_whitespace() || b.is_ascii_control() || matches!(b, b'"' | b'\'' | b'<' | b'>'))
    {
        return Err(CoreError::InvalidInput(
            "certificate URI base contains whitespace, quotes or angle brackets".into(),
        ));
    }

    let host = base
        .strip_prefix("https://")
        .or_else(|| base.strip_prefix("http://"))
        .ok_or_else(|| {
            CoreError::InvalidInput("certificate URI base must start with http:// or https://".into())
        })?;

    if host.split('/').next().map_or(true, str::is_empty) {
        return Err(CoreError::InvalidInput(
            "certificate URI base must include a host".into(),
        ));
    }

    Ok(())
}
