//! Request signature verification.
//!
//! DigiLocker signs each request body with HMAC-SHA256 under a pre-shared key and sends the
//! base64 digest in a header. Verification recomputes the digest over the exact raw body bytes.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature when none is configured.
pub const DEFAULT_SIGNATURE_HEADER: &str = "x-digilocker-hmac";

fn digest(raw_body: &[u8], shared_key: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length.
    let mut mac = match HmacSha256::new_from_slice(shared_key) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };
    mac.update(raw_body);
    mac.finalize().into_bytes().to_vec()
}

/// Compute the base64 signature header value for `raw_body`.
pub fn sign_request_body(raw_body: &[u8], shared_key: &[u8]) -> String {
    general_purpose::STANDARD.encode(digest(raw_body, shared_key))
}

/// Check `provided_mac_b64` against the HMAC-SHA256 of `raw_body`.
///
/// Returns `false` for a missing, non-base64 or mismatching signature. The digest comparison is
/// constant-time.
pub fn verify_request_signature(raw_body: &[u8], provided_mac_b64: &str, shared_key: &[u8]) -> bool {
    let expected = digest(raw_body, shared_key);

    let provided = match general_purpose::STANDARD.decode(provided_mac_b64.trim()) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::debug!("request signature is not valid base64");
            return false;
        }
    };

    tracing::debug!(
        expected = %general_purpose::STANDARD.encode(&expected),
        provided = %general_purpose::STANDARD.encode(&provided),
        "verifying request signature"
    );

    if expected.is_empty() || provided.len() != expected.len() {
        // Keep timing independent of the provided length.
        let _ = expected.ct_eq(&expected);
        return false;
    }
    provided.ct_eq(&expected).into()
}
