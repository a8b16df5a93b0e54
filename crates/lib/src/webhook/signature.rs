//! X-Line-Signature verification: base64(HMAC-SHA256(channel secret, raw body)).

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature of the raw request body.
pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

/// Compute the base64 signature LINE would send for `body` under `secret`.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    B64.encode(mac.finalize().into_bytes())
}

/// True when `signature` is the base64 HMAC-SHA256 of `body` keyed by `secret`.
/// Malformed base64 or a wrong-length digest yields false. Digest comparison is constant-time.
pub fn verify(body: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(provided) = B64.decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}
