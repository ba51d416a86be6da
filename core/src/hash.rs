//! SHA-256 and HMAC helpers shared by the signing providers.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// SHA-256 of `content`, hex encoded.
pub fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content).as_slice())
}

/// HMAC-SHA256 of `content` under `key`.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    // new_from_slice is infallible for HMAC: any key length is accepted.
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    h.finalize().into_bytes().to_vec()
}

/// HMAC-SHA256 of `content` under `key`, hex encoded without the
/// intermediate Vec.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    // new_from_slice is infallible for HMAC: any key length is accepted.
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    hex::encode(h.finalize().into_bytes())
}
