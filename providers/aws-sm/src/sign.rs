//! AWS Signature V4 as a pure function pipeline.
//!
//! Canonical request -> string-to-sign -> derived key -> signature. No shared
//! state; every step is deterministic for fixed inputs so each can be tested
//! against fixed vectors.
//!
//! - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)

use crate::constants::{ALGORITHM, SCOPE_TERMINATOR, SECRET_KEY_PREFIX};
use secref_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};

/// Build the canonical request and the signed-header list.
///
/// The URI and query string are fixed (`/`, empty): the Secrets Manager API
/// is a single POST endpoint. Headers are lower-cased and sorted by name.
pub(crate) fn canonical_request(
    method: &str,
    headers: &[(&str, &str)],
    payload_hash: &str,
) -> (String, String) {
    let mut sorted: Vec<(String, &str)> = headers
        .iter()
        .map(|(name, value)| (name.to_lowercase(), *value))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let signed_headers = sorted
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    let canonical_headers: String = sorted
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();

    let creq = format!("{method}\n/\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}");
    (creq, signed_headers)
}

/// Credential scope: `date/region/service/aws4_request`.
pub(crate) fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/{SCOPE_TERMINATOR}")
}

/// String-to-sign over the hashed canonical request.
pub(crate) fn string_to_sign(timestamp: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{timestamp}\n{scope}\n{}",
        hex_sha256(canonical_request.as_bytes())
    )
}

/// Derive the signing key with the chained HMAC-SHA256 construction.
pub(crate) fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(
        format!("{SECRET_KEY_PREFIX}{secret}").as_bytes(),
        date.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

/// Hex signature of the string-to-sign under the derived key.
pub(crate) fn signature(signing_key: &[u8], string_to_sign: &str) -> String {
    hex_hmac_sha256(signing_key, string_to_sign.as_bytes())
}

/// Assemble the `Authorization` header value.
pub(crate) fn authorization_header(
    access_key: &str,
    scope: &str,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{ALGORITHM} Credential={access_key}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}
