//! ACS3-HMAC-SHA256 request signing
//!
//! Alibaba Cloud V3 signatures cover the method, the canonical query string,
//! a fixed set of `x-acs-*` headers plus `host`, and the SHA-256 of the body:
//!
//! ```text
//! CanonicalRequest = Method \n "/" \n CanonicalQuery \n CanonicalHeaders \n SignedHeaders \n HexSha256(Body)
//! StringToSign     = "ACS3-HMAC-SHA256" \n HexSha256(CanonicalRequest)
//! Signature        = Hex(HMAC-SHA256(AccessKeySecret, StringToSign))
//! ```

use hmac::{Hmac, Mac};
use rrsync_core::{Error, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Signature algorithm identifier
pub const ALGORITHM: &str = "ACS3-HMAC-SHA256";

/// Everything that goes into a signature besides the credentials
#[derive(Debug, Clone)]
pub struct SigningInput<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub action: &'a str,
    pub version: &'a str,
    pub params: &'a BTreeMap<String, String>,
    pub date: &'a str,
    pub nonce: &'a str,
}

/// A signed request, ready to send
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// Canonical query string (also the query to send)
    pub query: String,
    /// Headers to attach, `Authorization` included; `host` is left to the client
    pub headers: Vec<(&'static str, String)>,
}

/// Sorted `key=value` pairs joined by `&`, RFC 3986-encoded
/// (everything but `A-Z a-z 0-9 - _ . ~`)
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Build the canonical request and the signed-headers list
pub fn canonical_request(input: &SigningInput<'_>, payload_hash: &str) -> (String, String) {
    let headers = signed_header_values(input, payload_hash);

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();
    let signed_headers = headers.keys().copied().collect::<Vec<_>>().join(";");

    let request = [
        input.method,
        "/",
        &canonical_query(input.params),
        &canonical_headers,
        &signed_headers,
        payload_hash,
    ]
    .join("\n");

    (request, signed_headers)
}

fn signed_header_values<'a>(
    input: &SigningInput<'a>,
    payload_hash: &'a str,
) -> BTreeMap<&'static str, &'a str> {
    BTreeMap::from([
        ("host", input.host),
        ("x-acs-action", input.action),
        ("x-acs-content-sha256", payload_hash),
        ("x-acs-date", input.date),
        ("x-acs-signature-nonce", input.nonce),
        ("x-acs-version", input.version),
    ])
}

/// Sign a request with an empty body
pub fn sign(
    access_key_id: &str,
    access_key_secret: &str,
    input: &SigningInput<'_>,
) -> Result<SignedRequest> {
    let payload_hash = sha256_hex(b"");
    let (request, signed_headers) = canonical_request(input, &payload_hash);

    let string_to_sign = format!("{}\n{}", ALGORITHM, sha256_hex(request.as_bytes()));

    let mut mac = Hmac::<Sha256>::new_from_slice(access_key_secret.as_bytes())
        .map_err(|e| Error::config(format!("Invalid AccessKey secret: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let authorization = format!(
        "{} Credential={},SignedHeaders={},Signature={}",
        ALGORITHM, access_key_id, signed_headers, signature
    );

    Ok(SignedRequest {
        query: canonical_query(input.params),
        headers: vec![
            ("x-acs-action", input.action.to_string()),
            ("x-acs-version", input.version.to_string()),
            ("x-acs-date", input.date.to_string()),
            ("x-acs-signature-nonce", input.nonce.to_string()),
            ("x-acs-content-sha256", payload_hash),
            ("authorization", authorization),
        ],
    })
}
