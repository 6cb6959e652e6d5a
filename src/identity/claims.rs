//! Read the claims segment of a bearer token without verifying it.
//!
//! The server stays the authority on whether a token is valid; this is only the
//! identity fallback when no profile endpoint answers.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::{Map, Value};

/// Decode the middle segment of `header.claims[.signature]` as base64 JSON.
/// Returns `None` for anything that is not a JSON record.
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let mut parts = token.trim().split('.');
    let _header = parts.next()?;
    let segment = parts.next()?;
    if segment.is_empty() { return None; }
    let bytes = decode_segment(segment)?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(m) => Some(m),
        _ => None,
    }
}

// Tokens in the wild use base64url without padding, but some issuers pad or
// use the standard alphabet.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE.decode(segment))
        .or_else(|_| STANDARD.decode(segment))
        .or_else(|_| STANDARD_NO_PAD.decode(segment))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(claims: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{}.{}.sig", header, body)
    }

    #[test]
    fn decodes_claims_segment() {
        let t = token_with(&json!({"sub": "a@b.com", "roles": ["ADMIN"]}));
        let m = decode_claims(&t).unwrap();
        assert_eq!(m["sub"], "a@b.com");
        assert_eq!(m["roles"][0], "ADMIN");
    }

    #[test]
    fn accepts_padded_standard_alphabet() {
        let body = STANDARD.encode(json!({"email": "x@y.io"}).to_string().as_bytes());
        let m = decode_claims(&format!("h.{}", body)).unwrap();
        assert_eq!(m["email"], "x@y.io");
    }

    #[test]
    fn rejects_opaque_and_malformed_tokens() {
        assert!(decode_claims("opaque-token").is_none());
        assert!(decode_claims("a..c").is_none());
        assert!(decode_claims("a.!!!not-base64!!!.c").is_none());
        let array_body = URL_SAFE_NO_PAD.encode(b"[1,2]");
        assert!(decode_claims(&format!("h.{}.s", array_body)).is_none());
        let text_body = URL_SAFE_NO_PAD.encode(b"plain text");
        assert!(decode_claims(&format!("h.{}.s", text_body)).is_none());
    }
}
