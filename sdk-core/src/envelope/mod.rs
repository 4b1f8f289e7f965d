//! Secure envelope: a compact JWE (RSA-OAEP-256 + A256GCM) carried as the
//! payload of a compact JWS (RS256)

pub mod codec;
pub mod operations;

pub use codec::EnvelopeCodec;
pub use operations::EnvelopeOps;

use josekit::jwe::JweHeader;
use josekit::jws::JwsHeader;
use josekit::JoseHeader;

pub const ALG_KEY_TRANSPORT: &str = "RSA-OAEP-256";
pub const ENC_CONTENT: &str = "A256GCM";
pub const ALG_SIGNATURE: &str = "RS256";

/// Inbound JWS header allowlist: RS256 only, no `crit`, no unencoded
/// payload, and nothing that makes the outer token look like a JWE.
pub(crate) fn accepts_signature(header: &JwsHeader) -> bool {
    text_claim(header, "alg") == Some(ALG_SIGNATURE)
        && header.claim("enc").is_none()
        && header.claim("crit").is_none()
        && header.claim("b64").is_none()
}

/// Inbound JWE header allowlist: RSA-OAEP-256 with A256GCM, no
/// compression, no `crit`.
pub(crate) fn accepts_encryption(header: &JweHeader) -> bool {
    text_claim(header, "alg") == Some(ALG_KEY_TRANSPORT)
        && text_claim(header, "enc") == Some(ENC_CONTENT)
        && header.claim("zip").is_none()
        && header.claim("crit").is_none()
}

fn text_claim<'a>(header: &'a impl JoseHeader, name: &str) -> Option<&'a str> {
    header.claim(name).and_then(|value| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwe_header(claims: serde_json::Value) -> JweHeader {
        let mut header = JweHeader::new();
        for (name, value) in claims.as_object().unwrap() {
            header.set_claim(name, Some(value.clone())).unwrap();
        }
        header
    }

    fn jws_header(claims: serde_json::Value) -> JwsHeader {
        let mut header = JwsHeader::new();
        for (name, value) in claims.as_object().unwrap() {
            header.set_claim(name, Some(value.clone())).unwrap();
        }
        header
    }

    #[test]
    fn test_encryption_allowlist() {
        assert!(accepts_encryption(&jwe_header(json!({"alg": "RSA-OAEP-256", "enc": "A256GCM"}))));

        assert!(!accepts_encryption(&jwe_header(json!({"alg": "RSA1_5", "enc": "A256GCM"}))));
        assert!(!accepts_encryption(&jwe_header(json!({"alg": "RSA-OAEP-256", "enc": "A128GCM"}))));
        assert!(!accepts_encryption(&jwe_header(json!({"alg": "RSA-OAEP-256"}))));
        assert!(!accepts_encryption(&jwe_header(
            json!({"alg": "RSA-OAEP-256", "enc": "A256GCM", "zip": "DEF"})
        )));
    }

    #[test]
    fn test_signature_allowlist() {
        assert!(accepts_signature(&jws_header(json!({"alg": "RS256"}))));

        assert!(!accepts_signature(&jws_header(json!({"alg": "none"}))));
        assert!(!accepts_signature(&jws_header(json!({"alg": "HS256"}))));
        assert!(!accepts_signature(&jws_header(json!({"alg": "RS256", "b64": false}))));
        assert!(!accepts_signature(&jws_header(json!({"alg": "RS256", "enc": "A256GCM"}))));
    }
}
