//! Compact JWE and JWS operations

use crate::{
    envelope::{accepts_encryption, accepts_signature, ALG_KEY_TRANSPORT, ENC_CONTENT},
    error::{CorpayError, Result},
};
use josekit::jwe::{self, JweDecrypter, JweEncrypter, JweHeader};
use josekit::jws::{self, JwsHeader, JwsSigner, JwsVerifier};
use zeroize::Zeroizing;

/// Envelope operations
pub struct EnvelopeOps;

impl EnvelopeOps {
    /// Encrypt `plaintext` for the holder of the encrypter's key as a
    /// compact JWE. A fresh CEK and IV are drawn for every call.
    pub fn encrypt(plaintext: &[u8], recipient: &dyn JweEncrypter) -> Result<String> {
        let mut header = JweHeader::new();
        header.set_algorithm(ALG_KEY_TRANSPORT);
        header.set_content_encryption(ENC_CONTENT);
        seal(plaintext, &header, recipient)
    }

    /// Decrypt a compact JWE with our private key
    pub fn decrypt(token: &str, decrypter: &dyn JweDecrypter) -> Result<Zeroizing<Vec<u8>>> {
        let (plaintext, header) = jwe::deserialize_compact(token.trim(), decrypter).map_err(|e| {
            tracing::debug!(error = %e, "JWE rejected");
            CorpayError::Decryption
        })?;
        let plaintext = Zeroizing::new(plaintext);

        if !accepts_encryption(&header) {
            tracing::debug!("JWE header outside the allowlist");
            return Err(CorpayError::Decryption);
        }
        Ok(plaintext)
    }

    /// Sign `payload` as a compact RS256 JWS
    pub fn sign(payload: &[u8], signer: &dyn JwsSigner) -> Result<String> {
        sign_under(payload, &JwsHeader::new(), signer)
    }

    /// Verify a compact JWS and return its decoded payload
    pub fn verify(token: &str, verifier: &dyn JwsVerifier) -> Result<Vec<u8>> {
        let (payload, header) = jws::deserialize_compact(token.trim(), verifier).map_err(|e| {
            tracing::debug!(error = %e, "JWS rejected");
            CorpayError::SignatureInvalid
        })?;

        if !accepts_signature(&header) {
            tracing::debug!("JWS header outside the allowlist");
            return Err(CorpayError::SignatureInvalid);
        }
        Ok(payload)
    }
}

/// Outbound failures map to `InternalError`
fn seal(plaintext: &[u8], header: &JweHeader, recipient: &dyn JweEncrypter) -> Result<String> {
    jwe::serialize_compact(plaintext, header, recipient).map_err(|e| {
        tracing::error!(error = %e, "JWE encryption failed");
        CorpayError::InternalError
    })
}

fn sign_under(payload: &[u8], header: &JwsHeader, signer: &dyn JwsSigner) -> Result<String> {
    jws::serialize_compact(payload, header, signer).map_err(|e| {
        tracing::error!(error = %e, "JWS signing failed");
        CorpayError::InternalError
    })
}
