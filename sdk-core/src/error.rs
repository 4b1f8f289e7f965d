//! Corpay error types

use thiserror::Error;

/// Failures raised by the checksum and envelope pipeline.
///
/// None of the variants carry payload contents. Reasons attached to
/// [`CorpayError::KeyLoad`] describe the container, never key bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorpayError {
    #[error("Key load failed: {0}")]
    KeyLoad(String),

    #[error("Checksum mismatch: untrusted payload")]
    ChecksumMismatch,

    #[error("Invalid signature")]
    SignatureInvalid,

    #[error("Decryption failure")]
    Decryption,

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Entropy unavailable")]
    EntropyUnavailable,

    #[error("Internal error")]
    InternalError,
}

impl CorpayError {
    /// Short machine-readable name, safe to log next to a correlation id.
    pub fn kind(&self) -> &'static str {
        match self {
            CorpayError::KeyLoad(_) => "key_load",
            CorpayError::ChecksumMismatch => "checksum_mismatch",
            CorpayError::SignatureInvalid => "signature_invalid",
            CorpayError::Decryption => "decryption",
            CorpayError::MalformedPayload => "malformed_payload",
            CorpayError::EntropyUnavailable => "entropy_unavailable",
            CorpayError::InternalError => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, CorpayError>;
