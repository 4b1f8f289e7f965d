//! Corpay SDK core: checksum canonicalizer, key material and the secure
//! envelope used on every call to the bank's corporate payments API

pub mod checksum;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keys;

// Re-exports
pub use crypto::legacy::CallbackCipher;
pub use envelope::EnvelopeCodec;
pub use error::{CorpayError, Result};
pub use keys::{KeyMaterial, KeySource, KeyStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
