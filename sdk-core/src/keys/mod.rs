//! Key material: our RSA private key and the bank's RSA public key

pub mod loader;
pub mod store;

pub use loader::load;
pub use store::KeyStore;

use crate::error::{CorpayError, Result};
use josekit::jwe::{JweDecrypter, JweEncrypter, RSA_OAEP_256};
use josekit::jws::{JwsSigner, JwsVerifier, RS256};
use openssl::pkey::{Id, PKey, PKeyRef, Private, Public};
use std::fmt;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Smallest RSA modulus accepted for either party
pub const MIN_RSA_BITS: u32 = 2048;

/// Where the key material lives on disk
#[derive(Clone)]
pub struct KeySource {
    /// PKCS#12 store or PEM private key
    pub private_key_path: PathBuf,
    /// Passphrase for the store or an encrypted PKCS#8 key
    pub passphrase: Option<String>,
    /// Counterparty X.509 certificate (PEM or DER) or bare public key
    pub counterparty_cert_path: PathBuf,
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySource")
            .field("private_key_path", &self.private_key_path)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("counterparty_cert_path", &self.counterparty_cert_path)
            .finish()
    }
}

/// Long-lived key handles.
///
/// One RSA private key backs both the RS256 signer and the RSA-OAEP-256
/// decrypter; the counterparty public key likewise backs the encrypter and
/// the signature verifier.
pub struct KeyMaterial {
    signer: Box<dyn JwsSigner + Send + Sync>,
    decrypter: Box<dyn JweDecrypter + Send + Sync>,
    encrypter: Box<dyn JweEncrypter + Send + Sync>,
    verifier: Box<dyn JwsVerifier + Send + Sync>,
    own_public_der: Vec<u8>,
    private_bits: u32,
    counterparty_bits: u32,
}

impl KeyMaterial {
    pub fn new(private_key: &PKeyRef<Private>, counterparty_key: &PKeyRef<Public>) -> Result<Self> {
        let private_bits = check_rsa("private key", private_key.id(), private_key.bits())?;
        let counterparty_bits =
            check_rsa("counterparty key", counterparty_key.id(), counterparty_key.bits())?;

        let private_der = Zeroizing::new(
            private_key
                .private_key_to_pkcs8()
                .map_err(|e| CorpayError::KeyLoad(format!("cannot encode private key: {e}")))?,
        );
        let public_der = counterparty_key
            .public_key_to_der()
            .map_err(|e| CorpayError::KeyLoad(format!("cannot encode counterparty key: {e}")))?;
        let own_public_der = private_key
            .public_key_to_der()
            .map_err(|e| CorpayError::KeyLoad(format!("cannot encode own public key: {e}")))?;

        let binding = |e: josekit::JoseError| CorpayError::KeyLoad(format!("unusable RSA key: {e}"));

        Ok(Self {
            signer: Box::new(RS256.signer_from_der(&*private_der).map_err(binding)?),
            decrypter: Box::new(RSA_OAEP_256.decrypter_from_der(&*private_der).map_err(binding)?),
            encrypter: Box::new(RSA_OAEP_256.encrypter_from_der(&public_der).map_err(binding)?),
            verifier: Box::new(RS256.verifier_from_der(&public_der).map_err(binding)?),
            own_public_der,
            private_bits,
            counterparty_bits,
        })
    }

    /// RS256 signer for outbound tokens
    pub fn signing_key(&self) -> &dyn JwsSigner {
        self.signer.as_ref()
    }

    /// RSA-OAEP-256 decrypter for inbound content keys
    pub fn decryption_key(&self) -> &dyn JweDecrypter {
        self.decrypter.as_ref()
    }

    /// RSA-OAEP-256 encrypter for outbound content keys
    pub fn encryption_key(&self) -> &dyn JweEncrypter {
        self.encrypter.as_ref()
    }

    /// RS256 verifier for inbound tokens
    pub fn verification_key(&self) -> &dyn JwsVerifier {
        self.verifier.as_ref()
    }

    /// Our own public key as SubjectPublicKeyInfo DER, as the counterparty
    /// would hold it
    pub fn own_public_key_der(&self) -> &[u8] {
        &self.own_public_der
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key_bits", &self.private_bits)
            .field("counterparty_key_bits", &self.counterparty_bits)
            .finish()
    }
}

fn check_rsa(what: &str, id: Id, bits: u32) -> Result<u32> {
    if id != Id::RSA {
        return Err(CorpayError::KeyLoad(format!("{what} is not an RSA key")));
    }
    if bits < MIN_RSA_BITS {
        return Err(CorpayError::KeyLoad(format!(
            "{what} is {bits} bits, minimum is {MIN_RSA_BITS}"
        )));
    }
    Ok(bits)
}

/// Public half of a private key
pub fn public_half(private_key: &PKeyRef<Private>) -> Result<PKey<Public>> {
    private_key
        .public_key_to_der()
        .and_then(|der| PKey::public_key_from_der(&der))
        .map_err(|e| CorpayError::KeyLoad(format!("cannot derive public key: {e}")))
}
