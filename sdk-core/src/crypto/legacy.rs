//! Symmetric-only cipher used by the bank for callback notifications
//!
//! Callbacks arrive as hex text encrypted with a shared AES-128 key, either
//! CBC with the fixed IV `00 01 .. 0f` or ECB, both PKCS#7 padded. There is
//! no integrity tag, so the output is only as trustworthy as the channel.

use crate::error::{CorpayError, Result};
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use zeroize::Zeroizing;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes128EcbEnc = ecb::Encryptor<aes::Aes128>;
type Aes128EcbDec = ecb::Decryptor<aes::Aes128>;

/// Fixed IV mandated by the bank's callback sample
pub const CALLBACK_IV: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];

pub struct CallbackCipher {
    key: Zeroizing<[u8; 16]>,
}

impl CallbackCipher {
    /// Build from the 32 hex character shared secret
    pub fn from_hex_key(key_hex: &str) -> Result<Self> {
        let raw = Zeroizing::new(hex::decode(key_hex.trim()).map_err(|_| {
            CorpayError::KeyLoad("callback key is not valid hex".into())
        })?);

        if raw.len() != 16 {
            return Err(CorpayError::KeyLoad(
                "callback key must be 16 bytes (32 hex chars) for AES-128".into(),
            ));
        }

        let mut key = Zeroizing::new([0u8; 16]);
        key.copy_from_slice(&raw);
        Ok(Self { key })
    }

    fn raw_key(&self) -> &[u8; 16] {
        &self.key
    }

    pub fn decrypt_cbc_hex(&self, cipher_hex: &str) -> Result<String> {
        let ct = hex::decode(cipher_hex.trim()).map_err(|_| CorpayError::Decryption)?;
        let pt = Aes128CbcDec::new(self.raw_key().into(), &CALLBACK_IV.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ct)
            .map_err(|_| CorpayError::Decryption)?;
        String::from_utf8(pt).map_err(|_| CorpayError::Decryption)
    }

    pub fn encrypt_cbc_hex(&self, plaintext: &str) -> String {
        let ct = Aes128CbcEnc::new(self.raw_key().into(), &CALLBACK_IV.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        hex::encode(ct)
    }

    pub fn decrypt_ecb_hex(&self, cipher_hex: &str) -> Result<String> {
        let ct = hex::decode(cipher_hex.trim()).map_err(|_| CorpayError::Decryption)?;
        let pt = Aes128EcbDec::new(self.raw_key().into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ct)
            .map_err(|_| CorpayError::Decryption)?;
        String::from_utf8(pt).map_err(|_| CorpayError::Decryption)
    }

    pub fn encrypt_ecb_hex(&self, plaintext: &str) -> String {
        let ct = Aes128EcbEnc::new(self.raw_key().into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        hex::encode(ct)
    }
}
