//! Body-level codec: JSON in, envelope token out, and back

use crate::{
    envelope::EnvelopeOps,
    error::{CorpayError, Result},
    keys::KeyStore,
};
use serde_json::Value;
use std::sync::Arc;

/// Seals outbound bodies for the counterparty and opens inbound tokens.
///
/// Outbound: JSON text is encrypted for the counterparty (JWE), and the JWE
/// text is then signed with our key (JWS). Inbound reverses the two steps
/// and only accepts RS256 over RSA-OAEP-256 + A256GCM.
#[derive(Clone)]
pub struct EnvelopeCodec {
    store: Arc<KeyStore>,
}

impl EnvelopeCodec {
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<KeyStore> {
        &self.store
    }

    /// Encrypt then sign a JSON body
    pub fn seal_and_sign(&self, body: &Value) -> Result<String> {
        let keys = self.store.get()?;
        let plaintext = serde_json::to_vec(body).map_err(|_| CorpayError::MalformedPayload)?;

        let jwe = EnvelopeOps::encrypt(&plaintext, keys.encryption_key())?;
        let token = EnvelopeOps::sign(jwe.as_bytes(), keys.signing_key())?;

        tracing::debug!(token_len = token.len(), "sealed envelope");
        Ok(token)
    }

    /// Verify then decrypt an envelope token back into its JSON body
    pub fn verify_and_open(&self, token: &str) -> Result<Value> {
        let keys = self.store.get()?;

        let opened = EnvelopeOps::verify(token, keys.verification_key())
            .and_then(|payload| {
                let jwe = String::from_utf8(payload).map_err(|_| CorpayError::Decryption)?;
                EnvelopeOps::decrypt(&jwe, keys.decryption_key())
            })
            .and_then(|plaintext| {
                serde_json::from_slice(&plaintext).map_err(|_| CorpayError::MalformedPayload)
            });

        match &opened {
            Ok(_) => tracing::debug!(token_len = token.len(), "opened envelope"),
            Err(e) => tracing::warn!(kind = e.kind(), "rejected envelope"),
        }
        opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{loader::load_private_key, public_half, KeyMaterial};
    use serde_json::json;

    /// Client codec plus a bank-side codec holding the mirrored keys
    fn pair() -> (EnvelopeCodec, EnvelopeCodec) {
        let client = load_private_key(include_bytes!("../../tests/fixtures/client_key.pem"), None).unwrap();
        let bank = load_private_key(include_bytes!("../../tests/fixtures/bank_key.pem"), None).unwrap();

        let client_side = KeyMaterial::new(&client, &public_half(&bank).unwrap()).unwrap();
        let bank_side = KeyMaterial::new(&bank, &public_half(&client).unwrap()).unwrap();

        (
            EnvelopeCodec::new(Arc::new(KeyStore::from_material(client_side))),
            EnvelopeCodec::new(Arc::new(KeyStore::from_material(bank_side))),
        )
    }

    #[test]
    fn test_round_trip_both_directions() {
        let (client, bank) = pair();
        let body = json!({"Data": {"foo": "bar"}});

        let token = client.seal_and_sign(&body).unwrap();
        assert!(token.is_ascii());
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(bank.verify_and_open(&token).unwrap(), body);

        let reply = json!({"Data": {"status": "S", "amount": 12.5}});
        let token = bank.seal_and_sign(&reply).unwrap();
        assert_eq!(client.verify_and_open(&token).unwrap(), reply);
    }

    #[test]
    fn test_own_token_does_not_open_locally() {
        let (client, _) = pair();
        let token = client.seal_and_sign(&json!({"a": 1})).unwrap();
        assert_eq!(
            client.verify_and_open(&token).unwrap_err(),
            CorpayError::SignatureInvalid
        );
    }

    #[test]
    fn test_non_json_plaintext() {
        let (client, bank) = pair();
        let client_keys = client.store().get().unwrap();

        let jwe = EnvelopeOps::encrypt(b"not json", client_keys.encryption_key()).unwrap();
        let token = EnvelopeOps::sign(jwe.as_bytes(), client_keys.signing_key()).unwrap();

        assert_eq!(
            bank.verify_and_open(&token).unwrap_err(),
            CorpayError::MalformedPayload
        );
    }

    #[test]
    fn test_signed_payload_that_is_not_a_jwe() {
        let (client, bank) = pair();
        let client_keys = client.store().get().unwrap();

        let token = EnvelopeOps::sign(b"just text", client_keys.signing_key()).unwrap();
        assert_eq!(bank.verify_and_open(&token).unwrap_err(), CorpayError::Decryption);

        let token = EnvelopeOps::sign(&[0xff, 0xfe], client_keys.signing_key()).unwrap();
        assert_eq!(bank.verify_and_open(&token).unwrap_err(), CorpayError::Decryption);
    }

    #[test]
    fn test_garbage_token() {
        let (client, _) = pair();
        assert_eq!(
            client.verify_and_open("not-a-token").unwrap_err(),
            CorpayError::SignatureInvalid
        );
        assert_eq!(client.verify_and_open("").unwrap_err(), CorpayError::SignatureInvalid);
    }
}
