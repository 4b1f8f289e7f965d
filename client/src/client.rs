//! Request orchestration: validate, checksum, seal, post, open, verify

use crate::config::{ClientConfig, Endpoint};
use crate::error::{ClientError, Result};
use crate::headers::RequestHeaders;
use crate::payloads::{
    BalanceRequest, BankRequest, BeneficiaryEnquiry, BeneficiaryQuery, BeneficiaryRecord,
    BeneficiaryRegistration, FundTransfer, PaymentDetails, TransferStatusRequest,
};
use crate::transport::{HttpTransport, Transport};
use corpay_sdk_core::{checksum, CallbackCipher, EnvelopeCodec, KeyStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Instrument;

/// Decoded bank answer
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status of the final attempt
    pub status: u16,
    /// Envelope token exactly as received
    pub raw: String,
    /// Unwrapped `Data` object, or the whole document when the bank omits it
    pub body: Value,
}

/// Cipher mode of an inbound callback notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackMode {
    #[default]
    Cbc,
    Ecb,
}

pub struct BankClient {
    config: Arc<ClientConfig>,
    codec: EnvelopeCodec,
    transport: Arc<dyn Transport>,
    callback: Option<CallbackCipher>,
}

impl BankClient {
    /// Load keys eagerly and connect over mutual TLS
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store = Arc::new(KeyStore::new(config.key_source()));
        store.initialize()?;

        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, EnvelopeCodec::new(store), Arc::new(transport))
    }

    pub fn with_transport(
        config: ClientConfig,
        codec: EnvelopeCodec,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let callback = config
            .callback_aes_key_hex
            .as_deref()
            .map(CallbackCipher::from_hex_key)
            .transpose()?;

        Ok(Self {
            config: Arc::new(config),
            codec,
            transport,
            callback,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get_balance(&self, corp_acc_num: &str) -> Result<ApiResponse> {
        self.call(BalanceRequest::new(&self.config, corp_acc_num)).await
    }

    pub async fn register_beneficiary(&self, records: Vec<BeneficiaryRecord>) -> Result<ApiResponse> {
        self.call(BeneficiaryRegistration::new(&self.config, records)).await
    }

    pub async fn beneficiary_enquiry(&self, query: BeneficiaryQuery) -> Result<ApiResponse> {
        self.call(BeneficiaryEnquiry::new(&self.config, query)).await
    }

    pub async fn fund_transfer(&self, details: PaymentDetails) -> Result<ApiResponse> {
        self.call(FundTransfer::new(&self.config, details)).await
    }

    pub async fn transfer_status(&self, crn: &str) -> Result<ApiResponse> {
        self.call(TransferStatusRequest::new(&self.config, crn)).await
    }

    /// Decrypt a callback notification pushed by the bank
    pub fn decode_callback(&self, cipher_hex: &str, mode: CallbackMode) -> Result<Value> {
        let cipher = self.callback.as_ref().ok_or_else(|| {
            ClientError::Config("CORPAY_CALLBACK_AES_KEY_HEX is not set".into())
        })?;

        let plaintext = match mode {
            CallbackMode::Cbc => cipher.decrypt_cbc_hex(cipher_hex)?,
            CallbackMode::Ecb => cipher.decrypt_ecb_hex(cipher_hex)?,
        };

        let document: Value = serde_json::from_str(&plaintext)
            .map_err(|_| corpay_sdk_core::CorpayError::MalformedPayload)?;
        Ok(unwrap_data(document))
    }

    /// Send any request body to its endpoint
    pub async fn call<R: BankRequest>(&self, request: R) -> Result<ApiResponse> {
        let headers = RequestHeaders::new(&self.config);
        let span = tracing::info_span!(
            "bank_call",
            endpoint = R::ENDPOINT.name(),
            correlation_id = %headers.correlation_id,
        );

        self.execute(R::ENDPOINT, request, headers).instrument(span).await
    }

    async fn execute<R: BankRequest>(
        &self,
        endpoint: Endpoint,
        request: R,
        headers: RequestHeaders,
    ) -> Result<ApiResponse> {
        let errors = request.validate();
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "request rejected by validation");
            return Err(ClientError::Validation(errors));
        }

        let mut data = serde_json::to_value(&request)
            .map_err(|_| corpay_sdk_core::CorpayError::MalformedPayload)?;
        checksum::inject(&mut data)?;

        let token = self.codec.seal_and_sign(&json!({ "Data": data }))?;
        let response = self
            .transport
            .post(&self.config.url(endpoint), &headers, token)
            .await?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "bank call failed");
            return Err(ClientError::Http {
                status: response.status,
            });
        }

        let document = self.codec.verify_and_open(&response.body)?;
        let body = unwrap_data(document);

        if has_checksum(&body) {
            if let Err(e) = checksum::ensure(&body) {
                tracing::warn!("response checksum does not match its contents");
                return Err(e.into());
            }
        }

        tracing::info!(status = response.status, "bank call completed");
        Ok(ApiResponse {
            status: response.status,
            raw: response.body,
            body,
        })
    }
}

/// `Data` (or `data`) when present, else the document itself
fn unwrap_data(mut document: Value) -> Value {
    if let Some(map) = document.as_object_mut() {
        for key in ["Data", "data"] {
            if let Some(data) = map.remove(key) {
                return data;
            }
        }
    }
    document
}

fn has_checksum(body: &Value) -> bool {
    matches!(body.get(checksum::CHECKSUM_FIELD), Some(Value::String(s)) if !s.is_empty())
}
