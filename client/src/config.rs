//! Client configuration, read from the process environment

use crate::error::{ClientError, Result};
use corpay_sdk_core::KeySource;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Bank environment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Uat,
    Prod,
}

impl FromStr for Environment {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uat" => Ok(Environment::Uat),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(ClientError::Config(format!(
                "CORPAY_ENV must be uat or prod, got {other:?}"
            ))),
        }
    }
}

/// Bank API operations and their paths below the base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Balance,
    BeneficiaryRegistration,
    BeneficiaryEnquiry,
    FundTransfer,
    TransferStatus,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Balance => "/txb/v1/acct-recon/get-balance",
            Endpoint::BeneficiaryRegistration => "/payee-mgmt/beneficiary-registration",
            Endpoint::BeneficiaryEnquiry => "/payee-mgmt/beneficiary-enquiry",
            Endpoint::FundTransfer => "/txb/v3/payments/transfer-payment",
            Endpoint::TransferStatus => "/txb/v1/payment/get-status",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Balance => "balance",
            Endpoint::BeneficiaryRegistration => "beneficiary_registration",
            Endpoint::BeneficiaryEnquiry => "beneficiary_enquiry",
            Endpoint::FundTransfer => "fund_transfer",
            Endpoint::TransferStatus => "transfer_status",
        }
    }
}

/// Retry tunables for the HTTP transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff for the given zero-based retry number, capped
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms))
    }
}

#[derive(Clone)]
pub struct ClientConfig {
    pub environment: Environment,
    pub base_url: String,
    pub channel_id: String,
    pub corp_code: String,
    pub user_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub service_id: String,
    pub service_version: String,
    /// Signing and decryption key store (PKCS#12 or PEM)
    pub client_p12_path: PathBuf,
    pub client_p12_password: Option<String>,
    pub bank_cert_path: PathBuf,
    /// Mutual TLS identity; usually the same store as the signing key
    pub tls_p12_path: PathBuf,
    pub callback_aes_key_hex: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Read `CORPAY_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| ClientError::Config(format!("{name} is not set")))
        };

        let environment = match get("CORPAY_ENV") {
            Some(value) => value.parse()?,
            None => Environment::Uat,
        };
        let base_url_var = match environment {
            Environment::Uat => "CORPAY_BASE_URL_UAT",
            Environment::Prod => "CORPAY_BASE_URL_PROD",
        };
        let base_url = require(base_url_var)?.trim_end_matches('/').to_string();

        let client_p12_path = PathBuf::from(require("CORPAY_CLIENT_P12_PATH")?);
        let tls_p12_path = get("CORPAY_TLS_P12_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| client_p12_path.clone());

        let timeout_ms = parse_number(get("CORPAY_TIMEOUT_MS"), "CORPAY_TIMEOUT_MS", 30_000u64)?;
        let max_retries = parse_number(get("CORPAY_MAX_RETRIES"), "CORPAY_MAX_RETRIES", 2u32)?;

        Ok(Self {
            environment,
            base_url,
            channel_id: require("CORPAY_CHANNEL_ID")?,
            corp_code: require("CORPAY_CORP_CODE")?,
            user_id: get("CORPAY_USER_ID").unwrap_or_else(|| "api_user".to_string()),
            client_id: require("CORPAY_CLIENT_ID")?,
            client_secret: require("CORPAY_CLIENT_SECRET")?,
            service_id: require("CORPAY_SERVICE_ID")?,
            service_version: require("CORPAY_SERVICE_VERSION")?,
            client_p12_path,
            client_p12_password: get("CORPAY_CLIENT_P12_PASSWORD"),
            bank_cert_path: PathBuf::from(require("CORPAY_BANK_CERT_PATH")?),
            tls_p12_path,
            callback_aes_key_hex: get("CORPAY_CALLBACK_AES_KEY_HEX"),
            timeout: Duration::from_millis(timeout_ms),
            retry: RetryPolicy {
                max_retries,
                ..RetryPolicy::default()
            },
        })
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Where the envelope keys come from
    pub fn key_source(&self) -> KeySource {
        KeySource {
            private_key_path: self.client_p12_path.clone(),
            passphrase: self.client_p12_password.clone(),
            counterparty_cert_path: self.bank_cert_path.clone(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("channel_id", &self.channel_id)
            .field("corp_code", &self.corp_code)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("service_id", &self.service_id)
            .field("service_version", &self.service_version)
            .field("client_p12_path", &self.client_p12_path)
            .field("bank_cert_path", &self.bank_cert_path)
            .field("tls_p12_path", &self.tls_p12_path)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn parse_number<T: FromStr>(value: Option<String>, name: &str, default: T) -> Result<T> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|_| ClientError::Config(format!("{name} must be a non-negative integer"))),
        None => Ok(default),
    }
}
