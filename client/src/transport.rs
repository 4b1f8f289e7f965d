//! HTTP transport to the bank gateway

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::{ClientError, Result};
use crate::headers::RequestHeaders;
use async_trait::async_trait;
use std::future::Future;

/// Raw answer from the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts one envelope token. Implementations return non-2xx answers as
/// responses, not errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        headers: &RequestHeaders,
        body: String,
    ) -> Result<TransportResponse>;
}

/// reqwest transport with a PKCS#12 client identity for mutual TLS
pub struct HttpTransport {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let der = std::fs::read(&config.tls_p12_path).map_err(|e| {
            ClientError::Config(format!(
                "cannot read TLS identity {}: {e}",
                config.tls_p12_path.display()
            ))
        })?;
        let password = config.client_p12_password.as_deref().unwrap_or("");
        let identity = reqwest::Identity::from_pkcs12_der(&der, password)
            .map_err(|e| ClientError::Config(format!("invalid TLS identity: {e}")))?;

        let client = reqwest::Client::builder()
            .identity(identity)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    async fn post_once(
        &self,
        url: &str,
        headers: &RequestHeaders,
        body: String,
    ) -> Result<TransportResponse> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(describe)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(describe)?;

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        headers: &RequestHeaders,
        body: String,
    ) -> Result<TransportResponse> {
        with_retry(&self.retry, move || self.post_once(url, headers, body.clone())).await
    }
}

fn describe(err: reqwest::Error) -> ClientError {
    if err.is_builder() {
        ClientError::Config(format!("invalid request: {err}"))
    } else if err.is_timeout() {
        ClientError::Transport("request timed out".into())
    } else if err.is_connect() {
        ClientError::Transport(format!("connection failed: {err}"))
    } else {
        ClientError::Transport(err.to_string())
    }
}

/// Run `attempt` until it succeeds, fails permanently, or the retry budget
/// is spent. Transport errors and 5xx answers are retried with exponential
/// backoff; the last 5xx answer is returned as is.
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<TransportResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TransportResponse>>,
{
    let mut retry = 0;
    loop {
        let outcome = attempt().await;

        let retryable = match &outcome {
            Ok(response) => response.status >= 500,
            Err(e) => e.is_retryable(),
        };
        if !retryable || retry >= policy.max_retries {
            return outcome;
        }

        let delay = policy.delay(retry);
        match &outcome {
            Ok(response) => tracing::warn!(
                status = response.status,
                attempt = retry + 1,
                delay_ms = delay.as_millis() as u64,
                "bank answered with server error, retrying"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                attempt = retry + 1,
                delay_ms = delay.as_millis() as u64,
                "transport failure, retrying"
            ),
        }

        tokio::time::sleep(delay).await;
        retry += 1;
    }
}
