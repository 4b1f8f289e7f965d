//! Client error types

use corpay_sdk_core::CorpayError;
use std::fmt;
use thiserror::Error;

/// One rejected request field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] CorpayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<FieldError>),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Bank returned HTTP {status}")]
    Http { status: u16 },
}

impl ClientError {
    /// Connection failures, timeouts and 5xx answers may succeed on retry.
    /// Envelope, checksum and validation failures never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Http { status } => *status >= 500,
            _ => false,
        }
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ClientError>;
