//! Corpay client: calls the bank's corporate payments API through the
//! secure envelope from `corpay-sdk-core`

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payloads;
pub mod transport;
pub mod validation;

pub use client::{ApiResponse, BankClient, CallbackMode};
pub use config::{ClientConfig, Endpoint, Environment, RetryPolicy};
pub use error::{ClientError, FieldError, Result};
pub use payloads::{BeneficiaryQuery, BeneficiaryRecord, PaymentDetails};
pub use transport::{HttpTransport, Transport, TransportResponse};
