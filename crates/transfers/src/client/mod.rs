//! Boundary to the inventory service that creates transfers.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::request::TransferRequest;
use crate::result::TransferResult;

pub mod in_memory;

#[cfg(feature = "http")]
pub mod http;

pub use in_memory::InMemoryTransferClient;

#[cfg(feature = "http")]
pub use http::HttpTransferClient;

/// Failure reported while creating a transfer.
///
/// The workflow shows `to_string()` as a single banner and does not branch on
/// the variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The service refused the transfer; the message is shown as-is.
    #[error("{0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("inventory service error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response from inventory service: {0}")]
    Parse(String),
    #[error("transfer submission timed out after {0:?}")]
    Timeout(Duration),
}

impl SubmissionError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Text for the review-screen banner.
    pub fn display_message(&self) -> String {
        self.to_string()
    }
}

/// Creates transfers on the inventory service.
///
/// Each call is one attempt: implementations must not retry on their own. One
/// client may be shared by many workflows; calls are independent.
#[async_trait]
pub trait TransferSubmissionClient: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    async fn create(&self, request: TransferRequest) -> Result<TransferResult, SubmissionError>;
}
