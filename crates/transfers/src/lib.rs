//! Inventory transfer workflow (client side).
//!
//! Lets an operator pick a destination, choose products and quantities, review
//! and submit a transfer to the inventory service. Everything here is
//! deterministic except the `TransferSubmissionClient` boundary.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod result;
pub mod selection;
pub mod stock;
pub mod workflow;

pub use client::{InMemoryTransferClient, SubmissionError, TransferSubmissionClient};
#[cfg(feature = "http")]
pub use client::HttpTransferClient;
pub use config::{HttpClientConfig, WorkflowConfig};
pub use error::WorkflowError;
pub use request::{TransferLine, TransferRequest, TransferRequestBuilder};
pub use result::{TransferResult, TransferStatus};
pub use selection::{SelectionEntry, SelectionSet, StaleEntry};
pub use stock::{StockLimit, clamp_quantity, max_quantity};
pub use workflow::{
    CompletionCallback, INTERRUPTED_SUBMISSION_MESSAGE, Step, TransferWorkflow, WorkflowEvent,
    WorkflowState,
};
