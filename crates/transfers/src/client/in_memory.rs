//! In-memory transfer client for tests/dev.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use forgepos_core::TransferId;

use super::{SubmissionError, TransferSubmissionClient};
use crate::request::TransferRequest;
use crate::result::{TransferResult, TransferStatus};

#[derive(Debug, Default)]
struct Ledger {
    created: u32,
    requests: Vec<TransferRequest>,
    scripted_failures: VecDeque<SubmissionError>,
}

/// Deterministic client that "creates" transfers in memory.
///
/// - Numbers transfers `TRF-001`, `TRF-002`, ... in creation order
/// - Records every request it receives, including failed ones
/// - Fails the next calls with queued errors, one error per call
#[derive(Debug, Default)]
pub struct InMemoryTransferClient {
    ledger: Mutex<Ledger>,
    calls: AtomicUsize,
    latency: Option<Duration>,
}

impl InMemoryTransferClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next not-yet-scripted call fail with `error`.
    pub fn fail_next(&self, error: SubmissionError) {
        if let Ok(mut ledger) = self.ledger.lock() {
            ledger.scripted_failures.push_back(error);
        }
    }

    /// Number of `create` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<TransferRequest> {
        self.ledger
            .lock()
            .map(|l| l.requests.clone())
            .unwrap_or_default()
    }

    /// Number of transfers successfully created.
    pub fn created(&self) -> u32 {
        self.ledger.lock().map(|l| l.created).unwrap_or_default()
    }
}

#[async_trait]
impl TransferSubmissionClient for InMemoryTransferClient {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn create(&self, request: TransferRequest) -> Result<TransferResult, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut ledger = self
            .ledger
            .lock()
            .map_err(|_| SubmissionError::rejected("in-memory transfer ledger is poisoned"))?;

        ledger.requests.push(request);

        if let Some(error) = ledger.scripted_failures.pop_front() {
            return Err(error);
        }

        ledger.created += 1;
        let id = TransferId::new();
        let display_number = format!("TRF-{:03}", ledger.created);

        Ok(TransferResult {
            id,
            qr_code: format!("forgepos:transfer:{id}"),
            display_number,
            status: TransferStatus::Pending,
        })
    }
}
