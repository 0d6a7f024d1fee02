//! MockSink - simulated delivery target for demos and tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{Address, ContractError, DeliverySink, Payload, SendResult};
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, instrument};

/// One observed delivery call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub address: Address,
    pub origin: String,
    pub outcome: SendResult,
    /// When the call started
    pub at: Instant,
}

/// Shared, append-only record of the calls a MockSink received
#[derive(Debug, Clone)]
pub struct DeliveryLog {
    records: Arc<Mutex<Vec<DeliveryRecord>>>,
    len: Arc<watch::Sender<usize>>,
}

impl DeliveryLog {
    fn new() -> Self {
        let (len, _rx) = watch::channel(0);
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            len: Arc::new(len),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DeliveryRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, record: DeliveryRecord) {
        let len = {
            let mut records = self.lock();
            records.push(record);
            records.len()
        };
        self.len.send_replace(len);
    }

    /// Snapshot of all records in call order
    pub fn records(&self) -> Vec<DeliveryRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        *self.len.borrow()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least `count` calls have been recorded
    pub async fn wait_for(&self, count: usize) {
        let mut rx = self.len.subscribe();
        let _ = rx.wait_for(|len| *len >= count).await;
    }
}

/// Sink with configurable latency and rejection behaviour
///
/// Outcome order: scripted outcomes first, then `reject_every`, else accept.
pub struct MockSink {
    name: String,
    latency: Duration,
    script: Mutex<VecDeque<SendResult>>,
    reject_every: Option<u64>,
    calls: AtomicU64,
    log: DeliveryLog,
}

impl MockSink {
    /// Create an instant, always-accepting sink
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latency: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            reject_every: None,
            calls: AtomicU64::new(0),
            log: DeliveryLog::new(),
        }
    }

    /// Simulated time spent per delivery
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Outcomes returned for the first calls, in order
    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = SendResult>) -> Self {
        self.lock_script().extend(outcomes);
        self
    }

    /// Reject every `n`-th call (after the script is used up); 0 disables
    pub fn with_reject_every(mut self, n: u64) -> Self {
        self.reject_every = (n > 0).then_some(n);
        self
    }

    /// Handle to the calls this sink receives
    pub fn log(&self) -> DeliveryLog {
        self.log.clone()
    }

    fn lock_script(&self) -> MutexGuard<'_, VecDeque<SendResult>> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_outcome(&self) -> SendResult {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(outcome) = self.lock_script().pop_front() {
            return outcome;
        }
        match self.reject_every {
            Some(n) if call.is_multiple_of(n) => SendResult::Rejected,
            _ => SendResult::Accepted,
        }
    }
}

impl DeliverySink for MockSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "mock_sink_deliver",
        skip(self, address, payload),
        fields(sink = %self.name, recipient = %address)
    )]
    async fn deliver(
        &self,
        address: &Address,
        payload: &Payload,
    ) -> Result<SendResult, ContractError> {
        let outcome = self.next_outcome();
        self.log.push(DeliveryRecord {
            address: address.clone(),
            origin: payload.origin.clone(),
            outcome,
            at: Instant::now(),
        });

        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        debug!(outcome = ?outcome, "Mock delivery");
        Ok(outcome)
    }
}
