//! Dispatcher - main loop for read, fan-out and backoff

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use contracts::{Address, DeliverySink, Event, EventSource, Payload, SendResult};

use crate::cancel::CancellationToken;
use crate::error::DispatcherError;
use crate::stats::DispatchStats;

/// Default pause after a rejected delivery
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

/// Dispatcher configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Pause after every rejection
    pub backoff: Duration,
    /// Delivery attempts per recipient per event (1 = never re-send)
    pub max_attempts: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_BACKOFF,
            max_attempts: 1,
        }
    }
}

impl DispatcherConfig {
    /// Check config legality
    pub fn validate(&self) -> Result<(), DispatcherError> {
        if self.max_attempts == 0 {
            return Err(DispatcherError::invalid_config(
                "max_attempts",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Run loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Constructed, not yet running
    Idle,
    /// Suspended on the source
    AwaitingEvent,
    /// Delivering the current event
    Dispatching,
    /// Suspended after a rejection
    BackingOff,
    /// Terminal
    Stopped,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder<S, K> {
    config: DispatcherConfig,
    source: S,
    sink: K,
}

impl<S, K> DispatcherBuilder<S, K>
where
    S: EventSource,
    K: DeliverySink,
{
    /// Create a new DispatcherBuilder with default config
    pub fn new(source: S, sink: K) -> Self {
        Self {
            config: DispatcherConfig::default(),
            source,
            sink,
        }
    }

    /// Set the backoff interval
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.config.backoff = backoff;
        self
    }

    /// Set delivery attempts per recipient
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Replace the whole config
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate config and build the dispatcher
    pub fn build(self) -> Result<Dispatcher<S, K>, DispatcherError> {
        Dispatcher::with_config(self.source, self.sink, self.config)
    }
}

/// Sequential consumer that fans each event out to its recipients
pub struct Dispatcher<S, K> {
    source: S,
    sink: K,
    config: DispatcherConfig,
    state: DispatcherState,
    stats: DispatchStats,
}

impl<S, K> Dispatcher<S, K>
where
    S: EventSource,
    K: DeliverySink,
{
    /// Create a dispatcher that backs off and advances on rejection
    pub fn new(source: S, sink: K, backoff: Duration) -> Self {
        Self::from_parts(
            source,
            sink,
            DispatcherConfig {
                backoff,
                max_attempts: 1,
            },
        )
    }

    /// Create a dispatcher from a validated config
    pub fn with_config(
        source: S,
        sink: K,
        config: DispatcherConfig,
    ) -> Result<Self, DispatcherError> {
        config.validate()?;
        Ok(Self::from_parts(source, sink, config))
    }

    fn from_parts(source: S, sink: K, config: DispatcherConfig) -> Self {
        Self {
            source,
            sink,
            config,
            state: DispatcherState::Idle,
            stats: DispatchStats::default(),
        }
    }

    /// Start building a dispatcher
    pub fn builder(source: S, sink: K) -> DispatcherBuilder<S, K> {
        DispatcherBuilder::new(source, sink)
    }

    /// Backoff interval
    pub fn backoff(&self) -> Duration {
        self.config.backoff
    }

    /// Active configuration
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Current run loop state
    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Run until cancelled
    ///
    /// Rejections and collaborator faults are absorbed by the backoff policy;
    /// the only way out is `cancel`. A stopped dispatcher returns immediately.
    #[instrument(
        name = "dispatcher_run",
        skip(self, cancel),
        fields(source = %self.source.name(), sink = %self.sink.name())
    )]
    pub async fn run(&mut self, cancel: &CancellationToken) {
        if self.state == DispatcherState::Stopped {
            return;
        }

        info!(
            backoff_ms = self.config.backoff.as_millis() as u64,
            max_attempts = self.config.max_attempts,
            "Dispatcher started"
        );

        while !cancel.is_cancelled() {
            self.transition(DispatcherState::AwaitingEvent);

            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                read = self.source.read_event() => read,
            };

            let flow = match read {
                Ok(event) => {
                    self.stats.cycles += 1;
                    if self.stats.cycles.is_multiple_of(100) {
                        debug!(cycles = self.stats.cycles, "Dispatcher progress");
                    }
                    self.dispatch_event(&event, cancel).await
                }
                Err(e) => {
                    self.stats.source_faults += 1;
                    warn!(error = %e, "Source read failed, backing off");
                    self.back_off(cancel).await
                }
            };

            if flow.is_break() {
                break;
            }
        }

        self.transition(DispatcherState::Stopped);

        info!(
            cycles = self.stats.cycles,
            deliveries = self.stats.deliveries,
            accepted = self.stats.accepted,
            rejected = self.stats.rejected,
            backoffs = self.stats.backoffs,
            source_faults = self.stats.source_faults,
            sink_faults = self.stats.sink_faults,
            "Dispatcher stopped"
        );
    }

    /// Spawn the dispatcher as a background task
    ///
    /// The task yields the final counters once `cancel` has been observed.
    pub fn spawn(mut self, cancel: CancellationToken) -> JoinHandle<DispatchStats>
    where
        S: Send + 'static,
        K: Send + 'static,
    {
        tokio::spawn(async move {
            self.run(&cancel).await;
            self.stats
        })
    }

    async fn dispatch_event(
        &mut self,
        event: &Event,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        debug!(
            origin = %event.payload.origin,
            recipients = event.recipients.len(),
            bytes = event.payload.data.len(),
            "Dispatching event"
        );

        for recipient in &event.recipients {
            let mut attempt = 1;
            loop {
                let outcome = self.deliver(recipient, &event.payload, attempt).await;
                if outcome.is_accepted() {
                    break;
                }

                if self.back_off(cancel).await.is_break() {
                    return ControlFlow::Break(());
                }

                if attempt >= self.config.max_attempts {
                    break;
                }
                attempt += 1;
            }
        }

        ControlFlow::Continue(())
    }

    /// One sink call; faults count as rejection
    async fn deliver(
        &mut self,
        recipient: &Address,
        payload: &Payload,
        attempt: u32,
    ) -> SendResult {
        self.transition(DispatcherState::Dispatching);
        self.stats.deliveries += 1;

        match self.sink.deliver(recipient, payload).await {
            Ok(SendResult::Accepted) => {
                self.stats.accepted += 1;
                trace!(recipient = %recipient, attempt, "Delivery accepted");
                SendResult::Accepted
            }
            Ok(SendResult::Rejected) => {
                self.stats.rejected += 1;
                warn!(recipient = %recipient, attempt, "Delivery rejected");
                SendResult::Rejected
            }
            Err(e) => {
                self.stats.sink_faults += 1;
                warn!(
                    recipient = %recipient,
                    attempt,
                    error = %e,
                    "Delivery failed, treating as rejection"
                );
                SendResult::Rejected
            }
        }
    }

    /// Cancellation-aware pause of one backoff interval
    async fn back_off(&mut self, cancel: &CancellationToken) -> ControlFlow<()> {
        self.transition(DispatcherState::BackingOff);
        self.stats.backoffs += 1;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => ControlFlow::Break(()),
            _ = tokio::time::sleep(self.config.backoff) => ControlFlow::Continue(()),
        }
    }

    fn transition(&mut self, next: DispatcherState) {
        if self.state != next {
            trace!(from = ?self.state, to = ?next, "Dispatcher state");
            self.state = next;
        }
    }
}
