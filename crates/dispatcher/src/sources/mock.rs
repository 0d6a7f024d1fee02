//! MockSource - periodic synthetic events

use std::time::Duration;

use bytes::Bytes;
use contracts::{Address, ContractError, Event, EventSource, Payload};
use tokio::time::sleep;
use tracing::trace;

/// Source that yields the same event after a fixed interval, forever
pub struct MockSource {
    name: String,
    interval: Duration,
    recipients: Vec<Address>,
    payload: Payload,
}

impl MockSource {
    /// Create a mock source with explicit recipients and payload
    pub fn new(
        name: impl Into<String>,
        interval: Duration,
        recipients: Vec<Address>,
        payload: Payload,
    ) -> Self {
        Self {
            name: name.into(),
            interval,
            recipients,
            payload,
        }
    }

    /// One recipient `DataCenter1/Node1`, a two-byte payload, every second
    pub fn demo() -> Self {
        Self::new(
            "mock",
            Duration::from_secs(1),
            vec![Address::new("DataCenter1", "Node1")],
            Payload::new("Source", Bytes::from_static(&[0x00, 0x01])),
        )
    }

    /// Override the interval between events
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the recipient list
    pub fn with_recipients(mut self, recipients: Vec<Address>) -> Self {
        self.recipients = recipients;
        self
    }
}

impl EventSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_event(&mut self) -> Result<Event, ContractError> {
        sleep(self.interval).await;
        trace!(source = %self.name, "Mock event produced");
        Ok(Event::new(self.recipients.clone(), self.payload.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_demo_source_waits_interval() {
        let mut source = MockSource::demo();
        let started = Instant::now();

        let event = source.read_event().await.unwrap();

        assert_eq!(Instant::now() - started, Duration::from_secs(1));
        assert_eq!(event.recipients, vec![Address::new("DataCenter1", "Node1")]);
        assert_eq!(event.payload.origin, "Source");
        assert_eq!(event.payload.data.as_ref(), &[0x00, 0x01]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrides() {
        let mut source = MockSource::demo()
            .with_interval(Duration::from_millis(10))
            .with_recipients(vec![]);

        let event = source.read_event().await.unwrap();
        assert!(event.recipients.is_empty());
    }
}
