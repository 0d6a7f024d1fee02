//! ChannelSource - events pushed in-process through an mpsc channel

use contracts::{ContractError, Event, EventSource};
use tokio::sync::mpsc;

/// Source backed by a bounded tokio channel
///
/// A closed channel (all senders dropped, buffer drained) is reported as
/// `ContractError::SourceClosed` on every read.
pub struct ChannelSource {
    name: String,
    rx: mpsc::Receiver<Event>,
}

impl ChannelSource {
    /// Wrap an existing receiver
    pub fn new(name: impl Into<String>, rx: mpsc::Receiver<Event>) -> Self {
        Self {
            name: name.into(),
            rx,
        }
    }

    /// Create a channel and return its sending half with the source
    pub fn channel(name: impl Into<String>, capacity: usize) -> (mpsc::Sender<Event>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(name, rx))
    }
}

impl EventSource for ChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_event(&mut self) -> Result<Event, ContractError> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| ContractError::source_closed(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Address, Payload};

    #[tokio::test]
    async fn test_channel_source_yields_in_order() {
        let (tx, mut source) = ChannelSource::channel("chan", 4);
        for origin in ["first", "second"] {
            tx.send(Event::new(
                vec![Address::new("dc1", "n1")],
                Payload::new(origin, vec![]),
            ))
            .await
            .unwrap();
        }

        assert_eq!(source.read_event().await.unwrap().payload.origin, "first");
        assert_eq!(source.read_event().await.unwrap().payload.origin, "second");
    }

    #[tokio::test]
    async fn test_channel_source_closed() {
        let (tx, mut source) = ChannelSource::channel("chan", 1);
        drop(tx);

        let err = source.read_event().await.unwrap_err();
        assert!(matches!(err, ContractError::SourceClosed { .. }));
    }
}
