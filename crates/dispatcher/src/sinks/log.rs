//! LogSink - logs delivery summary via tracing

use contracts::{Address, ContractError, DeliverySink, Payload, SendResult};
use tracing::{info, instrument};

/// Sink that logs every delivery and accepts it
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_delivery(&self, address: &Address, payload: &Payload) {
        info!(
            sink = %self.name,
            data_center = %address.data_center,
            node_id = %address.node_id,
            origin = %payload.origin,
            bytes = payload.data.len(),
            "Payload delivered"
        );
    }
}

impl DeliverySink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_deliver",
        skip(self, address, payload),
        fields(sink = %self.name, recipient = %address)
    )]
    async fn deliver(
        &self,
        address: &Address,
        payload: &Payload,
    ) -> Result<SendResult, ContractError> {
        self.log_delivery(address, payload);
        Ok(SendResult::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_accepts() {
        let sink = LogSink::new("test_log");
        let result = sink
            .deliver(&Address::new("dc1", "n1"), &Payload::new("o", vec![1, 2, 3]))
            .await;
        assert_eq!(result.unwrap(), SendResult::Accepted);
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
