//! DeliverySink trait - Dispatcher output interface

use std::sync::Arc;

use crate::{Address, ContractError, Payload, SendResult};

/// Delivers a payload to one address
///
/// Rejection is reported as `Ok(SendResult::Rejected)`. `Err` is reserved for
/// faults below the abstraction (transport failure and the like).
#[trait_variant::make(DeliverySink: Send)]
pub trait LocalDeliverySink {
    /// Sink name (used for logging)
    fn name(&self) -> &str;

    /// Deliver `payload` to `address`
    ///
    /// # Errors
    /// Returns a collaborator fault; never used for ordinary rejection
    async fn deliver(
        &self,
        address: &Address,
        payload: &Payload,
    ) -> Result<SendResult, ContractError>;
}

/// Shared sinks: one sink may serve several dispatchers
impl<T> DeliverySink for Arc<T>
where
    T: DeliverySink + Send + Sync,
{
    fn name(&self) -> &str {
        DeliverySink::name(&**self)
    }

    async fn deliver(
        &self,
        address: &Address,
        payload: &Payload,
    ) -> Result<SendResult, ContractError> {
        DeliverySink::deliver(&**self, address, payload).await
    }
}
