//! EventSource trait - Dispatcher input interface

use crate::{ContractError, Event};

/// Upstream producer of events
///
/// The dispatcher is the single consumer. `read_event` may suspend
/// indefinitely and must be cancel-safe: the dispatcher drops the pending
/// future when a stop request wins the race.
#[trait_variant::make(EventSource: Send)]
pub trait LocalEventSource {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Produce the next event
    ///
    /// # Errors
    /// Returns a collaborator fault (closed upstream, decode failure, IO)
    async fn read_event(&mut self) -> Result<Event, ContractError>;
}
