//! Sink implementations
//!
//! Contains LogSink and MockSink.

mod log;
mod mock;

pub use self::log::LogSink;
pub use self::mock::{DeliveryLog, DeliveryRecord, MockSink};
