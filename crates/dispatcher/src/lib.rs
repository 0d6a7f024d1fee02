//! # Dispatcher
//!
//! 事件分发模块。
//!
//! 负责：
//! - 从 `EventSource` 逐个读取 `Event`
//! - 按顺序 Fan-out 到每个收件地址
//! - 被拒绝时按固定间隔退避，可随时协作取消

pub mod cancel;
pub mod dispatcher;
pub mod error;
pub mod sinks;
pub mod sources;
pub mod stats;

pub use cancel::CancellationToken;
pub use contracts::{Address, DeliverySink, Event, EventSource, Payload, SendResult};
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig, DispatcherState};
pub use error::DispatcherError;
pub use sinks::{DeliveryLog, DeliveryRecord, LogSink, MockSink};
pub use sources::{parse_event_line, ChannelSource, JsonLinesSource, MockSource};
pub use stats::DispatchStats;
