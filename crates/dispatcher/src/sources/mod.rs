//! Source implementations
//!
//! Contains ChannelSource, JsonLinesSource, and MockSource.

mod channel;
mod json_lines;
mod mock;

pub use self::channel::ChannelSource;
pub use self::json_lines::{parse_event_line, JsonLinesSource};
pub use self::mock::MockSource;
