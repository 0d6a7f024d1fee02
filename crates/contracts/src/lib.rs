//! # Contracts
//!
//! Frozen interface contracts shared by the dispatcher and its collaborators.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - An `Event` carries one `Payload` and an ordered list of recipient `Address`es
//! - `EventSource` produces events, `DeliverySink` delivers a payload to one address
//! - Rejection is a `SendResult`, never an error

mod error;
mod event;
mod sink;
mod source;

pub use error::*;
pub use event::*;
pub use sink::*;
pub use source::*;
