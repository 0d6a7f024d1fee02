//! Event data model
//!
//! Immutable values handed from a source to the dispatcher.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Opaque payload forwarded to every recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Producer of the payload
    pub origin: String,

    /// Raw bytes (reference counted, cheap to clone)
    pub data: Bytes,
}

impl Payload {
    pub fn new(origin: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            origin: origin.into(),
            data: data.into(),
        }
    }
}

/// Delivery target
///
/// Equality is structural over both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub data_center: String,
    pub node_id: String,
}

impl Address {
    pub fn new(data_center: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            data_center: data_center.into(),
            node_id: node_id.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.data_center, self.node_id)
    }
}

/// One unit of work for the dispatcher
///
/// An empty recipient list is legal and dispatches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Recipients in delivery order (duplicates allowed)
    #[serde(default)]
    pub recipients: Vec<Address>,

    pub payload: Payload,
}

impl Event {
    pub fn new(recipients: Vec<Address>, payload: Payload) -> Self {
        Self {
            recipients,
            payload,
        }
    }
}

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendResult {
    Accepted,
    Rejected,
}

impl SendResult {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}
