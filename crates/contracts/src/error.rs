//! Collaborator fault definitions
//!
//! Categorized by side: source / sink

use thiserror::Error;

/// Unified collaborator error type
///
/// Rejection is not represented here; see `SendResult`.
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Source Errors =====
    /// Upstream closed, no further events
    #[error("source '{source_name}' closed")]
    SourceClosed { source_name: String },

    /// Source read failure
    #[error("source '{source_name}' read error: {message}")]
    SourceRead {
        source_name: String,
        message: String,
    },

    /// Malformed event record
    #[error("decode error at line {line}: {message}")]
    Decode { line: u64, message: String },

    // ===== Sink Errors =====
    /// Sink delivery fault
    #[error("sink '{sink_name}' delivery error: {message}")]
    SinkDelivery { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create source closed error
    pub fn source_closed(source_name: impl Into<String>) -> Self {
        Self::SourceClosed {
            source_name: source_name.into(),
        }
    }

    /// Create source read error
    pub fn source_read(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(line: u64, message: impl Into<String>) -> Self {
        Self::Decode {
            line,
            message: message.into(),
        }
    }

    /// Create sink delivery error
    pub fn sink_delivery(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkDelivery {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
