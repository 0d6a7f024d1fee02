//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Rejections and collaborator faults are absorbed by the run loop, so
/// these only surface while constructing a dispatcher.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Invalid dispatcher configuration
    #[error("invalid dispatcher config at '{field}': {message}")]
    InvalidConfig { field: String, message: String },
}

impl DispatcherError {
    /// Create an invalid config error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
