//! Error types for the lobby presence subsystem.
//!
//! The core has no user-facing failure surface: malformed input is ignored,
//! per-job failures are logged inside the serialized worker, and downstream
//! delivery failures are logged and not retried. The types here exist for
//! the seams where a caller can observe a failure at all: delivery sinks,
//! queries against a stopped executor, and configuration validation.

use std::fmt;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Failure to hand a result to a downstream consumer.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Response channel closed before delivery")]
    ResponderClosed,
    #[error("Stats sink rejected snapshot: {reason}")]
    SinkRejected { reason: String },
}

// ----------------------------------------------------------------------------
// Unified Error Type
// ----------------------------------------------------------------------------

/// Core error type for the lobby presence subsystem.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The serialized executor's queue is closed (worker stopped).
    #[error("Executor unavailable: {message}")]
    Executor { message: String },

    /// Downstream delivery failure (response channel or stats sink).
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Configuration error.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl LobbyError {
    /// Create an executor-unavailable error with a message.
    pub fn executor<T: fmt::Display>(message: T) -> Self {
        LobbyError::Executor {
            message: message.to_string(),
        }
    }

    /// Create a configuration error with a reason.
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        LobbyError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a sink-rejected delivery error.
    pub fn sink_rejected<T: Into<String>>(reason: T) -> Self {
        LobbyError::Delivery(DeliveryError::SinkRejected {
            reason: reason.into(),
        })
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, LobbyError>;
pub type LobbyResult<T> = Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats() {
        let err = LobbyError::executor("queue closed");
        assert_eq!(err.to_string(), "Executor unavailable: queue closed");

        let err: LobbyError = DeliveryError::ResponderClosed.into();
        assert!(err.to_string().contains("Response channel closed"));

        let err = LobbyError::config_error("publish interval must be non-zero");
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
