//! Error types for slircbot.
//!
//! Each layer has its own enum. None of these are fatal at runtime: transport
//! errors become connection events, handler errors are logged at the dispatch
//! boundary. Only configuration errors stop the binary.

use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Transport Errors (connection layer)
// ============================================================================

/// Errors raised while opening or running a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid server name for TLS: {0}")]
    InvalidServerName(String),

    #[error("connect timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("protocol error: {0}")]
    Protocol(#[from] slircbot_proto::ProtocolError),
}

impl TransportError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidServerName(_) => "invalid_server_name",
            Self::Timeout(_) => "timeout",
            Self::Protocol(_) => "protocol",
        }
    }
}

/// Transport errors are shared between event subscribers.
pub type SharedTransportError = Arc<TransportError>;

// ============================================================================
// Handler Errors (plugin execution)
// ============================================================================

/// Errors a handler may return. Caught, logged and otherwise ignored.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "failed",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Registry Errors (handler registration)
// ============================================================================

/// Errors raised when registering handlers.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid pattern for '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("handler name must not be empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_codes() {
        assert_eq!(HandlerError::Failed("x".into()).error_code(), "failed");
        assert_eq!(HandlerError::InvalidInput("x".into()).error_code(), "invalid_input");
        let err: HandlerError = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_code(), "internal_error");
        assert_eq!(err.to_string(), "internal error: boom");
    }

    #[test]
    fn transport_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::from(io);
        assert_eq!(err.error_code(), "io");
    }

    #[test]
    fn transport_timeout_display() {
        let err = TransportError::Timeout(std::time::Duration::from_secs(30));
        assert_eq!(err.error_code(), "timeout");
        assert_eq!(err.to_string(), "connect timed out after 30s");
    }
}
