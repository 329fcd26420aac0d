//! Telemetry utilities for handler timing and span naming.

use std::time::Instant;
use tracing::debug;

/// Guard for timing one handler invocation.
///
/// Logs the elapsed time at `debug` when dropped.
pub struct HandlerTimer {
    kind: &'static str,
    name: String,
    start: Instant,
}

impl HandlerTimer {
    /// Start timing a handler.
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for HandlerTimer {
    fn drop(&mut self) {
        let micros = self.start.elapsed().as_micros() as u64;
        debug!(kind = self.kind, handler = %self.name, elapsed_us = micros, "Handler finished");
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for everything one client does.
    pub fn client(name: &str) -> Span {
        info_span!("client", client = %name)
    }

    /// Span for one handler invocation.
    pub fn handler(kind: &'static str, name: &str, client: &str, target: Option<&str>) -> Span {
        if let Some(target) = target {
            info_span!("handler", kind, handler = %name, client = %client, target = %target)
        } else {
            info_span!("handler", kind, handler = %name, client = %client)
        }
    }
}
