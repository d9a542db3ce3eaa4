//! Port for structured audit logging.
//!
//! Defines the [`AuditLogger`] trait for recording review events
//! (provider calls, responses, parse failures, filtered findings) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics on stderr, while this port captures a
//! machine-readable transcript (JSONL) that CI can upload as an artifact.

use serde_json::Value;

/// A structured audit event.
///
/// Each event has a type string and a JSON payload with event-specific fields.
/// The timestamp is added by the writer.
pub struct AuditEvent {
    /// Event type identifier (e.g., "api_request", "api_response").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging audit events.
///
/// `log` is synchronous and non-fallible; write failures are ignored so
/// logging never interrupts a review.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when audit logging is disabled.
pub struct NoAuditLog;

impl AuditLogger for NoAuditLog {
    fn log(&self, _event: AuditEvent) {}
}
