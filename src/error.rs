use thiserror::Error;

use crate::emitter::EventId;

/// Boxed error returned by fallible listeners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// ListenerFailure
// ---------------------------------------------------------------------------

/// A listener failed while an event was being dispatched.
///
/// This is the value handed to `"error"` listeners (as the first argument)
/// when a listener of some other event returns `Err` or panics.
#[derive(Debug, Error)]
pub enum ListenerFailure {
    #[error("Listener for \"{event}\" failed: {source}")]
    Failed {
        event: EventId,
        #[source]
        source: BoxError,
    },

    #[error("Listener for \"{event}\" panicked: {message}")]
    Panicked { event: EventId, message: String },
}

impl ListenerFailure {
    /// The event whose dispatch pass raised the failure.
    pub fn event(&self) -> &EventId {
        match self {
            Self::Failed { event, .. } => event,
            Self::Panicked { event, .. } => event,
        }
    }
}

// ---------------------------------------------------------------------------
// EmitError
// ---------------------------------------------------------------------------

/// Failures that escape [`EventEmitter::emit`](crate::emitter::EventEmitter::emit).
///
/// Listener failures are normally re-routed to the `"error"` event; only a
/// failure on the error path itself reaches the caller.
#[derive(Debug, Error)]
pub enum EmitError {
    /// `"error"` was emitted while no listener was registered for it.
    #[error("Unhandled error event: {0}")]
    Unhandled(String),

    /// A listener of the `"error"` event failed.
    #[error("Error listener failed")]
    ErrorListener(#[source] ListenerFailure),
}

// ---------------------------------------------------------------------------
// MaxListenersExceeded
// ---------------------------------------------------------------------------

/// Diagnostic raised when an event collects more listeners than the
/// configured threshold. Never blocks registration; it is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Possible listener leak: \"{event}\" has {count} listeners, \
     more than the warning threshold of {max}. Use set_max_listeners() to raise it"
)]
pub struct MaxListenersExceeded {
    pub event: EventId,
    pub count: usize,
    pub max: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
