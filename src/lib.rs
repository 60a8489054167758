//! Synchronous, in-process publish/subscribe.
//!
//! [`EventEmitter`] maps event identifiers to ordered listener lists and
//! invokes them on the caller's thread when an event is emitted. See
//! [`emitter`] for the dispatch rules.

pub mod error;
pub mod types;

pub mod emitter;

pub use emitter::{Args, EventEmitter, EventId, Listener, ListenerKind, Symbol};
pub use error::{BoxError, EmitError, ListenerFailure, MaxListenersExceeded};
pub use types::{default_max_listeners, set_default_max_listeners, EmitterOptions, UNLIMITED};
