//! Event emitter: registration, synchronous dispatch and introspection.
//!
//! # Modules
//!
//! - [`event`]: [`EventId`], [`Symbol`] and the reserved event names.
//! - [`args`]: [`Args`], the type-erased argument list passed to listeners.
//! - [`listener`]: [`Listener`] handles and [`ListenerKind`].
//! - [`event_emitter`]: [`EventEmitter`] itself.

pub mod args;
pub mod event;
pub mod event_emitter;
pub mod listener;

pub use args::Args;
pub use event::{EventId, Symbol, ERROR, NEW_LISTENER, REMOVE_LISTENER};
pub use event_emitter::EventEmitter;
pub use listener::{Listener, ListenerId, ListenerKind, ListenerResult};
