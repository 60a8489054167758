//! EventEmitter: synchronous pub/sub keyed by [`EventId`].
//!
//! Listeners are stored per event as `Arc<Entry>` so snapshots are cheap.
//! Snapshot-on-emit semantics mean:
//!   - A listener added *during* emission is NOT called until the next emit.
//!   - A persistent listener removed *during* emission is still called in
//!     that round.
//!   - A once-listener is claimed before it runs, so it fires exactly once
//!     even when the same event is emitted again from inside a listener.
//!     It stays registered while running and is removed when it returns.
//!
//! A listener that returns `Err` or panics ends the current round; the
//! failure is re-emitted as `"error"` instead of reaching the caller. Only a
//! failure on the `"error"` path itself is returned from [`EventEmitter::emit`].
//!
//! All methods take `&self` (interior mutability via `parking_lot::Mutex`),
//! and the lock is never held during callbacks, so listeners may register,
//! remove and emit reentrantly.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::event::{ERROR, NEW_LISTENER, REMOVE_LISTENER};
use super::{Args, EventId, Listener, ListenerKind};
use crate::error::{BoxError, EmitError, ListenerFailure, MaxListenersExceeded};
use crate::types::{EmitterOptions, UNLIMITED};

// ============================================================================
// Entry
// ============================================================================

/// One registration. Registering the same handle twice yields two entries.
struct Entry {
    listener: Listener,
    kind: ListenerKind,
    fired: AtomicBool,
}

impl Entry {
    fn new(listener: Listener, kind: ListenerKind) -> Self {
        Self {
            listener,
            kind,
            fired: AtomicBool::new(false),
        }
    }

    /// Whether this entry may run now. Once-entries succeed a single time.
    fn claim(&self) -> bool {
        match self.kind {
            ListenerKind::Persistent => true,
            ListenerKind::Once => !self.fired.swap(true, Ordering::AcqRel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Back,
    Front,
}

type Registry = IndexMap<EventId, Vec<Arc<Entry>>>;

// ============================================================================
// EventEmitter
// ============================================================================

/// Synchronous event emitter.
///
/// A fresh emitter already has one `"error"` listener that logs through
/// `tracing`, so failures never vanish silently.
pub struct EventEmitter {
    registry: Mutex<Registry>,
    max_listeners: AtomicUsize,
    catch_panics: bool,
}

impl EventEmitter {
    /// Create an emitter with default options.
    pub fn new() -> Self {
        Self::with_options(EmitterOptions::default())
    }

    pub fn with_options(options: EmitterOptions) -> Self {
        let emitter = Self {
            registry: Mutex::new(IndexMap::new()),
            max_listeners: AtomicUsize::new(options.resolve_max_listeners()),
            catch_panics: options.catch_panics,
        };
        emitter.on(ERROR, default_error_listener());
        emitter
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Append `listener` to the listeners of `event`.
    ///
    /// Emits `"newListener"` first, then warns if the event now has more
    /// listeners than [`get_max_listeners`](Self::get_max_listeners).
    pub fn on(&self, event: impl Into<EventId>, listener: Listener) -> &Self {
        self.register(event.into(), listener, ListenerKind::Persistent, Position::Back)
    }

    /// Alias of [`on`](Self::on).
    pub fn add_listener(&self, event: impl Into<EventId>, listener: Listener) -> &Self {
        self.on(event, listener)
    }

    /// Insert `listener` ahead of every listener already registered for `event`.
    pub fn prepend_listener(&self, event: impl Into<EventId>, listener: Listener) -> &Self {
        self.register(event.into(), listener, ListenerKind::Persistent, Position::Front)
    }

    /// Append a listener that runs on the next emit of `event` only.
    pub fn once(&self, event: impl Into<EventId>, listener: Listener) -> &Self {
        self.register(event.into(), listener, ListenerKind::Once, Position::Back)
    }

    pub fn prepend_once_listener(&self, event: impl Into<EventId>, listener: Listener) -> &Self {
        self.register(event.into(), listener, ListenerKind::Once, Position::Front)
    }

    fn register(
        &self,
        event: EventId,
        listener: Listener,
        kind: ListenerKind,
        position: Position,
    ) -> &Self {
        // Observers must not see the listener they are being told about.
        self.notify(NEW_LISTENER, &event, &listener);

        let entry = Arc::new(Entry::new(listener, kind));
        let count = {
            let mut registry = self.registry.lock();
            let entries = registry.entry(event.clone()).or_default();
            match position {
                Position::Back => entries.push(entry),
                Position::Front => entries.insert(0, entry),
            }
            entries.len()
        };

        if position == Position::Back {
            if let Some(warning) = check_listener_limit(&event, count, self.get_max_listeners()) {
                tracing::warn!(
                    event = %warning.event,
                    count = warning.count,
                    max = warning.max,
                    "{warning}"
                );
            }
        }
        self
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Call every listener of `event`, in order, with `args`.
    ///
    /// Returns `Ok(true)` if at least one listener ran and `Ok(false)` if
    /// none did (no listeners, or only once-listeners that already fired).
    /// Listener failures are re-emitted as `"error"` with a
    /// [`ListenerFailure`] argument and do not surface here. `Err` means the
    /// error path itself failed: an `"error"` listener failed, or `"error"`
    /// was emitted with no listener registered for it.
    pub fn emit(&self, event: impl Into<EventId>, args: Args) -> Result<bool, EmitError> {
        let event: EventId = event.into();

        // Snapshot Arc references under the lock (cheap: just ref-count bumps).
        let snapshot: Vec<Arc<Entry>> = self
            .registry
            .lock()
            .get(&event)
            .cloned()
            .unwrap_or_default();

        if snapshot.is_empty() {
            if event.is_error() {
                return Err(EmitError::Unhandled(describe_error_args(&args)));
            }
            return Ok(false);
        }

        // Lock is released, so callbacks can safely call on()/off()/emit().
        let mut ran = false;
        for entry in &snapshot {
            if !entry.claim() {
                continue;
            }
            ran = true;
            let outcome = match entry.kind {
                ListenerKind::Persistent => self.invoke(&event, &entry.listener, &args),
                ListenerKind::Once => self.invoke_once(&event, entry, &args),
            };
            if let Err(failure) = outcome {
                if event.is_error() {
                    return Err(EmitError::ErrorListener(failure));
                }
                self.emit(ERROR, Args::new().with(failure))?;
                break;
            }
        }
        Ok(ran)
    }

    /// Run a claimed once-entry and remove it on every exit path, including
    /// a panic unwinding out of the listener when panics are not caught.
    fn invoke_once(&self, event: &EventId, entry: &Arc<Entry>, args: &Args) -> Result<(), ListenerFailure> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.invoke(event, &entry.listener, args)
        }));
        self.remove_entry(event, entry);
        outcome.unwrap_or_else(|payload| panic::resume_unwind(payload))
    }

    fn invoke(&self, event: &EventId, listener: &Listener, args: &Args) -> Result<(), ListenerFailure> {
        let result = if self.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| listener.call(args))).map_err(|payload| {
                ListenerFailure::Panicked {
                    event: event.clone(),
                    message: panic_message(payload.as_ref()),
                }
            })?
        } else {
            listener.call(args)
        };
        result.map_err(|source| ListenerFailure::Failed {
            event: event.clone(),
            source,
        })
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove the first registration of `listener` for `event`, then emit
    /// `"removeListener"`.
    ///
    /// Does nothing if the event or listener is not registered (safe to call
    /// multiple times).
    pub fn remove_listener(&self, event: impl Into<EventId>, listener: &Listener) -> &Self {
        let event: EventId = event.into();
        let removed = {
            let mut registry = self.registry.lock();
            registry.get_mut(&event).and_then(|entries| {
                let index = entries.iter().position(|e| e.listener == *listener)?;
                Some(entries.remove(index))
            })
        };

        match removed {
            Some(entry) => self.notify(REMOVE_LISTENER, &event, &entry.listener),
            None => tracing::trace!(
                event = %event,
                listener = listener.id(),
                "remove_listener: not registered"
            ),
        }
        self
    }

    /// Alias of [`remove_listener`](Self::remove_listener).
    pub fn off(&self, event: impl Into<EventId>, listener: &Listener) -> &Self {
        self.remove_listener(event, listener)
    }

    /// Drop every event and listener, including the default `"error"` listener.
    pub fn remove_all_listeners(&self) -> &Self {
        // Listeners are dropped after the lock is released: a captured value
        // may call back into the emitter from its Drop.
        let cleared = std::mem::take(&mut *self.registry.lock());
        drop(cleared);
        self
    }

    /// Empty the listener list of `event`. The event stays in
    /// [`event_names`](Self::event_names).
    pub fn remove_all_listeners_of(&self, event: impl Into<EventId>) -> &Self {
        let event: EventId = event.into();
        let cleared = self.registry.lock().get_mut(&event).map(std::mem::take);
        drop(cleared);
        self
    }

    /// Remove a once-entry after it ran, unless a listener already removed it.
    fn remove_entry(&self, event: &EventId, entry: &Arc<Entry>) {
        let removed = {
            let mut registry = self.registry.lock();
            registry.get_mut(event).and_then(|entries| {
                let index = entries.iter().position(|e| Arc::ptr_eq(e, entry))?;
                Some(entries.remove(index))
            })
        };
        if let Some(entry) = removed {
            self.notify(REMOVE_LISTENER, event, &entry.listener);
        }
    }

    /// Emit a `"newListener"` / `"removeListener"` notification.
    ///
    /// A failing notification must not undo the registry change, so the
    /// error is logged rather than returned.
    fn notify(&self, reserved: &str, event: &EventId, listener: &Listener) {
        let args = Args::new().with(event.clone()).with(listener.clone());
        if let Err(error) = self.emit(reserved, args) {
            tracing::error!(
                notification = reserved,
                event = %event,
                error = %error,
                "listener notification failed"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Every event that has been registered and not cleared by
    /// [`remove_all_listeners`](Self::remove_all_listeners), in first
    /// registration order. Includes events whose list is now empty.
    pub fn event_names(&self) -> Vec<EventId> {
        self.registry.lock().keys().cloned().collect()
    }

    pub fn listener_count(&self, event: impl Into<EventId>) -> usize {
        let event: EventId = event.into();
        self.registry
            .lock()
            .get(&event)
            .map_or(0, Vec::len)
    }

    /// Copy of the listeners registered for `event`, in dispatch order.
    pub fn listeners(&self, event: impl Into<EventId>) -> Vec<Listener> {
        let event: EventId = event.into();
        self.registry
            .lock()
            .get(&event)
            .map(|entries| entries.iter().map(|e| e.listener.clone()).collect())
            .unwrap_or_default()
    }

    /// Like [`listeners`](Self::listeners), with each listener's kind.
    pub fn raw_listeners(&self, event: impl Into<EventId>) -> Vec<(Listener, ListenerKind)> {
        let event: EventId = event.into();
        self.registry
            .lock()
            .get(&event)
            .map(|entries| entries.iter().map(|e| (e.listener.clone(), e.kind)).collect())
            .unwrap_or_default()
    }

    pub fn get_max_listeners(&self) -> usize {
        self.max_listeners.load(Ordering::Relaxed)
    }

    /// Set the warning threshold for this emitter. `0` or [`UNLIMITED`]
    /// disables the warning.
    pub fn set_max_listeners(&self, n: usize) -> &Self {
        self.max_listeners.store(n, Ordering::Relaxed);
        self
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: Vec<(EventId, usize)> = self
            .registry
            .lock()
            .iter()
            .map(|(event, entries)| (event.clone(), entries.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("events", &events)
            .field("max_listeners", &self.get_max_listeners())
            .field("catch_panics", &self.catch_panics)
            .finish()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn check_listener_limit(event: &EventId, count: usize, max: usize) -> Option<MaxListenersExceeded> {
    if max == 0 || max == UNLIMITED || count <= max {
        return None;
    }
    Some(MaxListenersExceeded {
        event: event.clone(),
        count,
        max,
    })
}

fn default_error_listener() -> Listener {
    Listener::new(|args| {
        tracing::error!(error = %describe_error_args(args), "unhandled error event");
    })
}

/// Best-effort text for the first argument of an `"error"` emission.
fn describe_error_args(args: &Args) -> String {
    if let Some(failure) = args.get::<ListenerFailure>(0) {
        failure.to_string()
    } else if let Some(error) = args.get::<BoxError>(0) {
        error.to_string()
    } else if let Some(message) = args.get::<String>(0) {
        message.clone()
    } else if let Some(message) = args.get::<&str>(0) {
        (*message).to_string()
    } else if args.is_empty() {
        "no error value".to_string()
    } else {
        format!("{} argument(s) of unrecognized type", args.len())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
