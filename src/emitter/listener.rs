use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::Args;
use crate::error::BoxError;

/// Identity of a [`Listener`]; shared by all clones of the handle.
pub type ListenerId = u64;

/// Result returned by fallible listener closures.
pub type ListenerResult = Result<(), BoxError>;

/// Closure type for event listeners.
pub type ListenerFn = dyn Fn(&Args) -> ListenerResult + Send + Sync;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// A registrable callback.
///
/// Closures cannot be compared, so each handle gets a unique id at creation.
/// Clones share that id, and removal matches on it: keep a clone of the
/// handle you registered in order to remove it later.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Arc<ListenerFn>,
}

impl Listener {
    /// Wrap a callback that cannot fail.
    pub fn new(callback: impl Fn(&Args) + Send + Sync + 'static) -> Self {
        Self::fallible(move |args| {
            callback(args);
            Ok(())
        })
    }

    /// Wrap a callback whose `Err` is re-routed to the `"error"` event.
    pub fn fallible(callback: impl Fn(&Args) -> ListenerResult + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed),
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub(crate) fn call(&self, args: &Args) -> ListenerResult {
        (self.callback)(args)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

/// How a registered listener behaves across emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    /// Invoked on every emit until removed.
    Persistent,
    /// Invoked on the first emit, then removed.
    Once,
}
