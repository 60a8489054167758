use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;

/// Threshold value meaning "no limit". A threshold of `0` behaves the same.
pub const UNLIMITED: usize = usize::MAX;

/// Initial value of the process-wide default threshold.
pub const INITIAL_DEFAULT_MAX_LISTENERS: usize = 10;

static DEFAULT_MAX_LISTENERS: AtomicUsize = AtomicUsize::new(INITIAL_DEFAULT_MAX_LISTENERS);

/// Process-wide listener threshold, captured by every emitter at construction.
pub fn default_max_listeners() -> usize {
    DEFAULT_MAX_LISTENERS.load(Ordering::Relaxed)
}

/// Change the process-wide threshold.
///
/// Only emitters constructed afterwards see the new value; existing instances
/// keep the threshold they captured.
pub fn set_default_max_listeners(n: usize) {
    DEFAULT_MAX_LISTENERS.store(n, Ordering::Relaxed);
}

/// Construction options for [`EventEmitter`](crate::emitter::EventEmitter).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmitterOptions {
    /// Listener-count warning threshold. `None` captures
    /// [`default_max_listeners`] at construction.
    pub max_listeners: Option<usize>,
    /// Convert listener panics into `"error"` events. When `false`, a
    /// panicking listener unwinds through `emit`.
    pub catch_panics: bool,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            max_listeners: None,
            catch_panics: true,
        }
    }
}

impl EmitterOptions {
    /// The threshold an emitter built from these options starts with.
    pub(crate) fn resolve_max_listeners(&self) -> usize {
        self.max_listeners.unwrap_or_else(default_max_listeners)
    }
}
