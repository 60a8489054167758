//! Argument lists forwarded from `emit` to listeners.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased, ordered argument list.
///
/// Cloning is cheap: each slot is an `Arc`, so every listener of a dispatch
/// pass sees the same values.
#[derive(Clone, Default)]
pub struct Args(Vec<Arc<dyn Any + Send + Sync>>);

impl Args {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a value and return the list, for builder-style construction.
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.0.push(Arc::new(value));
    }

    /// The argument at `index`, if present and of type `T`.
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.0.get(index).and_then(|value| (**value).downcast_ref::<T>())
    }

    /// Whether the argument at `index` exists and is a `T`.
    pub fn is<T: Any>(&self, index: usize) -> bool {
        self.get::<T>(index).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args").field("len", &self.0.len()).finish()
    }
}

/// Build an [`Args`] list: `args![1, "two", String::from("three")]`.
#[macro_export]
macro_rules! args {
    () => {
        $crate::emitter::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::emitter::Args::new()$(.with($value))+
    };
}
