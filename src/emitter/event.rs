//! Event identifiers.
//!
//! An event is named either by a string or by a [`Symbol`], an opaque token
//! that only compares equal to itself (and its clones).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Emitted with `(EventId, Listener)` before a listener is added.
pub const NEW_LISTENER: &str = "newListener";
/// Emitted with `(EventId, Listener)` after a listener is removed.
pub const REMOVE_LISTENER: &str = "removeListener";
/// Receives listener failures; has a logging listener from construction.
pub const ERROR: &str = "error";

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique event token.
///
/// Two symbols created with the same description are still distinct.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new() -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: None,
        }
    }

    /// Create a symbol carrying a description used only for display.
    pub fn with_description(description: impl Into<Arc<str>>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::new()
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

/// Key under which listeners are grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventId {
    Name(Arc<str>),
    Symbol(Symbol),
}

impl EventId {
    /// The name, if this is a string identifier.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Symbol(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.as_name() == Some(ERROR)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<&str> for EventId {
    fn from(name: &str) -> Self {
        Self::Name(Arc::from(name))
    }
}

impl From<String> for EventId {
    fn from(name: String) -> Self {
        Self::Name(Arc::from(name))
    }
}

impl From<Symbol> for EventId {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<&Symbol> for EventId {
    fn from(symbol: &Symbol) -> Self {
        Self::Symbol(symbol.clone())
    }
}

impl From<&EventId> for EventId {
    fn from(id: &EventId) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for EventId {
    fn eq(&self, other: &str) -> bool {
        self.as_name() == Some(other)
    }
}

impl PartialEq<&str> for EventId {
    fn eq(&self, other: &&str) -> bool {
        self.as_name() == Some(*other)
    }
}
