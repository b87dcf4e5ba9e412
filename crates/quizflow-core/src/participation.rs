//! Persistent "has participated" flag.
//!
//! The flag survives restarts through a [`FlagStore`]. Storage failures are
//! the store's business: the tracker only ever sees "set" or "not set".

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Default storage key for the participation flag.
pub const PARTICIPATION_STORAGE_KEY: &str = "marriage-quiz-participated";

const FLAG_VALUE: &str = "true";

/// Minimal key-value storage for string flags.
///
/// Implementations absorb their own I/O failures: a failed read reads as
/// absent and a failed write is dropped after logging.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store, used for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls made so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
    }
}

impl<S: FlagStore + ?Sized> FlagStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// Reads and writes the participation flag under one storage key.
pub struct ParticipationTracker {
    store: Box<dyn FlagStore>,
    key: String,
}

impl std::fmt::Debug for ParticipationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipationTracker")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ParticipationTracker {
    /// Track under [`PARTICIPATION_STORAGE_KEY`].
    pub fn new(store: impl FlagStore + 'static) -> Self {
        Self::with_key(store, PARTICIPATION_STORAGE_KEY)
    }

    pub fn with_key(store: impl FlagStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the flag is set. Any value other than `"true"` reads as unset.
    pub fn has_participated(&self) -> bool {
        self.store.get(&self.key).as_deref() == Some(FLAG_VALUE)
    }

    /// Set the flag. Does not write when it is already set.
    pub fn mark(&self) {
        if self.has_participated() {
            return;
        }
        self.store.set(&self.key, FLAG_VALUE);
        tracing::info!(key = %self.key, "participation recorded");
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.store.remove(&self.key);
        tracing::info!(key = %self.key, "participation cleared");
    }
}
