use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::{Map, Value};

/// Keys touched by a single [`KeyStore::upsert`] call, grouped by what happened to them.
///
/// Empty buckets are left out when the outcome is serialized.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertOutcome {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub set: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_updated: Vec<String>,
}

impl UpsertOutcome {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.removed.is_empty() && self.not_updated.is_empty()
    }
}

// A thread-safe key-value store using RwLock for concurrent read/write access.
// Allows multiple readers or one writer at a time. Cloning hands out another
// handle to the same map.
#[derive(Clone, Default)]
pub struct KeyStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl KeyStore {
    // Create a new KeyStore with an empty HashMap
    pub fn new() -> Self {
        KeyStore {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // Every mutation is a single insert or remove, so a guard left behind by a
    // panicking thread still points at a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    // Get a value by key, cloned out so the read lock is released on return
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    // All keys present at the time of the call, in no particular order
    pub fn list_keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    // Copy of the whole store, so callers can serialize it without holding the lock
    pub fn snapshot(&self) -> Map<String, Value> {
        self.read()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Applies a batch of writes under a single write lock.
    ///
    /// A `null` value removes the key (absent keys are still reported as removed).
    /// Any other value is stored if the key is absent; if the key is present it
    /// is replaced only when `overwrite` is set and reported as `not_updated`
    /// otherwise.
    pub fn upsert(&self, pairs: Map<String, Value>, overwrite: bool) -> UpsertOutcome {
        let mut outcome = UpsertOutcome::default();
        let mut entries = self.write();

        for (key, value) in pairs {
            if value.is_null() {
                entries.remove(&key);
                outcome.removed.push(key);
                continue;
            }

            match entries.entry(key) {
                Entry::Occupied(mut slot) => {
                    if overwrite {
                        outcome.set.push(slot.key().clone());
                        slot.insert(value);
                    } else {
                        outcome.not_updated.push(slot.key().clone());
                    }
                }
                Entry::Vacant(slot) => {
                    outcome.set.push(slot.key().clone());
                    slot.insert(value);
                }
            }
        }

        outcome
    }

    // Remove a single key, returning whether it was present
    pub fn remove(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }
}
