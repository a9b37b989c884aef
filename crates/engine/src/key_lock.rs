//! Per-master-key mutual exclusion
//!
//! Upserts on different keys proceed in parallel; upserts on the same key
//! queue. A key occupies memory only while some thread holds it.

use std::collections::HashSet;

use parking_lot::{Condvar, Mutex};
use tracedoc_core::MasterKey;

/// Set of master keys currently held
#[derive(Debug, Default)]
pub struct KeyLocks {
    held: Mutex<HashSet<MasterKey>>,
    released: Condvar,
}

impl KeyLocks {
    /// Create an empty lock set
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `key` is free, then hold it until the guard drops
    pub fn lock(&self, key: MasterKey) -> KeyGuard<'_> {
        let mut held = self.held.lock();
        while held.contains(&key) {
            self.released.wait(&mut held);
        }
        held.insert(key);
        KeyGuard { locks: self, key }
    }

    /// Whether `key` is currently held
    pub fn is_held(&self, key: MasterKey) -> bool {
        self.held.lock().contains(&key)
    }
}

/// Holds one master key; releases it on drop
#[derive(Debug)]
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: MasterKey,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.locks.held.lock().remove(&self.key);
        self.locks.released.notify_all();
    }
}
