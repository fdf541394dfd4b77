//! Single-flight guard so two passes never reconcile the same sheet at once.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Set of keys with a pass in flight.
#[derive(Clone, Default)]
pub struct SyncGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Held while a pass runs; releases its key on drop.
pub struct SyncLease {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

fn lock(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("recovering from poisoned sync guard");
        poisoned.into_inner()
    })
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if a lease for it is already held.
    pub fn try_acquire(&self, key: &str) -> Option<SyncLease> {
        if !lock(&self.in_flight).insert(key.to_string()) {
            return None;
        }
        Some(SyncLease {
            key: key.to_string(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_held(&self, key: &str) -> bool {
        lock(&self.in_flight).contains(key)
    }
}

impl Drop for SyncLease {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
    }
}
