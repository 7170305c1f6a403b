//! Process-local, LRU-bounded `ClusterIdentity -> Pid` cache (§4.7).

// Layer 1: Standard library imports
use std::num::NonZeroUsize;

// Layer 2: Third-party crate imports
use lru::LruCache;
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::identity::ClusterIdentity;
use crate::pid::Pid;

/// A lookup proceeds cache-first; on miss the caller falls through to the
/// identity lookup strategy and populates the cache with the result.
pub struct PidCache {
    inner: Mutex<LruCache<ClusterIdentity, Pid>>,
}

impl PidCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { inner: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, identity: &ClusterIdentity) -> Option<Pid> {
        self.inner.lock().get(identity).cloned()
    }

    pub fn insert(&self, identity: ClusterIdentity, pid: Pid) {
        self.inner.lock().put(identity, pid);
    }

    /// Drop a cached entry — used on `DeadLetter`/not-found replies and
    /// when a topology change moves the identity off this cache's view.
    pub fn invalidate(&self, identity: &ClusterIdentity) {
        self.inner.lock().pop(identity);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
