//! Block list: unresponsive members are short-circuited for a configured
//! duration, entries expiring by timestamp on read (§4.7).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Blocks member ids for `duration`; reads lazily evict expired entries
/// rather than running a background sweep.
pub struct BlockList {
    blocked: DashMap<String, DateTime<Utc>>,
    duration: Duration,
}

impl BlockList {
    pub fn new(duration: Duration) -> Self {
        Self { blocked: DashMap::new(), duration }
    }

    /// Block `member_id` for this list's configured duration, from now.
    pub fn block(&self, member_id: impl Into<String>) {
        let expires_at = Utc::now() + chrono::Duration::from_std(self.duration).unwrap_or(chrono::Duration::hours(1));
        self.blocked.insert(member_id.into(), expires_at);
    }

    /// Whether `member_id` is currently blocked. Removes the entry if its
    /// block window has already elapsed.
    pub fn is_blocked(&self, member_id: &str) -> bool {
        let Some(expires_at) = self.blocked.get(member_id).map(|entry| *entry) else {
            return false;
        };
        if Utc::now() >= expires_at {
            self.blocked.remove(member_id);
            return false;
        }
        true
    }

    pub fn unblock(&self, member_id: &str) {
        self.blocked.remove(member_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_then_query() {
        let list = BlockList::new(Duration::from_secs(3600));
        assert!(!list.is_blocked("m1"));
        list.block("m1");
        assert!(list.is_blocked("m1"));
    }

    #[test]
    fn test_block_expires() {
        let list = BlockList::new(Duration::from_millis(0));
        list.block("m1");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(!list.is_blocked("m1"));
    }

    #[test]
    fn test_unblock_removes_entry() {
        let list = BlockList::new(Duration::from_secs(3600));
        list.block("m1");
        list.unblock("m1");
        assert!(!list.is_blocked("m1"));
    }
}
